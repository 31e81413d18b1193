//! # tplgate-cli — Element Template Command-Line Interface
//!
//! A clap-based front end over `tplgate-registry`.
//!
//! ## Subcommands
//!
//! - `validate`: register element template files and report accepted
//!   templates and errors
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to domain crates; no validation logic here.

pub mod load;
pub mod validate;
