//! # autostep-cli
//!
//! The `autostep` command line.
//!
//! - `build`: resolve configuration, load extensions, assemble, compile and
//!   link, reporting every diagnostic
//! - `run`: `build`, then execute the linked tests
//! - `new project|web`: write a starter project
//!
//! Exit code 0 means the command succeeded; every failure exits with 1.

#![deny(unsafe_code)]

pub mod args;
pub mod commands;
pub mod errors;

pub use args::{Cli, Command, NewArgs, ProjectArgs, Template};
pub use commands::{BuiltProject, build_project, default_loader, dispatch};
pub use errors::{CommandError, ErrorClass};
