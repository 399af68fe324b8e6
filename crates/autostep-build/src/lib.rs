//! # autostep-build
//!
//! The build pipeline between loaded extensions and execution:
//!
//! - [`assemble_project`]: lets extensions attach, then gathers extension
//!   content and project-local files into a [`Project`](autostep_core::Project)
//! - [`build_and_report`]: compiles and links the project, logs every
//!   diagnostic and returns a [`BuildVerdict`]

#![deny(unsafe_code)]

pub mod assembler;
pub mod errors;
pub mod orchestrator;

pub use assembler::{DIAGNOSTIC_KEY, assemble_project};
pub use errors::{BuildError, Result};
pub use orchestrator::{BuildVerdict, ReportLevel, build_and_report, report_diagnostics, report_level};
