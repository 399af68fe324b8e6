//! # autostep-lang
//!
//! Front end for the AutoStep test language.
//!
//! - **Test files** (`.as`): one `Feature:` with `Scenario:` blocks of
//!   `Given`/`When`/`Then`/`And`/`But` steps
//! - **Interaction files** (`.asi`): `Step: <kind> <pattern>` declarations
//! - **Linking**: every test step must match exactly one definition
//!
//! [`LanguageCompiler`] ties these together behind the
//! [`ProjectCompiler`](autostep_core::ProjectCompiler) trait.

#![deny(unsafe_code)]

pub mod ast;
pub mod compiler;
pub mod interaction_parser;
pub mod linker;
pub mod test_parser;

pub use compiler::LanguageCompiler;
pub use interaction_parser::parse_interaction_file;
pub use linker::link;
pub use test_parser::parse_test_file;
