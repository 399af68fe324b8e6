//! # autostep-extensions
//!
//! Extension support for AutoStep projects.
//!
//! - **Sources and manifest**: where packages are looked up and which ones a
//!   project asks for ([`SourceSettings`], [`ExtensionManifest`])
//! - **Loading**: the [`ExtensionLoader`] seam and the directory-based
//!   [`LocalExtensionLoader`]
//! - **Entry points**: the [`ExtensionEntryPoint`] capability set, created
//!   from an [`EntryPointCatalog`]
//! - **Handle**: [`ExtensionHandle`] owns loaded entry points and unloads
//!   them when dropped
//! - **Built-ins**: the `console` entry point ([`builtin_catalog`])

#![deny(unsafe_code)]

pub mod builtin;
pub mod entry_point;
pub mod errors;
pub mod handle;
pub mod loader;
pub mod metadata;
pub mod sources;

pub use builtin::{CONSOLE_ENTRY_POINT, ConsoleEntryPoint, builtin_catalog};
pub use entry_point::{EntryPointCatalog, EntryPointFactory, ExtensionEntryPoint};
pub use errors::{ExtensionError, Result};
pub use handle::{ExtensionHandle, LoadedExtension};
pub use loader::{ExtensionLoader, LocalExtensionLoader};
pub use metadata::{CONTENT_DIR, METADATA_FILE_NAME, PackageMetadata};
pub use sources::{ExtensionManifest, PackageSource, STATE_DIR, SourceSettings, extensions_root};
