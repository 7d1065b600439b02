//! # Component Context
//!
//! Builds a validated, in-memory snapshot of a component's source files
//! (a [`Context`]) from a directory tree or a zip archive. Rule engines
//! consume the context to check file contents and paths.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐
//! │  Directory   │   │  Zip archive │
//! │  loader_dir  │   │  loader_zip  │
//! └──────┬───────┘   └──────┬───────┘
//!        │  depth / text /  │  name checks
//!        ▼                  ▼
//!   ┌─────────────────────────────┐
//!   │ Context                     │
//!   │  name · FileRegistry ·      │
//!   │  IgnoreMatcher              │
//!   └─────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use component_context::{load_context, LoaderConfig};
//! use std::path::Path;
//!
//! # async fn run() -> Result<(), component_context::ContextError> {
//! let ctx = load_context(Path::new("./widget"), &LoaderConfig::default()).await?;
//! for file in ctx.files() {
//!     if !ctx.is_ignore(&file.path) {
//!         println!("{} ({} bytes)", file.path, file.content.len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | File record and path helpers |
//! | [`registry`] | Ordered file registry |
//! | [`ignore`] | Glob ignore matcher |
//! | [`text`] | Plain-text detection and decoding |
//! | [`context`] | The context value |
//! | [`loader_dir`] | Directory loader |
//! | [`loader_zip`] | Zip archive loader |
//! | [`loader`] | Source dispatch |
//! | [`error`] | Error type |

pub mod config;
pub mod context;
pub mod error;
pub mod ignore;
pub mod loader;
pub mod loader_dir;
pub mod loader_zip;
pub mod models;
pub mod registry;
pub mod text;

pub use config::{BinaryPolicy, LoaderConfig};
pub use context::Context;
pub use error::ContextError;
pub use ignore::IgnoreMatcher;
pub use loader::load_context;
pub use loader_dir::load_directory;
pub use loader_zip::load_zip;
pub use models::File;
pub use registry::{FileRegistry, FileSelector};
