//! # Listalico Architecture
//!
//! Listalico is a personal note and task manager: notes with priorities,
//! categories and an optional task checkbox, grouped into colored folders,
//! with a two-stage trash and whole-store JSON backups.
//!
//! The crate is a **UI-agnostic library** that happens to ship a CLI client.
//!
//! ## The Layers
//!
//! ```text
//!   cli/         parse args, prompt, render        stdout / stderr / exit codes
//!     │
//!     ▼
//!   api.rs       "2-4" / "d1" / "Work"  →  ids      owns the Session
//!     │
//!     ▼
//!   commands/    one operation per fn on ids        Result<CmdResult>, no printing
//!     │
//!     ▼
//!   store/       NoteStore: four collections        StorageBackend: Fs | Mem
//! ```
//!
//! ## Ids and Indexes
//!
//! Stored ids are integers derived from creation time, compatible with
//! backups made by the browser app. Users never type them: notes are addressed
//! by display index (`1`, `2`, `d1`), folders by position or name. See
//! [`index`].
//!
//! ## Nothing Below the CLI Prints
//!
//! From `api.rs` inward, code takes Rust arguments and returns
//! `Result<CmdResult>`. It never prints and never exits. Persistence problems
//! are logged through `tracing` and handed back as warning messages.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Business logic for each operation
//! - [`store`]: Collections, persistence and storage backends
//! - [`model`]: Core data types (`Folder`, `Note`, trashed variants)
//! - [`index`]: Display indexes and folder selectors
//! - [`ids`]: Monotonic id generation
//! - [`session`]: Transient selection state
//! - [`config`]: Settings stored next to the data
//! - [`error`]: Error types
//! - `cli`: Argument parsing and terminal rendering for the binary (not part of the lib API)

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod ids;
pub mod index;
pub mod model;
pub mod session;
pub mod store;
