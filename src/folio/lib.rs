//! # Folio Architecture
//!
//! Folio is a **UI-agnostic file viewing and structured editing library**. It
//! browses a directory tree, shows large text files one page at a time,
//! searches inside a file and jumps to matches across page boundaries, and
//! edits JSON documents field by field. The `folio` binary is one client of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, runs the browse loop   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Normalizes inputs (1-based hit numbers → indexes)        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - View, search, edit, list, file management                │
//! │  - Returns CmdResult, never prints                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Engine (session, navigator, paging, document, path)        │
//! │  - Page/line arithmetic and the view state machine          │
//! │  - Path-addressed JSON editing                              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Providers (provider/)                                      │
//! │  - ContentProvider, SearchProvider, PersistenceProvider     │
//! │  - FsProvider (production), InMemoryProvider (testing)      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Line Numbers
//!
//! Every line number a user sees is absolute and 1-based. Pages are 1-based
//! too. Search hits carry both the line and the page holding it, so moving to
//! a hit never guesses: either the page is loaded and the view scrolls, or the
//! page is fetched first and the view scrolls after.
//!
//! ## No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes Rust arguments, returns
//! `Result<CmdResult>` or plain types, never writes to stdout or stderr and
//! never exits the process. Logging goes through `tracing`; the binary decides
//! where it ends up.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Business logic for each command
//! - [`session`]: Per-file view state machine
//! - [`navigator`]: Search hits and the selection cursor
//! - [`paging`]: Line ↔ page arithmetic
//! - [`path`]: Addresses into JSON documents
//! - [`document`]: The structural editor
//! - [`highlight`]: Marking query matches inside a line
//! - [`provider`]: Provider traits and implementations
//! - [`config`]: Configuration management
//! - [`error`]: Error types
//! - `cli`: Argument parsing and printing for the binary (not part of the lib API)

pub mod api;
pub mod commands;
pub mod config;
pub mod document;
pub mod error;
pub mod highlight;
pub mod navigator;
pub mod paging;
pub mod path;
pub mod provider;
pub mod session;
