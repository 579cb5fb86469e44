//! Report output.
//!
//! - [`text`] — deduplicated, filtered `LICENSES.txt` assembly.
//! - [`header`] — attribution header prepended to a build artifact (`--prepend`).
//! - [`terminal`] — end-of-run summary box; lists unresolved dependencies with `--verbose`.

pub mod header;
pub mod terminal;
pub mod text;
