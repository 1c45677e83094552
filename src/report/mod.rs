//! Report rendering backends.
//!
//! JSON output is handled inline in `main` via `serde_json`.

pub mod csv;
pub mod terminal;
