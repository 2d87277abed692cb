//! Purpose: Shared store-directory resolution for the CLI.
//! Exports: `default_store_dir` and the two store file names.
//! Role: Keep the binary's path semantics in one place.
//! Invariants: Default store directory remains `~/.rollcall`.
//! Invariants: Store file names are fixed; only the directory moves.

use std::path::PathBuf;

pub(crate) const CREDENTIALS_FILE: &str = "credentials.txt";
pub(crate) const STUDENTS_FILE: &str = "students.txt";

pub(crate) fn default_store_dir() -> PathBuf {
    let home = std::env::var_os("HOME").unwrap_or_default();
    PathBuf::from(home).join(".rollcall")
}
