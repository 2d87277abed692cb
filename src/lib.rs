//! Purpose: Shared core library crate used by the `rollcall` CLI and tests.
//! Exports: `core` (record codecs, rewrite engine, stores, auth gate, errors).
//! Role: Internal library backing the binary; not a stable public SDK.
//! Invariants: Treat the crate API as internal until a dedicated library release.
//! Invariants: The store files are the only state; no caching across operations.
pub mod core;
