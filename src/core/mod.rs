// Core modules implementing record codecs, the rewrite engine, stores, the
// auth gate, and error modeling.
pub mod codec;
pub mod credentials;
pub mod error;
pub mod rewrite;
pub mod session;
pub mod students;
