//! Domain input validation.
//!
//! Every insights query starts by turning the caller's free-form input
//! into a `NormalizedDomain`.

pub mod normalizer;

pub use normalizer::{normalize_domain, NormalizedDomain};
