//! User context extraction.
//!
//! Reduces an authenticated-principal-like object (or none) to the fixed
//! identity/demographic block carried by every audit record.

mod principal;

pub use principal::{extract, Principal, UserContext};
