//! Primitive wrappers for the unified API.

mod documents;

pub use documents::Documents;
