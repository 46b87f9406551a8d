//! Test helpers for workflow tests
//!
//! In-memory collaborators and draft fixtures, so controller behaviour can be
//! tested without a backend. Available to other crates through the
//! `test-helpers` feature.

pub mod fixtures;
pub mod mock_collaborators;

pub use fixtures::*;
pub use mock_collaborators::*;
