//! Relief Core Library
//!
//! This crate provides the draft models, validation rules, derived totals,
//! error types and configuration shared by the relief portal client crates.
//! It performs no I/O: persistence and file transfer live behind the
//! collaborator traits in `relief-workflow`.

pub mod config;
pub mod draft;
pub mod error;
pub mod models;
pub mod repeatable;
pub mod totals;
pub mod validation;

// Re-export commonly used types
pub use config::{AutoSaveConfig, ClientConfig, Config};
pub use draft::{CrossCheckViolation, DraftDocument, DraftKey, DraftKind, Section, UserProfile};
pub use error::{
    AttachmentError, ErrorMetadata, LogLevel, ServiceError, SubmitError, WorkflowError,
};
pub use repeatable::{Item, Repeatable};
pub use validation::{ConditionalRule, FieldError, FieldErrorKind, FieldPath};
