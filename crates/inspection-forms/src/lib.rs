//! Inspection Forms - storage, PDF export and user accounts
//!
//! This crate provides:
//! - `FormStore` and its in-memory implementation with form CRUD
//! - `FormService`: fetches a form once and renders it as a PDF report
//! - `UserRegistry`: registration, login and account management with
//!   Argon2 password hashes
//! - `TokenIssuer`: HS256 JWT session tokens
//!
//! # Example
//!
//! ```ignore
//! use inspection_forms::{FormService, InMemoryFormStore, NewForm};
//!
//! let store = InMemoryFormStore::new();
//! let id = store.create_form(new_form)?;
//! let pdf_bytes = FormService::new(store).generate_form_pdf(id)?;
//! ```

mod auth;
mod service;
mod store;
mod users;

pub use auth::{Claims, TokenIssuer, DEFAULT_TOKEN_TTL};
pub use service::{attachment_file_name, FormService};
pub use store::{FormHeaderPatch, FormStore, FormUpdate, InMemoryFormStore, NewForm};
pub use users::{NewUser, Role, User, UserId, UserRegistry, UserUpdate};

use inspection_report::{FormId, ReportError};
use thiserror::Error;

/// Errors raised by a form store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Form not found: {id}")]
    NotFound { id: FormId },

    #[error("Invalid form: {0}")]
    Invalid(String),
}

impl From<StoreError> for ReportError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id } => ReportError::NotFound { id },
            StoreError::Invalid(msg) => ReportError::RenderFailure(msg),
        }
    }
}

/// Errors raised while exporting a report to disk
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by user accounts and tokens
#[derive(Debug, Error)]
pub enum UserError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    #[error("User not found: {id}")]
    NotFound { id: UserId },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}
