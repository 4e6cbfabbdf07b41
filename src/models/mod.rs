//! Data models for the Pulse backoffice console
//!
//! This module contains the data structures exchanged with the backend and
//! validated locally before submission:
//!
//! - Customer records, drafts, and listing envelopes
//! - Operator identity and token envelopes
//! - The persisted session with its expiry semantics
//! - Field validators (CPF checksum, phone shape, email, password strength)

pub mod customer;
pub mod session;
pub mod user;
pub mod validation;

// Re-export main types for convenience
pub use customer::{
    Customer, CustomerDraft, CustomerListQuery, CustomerPage, CustomerStats, CustomerStatus,
    DeletionReceipt, SortDirection,
};
pub use session::{Session, SessionState};
pub use user::{
    AuthProviderInfo, AuthProviders, AuthResponse, AuthUser, LoginRequest, RefreshResponse,
    RegisterRequest,
};
pub use validation::{
    CpfValidator, FieldErrors, SecurityValidators, Validatable, ValidationContext,
    ValidationError, Validators,
};
