//! Local persistence for the operator session
//!
//! The console's stand-in for the web client's local storage: a small JSON
//! file in the per-user config directory, holding only the token envelope
//! and operator identity.

mod session;

pub use session::SessionStore;
