//! Progressive input masking for identity and phone fields
//!
//! Formatting is reapplied from the full digit prefix on every keystroke, so
//! a partially typed value always renders in the mask's partial-progress
//! shape. Masking never fails; invalid characters are simply dropped.

mod mask;

pub use mask::{digits_only, MaskKind, MaskedInput, MAX_DIGITS};
