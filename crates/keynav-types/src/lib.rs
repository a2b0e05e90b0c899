//! Foundation types for keynav.
//!
//! This crate contains the types shared by every keynav crate: keyboard and
//! pointer input events, user settings, and the error type.

pub mod error;
pub mod input;
pub mod settings;
