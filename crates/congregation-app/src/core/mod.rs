//! # Core Application Module
//!
//! This module contains the session/profile state owner:
//!
//! - [`AuthContext`]: Long-lived owner of the auth snapshot
//!
//! Bootstrap timers live here too; they hold only a weak handle to the
//! context so a dropped context takes its timers with it.

pub(crate) mod context;
mod timers;

pub use context::AuthContext;
