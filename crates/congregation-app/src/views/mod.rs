//! # View State Module
//!
//! This module contains the view state types that represent the current
//! application state. These types are plain data and can be:
//!
//! - Serialized for debugging
//! - Published through futures-signals for reactive updates

pub mod admin;
pub mod bootstrap;
pub mod notifications;
pub mod profile;

pub use admin::AdminPanelState;
pub use bootstrap::{AuthSnapshot, BootstrapPhase};
pub use notifications::ToastLevel;
pub use profile::{derive_display_name, NewProfile, Profile, ProfileUpdate, DEFAULT_DISPLAY_NAME};
