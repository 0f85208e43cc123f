//! # Congregation App - Portable Application Core
//!
//! Headless core of the Congregation community app: establishes the member's
//! session and profile at startup, exposes them as a reactive snapshot, and
//! derives the role-gated navigation shell from that snapshot.
//!
//! ## Architecture
//!
//! ```text
//! Frontend (web, desktop, mobile)
//!        ↓ ui facade
//! AuthContext ── workflows (bootstrap, auth, admin)
//!        ↓ Gateway trait
//! Hosted backend (identity service + profiles table)
//! ```
//!
//! The backend is reached only through [`Gateway`]; [`MemoryGateway`] is the
//! in-process implementation used by tests and the `app-host` binary.
//!
//! ## Usage
//!
//! ```rust
//! use congregation_app::{AppConfig, AuthContext, MemoryGateway, NavState};
//! use std::sync::Arc;
//!
//! # async fn run() {
//! let context = AuthContext::new(Arc::new(MemoryGateway::new()), AppConfig::default());
//! let snapshot = context.start().await;
//! assert!(snapshot.phase.is_settled());
//! assert_eq!(context.nav_state(), NavState::Anonymous);
//! context.dispose().await;
//! # }
//! ```

pub mod authorization;
pub mod config;
pub mod core;
pub mod errors;
pub mod gateway;
pub mod navigation;
pub mod ui;
pub mod views;
pub mod workflows;

pub use crate::config::{AppConfig, ConfigError};
pub use crate::core::AuthContext;
pub use crate::errors::{AppError, ErrorCategory, GatewayError};
pub use crate::gateway::{BoxedGateway, Gateway, MemoryGateway, Session, UserId};
pub use crate::navigation::{NavState, Resolution, Route, Screen};
pub use crate::views::{AuthSnapshot, BootstrapPhase, Profile};
