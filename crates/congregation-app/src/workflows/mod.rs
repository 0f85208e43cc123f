//! # Workflows - Portable Business Logic
//!
//! This module contains workflow coordinators that implement multi-step
//! operations on top of the [`AuthContext`](crate::AuthContext) and its
//! injected gateway. They are portable across frontends.
//!
//! ## Design Patterns
//!
//! **1. Gateway-First**
//! - Call the gateway; never touch storage directly
//! - Session changes flow back through the gateway's notification, not
//!   through direct snapshot writes
//!
//! **2. Error Handling**
//! - Return `Result<T, AppError>` (not frontend-specific errors)
//! - Errors propagate to the UI for toast formatting
//!
//! ## Available Workflows
//!
//! - `bootstrap`: Startup sequence, session-change handling, profile resolution
//! - `auth`: Sign in, sign up, sign out
//! - `admin`: Permission panel (list profiles, toggle elevated access)

pub mod admin;
pub mod auth;
pub mod bootstrap;
