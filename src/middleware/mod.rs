// SPDX-License-Identifier: MIT

//! Middleware modules (authentication, authorization, security headers).

pub mod auth;
pub mod security;

pub use auth::{require_admin, require_auth, require_subscription, CurrentUser};
