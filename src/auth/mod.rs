// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Microtask Platform

//! # Authentication Module
//!
//! JWT authentication for the marketplace API.
//!
//! ## Auth Flow
//!
//! 1. Frontend authenticates the user (e.g. via its identity provider)
//! 2. Frontend calls `POST /jwt` with the account email to obtain a token
//! 3. Frontend sends `Authorization: Bearer <token>` on protected routes
//! 4. Server verifies the HS256 signature and expiry and extracts:
//!    - `sub` -> the caller's email, used for every ownership check
//!
//! ## Security
//!
//! - Tokens are signed with the `ACCESS_TOKEN_SECRET` shared secret
//! - Roles live on stored accounts and are re-checked per request
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod extractor;
pub mod roles;

pub use claims::{AuthKeys, AuthenticatedUser};
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth};
pub use roles::Role;
