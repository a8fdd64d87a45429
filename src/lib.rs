// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Microtask Platform

//! Microtask Marketplace - Paid Task Backend
//!
//! This crate provides the backend for a micro-task marketplace where
//! buyers fund tasks with coins, workers submit completions for review,
//! and approved work pays out toward cash withdrawals.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token issuance and verification (HS256 JWT)
//! - `providers` - External payment integration (Stripe)
//! - `storage` - JSON document storage with typed repositories

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod providers;
pub mod state;
pub mod storage;
