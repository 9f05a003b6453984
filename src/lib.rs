// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Civic Auth - Bearer Token Authentication Service
//!
//! This crate issues, verifies and revokes signed bearer tokens, resolves
//! their subjects into principals and enforces per-route role requirements
//! for Axum services.
//!
//! ## Modules
//!
//! - `api` - Reference HTTP routes and the authorization policy (Axum)
//! - `auth` - Token codec, revocation, identity resolution and middleware
//! - `config` - Environment configuration
//! - `sweeper` - Background purge of expired revocations

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod state;
pub mod sweeper;
