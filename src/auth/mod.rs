// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Stateless bearer-token authentication and role-based authorization.
//!
//! ## Auth Flow
//!
//! 1. An external login or registration flow checks the user's credentials
//!    and calls [`AuthService::issue_token`].
//! 2. The client sends `Authorization: Bearer <token>` on every request.
//! 3. The server:
//!    - verifies the HS256 signature, the expiry and the revocation store
//!    - resolves the subject into a [`Principal`] via [`IdentityResolver`]
//!    - checks the route's requirement in the [`AuthorizationPolicy`]
//! 4. Logout and account deletion call [`AuthService::revoke_token`].
//!
//! ## Security
//!
//! - Every authentication failure is reported as the same 401 body
//! - Role failures are 403, never 401
//! - Revocation lookups are time-bounded and fail closed
//! - The principal lives in request extensions only; nothing is global

pub mod claims;
pub mod codec;
pub mod context;
pub mod error;
pub mod extractor;
pub mod identity;
pub mod middleware;
pub mod policy;
pub mod revocation;
pub mod roles;
pub mod service;
pub mod verifier;

pub use claims::{Principal, TokenClaims};
pub use codec::{IssuedToken, SigningKey, TokenCodec};
pub use context::{BearerToken, RequestContext};
pub use error::AuthError;
pub use extractor::{Auth, OptionalAuth, PresentedToken};
pub use identity::{IdentityError, IdentityResolver, StaticIdentityResolver};
pub use policy::{Access, AuthorizationGate, AuthorizationPolicy, RouteId};
pub use revocation::{InMemoryRevocationStore, RevocationError, RevocationStore};
pub use roles::Role;
pub use service::AuthService;
pub use verifier::TokenVerifier;
