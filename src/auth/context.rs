// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request-scoped authentication state.
//!
//! The authenticator middleware inserts these values into the request's
//! extensions; they are dropped with the request and never shared.

use super::Principal;

/// Outcome of authentication for one request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestContext {
    /// No credential was presented
    #[default]
    Anonymous,
    /// A valid credential resolved to this principal
    Authenticated(Principal),
}

impl RequestContext {
    /// The authenticated principal, if any.
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            RequestContext::Anonymous => None,
            RequestContext::Authenticated(principal) => Some(principal),
        }
    }
}

/// The verified bearer token presented with the request.
#[derive(Clone)]
pub struct BearerToken(pub String);

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(..)")
    }
}
