// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{AuthService, AuthorizationPolicy, IdentityResolver};

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub identity: Arc<dyn IdentityResolver>,
    pub policy: Arc<AuthorizationPolicy>,
}

impl AppState {
    pub fn new(
        auth: AuthService,
        identity: Arc<dyn IdentityResolver>,
        policy: AuthorizationPolicy,
    ) -> Self {
        Self {
            auth,
            identity,
            policy: Arc::new(policy),
        }
    }
}
