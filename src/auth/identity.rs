// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity resolution: verified token subject → [`Principal`].
//!
//! The user store lives outside this crate and plugs in through
//! [`IdentityResolver`]. [`StaticIdentityResolver`] is a fixed in-memory
//! table used by the bundled binary and by tests.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;

use super::{Principal, Role};
use crate::config::{ConfigError, DEV_USERS_ENV};

/// Identity lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// No user exists for the subject (deleted or never registered)
    #[error("no principal for subject")]
    NotFound,
    /// The user store could not be reached
    #[error("identity backend unavailable: {0}")]
    Unavailable(String),
}

/// Resolves a verified subject into the principal for one request.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Look up the principal for `subject`.
    async fn resolve(&self, subject: &str) -> Result<Principal, IdentityError>;
}

/// Fixed subject → roles table.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityResolver {
    principals: HashMap<String, BTreeSet<Role>>,
}

impl StaticIdentityResolver {
    /// Create an empty resolver. Every lookup returns `NotFound`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a principal.
    pub fn with_principal(
        mut self,
        subject: impl Into<String>,
        roles: impl IntoIterator<Item = Role>,
    ) -> Self {
        self.principals
            .insert(subject.into(), roles.into_iter().collect());
        self
    }

    /// Parse a `subject=ROLE[+ROLE],...` list, as found in `DEV_USERS`.
    pub fn from_list(list: &str) -> Result<Self, ConfigError> {
        let invalid = |reason| ConfigError::InvalidValue {
            var: DEV_USERS_ENV,
            value: list.to_string(),
            reason,
        };

        let mut resolver = Self::new();
        for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (subject, roles) = item
                .split_once('=')
                .ok_or_else(|| invalid("expected subject=ROLE[+ROLE]"))?;
            let subject = subject.trim();
            if subject.is_empty() {
                return Err(invalid("empty subject"));
            }
            let roles = roles
                .split('+')
                .map(str::parse::<Role>)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| invalid("unknown role"))?;
            resolver = resolver.with_principal(subject, roles);
        }
        Ok(resolver)
    }

    /// Number of known principals.
    pub fn len(&self) -> usize {
        self.principals.len()
    }

    /// Whether no principals are configured.
    pub fn is_empty(&self) -> bool {
        self.principals.is_empty()
    }
}

#[async_trait]
impl IdentityResolver for StaticIdentityResolver {
    async fn resolve(&self, subject: &str) -> Result<Principal, IdentityError> {
        self.principals
            .get(subject)
            .map(|roles| Principal {
                id: subject.to_string(),
                roles: roles.clone(),
            })
            .ok_or(IdentityError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_known_subject() {
        let resolver = StaticIdentityResolver::new().with_principal("alice", [Role::User]);
        let principal = resolver.resolve("alice").await.unwrap();

        assert_eq!(principal.id, "alice");
        assert!(principal.has_role(Role::User));
        assert!(!principal.has_role(Role::Admin));
    }

    #[tokio::test]
    async fn unknown_subject_is_not_found() {
        let resolver = StaticIdentityResolver::new();
        assert_eq!(
            resolver.resolve("ghost").await,
            Err(IdentityError::NotFound)
        );
    }

    #[tokio::test]
    async fn from_list_parses_roles() {
        let resolver =
            StaticIdentityResolver::from_list("alice@example.com=USER, root=admin+user").unwrap();
        assert_eq!(resolver.len(), 2);

        let root = resolver.resolve("root").await.unwrap();
        assert!(root.has_role(Role::Admin));
        assert!(root.has_role(Role::User));
    }

    #[test]
    fn from_list_rejects_bad_entries() {
        assert!(StaticIdentityResolver::from_list("alice").is_err());
        assert!(StaticIdentityResolver::from_list("=USER").is_err());
        assert!(StaticIdentityResolver::from_list("alice=OWNER").is_err());
        assert!(StaticIdentityResolver::from_list("").unwrap().is_empty());
    }
}
