//! Leaf evaluator checking a single action

use std::fmt;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::Evaluator;
use crate::error::Result;
use crate::scope::{scope_matches, ScopeAttributeMutator};
use crate::types::OrgPermissions;

/// Requires an action on a set of scopes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionEvaluator {
    pub action: String,
    pub scopes: Vec<String>,
}

impl PermissionEvaluator {
    pub fn new<I, S>(action: impl Into<String>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            action: action.into(),
            scopes: scopes.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl Evaluator for PermissionEvaluator {
    fn evaluate(&self, permissions: &OrgPermissions) -> bool {
        let granted = match permissions.get(&self.action) {
            Some(granted) => granted,
            None => return false,
        };

        if self.scopes.is_empty() {
            return true;
        }

        // Every target needs at least one covering grant
        self.scopes
            .iter()
            .all(|target| granted.iter().any(|scope| scope_matches(scope, target)))
    }

    async fn mutate_scopes(
        &self,
        ctx: &CancellationToken,
        mutator: &ScopeAttributeMutator,
    ) -> Result<Box<dyn Evaluator>> {
        if self.scopes.is_empty() {
            return Ok(self.boxed_clone());
        }

        let mut scopes = Vec::with_capacity(self.scopes.len());
        for scope in &self.scopes {
            scopes.extend(mutator.mutate(ctx, scope).await?);
        }

        Ok(Box::new(Self {
            action: self.action.clone(),
            scopes,
        }))
    }

    fn boxed_clone(&self) -> Box<dyn Evaluator> {
        Box::new(self.clone())
    }
}

impl fmt::Display for PermissionEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "permission({}, [{}])", self.action, self.scopes.join(", "))
    }
}
