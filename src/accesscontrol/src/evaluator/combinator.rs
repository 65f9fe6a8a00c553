//! Boolean combinators over child evaluators

use std::fmt;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::{write_group, Evaluator};
use crate::error::{AccessControlError, Result};
use crate::scope::ScopeAttributeMutator;
use crate::types::OrgPermissions;

/// Passes when every child passes
#[derive(Debug, Clone)]
pub struct AllEvaluator {
    pub all_of: Vec<Box<dyn Evaluator>>,
}

impl AllEvaluator {
    pub fn new(all_of: Vec<Box<dyn Evaluator>>) -> Self {
        Self { all_of }
    }
}

#[async_trait]
impl Evaluator for AllEvaluator {
    fn evaluate(&self, permissions: &OrgPermissions) -> bool {
        self.all_of.iter().all(|e| e.evaluate(permissions))
    }

    async fn mutate_scopes(
        &self,
        ctx: &CancellationToken,
        mutator: &ScopeAttributeMutator,
    ) -> Result<Box<dyn Evaluator>> {
        let mut modified = Vec::with_capacity(self.all_of.len());
        for e in &self.all_of {
            modified.push(e.mutate_scopes(ctx, mutator).await?);
        }
        Ok(Box::new(Self::new(modified)))
    }

    fn boxed_clone(&self) -> Box<dyn Evaluator> {
        Box::new(self.clone())
    }
}

impl fmt::Display for AllEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_group(f, "all", &self.all_of)
    }
}

/// Passes when at least one child passes
#[derive(Debug, Clone)]
pub struct AnyEvaluator {
    pub any_of: Vec<Box<dyn Evaluator>>,
}

impl AnyEvaluator {
    pub fn new(any_of: Vec<Box<dyn Evaluator>>) -> Self {
        Self { any_of }
    }
}

#[async_trait]
impl Evaluator for AnyEvaluator {
    fn evaluate(&self, permissions: &OrgPermissions) -> bool {
        self.any_of.iter().any(|e| e.evaluate(permissions))
    }

    /// Children without a resolver are kept as they are, since another
    /// branch may still grant access. Fails with `ResolverNotFound` only if
    /// no child could be resolved.
    async fn mutate_scopes(
        &self,
        ctx: &CancellationToken,
        mutator: &ScopeAttributeMutator,
    ) -> Result<Box<dyn Evaluator>> {
        let mut resolved = false;
        let mut modified = Vec::with_capacity(self.any_of.len());

        for e in &self.any_of {
            match e.mutate_scopes(ctx, mutator).await {
                Ok(mutated) => {
                    resolved = true;
                    modified.push(mutated);
                }
                Err(AccessControlError::ResolverNotFound) => modified.push(e.clone()),
                Err(err) => return Err(err),
            }
        }

        if !resolved {
            return Err(AccessControlError::ResolverNotFound);
        }

        Ok(Box::new(Self::new(modified)))
    }

    fn boxed_clone(&self) -> Box<dyn Evaluator> {
        Box::new(self.clone())
    }
}

impl fmt::Display for AnyEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_group(f, "any", &self.any_of)
    }
}
