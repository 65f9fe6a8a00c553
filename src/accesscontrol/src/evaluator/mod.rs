//! Access requirements as boolean-evaluable trees
//!
//! An [`Evaluator`] answers "do these granted permissions satisfy me?" and can
//! produce a copy of itself whose scopes have been resolved into concrete
//! form. Trees are built from permission leaves and `all` / `any`
//! combinators:
//!
//! ```
//! use accesscontrol::evaluator::{eval_all, eval_any, eval_permission};
//!
//! let requirement = eval_all(vec![
//!     eval_permission("dashboards:read", ["dashboards:uid:abc"]),
//!     eval_any(vec![
//!         eval_permission("folders:read", ["folders:uid:general"]),
//!         eval_permission("folders:read", ["folders:*"]),
//!     ]),
//! ]);
//!
//! assert_eq!(
//!     requirement.to_string(),
//!     "all(permission(dashboards:read, [dashboards:uid:abc]), \
//!      any(permission(folders:read, [folders:uid:general]), permission(folders:read, [folders:*])))",
//! );
//! ```

mod combinator;
mod permission;

pub use combinator::{AllEvaluator, AnyEvaluator};
pub use permission::PermissionEvaluator;

use std::fmt;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::scope::ScopeAttributeMutator;
use crate::types::OrgPermissions;

/// A requirement that can be checked against granted permissions
///
/// Evaluators are immutable: [`mutate_scopes`](Evaluator::mutate_scopes)
/// returns a new tree and leaves `self` untouched.
#[async_trait]
pub trait Evaluator: Send + Sync + fmt::Debug + fmt::Display {
    /// Checks the requirement against the scopes granted per action
    fn evaluate(&self, permissions: &OrgPermissions) -> bool;

    /// Returns a copy of this requirement with every scope replaced by the
    /// scopes `mutator` resolves it to
    async fn mutate_scopes(
        &self,
        ctx: &CancellationToken,
        mutator: &ScopeAttributeMutator,
    ) -> Result<Box<dyn Evaluator>>;

    fn boxed_clone(&self) -> Box<dyn Evaluator>;
}

impl Clone for Box<dyn Evaluator> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}

/// Requires `action` to be granted on every scope in `scopes`
///
/// With no scopes, holding the action at all is enough.
pub fn eval_permission<I, S>(action: impl Into<String>, scopes: I) -> Box<dyn Evaluator>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Box::new(PermissionEvaluator::new(action, scopes))
}

/// Requires every child evaluator to pass
pub fn eval_all(all_of: Vec<Box<dyn Evaluator>>) -> Box<dyn Evaluator> {
    Box::new(AllEvaluator::new(all_of))
}

/// Requires at least one child evaluator to pass
pub fn eval_any(any_of: Vec<Box<dyn Evaluator>>) -> Box<dyn Evaluator> {
    Box::new(AnyEvaluator::new(any_of))
}

/// Writes `name(child, child, ...)`
fn write_group(f: &mut fmt::Formatter<'_>, name: &str, children: &[Box<dyn Evaluator>]) -> fmt::Result {
    write!(f, "{}(", name)?;
    for (idx, child) in children.iter().enumerate() {
        if idx > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", child)?;
    }
    write!(f, ")")
}
