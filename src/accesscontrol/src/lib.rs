//! # Access Control
//!
//! In-process authorization evaluator working on a principal's cached
//! permission set.
//!
//! ## Features
//!
//! - **Fast path** against granted scopes as they are, wildcards included
//! - **Scope resolution** through resolvers registered per scope prefix,
//!   with a per-organization TTL cache
//! - **Memoized resource checks** for filtering large listings
//! - **Cancellation** of in-flight resolution via `CancellationToken`
//! - **Prometheus metrics** for evaluation count and duration
//!
//! ## Example
//!
//! ```rust
//! use accesscontrol::{eval_permission, AccessControl, AccessControlConfig, ScopedResource, SignedInUser};
//! use prometheus::Registry;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = AccessControl::new(AccessControlConfig::default(), &Registry::new())?;
//!
//!     let mut user = SignedInUser::new(1, 1, "alice")
//!         .with_permissions(1, "dashboards:read", ["dashboards:uid:*"]);
//!
//!     let requirement = eval_permission("dashboards:read", ["dashboards:uid:abc"]);
//!     let allowed = engine
//!         .evaluate(&CancellationToken::new(), &mut user, requirement.as_ref())
//!         .await?;
//!     assert!(allowed);
//!
//!     let mut checker = engine.checker(&user, "dashboards:read");
//!     assert!(checker.check(&ScopedResource::new(["dashboards:uid:xyz"])));
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod scope;
pub mod types;

// Re-export commonly used types
pub use config::AccessControlConfig;
pub use engine::{AccessControl, AccessControlMetrics, ResourceChecker};
pub use error::{AccessControlError, BoxError, Result};
pub use evaluator::{eval_all, eval_any, eval_permission, Evaluator};
pub use scope::{
    ScopeAttributeMutator, ScopeAttributeResolver, ScopeAttributeResolverFunc, ScopeResolvers,
};
pub use types::{OrgId, OrgPermissions, Permissions, Resource, ScopedResource, SignedInUser};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
