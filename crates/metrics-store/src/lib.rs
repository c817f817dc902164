//! In-memory document store for the metrics dashboard.
//!
//! Application traffic goes through [`MetricsStore`]'s actor-aware methods,
//! which consult the policy evaluator and apply a mutation only on ALLOW.
//! Administrative tooling (feature flags, allowed email domains, demo data)
//! uses the [`store::Admin`] handle, which bypasses the evaluator.

pub mod seed;
pub mod store;

pub use seed::{seed_builds, seed_demo_projects, SeedRequest};
pub use store::{Admin, MetricsStore, StoreError};
