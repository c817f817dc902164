//! Authorization decision model for the metrics dashboard.
//!
//! Given a request descriptor (collection, operation, actor identity,
//! optional target document id and proposed document) and a read-only
//! snapshot of the datastore, [`evaluate`] returns [`Decision::Allow`] or a
//! denial carrying one of two reasons: the rule table said no, or the
//! proposed document violates its collection schema.
//!
//! The evaluator holds no state and performs no I/O; concurrent calls need
//! no coordination. Persistence, atomicity of accepted writes, and the
//! administrative collections live behind the [`StoreSnapshot`] boundary.

pub mod actor;
pub mod collection;
pub mod decision;
pub mod evaluate;
mod rules;
pub mod schema;
pub mod snapshot;
pub mod value;

pub use actor::{Actor, ActorClass, SignInProvider};
pub use collection::{Collection, Operation, UnknownCollection};
pub use decision::{Decision, DenialReason, SchemaViolation};
pub use evaluate::{evaluate, evaluate_at};
pub use schema::{BuildStatus, ThemeType, PROJECT_GROUP_IDS_MAX, PROJECT_GROUP_NAME_MAX};
pub use snapshot::{FeatureConfig, StaticSnapshot, StoreSnapshot};
pub use value::{Document, Value};
