//! UnionX Core - dynamic tagged-union synthesis
//!
//! A union is bound to a namespace and stands for "any one of the namespace's
//! constructible members". Given raw input, it tries each member in order and
//! returns the first value that constructs. The set of members is derived
//! lazily from the namespace on every call, so declaring or removing members
//! after the union was bound is reflected immediately:
//! - `model`: namespaces and the `Variant` capability trait
//! - `ops`: namespace scanning and include/exclude filtering
//! - `sum`: the ordered-disjunction combinator and its display name
//! - `cache`: snapshot-keyed memoization of derived data
//! - `binder`: the `Union` facade a namespace forwards to
//!
//! ```
//! use serde_json::json;
//! use unionx_core::{bind_union, Namespace, UnionOptions};
//!
//! let weather = Namespace::new("Weather");
//! weather.declare_constant("MAX_TEMP", json!(274));
//! let union = bind_union(&weather, UnionOptions::default()).unwrap();
//!
//! assert_eq!(union.display_name().unwrap(), "Weather<[]>");
//! assert!(union.try_construct(&json!({})).is_err());
//! ```

pub mod binder;
pub mod cache;
pub mod config;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod sum;

// Re-export commonly used types
pub use binder::{bind_union, Union, UnionMarker};
pub use cache::{CacheOp, CacheStats};
pub use config::{UnionConfig, UnionOptions};
pub use errors::{ExError, ExErrorKind, Rejection, Result, UnionError};
pub use model::{Constant, Instance, Namespace, ResolvedVariant, Variant, VariantRef, ANONYMOUS};
pub use sum::Sum;
pub use unionx_core_types::{NamespaceId, Snapshot, SnapshotEntry};
