//! Binding a union to a namespace
//!
//! `Union` is the facade a namespace forwards to once bound. It holds the
//! namespace's configuration and cache, and resolves the current [`Sum`] on
//! every call, so forwarding always reflects the latest declared members.
//!
//! Ownership runs namespace -> union: the namespace keeps the union alive and
//! the union only holds a weak reference back.

use std::sync::{Arc, Weak};

use serde_json::Value;
use tracing::debug;
use unionx_core_types::{NamespaceId, Snapshot};

use crate::cache::{CacheOp, CacheStats, SnapshotCache};
use crate::config::{UnionConfig, UnionOptions};
use crate::errors::{Result, UnionError};
use crate::model::{Instance, Namespace, ResolvedVariant, Variant};
use crate::ops::filter::{filter, BASELINE_EXCLUSIONS, UNION_MARKER};
use crate::sum::{render_name, Sum};
use crate::{log_op_end, log_op_error, log_op_start};

/// Marker member declared into a namespace when a union is bound to it
#[derive(Debug, Clone, Copy, Default)]
pub struct UnionMarker;

impl Variant for UnionMarker {
    fn display_name(&self) -> Option<String> {
        Some(UNION_MARKER.to_string())
    }
}

#[derive(Clone)]
enum Derived {
    Variants(Arc<[ResolvedVariant]>),
    Sum(Arc<Sum>),
    DisplayName(Arc<str>),
}

/// Union facade over a namespace
pub struct Union {
    namespace: Weak<Namespace>,
    namespace_name: String,
    config: UnionConfig,
    cache: SnapshotCache<Derived>,
}

/// Configure and bind in one step
///
/// # Errors
///
/// - `InvalidConfiguration` if `options` do not validate against `namespace`.
/// - `AlreadyBound` if `namespace` already has a union.
pub fn bind_union(namespace: &Arc<Namespace>, options: UnionOptions) -> Result<Arc<Union>> {
    let config = options.configure(namespace)?;
    Union::bind(namespace, config)
}

impl Union {
    /// Bind a union with `config` to `namespace`
    ///
    /// # Errors
    ///
    /// Returns `AlreadyBound` if `namespace` already has a union.
    pub fn bind(namespace: &Arc<Namespace>, config: UnionConfig) -> Result<Arc<Union>> {
        log_op_start!("bind_union", namespace = namespace.name());
        let start = std::time::Instant::now();

        let union = Self::bind_impl(namespace, config).map_err(|e| {
            log_op_error!(
                "bind_union",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                namespace = namespace.name()
            );
            e
        })?;

        log_op_end!(
            "bind_union",
            duration_ms = start.elapsed().as_millis() as u64,
            namespace = namespace.name()
        );
        Ok(union)
    }

    fn bind_impl(namespace: &Arc<Namespace>, config: UnionConfig) -> Result<Arc<Union>> {
        let union = Arc::new(Union {
            namespace: Arc::downgrade(namespace),
            namespace_name: namespace.name().to_string(),
            config,
            cache: SnapshotCache::new(namespace.id().clone()),
        });
        namespace.attach(union.clone())?;
        namespace.declare(UNION_MARKER, Arc::new(UnionMarker));
        Ok(union)
    }

    pub fn namespace_name(&self) -> &str {
        &self.namespace_name
    }

    pub fn namespace_id(&self) -> Option<NamespaceId> {
        self.namespace.upgrade().map(|ns| ns.id().clone())
    }

    pub fn config(&self) -> &UnionConfig {
        &self.config
    }

    /// Variants the union currently dispatches to, in dispatch order
    ///
    /// # Errors
    ///
    /// - `NotFound` if an included name is no longer declared.
    /// - `Detached` if the namespace was dropped.
    pub fn variants(&self) -> Result<Arc<[ResolvedVariant]>> {
        let (namespace, snapshot) = self.observe()?;
        self.variants_at(&namespace, &snapshot)
    }

    /// Declared names of [`Union::variants`]
    ///
    /// # Errors
    ///
    /// See [`Union::variants`].
    pub fn variant_names(&self) -> Result<Vec<String>> {
        Ok(self
            .variants()?
            .iter()
            .map(|v| v.name().to_string())
            .collect())
    }

    /// Display name, e.g. `Planet<[Planet::Earth | Planet::Mars]>`
    ///
    /// # Errors
    ///
    /// See [`Union::variants`].
    pub fn display_name(&self) -> Result<String> {
        let (namespace, snapshot) = self.observe()?;
        Ok(self.display_name_at(&namespace, &snapshot)?.to_string())
    }

    /// The combinator for the namespace's current members
    ///
    /// # Errors
    ///
    /// See [`Union::variants`].
    pub fn sum(&self) -> Result<Arc<Sum>> {
        let (namespace, snapshot) = self.observe()?;
        let derived = self
            .cache
            .get_or_compute(&snapshot, CacheOp::Sum, || {
                let variants = self.variants_at(&namespace, &snapshot)?;
                let name = self.display_name_at(&namespace, &snapshot)?;
                Ok(Derived::Sum(Arc::new(Sum::with_name(
                    self.namespace_name.clone(),
                    variants,
                    name.to_string(),
                ))))
            })?;
        match derived {
            Derived::Sum(sum) => Ok(sum),
            _ => Err(mismatch(CacheOp::Sum)),
        }
    }

    /// Construct a value with the first variant that accepts `input`
    ///
    /// # Errors
    ///
    /// - `EmptyUnion` if no constructible variant is currently declared.
    /// - `NoMatch` if every variant rejected the input.
    /// - `NotFound` or `Detached` if the variant list cannot be derived.
    pub fn try_construct(&self, input: &Value) -> Result<Instance> {
        log_op_start!("try_construct", namespace = self.namespace_name.as_str());
        let start = std::time::Instant::now();

        let instance = self.sum().and_then(|sum| sum.try_construct(input)).map_err(|e| {
            log_op_error!(
                "try_construct",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                namespace = self.namespace_name.as_str()
            );
            e
        })?;

        log_op_end!(
            "try_construct",
            duration_ms = start.elapsed().as_millis() as u64,
            namespace = self.namespace_name.as_str(),
            variant = instance.type_name()
        );
        Ok(instance)
    }

    /// True when some current variant accepts `input`, false when every
    /// variant rejects it
    ///
    /// # Errors
    ///
    /// Returns `Detached`, `NotFound` and other failures that mean the union
    /// cannot be evaluated, rather than reporting them as invalid input.
    pub fn is_valid(&self, input: &Value) -> Result<bool> {
        self.sum()?.is_valid(input)
    }

    /// A union is always a constructible variant, even while empty
    pub fn is_constructible(&self) -> bool {
        true
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn observe(&self) -> Result<(Arc<Namespace>, Snapshot)> {
        let namespace = self
            .namespace
            .upgrade()
            .ok_or_else(|| UnionError::Detached {
                namespace: self.namespace_name.clone(),
            })?;
        let snapshot = namespace.snapshot();
        Ok((namespace, snapshot))
    }

    fn variants_at(
        &self,
        namespace: &Namespace,
        snapshot: &Snapshot,
    ) -> Result<Arc<[ResolvedVariant]>> {
        let derived = self
            .cache
            .get_or_compute(snapshot, CacheOp::Variants, || {
                let variants = filter(namespace, &self.config, BASELINE_EXCLUSIONS)?;
                debug!(
                    namespace = namespace.name(),
                    variant_count = variants.len(),
                    "resolved union variants"
                );
                Ok(Derived::Variants(variants.into()))
            })?;
        match derived {
            Derived::Variants(variants) => Ok(variants),
            _ => Err(mismatch(CacheOp::Variants)),
        }
    }

    fn display_name_at(&self, namespace: &Namespace, snapshot: &Snapshot) -> Result<Arc<str>> {
        let derived = self
            .cache
            .get_or_compute(snapshot, CacheOp::DisplayName, || {
                let variants = self.variants_at(namespace, snapshot)?;
                let name = render_name(&self.namespace_name, &variants)?;
                Ok(Derived::DisplayName(name.into()))
            })?;
        match derived {
            Derived::DisplayName(name) => Ok(name),
            _ => Err(mismatch(CacheOp::DisplayName)),
        }
    }
}

fn mismatch(op: CacheOp) -> UnionError {
    UnionError::Internal {
        message: format!("cache entry for {:?} holds a different derived value", op),
    }
}

/// Forwarding surface used when a union is nested inside another union
impl Variant for Union {
    fn display_name(&self) -> Option<String> {
        Union::display_name(self).ok()
    }

    fn try_display_name(&self) -> Result<Option<String>> {
        Ok(Some(Union::display_name(self)?))
    }

    fn is_constructible(&self) -> bool {
        Union::is_constructible(self)
    }

    fn is_union(&self) -> bool {
        true
    }

    fn try_construct(&self, input: &Value) -> Result<Instance> {
        Union::try_construct(self, input)
    }
}

impl std::fmt::Debug for Union {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Union")
            .field("namespace", &self.namespace_name)
            .field("config", &self.config)
            .field("cache", &self.cache.stats())
            .finish()
    }
}
