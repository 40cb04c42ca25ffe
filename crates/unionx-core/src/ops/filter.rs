//! Variant filtering
//!
//! Turns a namespace plus a union configuration into the ordered list of
//! variants a union dispatches to.

use std::collections::HashSet;

use tracing::debug;

use crate::config::UnionConfig;
use crate::errors::Result;
use crate::model::{Namespace, ResolvedVariant};
use crate::ops::scanner::list_declared;

/// Member declared by the binder to mark a namespace as bound
pub const UNION_MARKER: &str = "__union__";

/// Names the engine itself injects into namespaces
///
/// These are always excluded so a union never lists its own marker.
pub const BASELINE_EXCLUSIONS: &[&str] = &[UNION_MARKER];

/// Resolve the variants a union over `namespace` dispatches to
///
/// Candidates are the configured include list (in its given order) or, when
/// no include list is configured, every declared member in declaration order.
/// Excluded names and `baseline` names are removed, the rest are resolved, and
/// abstract or non-constructible members are dropped.
///
/// # Errors
///
/// Returns `NotFound` if a remaining candidate is not currently declared.
pub fn filter(
    namespace: &Namespace,
    config: &UnionConfig,
    baseline: &[&str],
) -> Result<Vec<ResolvedVariant>> {
    let candidates = match config.include() {
        Some(include) => include.to_vec(),
        None => list_declared(namespace),
    };

    let excluded: HashSet<&str> = config
        .exclude()
        .iter()
        .map(String::as_str)
        .chain(baseline.iter().copied())
        .collect();

    let mut variants = Vec::with_capacity(candidates.len());
    for name in candidates
        .iter()
        .filter(|name| !excluded.contains(name.as_str()))
    {
        let variant = namespace.resolve(name)?;
        if variant.is_abstract() || !variant.is_constructible() {
            debug!(
                namespace = namespace.name(),
                variant = name.as_str(),
                "skipping abstract or non-constructible member"
            );
            continue;
        }
        variants.push(ResolvedVariant::new(name.clone(), variant));
    }

    Ok(variants)
}
