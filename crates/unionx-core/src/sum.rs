//! The union combinator
//!
//! A `Sum` is an ordered disjunction over resolved variants: input is offered
//! to each variant in order and the first successful construction wins.

use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use crate::errors::{Rejection, Result, UnionError};
use crate::model::{Instance, ResolvedVariant, Variant};

/// Render `Namespace<[V1 | V2 | ...]>`
///
/// # Errors
///
/// Propagates a nested union's failure to derive its own name.
pub fn render_name(namespace: &str, variants: &[ResolvedVariant]) -> Result<String> {
    let joined = variants
        .iter()
        .map(ResolvedVariant::try_display_name)
        .collect::<Result<Vec<_>>>()?
        .join(" | ");
    Ok(format!("{}<[{}]>", namespace, joined))
}

/// Ordered-disjunction combinator over one snapshot of a namespace
#[derive(Debug, Clone)]
pub struct Sum {
    namespace: String,
    variants: Arc<[ResolvedVariant]>,
    name: String,
}

impl Sum {
    /// Build a sum, rendering its display name from the variants
    ///
    /// # Errors
    ///
    /// Fails when a nested union's name cannot be rendered.
    pub fn build(namespace: impl Into<String>, variants: Arc<[ResolvedVariant]>) -> Result<Self> {
        let namespace = namespace.into();
        let name = render_name(&namespace, &variants)?;
        Ok(Self::with_name(namespace, variants, name))
    }

    pub(crate) fn with_name(
        namespace: String,
        variants: Arc<[ResolvedVariant]>,
        name: String,
    ) -> Self {
        Self {
            namespace,
            variants,
            name,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn variants(&self) -> &[ResolvedVariant] {
        &self.variants
    }

    /// Rendered display name, e.g. `Planet<[Planet::Earth | Planet::Mars]>`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Construct a value with the first variant that accepts `input`
    ///
    /// Rejections (including a nested union that matched nothing) move on to
    /// the next variant. Any other failure, such as a nested union whose
    /// configuration no longer resolves, stops dispatch immediately.
    ///
    /// # Errors
    ///
    /// - `EmptyUnion` if there are no variants.
    /// - `NoMatch` if every variant rejected the input.
    pub fn try_construct(&self, input: &Value) -> Result<Instance> {
        if self.variants.is_empty() {
            return Err(UnionError::EmptyUnion {
                namespace: self.namespace.clone(),
            });
        }

        let mut rejections = Vec::with_capacity(self.variants.len());
        for candidate in self.variants.iter() {
            match candidate.variant().try_construct(input) {
                Ok(instance) => {
                    trace!(
                        namespace = self.namespace.as_str(),
                        variant = candidate.name(),
                        "variant accepted input"
                    );
                    return Ok(instance);
                }
                Err(err) => match rejection_reason(&err) {
                    Some(reason) => rejections.push(Rejection {
                        variant: candidate.display_name(),
                        reason,
                    }),
                    None => return Err(err),
                },
            }
        }

        Err(UnionError::NoMatch {
            union: self.name.clone(),
            rejections,
        })
    }

    /// True when some variant accepts `input`, false when all reject it
    ///
    /// # Errors
    ///
    /// Returns any failure that is not a rejection of the input.
    pub fn is_valid(&self, input: &Value) -> Result<bool> {
        match self.try_construct(input) {
            Ok(_) => Ok(true),
            Err(err) if err.is_rejection() => Ok(false),
            Err(err) => Err(err),
        }
    }
}

fn rejection_reason(err: &UnionError) -> Option<String> {
    match err {
        UnionError::Rejected { reason, .. } => Some(reason.clone()),
        _ if err.is_rejection() => Some(err.to_string()),
        _ => None,
    }
}

impl Variant for Sum {
    fn display_name(&self) -> Option<String> {
        Some(self.name.clone())
    }

    fn try_display_name(&self) -> Result<Option<String>> {
        Ok(Some(self.name.clone()))
    }

    fn is_constructible(&self) -> bool {
        true
    }

    fn is_union(&self) -> bool {
        true
    }

    fn try_construct(&self, input: &Value) -> Result<Instance> {
        Sum::try_construct(self, input)
    }
}
