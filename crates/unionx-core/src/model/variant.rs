use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::errors::{Result, UnionError};

/// Placeholder rendered for variants without a display name
pub const ANONYMOUS: &str = "Anonymous";

/// Capability set a namespace member exposes to the union engine
///
/// Every method has a fallback, so declarations that are not types at all
/// (constants, helper scopes) can live in a namespace without opting in: they
/// are never constructible and are dropped by the filter.
pub trait Variant: Send + Sync {
    /// Human-readable name used in union names and diagnostics
    fn display_name(&self) -> Option<String> {
        None
    }

    /// Display name for rendering a union that contains this variant
    ///
    /// Variants whose name is derived from other state (nested unions)
    /// override this to report why the name cannot be derived right now.
    ///
    /// # Errors
    ///
    /// Returns the error that prevented the name from being derived.
    fn try_display_name(&self) -> Result<Option<String>> {
        Ok(self.display_name())
    }

    /// Abstract variants describe shared structure and are never dispatched to
    fn is_abstract(&self) -> bool {
        false
    }

    fn is_constructible(&self) -> bool {
        false
    }

    /// True when this variant is itself a union over another namespace
    fn is_union(&self) -> bool {
        false
    }

    /// Attempt to build a value from raw input
    ///
    /// Must not have side effects when it fails.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` when the input does not describe this variant.
    fn try_construct(&self, _input: &Value) -> Result<Instance> {
        Err(UnionError::rejected(
            self.display_name()
                .unwrap_or_else(|| ANONYMOUS.to_string()),
            "not a constructible variant",
        ))
    }
}

/// Shared handle to a declared member
pub type VariantRef = Arc<dyn Variant>;

/// Value produced by a successful construction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instance {
    type_name: String,
    value: Value,
}

impl Instance {
    pub fn new(type_name: impl Into<String>, value: Value) -> Self {
        Self {
            type_name: type_name.into(),
            value,
        }
    }

    /// Display name of the variant that constructed this value
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// Check whether this value was constructed by the named variant
    pub fn is_a(&self, type_name: &str) -> bool {
        self.type_name == type_name
    }
}

/// A namespace member resolved by its declared name
#[derive(Clone)]
pub struct ResolvedVariant {
    name: String,
    variant: VariantRef,
}

impl ResolvedVariant {
    pub fn new(name: impl Into<String>, variant: VariantRef) -> Self {
        Self {
            name: name.into(),
            variant,
        }
    }

    /// Name the member was declared under
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variant(&self) -> &VariantRef {
        &self.variant
    }

    /// Display name, falling back to [`ANONYMOUS`]
    pub fn display_name(&self) -> String {
        self.variant
            .display_name()
            .unwrap_or_else(|| ANONYMOUS.to_string())
    }

    /// Display name, falling back to [`ANONYMOUS`] only for unnamed variants
    ///
    /// # Errors
    ///
    /// Propagates the variant's failure to derive its name.
    pub fn try_display_name(&self) -> Result<String> {
        Ok(self
            .variant
            .try_display_name()?
            .unwrap_or_else(|| ANONYMOUS.to_string()))
    }
}

impl fmt::Debug for ResolvedVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedVariant")
            .field("name", &self.name)
            .field("display_name", &self.variant.display_name())
            .finish()
    }
}

/// A plain value declared in a namespace
///
/// Constants sit next to variants in a namespace (limits, lookup tables) and
/// rely on the trait's fallbacks: never constructible.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    value: Value,
}

impl Constant {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl Variant for Constant {}
