//! Union configuration
//!
//! `UnionOptions` is the serde document a host writes (TOML or JSON);
//! `UnionConfig` is the validated, immutable form a union is created with.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{Result, UnionError};
use crate::model::Namespace;

/// Validated include/exclude policy for one union
///
/// Fixed at union-creation time. `include: None` means "every declared
/// member"; `exclude` is always applied after `include`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnionConfig {
    include: Option<Vec<String>>,
    exclude: Vec<String>,
}

impl UnionConfig {
    /// Validate a policy against the namespace it will be applied to
    ///
    /// Every included name must currently be declared. Repeated include names
    /// collapse to their first occurrence. Excluded names are not checked:
    /// excluding a member that is declared later is allowed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if an included name is not declared.
    pub fn configure(
        namespace: &Namespace,
        include: Option<Vec<String>>,
        exclude: Vec<String>,
    ) -> Result<Self> {
        let include = match include {
            Some(names) => {
                let mut seen = HashSet::with_capacity(names.len());
                let mut unique = Vec::with_capacity(names.len());
                for name in names {
                    if !namespace.contains(&name) {
                        return Err(UnionError::InvalidConfiguration {
                            namespace: namespace.name().to_string(),
                            reason: format!("included constant [{}] is not defined", name),
                        });
                    }
                    if seen.insert(name.clone()) {
                        unique.push(name);
                    }
                }
                Some(unique)
            }
            None => None,
        };

        Ok(Self { include, exclude })
    }

    pub fn include(&self) -> Option<&[String]> {
        self.include.as_deref()
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }
}

/// Host-facing union options
///
/// `only` and `except` are accepted as aliases, and each list may be given as
/// a single name.
///
/// ```
/// use unionx_core::config::UnionOptions;
///
/// let options = UnionOptions::from_toml_str(r#"exclude = "Pluto""#).unwrap();
/// assert_eq!(options.exclude, vec!["Pluto".to_string()]);
/// assert!(options.include.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnionOptions {
    #[serde(
        default,
        alias = "only",
        deserialize_with = "one_or_many_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub include: Option<Vec<String>>,
    #[serde(default, alias = "except", deserialize_with = "one_or_many")]
    pub exclude: Vec<String>,
}

impl UnionOptions {
    pub fn include<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = names.into_iter().map(Into::into).collect();
        self
    }

    /// Parse options from a TOML document
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if the document is malformed or has unknown keys.
    pub fn from_toml_str(document: &str) -> Result<Self> {
        Ok(toml::from_str(document)?)
    }

    /// Parse options from a JSON value
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if the value does not describe options.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Validate these options against `namespace`
    ///
    /// # Errors
    ///
    /// See [`UnionConfig::configure`].
    pub fn configure(self, namespace: &Namespace) -> Result<UnionConfig> {
        UnionConfig::configure(namespace, self.include, self.exclude)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(name) => vec![name],
        OneOrMany::Many(names) => names,
    })
}

fn one_or_many_opt<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    one_or_many(deserializer).map(Some)
}
