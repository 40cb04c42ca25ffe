//! Shared fixtures for integration tests
//!
//! `Record` is a minimal strict structured type: an object with a fixed set
//! of attributes, each either a literal tag, an integer, or a value of some
//! other variant (possibly a union).

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{Map, Value};
use unionx_core::{
    bind_union, Instance, Namespace, Result, UnionError, UnionOptions, Variant, VariantRef,
};

/// Shape of a single attribute
#[derive(Clone)]
pub enum Attr {
    Literal(Value),
    Integer,
    Nested(VariantRef),
}

#[derive(Clone)]
struct Attribute {
    name: String,
    kind: Attr,
    optional: bool,
}

/// Strict record type: unknown keys and missing required keys are rejected
#[derive(Clone)]
pub struct Record {
    name: String,
    abstract_: bool,
    attributes: Vec<Attribute>,
}

impl Record {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            abstract_: false,
            attributes: Vec::new(),
        }
    }

    /// Abstract base carrying shared attributes
    pub fn base(name: impl Into<String>) -> Self {
        Self {
            abstract_: true,
            ..Self::new(name)
        }
    }

    /// Concrete subtype inheriting `self`'s attributes
    pub fn extend(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            abstract_: false,
            attributes: self.attributes.clone(),
        }
    }

    pub fn attribute(mut self, name: &str, kind: Attr) -> Self {
        self.attributes.push(Attribute {
            name: name.to_string(),
            kind,
            optional: false,
        });
        self
    }

    pub fn optional(mut self, name: &str, kind: Attr) -> Self {
        self.attributes.push(Attribute {
            name: name.to_string(),
            kind,
            optional: true,
        });
        self
    }

    pub fn tagged(name: impl Into<String>, id: &str) -> Self {
        Self::new(name).attribute("id", Attr::Literal(Value::from(id)))
    }

    pub fn into_ref(self) -> VariantRef {
        Arc::new(self)
    }

    fn reject(&self, reason: impl Into<String>) -> UnionError {
        UnionError::rejected(self.name.clone(), reason)
    }
}

impl Variant for Record {
    fn display_name(&self) -> Option<String> {
        Some(self.name.clone())
    }

    fn is_abstract(&self) -> bool {
        self.abstract_
    }

    fn is_constructible(&self) -> bool {
        true
    }

    fn try_construct(&self, input: &Value) -> Result<Instance> {
        if self.abstract_ {
            return Err(self.reject("abstract type cannot be constructed"));
        }
        let object = input
            .as_object()
            .ok_or_else(|| self.reject("expected an object"))?;

        if let Some(unknown) = object
            .keys()
            .find(|key| !self.attributes.iter().any(|a| &a.name == *key))
        {
            return Err(self.reject(format!("unexpected key :{}", unknown)));
        }

        let mut output = Map::new();
        for attribute in &self.attributes {
            let Some(raw) = object.get(&attribute.name) else {
                if attribute.optional {
                    continue;
                }
                return Err(self.reject(format!("missing key :{}", attribute.name)));
            };

            let value = match &attribute.kind {
                Attr::Literal(expected) if raw == expected => raw.clone(),
                Attr::Literal(expected) => {
                    return Err(self.reject(format!(
                        "{} violates constraints (eql?({}))",
                        raw, expected
                    )))
                }
                Attr::Integer if raw.is_i64() => raw.clone(),
                Attr::Integer => return Err(self.reject(format!("{} is not an integer", raw))),
                Attr::Nested(variant) => match variant.try_construct(raw) {
                    Ok(instance) => instance.into_value(),
                    Err(err @ UnionError::Rejected { .. })
                    | Err(err @ UnionError::NoMatch { .. })
                    | Err(err @ UnionError::EmptyUnion { .. }) => {
                        return Err(self.reject(format!("[{}] {}", attribute.name, err)))
                    }
                    Err(err) => return Err(err),
                },
            };
            output.insert(attribute.name.clone(), value);
        }

        Ok(Instance::new(self.name.clone(), Value::Object(output)))
    }
}

/// Wraps a variant and counts construction attempts
pub struct Counting {
    inner: VariantRef,
    attempts: Arc<AtomicUsize>,
}

impl Counting {
    pub fn wrap(inner: VariantRef) -> (VariantRef, Arc<AtomicUsize>) {
        let attempts = Arc::new(AtomicUsize::new(0));
        let variant = Arc::new(Self {
            inner,
            attempts: attempts.clone(),
        });
        (variant, attempts)
    }
}

impl Variant for Counting {
    fn display_name(&self) -> Option<String> {
        self.inner.display_name()
    }

    fn try_display_name(&self) -> Result<Option<String>> {
        self.inner.try_display_name()
    }

    fn is_abstract(&self) -> bool {
        self.inner.is_abstract()
    }

    fn is_constructible(&self) -> bool {
        self.inner.is_constructible()
    }

    fn try_construct(&self, input: &Value) -> Result<Instance> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.inner.try_construct(input)
    }
}

/// Accepts any object
pub fn open(name: &str) -> VariantRef {
    struct Open(String);

    impl Variant for Open {
        fn display_name(&self) -> Option<String> {
            Some(self.0.clone())
        }

        fn is_constructible(&self) -> bool {
            true
        }

        fn try_construct(&self, input: &Value) -> Result<Instance> {
            if input.is_object() {
                Ok(Instance::new(self.0.clone(), input.clone()))
            } else {
                Err(UnionError::rejected(self.0.clone(), "expected an object"))
            }
        }
    }

    Arc::new(Open(name.to_string()))
}

/// `Fixtures::Weather`, a union over `[Warm]` only
pub fn weather() -> Arc<Namespace> {
    let ns = Namespace::new("Fixtures::Weather");
    ns.declare_constant("MAX_TEMP", Value::from(274));

    let base = Record::base(ns.qualify("Base")).attribute("temp", Attr::Integer);
    let cold = base
        .extend(ns.qualify("Cold"))
        .attribute("id", Attr::Literal(Value::from("cold")));
    let warm = base
        .extend(ns.qualify("Warm"))
        .attribute("id", Attr::Literal(Value::from("warm")));
    ns.declare("Base", base.into_ref());
    ns.declare("Cold", cold.into_ref());
    ns.declare("Warm", warm.into_ref());

    bind(&ns, UnionOptions::default().include(["Warm"]));
    ns
}

/// `Fixtures::Season`, with `Autum` hidden in a nested `Unused` scope
pub fn season() -> Arc<Namespace> {
    let ns = Namespace::new("Fixtures::Season");
    ns.declare("Spring", Record::tagged(ns.qualify("Spring"), "spring").into_ref());

    let unused = Namespace::nested(&ns, "Unused");
    unused.declare("Autum", Record::tagged(unused.qualify("Autum"), "autum").into_ref());

    bind(&ns, UnionOptions::default());
    ns
}

/// `Fixtures::Planet`, excluding `Pluto`, whose members refer to other unions
pub fn planet(season: &Arc<Namespace>, weather: &Arc<Namespace>) -> Arc<Namespace> {
    let ns = Namespace::new("Fixtures::Planet");

    let base = Record::base(ns.qualify("Base"))
        .optional("closest", Attr::Nested(ns.clone()))
        .optional("season", Attr::Nested(season.clone()))
        .optional("weather", Attr::Nested(weather.clone()));
    ns.declare("Base", base.clone().into_ref());
    for (name, id) in [("Pluto", "pluto"), ("Earth", "earth"), ("Mars", "mars")] {
        let record = base
            .extend(ns.qualify(name))
            .attribute("id", Attr::Literal(Value::from(id)));
        ns.declare(name, record.into_ref());
    }

    bind(&ns, UnionOptions::default().exclude(["Pluto"]));
    ns
}

/// `People`, nesting the `Farmer` union restricted to `[Carrot, Potato]`
pub fn people() -> Arc<Namespace> {
    let ns = Namespace::new("People");
    ns.declare("Base", Record::base(ns.qualify("Base")).into_ref());
    ns.declare("Developer", Record::tagged(ns.qualify("Developer"), "developer").into_ref());
    ns.declare("Engineer", Record::tagged(ns.qualify("Engineer"), "engineer").into_ref());

    let farmer = Namespace::nested(&ns, "Farmer");
    for (name, id) in [("Carrot", "carrot"), ("Potato", "potato"), ("Pig", "pig")] {
        farmer.declare(name, Record::tagged(farmer.qualify(name), id).into_ref());
    }
    bind(&farmer, UnionOptions::default().include(["Carrot", "Potato"]));

    bind(&ns, UnionOptions::default());
    ns
}

fn bind(ns: &Arc<Namespace>, options: UnionOptions) {
    bind_union(ns, options).unwrap();
}
