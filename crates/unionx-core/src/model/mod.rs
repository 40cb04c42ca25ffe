pub mod namespace;
pub mod variant;

pub use namespace::Namespace;
pub use variant::{Constant, Instance, ResolvedVariant, Variant, VariantRef, ANONYMOUS};
