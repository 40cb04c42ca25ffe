use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use serde_json::Value;
use unionx_core_types::{NamespaceId, Snapshot, SnapshotEntry};

use crate::binder::Union;
use crate::errors::{Result, UnionError};
use crate::model::variant::{Instance, Variant, VariantRef};

/// A mutable scope holding named variant declarations
///
/// Members keep their declaration order. The host owns namespaces through
/// `Arc<Namespace>` and may declare or remove members at any time; the engine
/// never locks a namespace across calls, it only reads the state it observes.
///
/// Once a union is bound, the namespace owns it and presents the union's
/// operations through its own [`Variant`] implementation.
///
/// A nested namespace keeps a weak link to its parent. Every mutation of the
/// child, binding included, gives the child's declaration in the parent a new
/// revision, so unions over the parent observe it.
pub struct Namespace {
    id: NamespaceId,
    name: String,
    members: RwLock<Members>,
    binding: OnceLock<Arc<Union>>,
    parent: OnceLock<Weak<Namespace>>,
}

#[derive(Default)]
struct Members {
    declarations: Vec<Declaration>,
    next_revision: u64,
}

impl Members {
    fn bump(&mut self) -> u64 {
        self.next_revision += 1;
        self.next_revision
    }
}

struct Declaration {
    name: String,
    revision: u64,
    variant: VariantRef,
}

impl Namespace {
    /// Create a new empty namespace
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: NamespaceId::new(),
            name: name.into(),
            members: RwLock::new(Members::default()),
            binding: OnceLock::new(),
            parent: OnceLock::new(),
        })
    }

    /// Create a child namespace declared as a member of `parent`
    ///
    /// The child's name is qualified by the parent's (`Parent::Child`).
    pub fn nested(parent: &Arc<Namespace>, name: &str) -> Arc<Namespace> {
        let child = Namespace::new(parent.qualify(name));
        let _ = child.parent.set(Arc::downgrade(parent));
        parent.declare(name, child.clone());
        child
    }

    pub fn id(&self) -> &NamespaceId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Qualify a member name with this namespace's name
    pub fn qualify(&self, member: &str) -> String {
        format!("{}::{}", self.name, member)
    }

    /// Declare a member, replacing any member with the same name
    ///
    /// A replaced member keeps its position but receives a new revision.
    /// Returns the replaced member, if any.
    pub fn declare(&self, name: impl Into<String>, variant: VariantRef) -> Option<VariantRef> {
        let name = name.into();
        let replaced = {
            let mut members = self.write();
            let revision = members.bump();

            match members.declarations.iter_mut().find(|d| d.name == name) {
                Some(existing) => {
                    existing.revision = revision;
                    Some(std::mem::replace(&mut existing.variant, variant))
                }
                None => {
                    members.declarations.push(Declaration {
                        name,
                        revision,
                        variant,
                    });
                    None
                }
            }
        };
        self.touch_parent();
        replaced
    }

    /// Declare a plain constant value
    pub fn declare_constant(&self, name: impl Into<String>, value: Value) -> Option<VariantRef> {
        self.declare(name, Arc::new(crate::model::variant::Constant::new(value)))
    }

    /// Remove a member
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no member is declared under `name`.
    pub fn remove(&self, name: &str) -> Result<VariantRef> {
        let removed = {
            let mut members = self.write();
            let position = members
                .declarations
                .iter()
                .position(|d| d.name == name)
                .ok_or_else(|| self.not_found(name))?;
            members.bump();
            members.declarations.remove(position).variant
        };
        self.touch_parent();
        Ok(removed)
    }

    /// Names of all declared members, in declaration order
    pub fn enumerate_declared_names(&self) -> Vec<String> {
        self.read()
            .declarations
            .iter()
            .map(|d| d.name.clone())
            .collect()
    }

    /// Resolve a member by name
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no member is declared under `name`.
    pub fn resolve(&self, name: &str) -> Result<VariantRef> {
        self.read()
            .declarations
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.variant.clone())
            .ok_or_else(|| self.not_found(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().declarations.iter().any(|d| d.name == name)
    }

    pub fn len(&self) -> usize {
        self.read().declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().declarations.is_empty()
    }

    /// Capture the current member list as a cache key
    pub fn snapshot(&self) -> Snapshot {
        self.read()
            .declarations
            .iter()
            .map(|d| SnapshotEntry {
                name: d.name.clone(),
                revision: d.revision,
            })
            .collect()
    }

    /// The union bound to this namespace, if any
    pub fn union(&self) -> Option<Arc<Union>> {
        self.binding.get().cloned()
    }

    pub fn is_bound(&self) -> bool {
        self.binding.get().is_some()
    }

    pub(crate) fn attach(&self, union: Arc<Union>) -> Result<()> {
        self.binding
            .set(union)
            .map_err(|_| UnionError::AlreadyBound {
                namespace: self.name.clone(),
            })
    }

    /// Give the parent's declaration of this namespace a new revision
    fn touch_parent(&self) {
        let Some(parent) = self.parent.get().and_then(Weak::upgrade) else {
            return;
        };
        let me = self as *const Namespace as *const ();
        let touched = {
            let mut members = parent.write();
            let revision = members.bump();
            match members
                .declarations
                .iter_mut()
                .find(|d| Arc::as_ptr(&d.variant) as *const () == me)
            {
                Some(declaration) => {
                    declaration.revision = revision;
                    true
                }
                None => false,
            }
        };
        // Removed or replaced in the parent: nothing there depends on us
        if touched {
            parent.touch_parent();
        }
    }

    fn not_found(&self, name: &str) -> UnionError {
        UnionError::NotFound {
            name: name.to_string(),
            namespace: self.name.clone(),
        }
    }

    // Host mutation is externally synchronized, so a poisoned lock only means
    // a host thread panicked mid-call; the member list itself is still whole.
    fn read(&self) -> RwLockReadGuard<'_, Members> {
        self.members.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Members> {
        self.members.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A namespace is a variant through its bound union
///
/// Unbound namespaces are plain scopes and fall back to non-constructible.
impl Variant for Namespace {
    fn display_name(&self) -> Option<String> {
        match self.binding.get() {
            Some(union) => Variant::display_name(&**union),
            None => Some(self.name.clone()),
        }
    }

    fn try_display_name(&self) -> Result<Option<String>> {
        match self.binding.get() {
            Some(union) => union.try_display_name(),
            None => Ok(Some(self.name.clone())),
        }
    }

    fn is_constructible(&self) -> bool {
        self.is_bound()
    }

    fn is_union(&self) -> bool {
        self.is_bound()
    }

    fn try_construct(&self, input: &Value) -> Result<Instance> {
        match self.binding.get() {
            Some(union) => union.try_construct(input),
            None => Err(UnionError::rejected(
                self.name.clone(),
                "namespace is not bound to a union",
            )),
        }
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("members", &self.enumerate_declared_names())
            .field("bound", &self.is_bound())
            .finish()
    }
}
