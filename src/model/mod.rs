//! Attribute model capability consumed by the path graph.
//!
//! The path graph never inspects entity shapes directly. It asks an
//! [`AttributeModel`] to resolve attribute names against a declaring type and
//! dispatches on the returned [`AttributeKind`].

mod in_memory;
mod typed;

pub use in_memory::{AttributeModelBuilder, InMemoryAttributeModel};
pub use typed::{
    CollectionAttribute, JoinableAttribute, ListAttribute, MapAttribute, SetAttribute,
    SingularAttribute,
};

use crate::error::{PathError, PathResult};
use smol_str::SmolStr;
use std::collections::HashSet;
use std::fmt;

/// Reference to a named type of the domain model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef {
    name: SmolStr,
}

impl TypeRef {
    /// Creates a type reference.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_str(&self) -> SmolStr {
        self.name.clone()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// How a type participates in navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    /// A mapped entity; can be a query root and a join target.
    Entity,
    /// A component embedded in its owner; navigable and joinable.
    Embeddable,
    /// A column value (`String`, integers, ...); a navigation leaf.
    Basic,
}

impl TypeCategory {
    /// Returns true for basic (non-navigable) types.
    pub fn is_basic(self) -> bool {
        matches!(self, TypeCategory::Basic)
    }
}

/// Plurality of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Singular,
    Collection,
    List,
    Set,
    Map,
}

impl AttributeKind {
    /// Returns true for every kind except [`AttributeKind::Singular`].
    pub fn is_plural(self) -> bool {
        !matches!(self, AttributeKind::Singular)
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeKind::Singular => write!(f, "singular"),
            AttributeKind::Collection => write!(f, "collection"),
            AttributeKind::List => write!(f, "list"),
            AttributeKind::Set => write!(f, "set"),
            AttributeKind::Map => write!(f, "map"),
        }
    }
}

/// Resolved description of one attribute.
///
/// For singular attributes `element_type` is the attribute type itself; for
/// plural attributes it is the element (or map value) type. `key_type` is
/// only set for maps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDescriptor {
    pub name: SmolStr,
    pub declaring_type: TypeRef,
    pub kind: AttributeKind,
    pub element_type: TypeRef,
    pub element_category: TypeCategory,
    pub key_type: Option<TypeRef>,
    pub key_category: Option<TypeCategory>,
}

impl AttributeDescriptor {
    /// Describes a singular attribute.
    pub fn singular(
        declaring_type: impl Into<TypeRef>,
        name: impl Into<SmolStr>,
        target: impl Into<TypeRef>,
        category: TypeCategory,
    ) -> Self {
        Self {
            name: name.into(),
            declaring_type: declaring_type.into(),
            kind: AttributeKind::Singular,
            element_type: target.into(),
            element_category: category,
            key_type: None,
            key_category: None,
        }
    }

    /// Describes a collection, list or set attribute.
    ///
    /// Passing [`AttributeKind::Map`] or [`AttributeKind::Singular`] is allowed
    /// but produces a descriptor without key information; use
    /// [`AttributeDescriptor::map`] for maps.
    pub fn plural(
        declaring_type: impl Into<TypeRef>,
        name: impl Into<SmolStr>,
        kind: AttributeKind,
        element: impl Into<TypeRef>,
        category: TypeCategory,
    ) -> Self {
        Self {
            name: name.into(),
            declaring_type: declaring_type.into(),
            kind,
            element_type: element.into(),
            element_category: category,
            key_type: None,
            key_category: None,
        }
    }

    /// Describes a map attribute.
    pub fn map(
        declaring_type: impl Into<TypeRef>,
        name: impl Into<SmolStr>,
        key: (TypeRef, TypeCategory),
        value: (TypeRef, TypeCategory),
    ) -> Self {
        Self {
            name: name.into(),
            declaring_type: declaring_type.into(),
            kind: AttributeKind::Map,
            element_type: value.0,
            element_category: value.1,
            key_type: Some(key.0),
            key_category: Some(key.1),
        }
    }

    pub fn is_plural(&self) -> bool {
        self.kind.is_plural()
    }

    /// True when the element (or singular target) is a basic type.
    pub fn is_element_basic(&self) -> bool {
        self.element_category.is_basic()
    }

    /// True when the map key is basic. Non-map attributes report `true`.
    pub fn is_key_basic(&self) -> bool {
        self.key_category.is_none_or(TypeCategory::is_basic)
    }

    /// Fails with [`PathError::AttributeKindMismatch`] unless `self.kind == expected`.
    pub fn expect_kind(&self, expected: AttributeKind) -> PathResult<()> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(PathError::AttributeKindMismatch {
                attribute: self.name.clone(),
                expected,
                actual: self.kind,
            })
        }
    }
}

/// Read-only view of entity shapes.
///
/// Implementations back onto mapping metadata; tests use
/// [`InMemoryAttributeModel`].
pub trait AttributeModel: Send + Sync {
    /// Resolves `name` against `declaring_type`, including inherited attributes.
    fn resolve(&self, declaring_type: &TypeRef, name: &str) -> PathResult<AttributeDescriptor>;

    /// Category of a known type, `None` when the type is unknown.
    fn type_category(&self, ty: &TypeRef) -> Option<TypeCategory>;

    /// Direct supertypes of `ty`.
    ///
    /// # Default Implementation
    ///
    /// Returns no supertypes.
    fn supertypes(&self, _ty: &TypeRef) -> &[TypeRef] {
        &[]
    }

    /// Returns true when `sub` is `sup` or inherits from it.
    fn is_assignable(&self, sub: &TypeRef, sup: &TypeRef) -> bool {
        let mut visited = HashSet::new();
        let mut pending = vec![sub.clone()];
        while let Some(ty) = pending.pop() {
            if &ty == sup {
                return true;
            }
            if visited.insert(ty.clone()) {
                pending.extend(self.supertypes(&ty).iter().cloned());
            }
        }
        false
    }
}
