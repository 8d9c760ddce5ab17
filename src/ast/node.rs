//! Arena node payloads.

use super::correlation::CorrelationScope;
use super::handle::{FromId, JoinId, PathId};
use crate::model::{AttributeDescriptor, AttributeKind, TypeCategory, TypeRef};
use smol_str::SmolStr;
use std::collections::HashMap;
use std::fmt;

/// Join type requested for a join or fetch.
///
/// `Right` is recognised so callers can express it, but every construction
/// path rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JoinType {
    #[default]
    Inner,
    Left,
    Right,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinType::Inner => write!(f, "inner"),
            JoinType::Left => write!(f, "left"),
            JoinType::Right => write!(f, "right"),
        }
    }
}

/// Whether a join node was registered as an ordinary join or a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Join,
    Fetch,
}

#[derive(Debug, Clone)]
pub(crate) struct JoinData {
    pub(crate) attribute: AttributeDescriptor,
    pub(crate) join_type: JoinType,
    pub(crate) registration: Registration,
}

/// What a node is.
#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    /// Query root over an entity.
    Root,
    /// Singular attribute reached with `get`.
    Attribute(AttributeDescriptor),
    /// Plural attribute reached with `get`; a value, never a join.
    PluralAttribute(AttributeDescriptor),
    /// Join or fetch over an attribute.
    Join(JoinData),
    /// Key side of a map join.
    MapKey(JoinId),
}

/// Join, fetch, correlation and alias state of a from node.
#[derive(Debug, Clone)]
pub(crate) struct FromState {
    pub(crate) joins: Vec<JoinId>,
    pub(crate) fetches: Vec<JoinId>,
    pub(crate) correlation: CorrelationScope,
    pub(crate) alias: Option<SmolStr>,
}

impl FromState {
    pub(crate) fn new(correlation: CorrelationScope) -> Self {
        Self {
            joins: Vec::new(),
            fetches: Vec::new(),
            correlation,
            alias: None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PathNode {
    /// Node this one was derived from; `None` for roots.
    pub(crate) source: Option<PathId>,
    /// Type of the value this path denotes.
    pub(crate) node_type: TypeRef,
    pub(crate) category: TypeCategory,
    pub(crate) kind: NodeKind,
    /// Memoized `get` results keyed by attribute name.
    pub(crate) attribute_paths: HashMap<SmolStr, PathId>,
    /// Present exactly for roots and joins.
    pub(crate) from: Option<FromState>,
}

impl PathNode {
    pub(crate) fn root(entity: TypeRef) -> Self {
        Self {
            source: None,
            node_type: entity,
            category: TypeCategory::Entity,
            kind: NodeKind::Root,
            attribute_paths: HashMap::new(),
            from: Some(FromState::new(CorrelationScope::Direct)),
        }
    }

    pub(crate) fn attribute(source: PathId, attribute: AttributeDescriptor) -> Self {
        let kind = if attribute.is_plural() {
            NodeKind::PluralAttribute(attribute.clone())
        } else {
            NodeKind::Attribute(attribute.clone())
        };
        Self {
            source: Some(source),
            node_type: attribute.element_type,
            category: attribute.element_category,
            kind,
            attribute_paths: HashMap::new(),
            from: None,
        }
    }

    pub(crate) fn join(
        source: FromId,
        attribute: AttributeDescriptor,
        join_type: JoinType,
        registration: Registration,
    ) -> Self {
        Self {
            source: Some(source.into()),
            node_type: attribute.element_type.clone(),
            category: attribute.element_category,
            kind: NodeKind::Join(JoinData {
                attribute,
                join_type,
                registration,
            }),
            attribute_paths: HashMap::new(),
            from: Some(FromState::new(CorrelationScope::Direct)),
        }
    }

    pub(crate) fn map_key(join: JoinId, attribute: &AttributeDescriptor) -> Self {
        // A map described without key metadata exposes an opaque basic key.
        let (node_type, category) = match (&attribute.key_type, attribute.key_category) {
            (Some(key_type), Some(category)) => (key_type.clone(), category),
            _ => (TypeRef::new("Object"), TypeCategory::Basic),
        };
        Self {
            source: Some(join.into()),
            node_type,
            category,
            kind: NodeKind::MapKey(join),
            attribute_paths: HashMap::new(),
            from: None,
        }
    }

    /// Structural copy for a correlation delegate: same kind and type, fresh
    /// caches and join sets, scope fixed at creation. A delegate of a fetch
    /// sits in no fetch set, so it is registered as a plain join.
    pub(crate) fn correlated_copy(&self, correlation: CorrelationScope) -> Self {
        let kind = match &self.kind {
            NodeKind::Join(data) => NodeKind::Join(JoinData {
                registration: Registration::Join,
                ..data.clone()
            }),
            kind => kind.clone(),
        };
        Self {
            source: self.source,
            node_type: self.node_type.clone(),
            category: self.category,
            kind,
            attribute_paths: HashMap::new(),
            from: Some(FromState::new(correlation)),
        }
    }

    pub(crate) fn attribute_descriptor(&self) -> Option<&AttributeDescriptor> {
        match &self.kind {
            NodeKind::Attribute(attribute) | NodeKind::PluralAttribute(attribute) => {
                Some(attribute)
            }
            NodeKind::Join(data) => Some(&data.attribute),
            NodeKind::Root | NodeKind::MapKey(_) => None,
        }
    }

    /// Basic-typed leaves and plural value paths cannot be navigated.
    pub(crate) fn can_be_dereferenced(&self) -> bool {
        match &self.kind {
            NodeKind::Root => true,
            NodeKind::PluralAttribute(_) => false,
            NodeKind::Attribute(_) | NodeKind::Join(_) | NodeKind::MapKey(_) => {
                !self.category.is_basic()
            }
        }
    }

    pub(crate) fn join_kind(&self) -> Option<AttributeKind> {
        match &self.kind {
            NodeKind::Join(data) => Some(data.attribute.kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AttributeKind;

    fn lines() -> AttributeDescriptor {
        AttributeDescriptor::plural(
            "Order",
            "lines",
            AttributeKind::Set,
            "OrderLine",
            TypeCategory::Entity,
        )
    }

    #[test]
    fn join_type_defaults_to_inner() {
        assert_eq!(JoinType::default(), JoinType::Inner);
        assert_eq!(JoinType::Left.to_string(), "left");
    }

    #[test]
    fn plural_get_is_a_value_leaf() {
        let node = PathNode::attribute(PathId::new(0), lines());
        assert!(matches!(node.kind, NodeKind::PluralAttribute(_)));
        assert!(!node.can_be_dereferenced());
        assert!(node.from.is_none());
    }

    #[test]
    fn basic_singular_path_cannot_be_dereferenced() {
        let number =
            AttributeDescriptor::singular("Order", "number", "String", TypeCategory::Basic);
        let node = PathNode::attribute(PathId::new(0), number);
        assert!(!node.can_be_dereferenced());
    }

    #[test]
    fn join_over_scalar_collection_is_not_navigable() {
        let tags = AttributeDescriptor::plural(
            "Order",
            "tags",
            AttributeKind::Set,
            "String",
            TypeCategory::Basic,
        );
        let node = PathNode::join(FromId::new(0), tags, JoinType::Inner, Registration::Join);
        assert!(!node.can_be_dereferenced());
        assert_eq!(node.join_kind(), Some(AttributeKind::Set));
    }

    #[test]
    fn correlated_copy_of_fetch_is_a_join() {
        let customer =
            AttributeDescriptor::singular("Order", "customer", "Customer", TypeCategory::Entity);
        let fetch = PathNode::join(FromId::new(0), customer, JoinType::Left, Registration::Fetch);
        let scope = CorrelationScope::Correlated {
            parent: FromId::new(1),
            subquery: crate::ast::SubqueryId::new(0),
        };

        let delegate = fetch.correlated_copy(scope);
        match delegate.kind {
            NodeKind::Join(data) => {
                assert_eq!(data.registration, Registration::Join);
                assert_eq!(data.join_type, JoinType::Left);
            }
            other => panic!("expected a join, got {other:?}"),
        }
    }

    #[test]
    fn map_key_without_metadata_is_basic() {
        let odd = AttributeDescriptor::plural(
            "Order",
            "odd",
            AttributeKind::Map,
            "OrderLine",
            TypeCategory::Entity,
        );
        let node = PathNode::map_key(JoinId::new(1), &odd);
        assert_eq!(node.category, TypeCategory::Basic);
        assert!(!node.can_be_dereferenced());
    }
}
