//! Concrete join kinds and the expressions only some of them expose.

use super::QueryAst;
use super::handle::{FromId, JoinId, PathId};
use super::node::PathNode;
use crate::model::AttributeKind;
use log::trace;

macro_rules! join_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(JoinId);

        impl $name {
            pub(crate) fn new(id: JoinId) -> Self {
                Self(id)
            }

            /// Untyped join handle.
            pub fn id(self) -> JoinId {
                self.0
            }
        }

        impl From<$name> for JoinId {
            fn from(join: $name) -> Self {
                join.0
            }
        }

        impl From<$name> for FromId {
            fn from(join: $name) -> Self {
                join.0.into()
            }
        }

        impl From<$name> for PathId {
            fn from(join: $name) -> Self {
                join.0.into()
            }
        }
    };
}

join_handle!(
    /// Join over a singular entity or embeddable attribute.
    SingularJoin
);
join_handle!(
    /// Join over a collection (bag) attribute.
    CollectionJoin
);
join_handle!(
    /// Join over a list attribute.
    ListJoin
);
join_handle!(
    /// Join over a set attribute.
    SetJoin
);
join_handle!(
    /// Join over a map attribute; its value side is the join itself.
    MapJoin
);

/// A join of any kind, as returned by by-name `join`/`fetch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnyJoin {
    Singular(SingularJoin),
    Collection(CollectionJoin),
    List(ListJoin),
    Set(SetJoin),
    Map(MapJoin),
}

impl AnyJoin {
    pub(crate) fn classify(id: JoinId, kind: AttributeKind) -> Self {
        match kind {
            AttributeKind::Singular => AnyJoin::Singular(SingularJoin::new(id)),
            AttributeKind::Collection => AnyJoin::Collection(CollectionJoin::new(id)),
            AttributeKind::List => AnyJoin::List(ListJoin::new(id)),
            AttributeKind::Set => AnyJoin::Set(SetJoin::new(id)),
            AttributeKind::Map => AnyJoin::Map(MapJoin::new(id)),
        }
    }

    pub fn id(self) -> JoinId {
        match self {
            AnyJoin::Singular(join) => join.id(),
            AnyJoin::Collection(join) => join.id(),
            AnyJoin::List(join) => join.id(),
            AnyJoin::Set(join) => join.id(),
            AnyJoin::Map(join) => join.id(),
        }
    }

    /// Attribute kind the join was dispatched on.
    pub fn kind(self) -> AttributeKind {
        match self {
            AnyJoin::Singular(_) => AttributeKind::Singular,
            AnyJoin::Collection(_) => AttributeKind::Collection,
            AnyJoin::List(_) => AttributeKind::List,
            AnyJoin::Set(_) => AttributeKind::Set,
            AnyJoin::Map(_) => AttributeKind::Map,
        }
    }

    pub fn as_set(self) -> Option<SetJoin> {
        match self {
            AnyJoin::Set(join) => Some(join),
            _ => None,
        }
    }

    pub fn as_list(self) -> Option<ListJoin> {
        match self {
            AnyJoin::List(join) => Some(join),
            _ => None,
        }
    }

    pub fn as_map(self) -> Option<MapJoin> {
        match self {
            AnyJoin::Map(join) => Some(join),
            _ => None,
        }
    }
}

impl From<AnyJoin> for JoinId {
    fn from(join: AnyJoin) -> Self {
        join.id()
    }
}

impl From<AnyJoin> for FromId {
    fn from(join: AnyJoin) -> Self {
        join.id().into()
    }
}

impl From<AnyJoin> for PathId {
    fn from(join: AnyJoin) -> Self {
        join.id().into()
    }
}

/// `entry(map)` expression: the key/value pair of a map join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapEntry {
    pub join: MapJoin,
}

/// `index(list)` expression: the position of a list join element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListIndex {
    pub join: ListJoin,
}

impl QueryAst {
    /// Typed view of an existing join.
    pub fn typed_join(&self, join: impl Into<JoinId>) -> AnyJoin {
        let join = join.into();
        AnyJoin::classify(join, self.join_data(join).attribute.kind)
    }

    /// Key side of a map join.
    ///
    /// Every call builds a new key path node; key paths are not memoized.
    pub fn map_key(&mut self, join: MapJoin) -> PathId {
        let node = PathNode::map_key(join.id(), &self.join_data(join.id()).attribute);
        let key = self.push_node(node);
        trace!("created map key {key} of {}", join.id());
        key
    }

    /// Value side of a map join, which is the join node itself.
    pub fn map_value(&self, join: MapJoin) -> PathId {
        join.into()
    }

    /// Key/value pair expression of a map join.
    pub fn map_entry(&self, join: MapJoin) -> MapEntry {
        MapEntry { join }
    }

    /// Index expression of a list join.
    pub fn list_index(&self, join: ListJoin) -> ListIndex {
        ListIndex { join }
    }
}
