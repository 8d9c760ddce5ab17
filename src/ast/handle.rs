//! Stable handles into the node arena of a [`QueryAst`](super::QueryAst).
//!
//! Handles are plain indices. Two handles are equal exactly when they name the
//! same node, which is the identity later compilation stages compare by.
//! A handle is only meaningful for the `QueryAst` that issued it.

use std::fmt;

macro_rules! node_handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(usize);

        impl $name {
            pub(crate) fn new(index: usize) -> Self {
                Self(index)
            }

            /// Returns the arena index.
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

node_handle!(
    /// Any navigable node: roots, attribute paths, joins, map keys.
    PathId,
    "path"
);
node_handle!(
    /// A node that can source joins and fetches (roots and joins).
    FromId,
    "from"
);
node_handle!(
    /// A join or fetch node.
    JoinId,
    "join"
);
node_handle!(
    /// A sub-query that correlated nodes are bound to.
    SubqueryId,
    "subquery"
);

impl From<FromId> for PathId {
    fn from(id: FromId) -> Self {
        PathId(id.0)
    }
}

impl From<JoinId> for FromId {
    fn from(id: JoinId) -> Self {
        FromId(id.0)
    }
}

impl From<JoinId> for PathId {
    fn from(id: JoinId) -> Self {
        PathId(id.0)
    }
}
