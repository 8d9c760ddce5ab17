//! Where new joins and fetches of a from node are recorded.
//!
//! The scope is fixed when the node is created. Roots and joins built by the
//! outer query are [`CorrelationScope::Direct`]; delegates produced by
//! `correlate_to` are [`CorrelationScope::Correlated`] for their whole life.

use super::handle::{FromId, JoinId, SubqueryId};
use super::node::FromState;
use crate::error::{PathError, PathResult};
use smol_str::SmolStr;

/// Registration strategy of a from node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationScope {
    /// Joins and fetches land in the node's own sets.
    Direct,
    /// The node stands in for `parent` inside `subquery`. Joins are recorded
    /// locally; fetches are refused.
    Correlated {
        parent: FromId,
        subquery: SubqueryId,
    },
}

impl CorrelationScope {
    pub fn is_correlated(self) -> bool {
        matches!(self, CorrelationScope::Correlated { .. })
    }

    /// Correlation parent, if any.
    pub fn parent(self) -> Option<FromId> {
        match self {
            CorrelationScope::Direct => None,
            CorrelationScope::Correlated { parent, .. } => Some(parent),
        }
    }

    /// Rejects a fetch before any node is allocated for it.
    pub(crate) fn check_fetch(self, path: SmolStr, attribute: &str) -> PathResult<()> {
        match self {
            CorrelationScope::Direct => Ok(()),
            CorrelationScope::Correlated { .. } => Err(PathError::FetchFromCorrelation {
                path,
                attribute: attribute.into(),
            }),
        }
    }

    pub(crate) fn add_join(self, state: &mut FromState, join: JoinId) {
        state.joins.push(join);
    }

    /// Callers run [`CorrelationScope::check_fetch`] first.
    pub(crate) fn add_fetch(self, state: &mut FromState, fetch: JoinId) {
        debug_assert!(!self.is_correlated(), "fetch registered on a correlated scope");
        state.fetches.push(fetch);
    }
}
