//! The path/join graph of one query under construction.
//!
//! [`QueryAst`] owns every node in an arena and hands out copyable handles.
//! Sources and correlation parents are stored as handles, so the graph can
//! point both ways without shared ownership.

mod alias;
mod correlation;
mod from;
mod handle;
mod join;
mod node;
mod path;
mod span;

pub use alias::{AliasGenerator, DEFAULT_ALIAS_PREFIX};
pub(crate) use from::check_join_target;
pub use correlation::CorrelationScope;
pub use handle::{FromId, JoinId, PathId, SubqueryId};
pub use join::{
    AnyJoin, CollectionJoin, ListIndex, ListJoin, MapEntry, MapJoin, SetJoin, SingularJoin,
};
pub use node::{JoinType, Registration};
pub use span::{Span, Spanned};

use crate::error::{PathError, PathResult};
use crate::model::{AttributeDescriptor, AttributeKind, AttributeModel, TypeCategory, TypeRef};
use log::debug;
use node::{FromState, JoinData, NodeKind, PathNode};
use smol_str::SmolStr;
use std::sync::Arc;

/// Configuration of a [`QueryAst`].
#[derive(Debug, Clone)]
pub struct AstConfig {
    /// Prefix of generated aliases.
    pub alias_prefix: SmolStr,

    /// Require typed attribute references to be declared by the source
    /// node's type or one of its supertypes.
    pub check_attribute_owner: bool,
}

impl Default for AstConfig {
    fn default() -> Self {
        Self {
            alias_prefix: DEFAULT_ALIAS_PREFIX.into(),
            check_attribute_owner: true,
        }
    }
}

/// Mutable path/join graph of a single query.
///
/// Construction is single-threaded: every operation takes `&mut self` and no
/// state is shared between instances.
pub struct QueryAst {
    model: Arc<dyn AttributeModel>,
    config: AstConfig,
    nodes: Vec<PathNode>,
    roots: Vec<FromId>,
    /// Correlation delegates per sub-query, in creation order.
    subqueries: Vec<Vec<FromId>>,
    /// Generated aliases with the configured prefix handed out so far.
    aliases_issued: usize,
}

impl QueryAst {
    /// Creates an empty graph over `model` with the default configuration.
    pub fn new(model: impl AttributeModel + 'static) -> Self {
        Self::with_config(Arc::new(model), AstConfig::default())
    }

    /// Creates an empty graph over a shared model.
    pub fn with_config(model: Arc<dyn AttributeModel>, config: AstConfig) -> Self {
        Self {
            model,
            config,
            nodes: Vec::new(),
            roots: Vec::new(),
            subqueries: Vec::new(),
            aliases_issued: 0,
        }
    }

    pub fn config(&self) -> &AstConfig {
        &self.config
    }

    pub fn model(&self) -> &dyn AttributeModel {
        self.model.as_ref()
    }

    /// Alias generator configured for this graph, continuing after every
    /// alias already generated for it.
    pub fn alias_generator(&self) -> AliasGenerator {
        let mut aliases = AliasGenerator::from_config(&self.config);
        aliases.skip_past(self.aliases_issued);
        aliases
    }

    /// Adds a query root over `entity`.
    pub fn from(&mut self, entity: &str) -> PathResult<FromId> {
        let entity = TypeRef::new(entity);
        if self.model.type_category(&entity) != Some(TypeCategory::Entity) {
            return Err(PathError::UnknownType {
                name: entity.name_str(),
            });
        }

        debug!("created root over {entity}");
        let root = FromId::new(self.push_node(PathNode::root(entity)).index());
        self.roots.push(root);
        Ok(root)
    }

    /// Allocates a sub-query that nodes can be correlated into.
    pub fn subquery(&mut self) -> SubqueryId {
        self.subqueries.push(Vec::new());
        SubqueryId::new(self.subqueries.len() - 1)
    }

    /// Query roots in creation order. Correlation delegates are not roots.
    pub fn roots(&self) -> &[FromId] {
        &self.roots
    }

    /// Delegates correlated into `subquery`, in creation order.
    ///
    /// # Panics
    /// Panics if `subquery` was not issued by this graph.
    pub fn correlations(&self, subquery: SubqueryId) -> &[FromId] {
        &self.subqueries[subquery.index()]
    }

    /// Number of nodes in the arena.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Joins of `from`, in emission order.
    pub fn joins(&self, from: impl Into<FromId>) -> &[JoinId] {
        &self.from_state(from.into()).joins
    }

    /// Fetches of `from`, in emission order.
    pub fn fetches(&self, from: impl Into<FromId>) -> &[JoinId] {
        &self.from_state(from.into()).fetches
    }

    pub fn correlation_scope(&self, from: impl Into<FromId>) -> CorrelationScope {
        self.from_state(from.into()).correlation
    }

    pub fn is_correlated(&self, from: impl Into<FromId>) -> bool {
        self.correlation_scope(from).is_correlated()
    }

    /// Scope that decides whether `from` may fetch: the first correlated
    /// scope on its source chain, so joins built under a delegate inherit
    /// the delegate's restrictions.
    pub(crate) fn fetch_scope(&self, from: FromId) -> CorrelationScope {
        let mut current = Some(PathId::from(from));
        while let Some(path) = current {
            let node = self.node(path);
            if let Some(state) = &node.from {
                if state.correlation.is_correlated() {
                    return state.correlation;
                }
            }
            current = node.source;
        }
        CorrelationScope::Direct
    }

    /// Node `from` was correlated to.
    pub fn correlation_parent(&self, from: impl Into<FromId>) -> PathResult<FromId> {
        let from = from.into();
        self.correlation_scope(from)
            .parent()
            .ok_or_else(|| PathError::NotCorrelated {
                path: self.path_identifier(from).into(),
            })
    }

    /// Node `path` was derived from; `None` for roots.
    pub fn source(&self, path: impl Into<PathId>) -> Option<PathId> {
        self.node(path.into()).source
    }

    /// Type of the value `path` denotes (element type for plural paths).
    pub fn node_type(&self, path: impl Into<PathId>) -> &TypeRef {
        &self.node(path.into()).node_type
    }

    /// Attribute `path` navigates, `None` for roots and map keys.
    pub fn attribute(&self, path: impl Into<PathId>) -> Option<&AttributeDescriptor> {
        self.node(path.into()).attribute_descriptor()
    }

    /// Narrows a path handle to a from handle when the node is a root or join.
    pub fn as_from(&self, path: PathId) -> Option<FromId> {
        self.node(path).from.as_ref().map(|_| FromId::new(path.index()))
    }

    /// Narrows a path handle to a join handle when the node is a join.
    pub fn as_join(&self, path: PathId) -> Option<JoinId> {
        self.node(path)
            .join_kind()
            .map(|_| JoinId::new(path.index()))
    }

    pub fn join_type(&self, join: impl Into<JoinId>) -> JoinType {
        self.join_data(join.into()).join_type
    }

    pub fn join_kind(&self, join: impl Into<JoinId>) -> AttributeKind {
        self.join_data(join.into()).attribute.kind
    }

    /// Whether `join` sits in its source's join set or fetch set.
    pub fn registration(&self, join: impl Into<JoinId>) -> Registration {
        self.join_data(join.into()).registration
    }

    /// Root at the start of the source chain of `path`.
    pub fn find_root(&self, path: impl Into<PathId>) -> FromId {
        let mut current = path.into();
        while let Some(source) = self.node(current).source {
            current = source;
        }
        FromId::new(current.index())
    }

    pub(crate) fn push_node(&mut self, node: PathNode) -> PathId {
        self.nodes.push(node);
        PathId::new(self.nodes.len() - 1)
    }

    pub(crate) fn node(&self, path: PathId) -> &PathNode {
        &self.nodes[path.index()]
    }

    pub(crate) fn node_mut(&mut self, path: PathId) -> &mut PathNode {
        &mut self.nodes[path.index()]
    }

    pub(crate) fn from_state(&self, from: FromId) -> &FromState {
        self.nodes[from.index()]
            .from
            .as_ref()
            .expect("from handles always point at roots or joins")
    }

    pub(crate) fn from_state_mut(&mut self, from: FromId) -> &mut FromState {
        self.nodes[from.index()]
            .from
            .as_mut()
            .expect("from handles always point at roots or joins")
    }

    pub(crate) fn join_data(&self, join: JoinId) -> &JoinData {
        match &self.nodes[join.index()].kind {
            NodeKind::Join(data) => data,
            _ => unreachable!("join handles always point at join nodes"),
        }
    }
}

impl std::fmt::Debug for QueryAst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryAst")
            .field("config", &self.config)
            .field("nodes", &self.nodes)
            .field("roots", &self.roots)
            .field("subqueries", &self.subqueries)
            .finish_non_exhaustive()
    }
}
