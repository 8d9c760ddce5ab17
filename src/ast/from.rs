//! Join, fetch and correlation construction on from nodes.
//!
//! Every entry point validates completely before allocating, so a failed
//! call leaves the arena, the caches and the join/fetch sets untouched.

use super::QueryAst;
use super::correlation::CorrelationScope;
use super::handle::{FromId, JoinId, SubqueryId};
use super::join::{AnyJoin, CollectionJoin, ListJoin, MapJoin, SetJoin, SingularJoin};
use super::node::{JoinType, NodeKind, PathNode, Registration};
use crate::error::{PathError, PathResult};
use crate::model::{
    AttributeDescriptor, AttributeKind, CollectionAttribute, JoinableAttribute, ListAttribute,
    MapAttribute, SetAttribute, SingularAttribute,
};
use log::debug;

impl QueryAst {
    /// Roots always; joins unless their target is basic.
    pub fn can_be_join_source(&self, from: impl Into<FromId>) -> bool {
        let from: FromId = from.into();
        let node = self.node(from.into());
        match node.kind {
            NodeKind::Root => true,
            _ => node.can_be_dereferenced(),
        }
    }

    /// Same as [`QueryAst::can_be_join_source`].
    pub fn can_be_fetch_source(&self, from: impl Into<FromId>) -> bool {
        self.can_be_join_source(from)
    }

    /// Inner join over `name`, dispatched on the attribute kind.
    pub fn join(&mut self, from: impl Into<FromId>, name: &str) -> PathResult<AnyJoin> {
        self.join_with(from, name, JoinType::Inner)
    }

    /// Join over `name` with an explicit join type.
    pub fn join_with(
        &mut self,
        from: impl Into<FromId>,
        name: &str,
        join_type: JoinType,
    ) -> PathResult<AnyJoin> {
        let from = from.into();
        let attribute = self.resolve_joinable(from, name, Registration::Join)?;
        let kind = attribute.kind;
        let join = self.build_join(from, attribute, join_type, Registration::Join)?;
        Ok(AnyJoin::classify(join, kind))
    }

    /// Inner fetch over `name`, dispatched on the attribute kind.
    pub fn fetch(&mut self, from: impl Into<FromId>, name: &str) -> PathResult<AnyJoin> {
        self.fetch_with(from, name, JoinType::Inner)
    }

    /// Fetch over `name` with an explicit join type.
    pub fn fetch_with(
        &mut self,
        from: impl Into<FromId>,
        name: &str,
        join_type: JoinType,
    ) -> PathResult<AnyJoin> {
        let from = from.into();
        let attribute = self.resolve_joinable(from, name, Registration::Fetch)?;
        let kind = attribute.kind;
        let join = self.build_join(from, attribute, join_type, Registration::Fetch)?;
        Ok(AnyJoin::classify(join, kind))
    }

    /// Join through a kind-checked attribute reference.
    pub fn join_attribute<A: JoinableAttribute>(
        &mut self,
        from: impl Into<FromId>,
        attribute: &A,
        join_type: JoinType,
    ) -> PathResult<A::Join> {
        self.register_attribute(from.into(), attribute, join_type, Registration::Join)
    }

    /// Fetch through a kind-checked attribute reference.
    pub fn fetch_attribute<A: JoinableAttribute>(
        &mut self,
        from: impl Into<FromId>,
        attribute: &A,
        join_type: JoinType,
    ) -> PathResult<A::Join> {
        self.register_attribute(from.into(), attribute, join_type, Registration::Fetch)
    }

    pub fn join_singular(
        &mut self,
        from: impl Into<FromId>,
        name: &str,
        join_type: JoinType,
    ) -> PathResult<SingularJoin> {
        self.join_by_name::<SingularAttribute>(from.into(), name, join_type)
    }

    pub fn join_collection(
        &mut self,
        from: impl Into<FromId>,
        name: &str,
        join_type: JoinType,
    ) -> PathResult<CollectionJoin> {
        self.join_by_name::<CollectionAttribute>(from.into(), name, join_type)
    }

    pub fn join_list(
        &mut self,
        from: impl Into<FromId>,
        name: &str,
        join_type: JoinType,
    ) -> PathResult<ListJoin> {
        self.join_by_name::<ListAttribute>(from.into(), name, join_type)
    }

    pub fn join_set(
        &mut self,
        from: impl Into<FromId>,
        name: &str,
        join_type: JoinType,
    ) -> PathResult<SetJoin> {
        self.join_by_name::<SetAttribute>(from.into(), name, join_type)
    }

    pub fn join_map(
        &mut self,
        from: impl Into<FromId>,
        name: &str,
        join_type: JoinType,
    ) -> PathResult<MapJoin> {
        self.join_by_name::<MapAttribute>(from.into(), name, join_type)
    }

    /// Builds a correlation delegate of `from` bound to `subquery`.
    ///
    /// The delegate is a distinct node of the same kind (same root type, or
    /// same attribute and join type) with empty join sets and a correlated
    /// scope. It shares `from`'s alias; the sub-query keeps building on it.
    ///
    /// # Panics
    /// Panics if `subquery` was not issued by this graph.
    pub fn correlate_to(&mut self, from: impl Into<FromId>, subquery: SubqueryId) -> FromId {
        let parent = from.into();
        let scope = CorrelationScope::Correlated { parent, subquery };
        let delegate = self.node(parent.into()).correlated_copy(scope);
        let delegate = FromId::new(self.push_node(delegate).index());
        self.subqueries[subquery.index()].push(delegate);
        debug!(
            "correlated {} into {subquery} as {delegate}",
            self.path_identifier(parent)
        );
        delegate
    }

    fn join_by_name<A>(&mut self, from: FromId, name: &str, join_type: JoinType) -> PathResult<A::Join>
    where
        A: JoinableAttribute + TryFrom<AttributeDescriptor, Error = PathError>,
    {
        let attribute = A::try_from(self.resolve_joinable(from, name, Registration::Join)?)?;
        self.register_attribute(from, &attribute, join_type, Registration::Join)
    }

    fn register_attribute<A: JoinableAttribute>(
        &mut self,
        from: FromId,
        attribute: &A,
        join_type: JoinType,
        registration: Registration,
    ) -> PathResult<A::Join> {
        let descriptor = attribute.descriptor();
        self.check_source(from, &descriptor.name, registration)?;
        if self.config.check_attribute_owner {
            let source_type = &self.node(from.into()).node_type;
            if !self
                .model
                .is_assignable(source_type, &descriptor.declaring_type)
            {
                return Err(PathError::AttributeOwnerMismatch {
                    attribute: descriptor.name.clone(),
                    declaring_type: descriptor.declaring_type.name_str(),
                    source_type: source_type.name_str(),
                });
            }
        }
        let join = self.build_join(from, descriptor.clone(), join_type, registration)?;
        Ok(A::wrap_join(join))
    }

    fn resolve_joinable(
        &self,
        from: FromId,
        name: &str,
        registration: Registration,
    ) -> PathResult<AttributeDescriptor> {
        self.check_source(from, name, registration)?;
        self.model.resolve(&self.node(from.into()).node_type, name)
    }

    fn check_source(&self, from: FromId, name: &str, registration: Registration) -> PathResult<()> {
        let allowed = match registration {
            Registration::Join => self.can_be_join_source(from),
            Registration::Fetch => self.can_be_fetch_source(from),
        };
        if allowed {
            Ok(())
        } else {
            Err(PathError::Dereference {
                path: self.path_identifier(from).into(),
                attribute: name.into(),
            })
        }
    }

    /// Shared by joins and fetches: validate, allocate, then record through
    /// the source's correlation scope.
    fn build_join(
        &mut self,
        from: FromId,
        attribute: AttributeDescriptor,
        join_type: JoinType,
        registration: Registration,
    ) -> PathResult<JoinId> {
        check_join_target(&self.path_identifier(from), &attribute, join_type)?;

        if registration == Registration::Fetch {
            self.fetch_scope(from)
                .check_fetch(self.path_identifier(from).into(), &attribute.name)?;
        }
        let scope = self.from_state(from).correlation;

        debug!(
            "created {join_type} {} {registration:?} {}.{}",
            attribute.kind,
            self.path_identifier(from),
            attribute.name
        );
        let node = PathNode::join(from, attribute, join_type, registration);
        let join = JoinId::new(self.push_node(node).index());
        let state = self.from_state_mut(from);
        match registration {
            Registration::Join => scope.add_join(state, join),
            Registration::Fetch => scope.add_fetch(state, join),
        }
        Ok(join)
    }
}

/// Join-type and target checks that do not depend on the arena.
pub(crate) fn check_join_target(
    path: &str,
    attribute: &AttributeDescriptor,
    join_type: JoinType,
) -> PathResult<()> {
    if join_type == JoinType::Right {
        return Err(PathError::UnsupportedJoinType { join_type });
    }
    match attribute.kind {
        AttributeKind::Singular if attribute.is_element_basic() => {
            Err(PathError::BasicPathUsage {
                path: path.into(),
                attribute: attribute.name.clone(),
            })
        }
        AttributeKind::Singular
        | AttributeKind::Collection
        | AttributeKind::List
        | AttributeKind::Set
        | AttributeKind::Map => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{AnyJoin, AstConfig, FromId, JoinType, QueryAst, Registration};
    use crate::error::PathError;
    use crate::model::{
        AttributeKind, AttributeModel, InMemoryAttributeModel, ListAttribute, SetAttribute,
        TypeRef,
    };
    use std::sync::Arc;

    fn ast() -> QueryAst {
        QueryAst::new(InMemoryAttributeModel::example())
    }

    #[test]
    fn join_dispatches_on_attribute_kind() {
        let mut ast = ast();
        let root = ast.from("Order").expect("Order is an entity");

        let cases = [
            ("customer", AttributeKind::Singular),
            ("shippingAddress", AttributeKind::Singular),
            ("lines", AttributeKind::Set),
            ("payments", AttributeKind::List),
            ("notes", AttributeKind::Collection),
            ("linesBySku", AttributeKind::Map),
        ];
        for (name, kind) in cases {
            let join = ast.join(root, name).expect("join succeeds");
            assert_eq!(join.kind(), kind, "{name}");
            assert_eq!(ast.join_kind(join), kind, "{name}");
            assert_eq!(ast.typed_join(join), join, "{name}");
        }
        assert!(matches!(ast.join(root, "tags"), Ok(AnyJoin::Set(_))));
    }

    #[test]
    fn joins_keep_insertion_order() {
        let mut ast = ast();
        let root = ast.from("Order").expect("Order is an entity");
        let first = ast.join(root, "lines").expect("lines").id();
        let second = ast.join(root, "customer").expect("customer").id();
        let third = ast.join(root, "payments").expect("payments").id();

        assert_eq!(ast.joins(root), &[first, second, third]);
        assert!(ast.fetches(root).is_empty());
    }

    #[test]
    fn right_join_is_rejected_for_every_kind() {
        let mut ast = ast();
        let root = ast.from("Order").expect("Order is an entity");
        for name in ["customer", "notes", "payments", "lines", "linesBySku"] {
            assert_eq!(
                ast.join_with(root, name, JoinType::Right),
                Err(PathError::UnsupportedJoinType {
                    join_type: JoinType::Right
                }),
                "{name}"
            );
            assert!(ast.fetch_with(root, name, JoinType::Right).is_err());
        }
        assert!(ast.joins(root).is_empty());
        assert!(ast.fetches(root).is_empty());
    }

    #[test]
    fn basic_singular_cannot_be_joined() {
        let mut ast = ast();
        let root = ast.from("Order").expect("Order is an entity");
        let before = ast.node_count();

        let err = ast.join(root, "number").expect_err("basic join");
        assert_eq!(
            err,
            PathError::BasicPathUsage {
                path: "Order".into(),
                attribute: "number".into(),
            }
        );
        assert_eq!(ast.node_count(), before);
    }

    #[test]
    fn scalar_collection_join_is_a_dead_end() {
        let mut ast = ast();
        let root = ast.from("Order").expect("Order is an entity");
        let tags = ast.join(root, "tags").expect("tags joins");

        assert!(!ast.can_be_join_source(tags));
        assert!(!ast.can_be_dereferenced(tags));
        assert_eq!(
            ast.join(tags, "anything").map(|_| ()),
            Err(PathError::Dereference {
                path: "Order.tags".into(),
                attribute: "anything".into(),
            })
        );
        assert!(ast.get(tags, "length").is_err());
    }

    #[test]
    fn kind_specific_join_rejects_other_kinds() {
        let mut ast = ast();
        let root = ast.from("Order").expect("Order is an entity");

        assert!(ast.join_set(root, "lines", JoinType::Inner).is_ok());
        assert!(ast.join_list(root, "payments", JoinType::Left).is_ok());
        assert!(ast.join_collection(root, "notes", JoinType::Inner).is_ok());
        assert!(ast.join_singular(root, "customer", JoinType::Inner).is_ok());

        let err = ast
            .join_set(root, "payments", JoinType::Inner)
            .expect_err("payments is a list");
        assert_eq!(
            err,
            PathError::AttributeKindMismatch {
                attribute: "payments".into(),
                expected: AttributeKind::Set,
                actual: AttributeKind::List,
            }
        );
        assert!(ast.join_map(root, "lines", JoinType::Inner).is_err());
        assert_eq!(ast.joins(root).len(), 4);
    }

    #[test]
    fn typed_attribute_join_returns_typed_handle() {
        let mut ast = ast();
        let root = ast.from("Order").expect("Order is an entity");
        let lines = ast
            .model()
            .resolve(&TypeRef::new("Order"), "lines")
            .and_then(SetAttribute::try_from)
            .expect("lines is a set");

        let join = ast
            .join_attribute(root, &lines, JoinType::Left)
            .expect("typed join");
        assert_eq!(ast.join_type(join), JoinType::Left);
        assert_eq!(ast.joins(root), &[join.id()]);
    }

    #[test]
    fn typed_attribute_from_unrelated_type_is_rejected() {
        let mut ast = ast();
        let root = ast.from("Customer").expect("Customer is an entity");
        let payments = ast
            .model()
            .resolve(&TypeRef::new("Order"), "payments")
            .and_then(ListAttribute::try_from)
            .expect("payments is a list");

        let err = ast
            .join_attribute(root, &payments, JoinType::Inner)
            .expect_err("Customer does not declare payments");
        assert_eq!(err.code(), "path::attribute_owner_mismatch");
        assert!(ast.joins(root).is_empty());
    }

    #[test]
    fn owner_check_can_be_disabled() {
        let config = AstConfig {
            check_attribute_owner: false,
            ..AstConfig::default()
        };
        let mut ast = QueryAst::with_config(Arc::new(InMemoryAttributeModel::example()), config);
        let root = ast.from("Customer").expect("Customer is an entity");
        let payments = ast
            .model()
            .resolve(&TypeRef::new("Order"), "payments")
            .and_then(ListAttribute::try_from)
            .expect("payments is a list");

        assert!(ast.join_attribute(root, &payments, JoinType::Inner).is_ok());
    }

    #[test]
    fn subtype_root_accepts_supertype_attribute() {
        let mut ast = ast();
        let root = ast.from("SpecialOrder").expect("SpecialOrder is an entity");
        let lines = ast
            .model()
            .resolve(&TypeRef::new("Order"), "lines")
            .and_then(SetAttribute::try_from)
            .expect("lines is a set");
        assert!(ast.join_attribute(root, &lines, JoinType::Inner).is_ok());
    }

    #[test]
    fn fetch_lands_in_fetch_set_only() {
        let mut ast = ast();
        let root = ast.from("Order").expect("Order is an entity");
        let fetched = ast.fetch(root, "lines").expect("fetch lines");

        assert_eq!(ast.fetches(root), &[fetched.id()]);
        assert!(ast.joins(root).is_empty());
        assert_eq!(ast.registration(fetched), Registration::Fetch);
        assert!(ast.fetch(fetched, "product").is_ok());
    }

    #[test]
    fn each_join_call_builds_a_new_node() {
        let mut ast = ast();
        let root = ast.from("Order").expect("Order is an entity");
        let first = ast.join(root, "lines").expect("lines");
        let second = ast.join(root, "lines").expect("lines");
        assert_ne!(first, second);
        assert_eq!(ast.joins(root).len(), 2);
    }

    #[test]
    fn correlated_delegate_copies_join_kind() {
        let mut ast = ast();
        let root = ast.from("Order").expect("Order is an entity");
        let lines = ast.join_with(root, "lines", JoinType::Left).expect("lines");
        let subquery = ast.subquery();
        let correlated = ast.correlate_to(lines, subquery);

        let as_join = ast.as_join(correlated.into()).expect("delegate is a join");
        assert_eq!(ast.join_kind(as_join), AttributeKind::Set);
        assert_eq!(ast.join_type(as_join), JoinType::Left);
        assert_eq!(ast.correlation_parent(correlated), Ok(FromId::from(lines)));
        assert_eq!(ast.correlations(subquery), &[correlated]);
        assert_eq!(ast.path_identifier(correlated), "Order.lines");
        assert!(ast.joins(lines).is_empty());
    }

    #[test]
    fn joins_under_a_correlation_cannot_fetch() {
        let mut ast = ast();
        let root = ast.from("Order").expect("Order is an entity");
        let subquery = ast.subquery();
        let correlated = ast.correlate_to(root, subquery);
        let lines = ast.join(correlated, "lines").expect("correlated join");
        let before = ast.node_count();

        assert_eq!(
            ast.fetch(lines, "product"),
            Err(PathError::FetchFromCorrelation {
                path: "Order.lines".into(),
                attribute: "product".into(),
            })
        );
        assert_eq!(ast.node_count(), before);
        assert!(ast.fetches(lines).is_empty());

        let outer_lines = ast.join(root, "lines").expect("outer join");
        assert!(ast.fetch(outer_lines, "product").is_ok());
    }

    #[test]
    fn correlating_a_fetch_yields_a_plain_join() {
        let mut ast = ast();
        let root = ast.from("Order").expect("Order is an entity");
        let customer = ast.fetch(root, "customer").expect("customer fetches");
        let subquery = ast.subquery();
        let correlated = ast.correlate_to(customer, subquery);

        let as_join = ast.as_join(correlated.into()).expect("delegate is a join");
        assert_eq!(ast.registration(as_join), Registration::Join);
        assert_eq!(ast.registration(customer), Registration::Fetch);
    }

    #[test]
    fn fetches_keep_insertion_order() {
        let mut ast = ast();
        let root = ast.from("Order").expect("Order is an entity");
        let fetched = ["customer", "lines", "payments"]
            .map(|name| ast.fetch(root, name).expect("fetch").id());

        assert_eq!(ast.fetches(root), &fetched);
        assert!(ast.joins(root).is_empty());
    }

    #[test]
    #[should_panic]
    fn foreign_subquery_handle_panics() {
        let mut ast = ast();
        let root = ast.from("Order").expect("Order is an entity");
        let foreign = ast.subquery();
        let mut other = QueryAst::new(InMemoryAttributeModel::example());
        other.from("Order").expect("Order is an entity");

        other.correlate_to(root, foreign);
    }
}
