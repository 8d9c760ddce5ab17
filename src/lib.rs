//! Typed query path construction with rich diagnostics.
//!
//! This library builds the path/join graph of a criteria-style query:
//! roots over entities, attribute paths navigated from them, typed joins
//! and fetches over singular and plural attributes, and correlation of
//! outer-query nodes into sub-queries. Aliases are assigned lazily when a
//! query fragment is rendered.
//!
//! # Example
//!
//! ```
//! use query_path::{InMemoryAttributeModel, JoinType, PathError, QueryAst, Renderer};
//!
//! let mut ast = QueryAst::new(InMemoryAttributeModel::example());
//! let order = ast.from("Order").unwrap();
//! let lines = ast.join_set(order, "lines", JoinType::Inner).unwrap();
//! ast.join(lines, "product").unwrap();
//!
//! // Basic attributes cannot be joined.
//! let err = ast.join(order, "number").unwrap_err();
//! assert!(matches!(err, PathError::BasicPathUsage { .. }));
//!
//! let mut renderer = Renderer::new(&mut ast);
//! assert_eq!(
//!     renderer.render_from_clause(),
//!     "from Order as generatedAlias0 \
//!      inner join generatedAlias0.lines as generatedAlias1 \
//!      inner join generatedAlias1.product as generatedAlias2"
//! );
//! ```

pub mod ast;
pub mod diag;
pub mod error;
pub mod model;
pub mod path_expr;
pub mod render;

// Re-export the graph and its handles.
pub use ast::{
    AliasGenerator, AnyJoin, AstConfig, CollectionJoin, CorrelationScope, FromId, JoinId,
    JoinType, ListIndex, ListJoin, MapEntry, MapJoin, PathId, QueryAst, Registration, SetJoin,
    SingularJoin, Span, Spanned, SubqueryId,
};

// Re-export the attribute model.
pub use model::{
    AttributeDescriptor, AttributeKind, AttributeModel, AttributeModelBuilder,
    CollectionAttribute, InMemoryAttributeModel, JoinableAttribute, ListAttribute, MapAttribute,
    SetAttribute, SingularAttribute, TypeCategory, TypeRef,
};

pub use diag::{Diag, DiagLabel, DiagSeverity, LabelRole, SourceText};
pub use error::{PathError, PathResult};
pub use path_expr::parse_path_expression;
pub use render::Renderer;
