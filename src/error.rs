//! Errors raised while building the path/join graph.
//!
//! Every variant is a contract violation by the caller: none of them is
//! retryable and none leaves a partially constructed node behind.

use crate::ast::{JoinType, Span};
use crate::diag::{Diag, DiagLabel};
use crate::model::AttributeKind;
use smol_str::SmolStr;
use std::fmt;

/// Result alias used throughout the crate.
pub type PathResult<T> = Result<T, PathError>;

/// Errors produced by path navigation, join/fetch construction and correlation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// `get`/`join`/`fetch` on a node that cannot be navigated further
    /// (basic-typed leaf or a collection of basic values).
    Dereference { path: SmolStr, attribute: SmolStr },
    /// The attribute name does not resolve against the declaring type.
    UnknownAttribute {
        declaring_type: SmolStr,
        attribute: SmolStr,
    },
    /// The type is not known to the attribute model.
    UnknownType { name: SmolStr },
    /// A kind-specific call was made against an attribute of another kind.
    AttributeKindMismatch {
        attribute: SmolStr,
        expected: AttributeKind,
        actual: AttributeKind,
    },
    /// Only inner and left joins are supported.
    UnsupportedJoinType { join_type: JoinType },
    /// Join requested against a basic-typed singular attribute.
    BasicPathUsage { path: SmolStr, attribute: SmolStr },
    /// Fetch requested on a node that belongs to a correlated sub-query.
    FetchFromCorrelation { path: SmolStr, attribute: SmolStr },
    /// Correlation parent requested from a node that is not correlated.
    NotCorrelated { path: SmolStr },
    /// A typed attribute reference declared by an unrelated type.
    AttributeOwnerMismatch {
        attribute: SmolStr,
        declaring_type: SmolStr,
        source_type: SmolStr,
    },
    /// Explicit alias assigned to a correlated node.
    CorrelatedAlias { path: SmolStr },
}

impl PathError {
    /// Returns the stable diagnostic code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            PathError::Dereference { .. } => "path::dereference",
            PathError::UnknownAttribute { .. } => "path::unknown_attribute",
            PathError::UnknownType { .. } => "path::unknown_type",
            PathError::AttributeKindMismatch { .. } => "path::attribute_kind_mismatch",
            PathError::UnsupportedJoinType { .. } => "path::unsupported_join_type",
            PathError::BasicPathUsage { .. } => "path::basic_path_usage",
            PathError::FetchFromCorrelation { .. } => "path::fetch_from_correlation",
            PathError::NotCorrelated { .. } => "path::not_correlated",
            PathError::AttributeOwnerMismatch { .. } => "path::attribute_owner_mismatch",
            PathError::CorrelatedAlias { .. } => "path::correlated_alias",
        }
    }

    /// Converts this error to a diagnostic labelled at the given span.
    pub fn to_diag(&self, span: Span) -> Diag {
        let diag = Diag::error(self.to_string()).with_code(self.code());

        match self {
            PathError::Dereference { .. } => diag
                .with_label(DiagLabel::primary(span, "cannot be dereferenced"))
                .with_help("only entity or embeddable typed paths can be navigated further"),
            PathError::UnknownAttribute { declaring_type, .. } => diag.with_label(
                DiagLabel::primary(span, format!("not an attribute of '{declaring_type}'")),
            ),
            PathError::UnknownType { .. } => {
                diag.with_label(DiagLabel::primary(span, "undefined type"))
            }
            PathError::AttributeKindMismatch { expected, .. } => diag
                .with_label(DiagLabel::primary(span, format!("expected a {expected} attribute"))),
            PathError::UnsupportedJoinType { .. } => diag
                .with_label(DiagLabel::primary(span, "unsupported join type"))
                .with_help("use an inner or left join"),
            PathError::BasicPathUsage { .. } => diag
                .with_label(DiagLabel::primary(span, "basic attribute"))
                .with_help("navigate basic attributes with `get` instead of joining them"),
            PathError::FetchFromCorrelation { .. } => diag
                .with_label(DiagLabel::primary(span, "fetch inside a correlated sub-query"))
                .with_note("fetches only apply to the top-level query result"),
            PathError::NotCorrelated { .. } => {
                diag.with_label(DiagLabel::primary(span, "not correlated"))
            }
            PathError::AttributeOwnerMismatch { source_type, .. } => diag.with_label(
                DiagLabel::primary(span, format!("not declared by '{source_type}'")),
            ),
            PathError::CorrelatedAlias { .. } => diag
                .with_label(DiagLabel::primary(span, "correlated node"))
                .with_help("assign the alias to the correlation parent instead"),
        }
    }
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::Dereference { path, attribute } => {
                write!(f, "Cannot dereference '{attribute}' from basic path '{path}'")
            }
            PathError::UnknownAttribute {
                declaring_type,
                attribute,
            } => write!(
                f,
                "Unable to locate attribute '{attribute}' on type '{declaring_type}'"
            ),
            PathError::UnknownType { name } => write!(f, "Type '{name}' not found"),
            PathError::AttributeKindMismatch {
                attribute,
                expected,
                actual,
            } => write!(
                f,
                "Attribute '{attribute}' is a {actual} attribute, expected a {expected} attribute"
            ),
            PathError::UnsupportedJoinType { join_type } => {
                write!(f, "{join_type} joins are not supported")
            }
            PathError::BasicPathUsage { path, attribute } => write!(
                f,
                "Cannot join to basic attribute '{attribute}' of '{path}'"
            ),
            PathError::FetchFromCorrelation { path, attribute } => write!(
                f,
                "Cannot fetch '{attribute}' from correlated path '{path}'"
            ),
            PathError::NotCorrelated { path } => write!(f, "Path '{path}' is not correlated"),
            PathError::AttributeOwnerMismatch {
                attribute,
                declaring_type,
                source_type,
            } => write!(
                f,
                "Attribute '{declaring_type}.{attribute}' cannot be used from type '{source_type}'"
            ),
            PathError::CorrelatedAlias { path } => write!(
                f,
                "Cannot assign an alias to correlated path '{path}'"
            ),
        }
    }
}

impl std::error::Error for PathError {}
