//! Dotted path expressions: `lines.product.name`.
//!
//! A path expression is a sequence of attribute names separated by dots.
//! [`QueryAst::navigate`] resolves one with `get`, [`QueryAst::join_path`]
//! joins each segment in turn. Failures are reported as [`Diag`]s labelled at
//! the offending segment.

use crate::ast::{AnyJoin, FromId, JoinType, PathId, QueryAst, Span, Spanned, check_join_target};
use crate::diag::Diag;
use logos::Logos;
use smol_str::SmolStr;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
enum PathToken {
    #[token(".")]
    Dot,

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Identifier,
}

/// Splits a path expression into attribute name segments.
pub fn parse_path_expression(source: &str) -> Result<Vec<Spanned<SmolStr>>, Diag> {
    let mut segments = Vec::new();
    let mut last_dot: Option<Span> = None;
    let mut expect_identifier = true;

    for (token, span) in PathToken::lexer(source).spanned() {
        match token {
            Ok(PathToken::Identifier) if expect_identifier => {
                segments.push(Spanned::new(SmolStr::new(&source[span.clone()]), span));
                expect_identifier = false;
            }
            Ok(PathToken::Identifier) => {
                return Err(Diag::error("expected '.' between attribute names")
                    .with_primary_label(span, "unexpected attribute name")
                    .with_code("path_expr::missing_dot"));
            }
            Ok(PathToken::Dot) if expect_identifier => {
                return Err(Diag::error("expected an attribute name before '.'")
                    .with_primary_label(span, "empty segment")
                    .with_code("path_expr::empty_segment"));
            }
            Ok(PathToken::Dot) => {
                expect_identifier = true;
                last_dot = Some(span);
            }
            Err(()) => {
                return Err(Diag::error(format!(
                    "unexpected character '{}' in path expression",
                    &source[span.clone()]
                ))
                .with_primary_label(span, "not part of an attribute name")
                .with_code("path_expr::unexpected_character"));
            }
        }
    }

    match last_dot {
        _ if segments.is_empty() => Err(Diag::error("empty path expression")
            .with_primary_label(0..source.len(), "no attribute names")
            .with_code("path_expr::empty")),
        Some(dot) if expect_identifier => Err(Diag::error("expected an attribute name after '.'")
            .with_primary_label(dot, "trailing dot")
            .with_code("path_expr::trailing_dot")),
        _ => Ok(segments),
    }
}

impl QueryAst {
    /// Resolves a dotted path expression from `start` with repeated `get`.
    ///
    /// Segments resolved before a failing one stay memoized; no join is
    /// ever created.
    pub fn navigate(&mut self, start: impl Into<PathId>, expression: &str) -> Result<PathId, Diag> {
        let segments = parse_path_expression(expression)?;
        let mut current = start.into();
        for segment in &segments {
            current = self
                .get(current, &segment.node)
                .map_err(|err| err.to_diag(segment.span.clone()))?;
        }
        Ok(current)
    }

    /// Joins every segment of a dotted path expression, each from the join
    /// built for the previous one, and returns the last join.
    ///
    /// The whole chain is checked against the attribute model first, so a
    /// failing expression creates no joins at all.
    pub fn join_path(
        &mut self,
        start: impl Into<FromId>,
        expression: &str,
        join_type: JoinType,
    ) -> Result<AnyJoin, Diag> {
        let start = start.into();
        let segments = parse_path_expression(expression)?;
        self.check_join_chain(start, &segments, join_type)?;

        let mut current = start;
        let mut last = None;
        for segment in &segments {
            let join = self
                .join_with(current, &segment.node, join_type)
                .map_err(|err| err.to_diag(segment.span.clone()))?;
            current = join.into();
            last = Some(join);
        }
        // A parsed expression always has at least one segment.
        last.ok_or_else(|| Diag::error("empty path expression"))
    }

    fn check_join_chain(
        &self,
        start: FromId,
        segments: &[Spanned<SmolStr>],
        join_type: JoinType,
    ) -> Result<(), Diag> {
        let mut path = self.path_identifier(start);
        let mut owner = self.node_type(start).clone();
        let mut joinable = self.can_be_join_source(start);

        for segment in segments {
            let to_diag = |err: crate::error::PathError| err.to_diag(segment.span.clone());
            if !joinable {
                return Err(to_diag(crate::error::PathError::Dereference {
                    path: path.as_str().into(),
                    attribute: segment.node.clone(),
                }));
            }
            let attribute = self
                .model()
                .resolve(&owner, &segment.node)
                .map_err(to_diag)?;
            check_join_target(&path, &attribute, join_type).map_err(to_diag)?;

            joinable = !attribute.is_element_basic();
            owner = attribute.element_type;
            path = format!("{path}.{}", segment.node);
        }
        Ok(())
    }
}
