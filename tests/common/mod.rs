//! Common test utilities
//!
//! Shared fixtures and assertion helpers for the integration tests.
//!
//! # Fixtures
//! - [`order_ast`] - Empty graph over the order model
//! - [`order_root`] - Graph with a single `Order` root
//!
//! # Diagnostic Helpers
//! - [`format_reports`] - Render a diagnostic against its expression for assertion messages
//! - [`assert_diag_code`] - Assert a diagnostic carries a given code

#![allow(dead_code)]

use query_path::diag::convert_diag_to_report;
use query_path::{Diag, FromId, InMemoryAttributeModel, QueryAst, SourceText};

// ============================================================================
// Fixtures
// ============================================================================

/// Empty graph over the example order model.
pub fn order_ast() -> QueryAst {
    QueryAst::new(InMemoryAttributeModel::example())
}

/// Graph over the example order model with one `Order` root.
pub fn order_root() -> (QueryAst, FromId) {
    let mut ast = order_ast();
    let root = ast.from("Order").expect("Order is an entity in the example model");
    (ast, root)
}

// ============================================================================
// Diagnostic Helpers
// ============================================================================

/// Render a diagnostic against its path expression for assertion messages.
pub fn format_reports(diag: &Diag, expression: &str) -> String {
    let report = convert_diag_to_report(diag, &SourceText::new(expression));
    format!("{report:?}")
}

/// Assert that `diag` carries `code`.
///
/// # Panics
/// Panics with the rendered diagnostic when the code differs.
pub fn assert_diag_code(diag: &Diag, expression: &str, code: &str) {
    assert_eq!(
        diag.code.as_deref(),
        Some(code),
        "unexpected diagnostic for `{expression}`:\n{}",
        format_reports(diag, expression)
    );
}
