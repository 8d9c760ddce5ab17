//! Textual query fragments over the path graph.
//!
//! Rendering is where aliases get fixed: every from node reached is passed
//! through [`QueryAst::prepare_alias`] with the renderer's generator, in the
//! order the fragments are produced.

use crate::ast::{
    AliasGenerator, FromId, JoinId, JoinType, ListIndex, MapEntry, PathId, QueryAst, Registration,
    SubqueryId,
};
use log::trace;

/// Renders fragments of one query, owning its alias sequence.
pub struct Renderer<'a> {
    ast: &'a mut QueryAst,
    aliases: AliasGenerator,
}

impl<'a> Renderer<'a> {
    /// Creates a renderer using the graph's configured alias prefix.
    pub fn new(ast: &'a mut QueryAst) -> Self {
        let aliases = ast.alias_generator();
        Self { ast, aliases }
    }

    /// Creates a renderer continuing an existing alias sequence.
    pub fn with_aliases(ast: &'a mut QueryAst, aliases: AliasGenerator) -> Self {
        Self { ast, aliases }
    }

    /// Hands back the alias sequence, e.g. to continue in a sub-query.
    pub fn into_aliases(self) -> AliasGenerator {
        self.aliases
    }

    /// Alias of `from`, assigning it if this is its first render.
    pub fn alias(&mut self, from: impl Into<FromId>) -> String {
        self.ast.prepare_alias(from, &mut self.aliases).to_string()
    }

    /// `alias` for roots and joins, `source.attribute` for attribute paths,
    /// `key(alias)` for map keys.
    pub fn render_path(&mut self, path: impl Into<PathId>) -> String {
        let path = path.into();
        if let Some(from) = self.ast.as_from(path) {
            return self.alias(from);
        }
        let source = self.ast.source(path);
        if let (Some(source), None) = (source, self.ast.attribute(path)) {
            // Map key: its source is the map join.
            return format!("key({})", self.render_path(source));
        }
        let name = self
            .ast
            .attribute(path)
            .map(|attribute| attribute.name.clone())
            .unwrap_or_default();
        match source {
            Some(source) => format!("{}.{name}", self.render_path(source)),
            None => name.to_string(),
        }
    }

    /// `entry(alias)` of a map join.
    pub fn render_entry(&mut self, entry: MapEntry) -> String {
        format!("entry({})", self.alias(entry.join))
    }

    /// `index(alias)` of a list join.
    pub fn render_index(&mut self, index: ListIndex) -> String {
        format!("index({})", self.alias(index.join))
    }

    /// From clause of the top-level query: every root, then its joins and
    /// fetches depth-first in insertion order.
    pub fn render_from_clause(&mut self) -> String {
        let roots = self.ast.roots().to_vec();
        let mut out = String::from("from ");
        for (i, root) in roots.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let entity = self.ast.node_type(*root).to_string();
            let alias = self.alias(*root);
            out.push_str(&format!("{entity} as {alias}"));
        }
        for root in roots {
            self.render_joins_of(root, &mut out);
        }
        trace!("rendered {out}");
        out
    }

    /// Joins made under the correlation delegates of `subquery`. The
    /// delegates themselves render as their parents' aliases.
    pub fn render_correlated_joins(&mut self, subquery: SubqueryId) -> String {
        let delegates = self.ast.correlations(subquery).to_vec();
        let mut out = String::new();
        for delegate in delegates {
            self.render_joins_of(delegate, &mut out);
        }
        out.trim_start().to_string()
    }

    fn render_joins_of(&mut self, from: FromId, out: &mut String) {
        let joins = self.ast.joins(from).to_vec();
        let fetches = self.ast.fetches(from).to_vec();
        for join in joins.into_iter().chain(fetches) {
            self.render_join(from, join, out);
            self.render_joins_of(join.into(), out);
        }
    }

    fn render_join(&mut self, source: FromId, join: JoinId, out: &mut String) {
        let keyword = match self.ast.join_type(join) {
            JoinType::Left => "left join",
            JoinType::Inner | JoinType::Right => "inner join",
        };
        let fetch = match self.ast.registration(join) {
            Registration::Fetch => " fetch",
            Registration::Join => "",
        };
        let source_alias = self.alias(source);
        let name = self
            .ast
            .attribute(join)
            .map(|attribute| attribute.name.clone())
            .unwrap_or_default();
        let alias = self.alias(join);
        out.push_str(&format!(" {keyword}{fetch} {source_alias}.{name} as {alias}"));
    }
}
