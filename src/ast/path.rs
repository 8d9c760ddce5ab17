//! Attribute navigation shared by every node kind.

use super::QueryAst;
use super::handle::PathId;
use super::node::{NodeKind, PathNode};
use crate::error::{PathError, PathResult};
use log::{debug, trace};

impl QueryAst {
    /// Navigates `name` from `path`.
    ///
    /// Singular attributes yield an attribute path, plural ones a value path;
    /// `get` never creates a join. Results are memoized per node, so asking
    /// twice for the same name returns the same handle.
    pub fn get(&mut self, path: impl Into<PathId>, name: &str) -> PathResult<PathId> {
        let path = path.into();
        let node = self.node(path);
        if !node.can_be_dereferenced() {
            return Err(PathError::Dereference {
                path: self.path_identifier(path).into(),
                attribute: name.into(),
            });
        }
        if let Some(&cached) = node.attribute_paths.get(name) {
            trace!("reusing {cached} for {}.{name}", self.path_identifier(path));
            return Ok(cached);
        }

        let attribute = self.model.resolve(&node.node_type, name)?;
        debug!(
            "created {} attribute path {}.{name}",
            attribute.kind,
            self.path_identifier(path)
        );
        let child = self.push_node(PathNode::attribute(path, attribute));
        self.node_mut(path)
            .attribute_paths
            .insert(name.into(), child);
        Ok(child)
    }

    /// Dotted identifier of `path`, for diagnostics and pre-alias keys.
    ///
    /// Roots are named by their explicit alias or entity name; correlated
    /// delegates share their parent's identifier; map keys read `key(...)`.
    pub fn path_identifier(&self, path: impl Into<PathId>) -> String {
        let path = path.into();
        let node = self.node(path);
        if let Some(state) = &node.from {
            if let Some(parent) = state.correlation.parent() {
                return self.path_identifier(parent);
            }
        }

        match &node.kind {
            NodeKind::Root => match node.from.as_ref().and_then(|state| state.alias.as_ref()) {
                Some(alias) => alias.to_string(),
                None => node.node_type.to_string(),
            },
            NodeKind::MapKey(join) => format!("key({})", self.path_identifier(*join)),
            NodeKind::Attribute(attribute) | NodeKind::PluralAttribute(attribute) => {
                self.qualified(node.source, &attribute.name)
            }
            NodeKind::Join(data) => self.qualified(node.source, &data.attribute.name),
        }
    }

    fn qualified(&self, source: Option<PathId>, name: &str) -> String {
        match source {
            Some(source) => format!("{}.{name}", self.path_identifier(source)),
            None => name.to_string(),
        }
    }

    /// False for basic-typed leaves and plural value paths.
    pub fn can_be_dereferenced(&self, path: impl Into<PathId>) -> bool {
        self.node(path.into()).can_be_dereferenced()
    }
}
