//! Lazy alias assignment.
//!
//! Aliases are never assigned when nodes are built. The first render of a
//! from node calls [`QueryAst::prepare_alias`], which draws the next name from
//! the [`AliasGenerator`] threaded through that render, or reuses the
//! correlation parent's alias.

use super::handle::FromId;
use super::{AstConfig, QueryAst};
use crate::error::{PathError, PathResult};
use log::trace;
use smol_str::{SmolStr, format_smolstr};

/// Default prefix of generated aliases.
pub const DEFAULT_ALIAS_PREFIX: &str = "generatedAlias";

/// Sequence of generated aliases: `generatedAlias0`, `generatedAlias1`, ...
#[derive(Debug, Clone)]
pub struct AliasGenerator {
    prefix: SmolStr,
    next: usize,
}

impl AliasGenerator {
    /// Creates a generator using [`DEFAULT_ALIAS_PREFIX`].
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_ALIAS_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<SmolStr>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }

    /// Creates a generator using the configured prefix.
    pub fn from_config(config: &AstConfig) -> Self {
        Self::with_prefix(config.alias_prefix.clone())
    }

    /// Returns the next alias of the sequence.
    pub fn next_alias(&mut self) -> SmolStr {
        let alias = format_smolstr!("{}{}", self.prefix, self.next);
        self.next += 1;
        alias
    }

    /// Number of aliases handed out so far.
    pub fn issued(&self) -> usize {
        self.next
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Moves the sequence forward so it never repeats the first `issued`
    /// aliases.
    pub(crate) fn skip_past(&mut self, issued: usize) {
        self.next = self.next.max(issued);
    }
}

impl Default for AliasGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryAst {
    /// Assigns the alias of `from` if it has none yet and returns it.
    ///
    /// Idempotent. A correlated node never owns an alias: it resolves (and if
    /// needed triggers) its correlation parent's assignment. A generator with
    /// the configured prefix is first moved past every alias this graph has
    /// already handed out, so separate renders never reuse a name.
    pub fn prepare_alias(&mut self, from: impl Into<FromId>, aliases: &mut AliasGenerator) -> SmolStr {
        let from = from.into();
        let state = self.from_state(from);
        if let Some(parent) = state.correlation.parent() {
            return self.prepare_alias(parent, aliases);
        }
        if let Some(alias) = &state.alias {
            return alias.clone();
        }

        if aliases.prefix() == self.config.alias_prefix {
            aliases.skip_past(self.aliases_issued);
            self.aliases_issued = aliases.issued() + 1;
        }
        let alias = aliases.next_alias();
        trace!("assigned alias {alias} to {}", self.path_identifier(from));
        self.from_state_mut(from).alias = Some(alias.clone());
        alias
    }

    /// Effective alias of `from`, if assigned (explicitly or by rendering).
    pub fn alias(&self, from: impl Into<FromId>) -> Option<SmolStr> {
        let state = self.from_state(from.into());
        match state.correlation.parent() {
            Some(parent) => self.alias(parent),
            None => state.alias.clone(),
        }
    }

    /// Assigns an explicit alias, replacing any earlier one.
    ///
    /// Correlated nodes share their parent's alias and refuse their own.
    pub fn set_alias(&mut self, from: impl Into<FromId>, alias: impl Into<SmolStr>) -> PathResult<()> {
        let from = from.into();
        if self.from_state(from).correlation.is_correlated() {
            return Err(PathError::CorrelatedAlias {
                path: self.path_identifier(from).into(),
            });
        }
        self.from_state_mut(from).alias = Some(alias.into());
        Ok(())
    }
}
