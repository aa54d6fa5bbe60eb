//! Column resolution: map a table's columns to (source, target).
//!
//! Matchers are evaluated in fixed priority order; the positional fallback
//! guarantees resolution never fails for shape reasons alone. Only a table
//! with fewer than two columns is unresolvable.

use crate::error::{LinkgraphError, Result};

/// Resolved source/target column positions plus the schema that matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub source: usize,
    pub target: usize,
    pub schema: &'static str,
}

/// Trait for schema matchers. A matcher is a pure predicate-plus-mapper
/// over the column names.
trait SchemaMatcher {
    fn name(&self) -> &'static str;

    /// Return the (source, target) column positions if this schema applies.
    fn resolve(&self, columns: &[String]) -> Option<(usize, usize)>;
}

/// Biological-interaction exports name their endpoints `Official Symbol`
/// and `Chemical Name`. Matching is exact and case-sensitive.
struct BiologicalMatcher;

impl SchemaMatcher for BiologicalMatcher {
    fn name(&self) -> &'static str {
        "biological_interaction"
    }

    fn resolve(&self, columns: &[String]) -> Option<(usize, usize)> {
        let source = columns.iter().position(|c| c == "Official Symbol")?;
        let target = columns.iter().position(|c| c == "Chemical Name")?;
        Some((source, target))
    }
}

/// Generic `Source`/`Target` edge lists. Exact, case-sensitive names.
struct SourceTargetMatcher;

impl SchemaMatcher for SourceTargetMatcher {
    fn name(&self) -> &'static str {
        "source_target"
    }

    fn resolve(&self, columns: &[String]) -> Option<(usize, usize)> {
        let source = columns.iter().position(|c| c == "Source")?;
        let target = columns.iter().position(|c| c == "Target")?;
        Some((source, target))
    }
}

/// Total fallback: the first two columns are source and target, whatever
/// their names.
struct PositionalMatcher;

impl SchemaMatcher for PositionalMatcher {
    fn name(&self) -> &'static str {
        "positional"
    }

    fn resolve(&self, columns: &[String]) -> Option<(usize, usize)> {
        if columns.len() >= 2 {
            Some((0, 1))
        } else {
            None
        }
    }
}

/// Registry of schema matchers, evaluated in priority order.
pub struct SchemaRegistry {
    matchers: Vec<Box<dyn SchemaMatcher>>,
}

impl SchemaRegistry {
    /// Create a registry with the built-in matchers in priority order.
    pub fn new() -> Self {
        Self {
            matchers: vec![
                Box::new(BiologicalMatcher),
                Box::new(SourceTargetMatcher),
                Box::new(PositionalMatcher),
            ],
        }
    }

    /// Resolve the source/target columns for the given header row.
    ///
    /// Fails with `MalformedGraphInput` only when the table has fewer than
    /// two columns; any other shape resolves via the positional fallback.
    pub fn resolve(&self, columns: &[String]) -> Result<ColumnMapping> {
        for matcher in &self.matchers {
            if let Some((source, target)) = matcher.resolve(columns) {
                log::debug!("Resolved columns via {} schema", matcher.name());
                return Ok(ColumnMapping {
                    source,
                    target,
                    schema: matcher.name(),
                });
            }
        }
        Err(LinkgraphError::MalformedGraphInput(format!(
            "table has {} column(s); at least two are required",
            columns.len()
        )))
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
