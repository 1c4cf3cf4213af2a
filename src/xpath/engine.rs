//! Query evaluation across every document of a snapshot.

use super::ast::LocationPath;
use super::error::QueryError;
use super::evaluator::{Evaluator, TraversalBudget};
use super::parser::Parser;
use crate::document::node::Node;
use crate::document::store::Snapshot;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default cap on nodes visited by a single query.
pub const DEFAULT_MAX_VISITED_NODES: usize = 1_000_000;

/// A node selected by a query, with the id of the document it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<'a> {
    pub document_id: &'a str,
    pub node: &'a Node,
}

/// Evaluates path expressions against a pinned snapshot.
///
/// The engine borrows the snapshot, so a reload that swaps the store's
/// snapshot mid-query cannot change what the engine sees.
pub struct QueryEngine<'a> {
    snapshot: &'a Snapshot,
    max_visited_nodes: usize,
}

impl<'a> QueryEngine<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self {
            snapshot,
            max_visited_nodes: DEFAULT_MAX_VISITED_NODES,
        }
    }

    /// Sets the maximum number of nodes one evaluation may visit.
    pub fn with_traversal_limit(mut self, limit: usize) -> Self {
        self.max_visited_nodes = limit;
        self
    }

    pub fn snapshot(&self) -> &'a Snapshot {
        self.snapshot
    }

    /// Parses and evaluates an expression against every document.
    ///
    /// Matches are concatenated in store order; within a document they keep
    /// traversal order.
    ///
    /// # Errors
    ///
    /// Returns the parser's `QueryError` for malformed expressions, or
    /// `QueryError::TraversalLimit` if the query visits too many nodes.
    pub fn evaluate(&self, expression: &str) -> Result<Vec<Match<'a>>, QueryError> {
        let path = Parser::parse(expression)?;
        self.evaluate_path(&path)
    }

    /// Like [`evaluate`](Self::evaluate), also returning the time spent.
    pub fn evaluate_timed(&self, expression: &str) -> Result<(Vec<Match<'a>>, Duration), QueryError> {
        let started = Instant::now();
        let matches = self.evaluate(expression)?;
        let elapsed = started.elapsed();
        debug!(
            expression,
            matches = matches.len(),
            elapsed_us = elapsed.as_micros() as u64,
            "evaluated query"
        );
        Ok((matches, elapsed))
    }

    /// Evaluates an already parsed path against every document.
    pub fn evaluate_path(&self, path: &LocationPath) -> Result<Vec<Match<'a>>, QueryError> {
        let budget = TraversalBudget::new(self.max_visited_nodes);
        let mut matches = Vec::new();
        for document in self.snapshot.documents() {
            let evaluator = Evaluator::new(document.root(), &budget);
            matches.extend(evaluator.select(path)?.into_iter().map(|node| Match {
                document_id: document.id(),
                node,
            }));
        }
        Ok(matches)
    }

    /// Returns the first match of an expression, if any.
    pub fn first(&self, expression: &str) -> Result<Option<Match<'a>>, QueryError> {
        Ok(self.evaluate(expression)?.into_iter().next())
    }

    /// Evaluates a relative expression with `node` as the context node.
    ///
    /// Absolute expressions treat `node` as the root of its own document.
    pub fn evaluate_at(&self, node: &'a Node, expression: &str) -> Result<Vec<&'a Node>, QueryError> {
        let path = Parser::parse(expression)?;
        self.evaluate_path_at(node, &path)
    }

    pub fn evaluate_path_at(&self, node: &'a Node, path: &LocationPath) -> Result<Vec<&'a Node>, QueryError> {
        let budget = TraversalBudget::new(self.max_visited_nodes);
        Evaluator::new(node, &budget).select_at(path, node)
    }
}

/// Removes repeated nodes (by identity) from a concatenation of query
/// results, keeping the first occurrence of each.
pub fn dedup_matches<'a, I>(matches: I) -> Vec<Match<'a>>
where
    I: IntoIterator<Item = Match<'a>>,
{
    let mut seen = HashSet::new();
    matches
        .into_iter()
        .filter(|m| seen.insert(m.node as *const Node))
        .collect()
}
