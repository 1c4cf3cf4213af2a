use super::ast::{Axis, Expr, Function, LocationPath, NodeTest, Step};
use super::error::QueryError;
use crate::document::node::Node;
use std::cell::{Cell, OnceCell};
use std::collections::{HashMap, HashSet};

/// Caps how many nodes one query may touch across all documents.
#[derive(Debug)]
pub struct TraversalBudget {
    limit: usize,
    visited: Cell<usize>,
}

impl TraversalBudget {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            visited: Cell::new(0),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(usize::MAX)
    }

    /// Number of nodes visited so far.
    pub fn visited(&self) -> usize {
        self.visited.get()
    }

    fn spend(&self, count: usize) -> Result<(), QueryError> {
        let visited = self.visited.get().saturating_add(count);
        self.visited.set(visited);
        if visited > self.limit {
            return Err(QueryError::TraversalLimit { limit: self.limit });
        }
        Ok(())
    }
}

/// A position in the tree: the virtual document node above the root element,
/// or a real node.
#[derive(Debug, Clone, Copy)]
enum Context<'a> {
    Document(&'a Node),
    Node(&'a Node),
}

impl<'a> Context<'a> {
    fn identity(&self) -> (bool, *const Node) {
        match *self {
            Context::Document(root) => (true, root as *const Node),
            Context::Node(node) => (false, node as *const Node),
        }
    }

    fn node(&self) -> Option<&'a Node> {
        match *self {
            Context::Document(_) => None,
            Context::Node(node) => Some(node),
        }
    }

    fn string_value(&self) -> String {
        match self {
            Context::Document(root) | Context::Node(root) => root.text(),
        }
    }
}

/// Predicate values.
#[derive(Debug)]
enum Value {
    /// String-values of a selected node (or attribute) set
    Set(Vec<String>),
    Str(String),
    Bool(bool),
}

impl Value {
    fn truthy(&self) -> bool {
        match self {
            Value::Set(items) => !items.is_empty(),
            Value::Str(s) => !s.is_empty(),
            Value::Bool(b) => *b,
        }
    }

    fn into_string(self) -> String {
        match self {
            Value::Set(items) => items.into_iter().next().unwrap_or_default(),
            Value::Str(s) => s,
            Value::Bool(b) => b.to_string(),
        }
    }
}

/// Evaluates parsed paths against one document tree.
pub struct Evaluator<'a, 'b> {
    root: &'a Node,
    budget: &'b TraversalBudget,
    /// Pre-order position of every node under `root`, built on first use
    order: OnceCell<HashMap<*const Node, usize>>,
}

impl<'a, 'b> Evaluator<'a, 'b> {
    /// Creates an evaluator for the tree under `root`.
    ///
    /// Absolute paths start at a virtual document node whose only child is `root`.
    pub fn new(root: &'a Node, budget: &'b TraversalBudget) -> Self {
        Evaluator {
            root,
            budget,
            order: OnceCell::new(),
        }
    }

    /// Evaluates a path from the document node and returns matching nodes in
    /// document order.
    ///
    /// A bare `/` selects the document node, which is returned as the root
    /// element.
    pub fn select(&self, path: &LocationPath) -> Result<Vec<&'a Node>, QueryError> {
        self.select_from(path, Context::Document(self.root))
    }

    /// Evaluates a path with `node` as the context node.
    pub fn select_at(&self, path: &LocationPath, node: &'a Node) -> Result<Vec<&'a Node>, QueryError> {
        self.select_from(path, Context::Node(node))
    }

    fn select_from(&self, path: &LocationPath, context: Context<'a>) -> Result<Vec<&'a Node>, QueryError> {
        Ok(self
            .evaluate_path(path, context)?
            .into_iter()
            .map(|ctx| match ctx {
                Context::Document(root) => root,
                Context::Node(node) => node,
            })
            .collect())
    }

    fn evaluate_path(&self, path: &LocationPath, context: Context<'a>) -> Result<Vec<Context<'a>>, QueryError> {
        let mut current = if path.absolute {
            vec![Context::Document(self.root)]
        } else {
            vec![context]
        };

        for step in &path.steps {
            let mut next = Vec::new();
            let mut seen = HashSet::new();
            for ctx in &current {
                for candidate in self.evaluate_step(step, *ctx)? {
                    if seen.insert(candidate.identity()) {
                        next.push(candidate);
                    }
                }
            }
            // nested contexts can yield their matches out of document order
            if current.len() > 1 {
                next.sort_by_key(|ctx| self.position(*ctx));
            }
            current = next;
        }

        Ok(current)
    }

    /// Document-order rank of a context; the document node comes first.
    fn position(&self, context: Context<'a>) -> usize {
        match context {
            Context::Document(_) => 0,
            Context::Node(node) => {
                let order = self.order.get_or_init(|| {
                    let mut nodes = Vec::new();
                    preorder(self.root, &mut nodes);
                    nodes
                        .iter()
                        .enumerate()
                        .filter_map(|(index, ctx)| Some((ctx.node()? as *const Node, index + 1)))
                        .collect()
                });
                order.get(&(node as *const Node)).copied().unwrap_or(usize::MAX)
            }
        }
    }

    fn evaluate_step(&self, step: &Step, context: Context<'a>) -> Result<Vec<Context<'a>>, QueryError> {
        let candidates = self.axis(step.axis, context);
        self.budget.spend(candidates.len())?;

        let mut results = Vec::new();
        for candidate in candidates {
            if !Self::node_test(&step.test, candidate) {
                continue;
            }
            let mut keep = true;
            for predicate in &step.predicates {
                if !self.evaluate_expr(predicate, candidate)?.truthy() {
                    keep = false;
                    break;
                }
            }
            if keep {
                results.push(candidate);
            }
        }
        Ok(results)
    }

    fn axis(&self, axis: Axis, context: Context<'a>) -> Vec<Context<'a>> {
        match (axis, context) {
            (Axis::SelfNode, ctx) => vec![ctx],
            (Axis::Child, Context::Document(root)) => vec![Context::Node(root)],
            (Axis::Child, Context::Node(node)) => {
                node.children().iter().map(Context::Node).collect()
            }
            (Axis::Descendant, Context::Document(root)) => {
                let mut out = Vec::new();
                preorder(root, &mut out);
                out
            }
            (Axis::Descendant, Context::Node(node)) => {
                let mut out = Vec::new();
                for child in node.children() {
                    preorder(child, &mut out);
                }
                out
            }
        }
    }

    fn node_test(test: &NodeTest, context: Context<'a>) -> bool {
        match (test, context) {
            (NodeTest::Any, _) => true,
            (_, Context::Document(_)) => false,
            (NodeTest::Name(name), Context::Node(node)) => node.tag() == Some(name.as_str()),
            (NodeTest::Wildcard, Context::Node(node)) => node.is_element(),
            (NodeTest::Text, Context::Node(node)) => !node.is_element(),
        }
    }

    fn evaluate_expr(&self, expr: &Expr, context: Context<'a>) -> Result<Value, QueryError> {
        let value = match expr {
            Expr::Literal(s) => Value::Str(s.clone()),
            Expr::Attribute(name) => Value::Set(
                context
                    .node()
                    .and_then(|node| node.attribute(name))
                    .map(|v| vec![v.to_string()])
                    .unwrap_or_default(),
            ),
            Expr::Path(path, attribute) => {
                let selected = self.evaluate_path(path, context)?;
                let values = match attribute {
                    Some(name) => selected
                        .iter()
                        .filter_map(|ctx| ctx.node()?.attribute(name))
                        .map(str::to_string)
                        .collect(),
                    None => selected.iter().map(Context::string_value).collect(),
                };
                Value::Set(values)
            }
            Expr::Call(Function::Translate(value, from, to)) => {
                let value = self.evaluate_expr(value, context)?.into_string();
                let from = self.evaluate_expr(from, context)?.into_string();
                let to = self.evaluate_expr(to, context)?.into_string();
                Value::Str(translate(&value, &from, &to))
            }
            Expr::Call(Function::Contains(haystack, needle)) => {
                let haystack = self.evaluate_expr(haystack, context)?.into_string();
                let needle = self.evaluate_expr(needle, context)?.into_string();
                Value::Bool(haystack.contains(&needle))
            }
            Expr::Call(Function::Not(inner)) => {
                Value::Bool(!self.evaluate_expr(inner, context)?.truthy())
            }
            Expr::Equals(left, right) | Expr::NotEquals(left, right) => {
                let equal = matches!(expr, Expr::Equals(..));
                let left = self.evaluate_expr(left, context)?;
                let right = self.evaluate_expr(right, context)?;
                Value::Bool(compare(&left, &right, equal))
            }
            Expr::And(left, right) => Value::Bool(
                self.evaluate_expr(left, context)?.truthy()
                    && self.evaluate_expr(right, context)?.truthy(),
            ),
            Expr::Or(left, right) => Value::Bool(
                self.evaluate_expr(left, context)?.truthy()
                    || self.evaluate_expr(right, context)?.truthy(),
            ),
        };
        Ok(value)
    }
}

/// Collects `node` and its descendants in document order.
fn preorder<'a>(node: &'a Node, out: &mut Vec<Context<'a>>) {
    out.push(Context::Node(node));
    for child in node.children() {
        preorder(child, out);
    }
}

/// Node-set comparison: a set matches when any member satisfies the test.
fn compare(left: &Value, right: &Value, equal: bool) -> bool {
    match (left, right) {
        (Value::Bool(l), r) => (*l == r.truthy()) == equal,
        (l, Value::Bool(r)) => (l.truthy() == *r) == equal,
        (Value::Set(ls), Value::Set(rs)) => ls
            .iter()
            .any(|l| rs.iter().any(|r| (l == r) == equal)),
        (Value::Set(items), Value::Str(s)) | (Value::Str(s), Value::Set(items)) => {
            items.iter().any(|item| (item == s) == equal)
        }
        (Value::Str(l), Value::Str(r)) => (l == r) == equal,
    }
}

/// Replaces each character of `value` found in `from` with the character at
/// the same position in `to`, dropping it when `to` is shorter.
pub fn translate(value: &str, from: &str, to: &str) -> String {
    let from: Vec<char> = from.chars().collect();
    let to: Vec<char> = to.chars().collect();
    value
        .chars()
        .filter_map(|ch| match from.iter().position(|&f| f == ch) {
            Some(index) => to.get(index).copied(),
            None => Some(ch),
        })
        .collect()
}
