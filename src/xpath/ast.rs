//! Abstract syntax tree types for path expressions.

/// Axis a step moves along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Direct children (`a/b`)
    Child,
    /// All descendants in pre-order (`a//b`)
    Descendant,
    /// The context node itself (`.`)
    SelfNode,
}

/// Which nodes a step keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// Elements with this tag
    Name(String),
    /// Any element (`*`)
    Wildcard,
    /// Text nodes (`text()`)
    Text,
    /// Any node; only produced by `.`
    Any,
}

/// A single location step with its predicates.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub axis: Axis,
    pub test: NodeTest,
    pub predicates: Vec<Expr>,
}

impl Step {
    pub fn new(axis: Axis, test: NodeTest) -> Self {
        Self {
            axis,
            test,
            predicates: Vec::new(),
        }
    }
}

/// A sequence of steps, either rooted at the document or relative to a context.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPath {
    pub absolute: bool,
    pub steps: Vec<Step>,
}

/// Built-in functions usable inside predicates.
#[derive(Debug, Clone, PartialEq)]
pub enum Function {
    /// `translate(value, from, to)`
    Translate(Box<Expr>, Box<Expr>, Box<Expr>),
    /// `contains(haystack, needle)`
    Contains(Box<Expr>, Box<Expr>),
    /// `not(value)`
    Not(Box<Expr>),
}

/// Predicate expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A quoted string
    Literal(String),
    /// `@name` on the context node
    Attribute(String),
    /// A path, optionally ending in an attribute selection (`a/b/@c`)
    Path(LocationPath, Option<String>),
    Call(Function),
    Equals(Box<Expr>, Box<Expr>),
    NotEquals(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}
