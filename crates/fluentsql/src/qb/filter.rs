//! Filter algebra for WHERE / HAVING / JOIN ON predicates.
//!
//! Leaves are accumulated in a [`Filters`] group and AND-ed together. Groups
//! and trees combine with `not` / `and` / `or` into an immutable [`Filter`]
//! tree. Nodes are reference-counted, so a filter can be reused in several
//! combinations (or statements) without copying; nothing is ever mutated after
//! construction, which keeps the tree acyclic.
//!
//! ```ignore
//! let u = Table::aliased("users", "u");
//! let active = Filters::new().add_on(&u, "status", Op::Eq, "active");
//! let staff = Filters::new().add_on(&u, "role", Op::In, Value::list(["admin", "ops"]));
//! let f = active.or(staff).not();
//! ```

use crate::qb::table::Table;
use crate::value::Value;
use std::ops::{BitAnd, BitOr, Not};
use std::sync::Arc;

/// Comparison operator of a predicate leaf.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    /// Literal list membership; the value is rendered inline.
    In,
    /// Contains-match; the value is wrapped in `%...%` by the dialect.
    Like,
}

impl Op {
    pub fn as_sql(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "<>",
            Op::Lt => "<",
            Op::Gt => ">",
            Op::Lte => "<=",
            Op::Gte => ">=",
            Op::In => "IN",
            Op::Like => "LIKE",
        }
    }
}

/// An atomic predicate.
#[derive(Clone, Debug, PartialEq)]
pub enum Leaf {
    /// `[table.]column op value`
    Column {
        table: Option<Table>,
        column: String,
        op: Op,
        value: Value,
    },
    /// `left.left_column op right.right_column`, for JOIN conditions.
    Columns {
        left: Table,
        left_column: String,
        op: Op,
        right: Table,
        right_column: String,
    },
    /// Raw SQL emitted verbatim.
    Expr(String),
}

/// A group of leaves joined with AND.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filters {
    leaves: Vec<Leaf>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, leaf: Leaf) -> Self {
        self.leaves.push(leaf);
        self
    }

    /// Equality against an unqualified column.
    pub fn eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.add(column, Op::Eq, value)
    }

    /// Leaf with an explicit operator against an unqualified column.
    pub fn add(self, column: &str, op: Op, value: impl Into<Value>) -> Self {
        self.push(Leaf::Column {
            table: None,
            column: column.to_string(),
            op,
            value: value.into(),
        })
    }

    /// Leaf against a column qualified by `table`.
    pub fn add_on(self, table: &Table, column: &str, op: Op, value: impl Into<Value>) -> Self {
        self.push(Leaf::Column {
            table: Some(table.clone()),
            column: column.to_string(),
            op,
            value: value.into(),
        })
    }

    /// Two-column leaf, normally a JOIN condition.
    ///
    /// `Op::In` and `Op::Like` are rejected when the statement is compiled.
    pub fn on(self, left: &Table, left_column: &str, op: Op, right: &Table, right_column: &str) -> Self {
        self.push(Leaf::Columns {
            left: left.clone(),
            left_column: left_column.to_string(),
            op,
            right: right.clone(),
            right_column: right_column.to_string(),
        })
    }

    /// Raw SQL leaf (trusted input).
    pub fn expr(self, sql: impl Into<String>) -> Self {
        self.push(Leaf::Expr(sql.into()))
    }

    pub fn ne(self, column: &str, value: impl Into<Value>) -> Self {
        self.add(column, Op::Ne, value)
    }

    pub fn lt(self, column: &str, value: impl Into<Value>) -> Self {
        self.add(column, Op::Lt, value)
    }

    pub fn gt(self, column: &str, value: impl Into<Value>) -> Self {
        self.add(column, Op::Gt, value)
    }

    pub fn lte(self, column: &str, value: impl Into<Value>) -> Self {
        self.add(column, Op::Lte, value)
    }

    pub fn gte(self, column: &str, value: impl Into<Value>) -> Self {
        self.add(column, Op::Gte, value)
    }

    pub fn like(self, column: &str, value: impl Into<Value>) -> Self {
        self.add(column, Op::Like, value)
    }

    /// `column IN (v1, v2, ...)`, rendered as literals.
    pub fn in_list<I, T>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.add(column, Op::In, Value::list(values))
    }

    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// `NOT(<self>)`
    pub fn not(self) -> Filter {
        Filter::from(self).not()
    }

    /// `(<self>) AND (<other>)`
    pub fn and(self, other: impl Into<Filter>) -> Filter {
        Filter::from(self).and(other)
    }

    /// `(<self>) OR (<other>)`
    pub fn or(self, other: impl Into<Filter>) -> Filter {
        Filter::from(self).or(other)
    }
}

/// Node of an immutable filter tree.
#[derive(Debug, PartialEq)]
pub enum Node {
    Leaves(Vec<Leaf>),
    Not(Filter),
    And(Filter, Filter),
    Or(Filter, Filter),
}

/// Shared handle to an immutable filter tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Filter(Arc<Node>);

impl Filter {
    fn new(node: Node) -> Self {
        Filter(Arc::new(node))
    }

    pub fn node(&self) -> &Node {
        &self.0
    }

    /// True for a leaf group with no leaves.
    pub fn is_empty(&self) -> bool {
        matches!(self.node(), Node::Leaves(leaves) if leaves.is_empty())
    }

    /// `NOT(<self>)`
    pub fn not(self) -> Filter {
        Filter::new(Node::Not(self))
    }

    /// `(<self>) AND (<other>)`
    pub fn and(self, other: impl Into<Filter>) -> Filter {
        Filter::new(Node::And(self, other.into()))
    }

    /// `(<self>) OR (<other>)`
    pub fn or(self, other: impl Into<Filter>) -> Filter {
        Filter::new(Node::Or(self, other.into()))
    }
}

impl From<Filters> for Filter {
    fn from(filters: Filters) -> Self {
        Filter::new(Node::Leaves(filters.leaves))
    }
}

impl Not for Filter {
    type Output = Filter;

    fn not(self) -> Filter {
        Filter::not(self)
    }
}

impl<F: Into<Filter>> BitAnd<F> for Filter {
    type Output = Filter;

    fn bitand(self, rhs: F) -> Filter {
        self.and(rhs)
    }
}

impl<F: Into<Filter>> BitOr<F> for Filter {
    type Output = Filter;

    fn bitor(self, rhs: F) -> Filter {
        self.or(rhs)
    }
}
