// Pipeline AST for the enumerable jq subset, plus its canonical text.
//
// Everything here is plain data: operators carry only what they need to
// render, and extending a pipeline always builds a new one.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::spec::Literal;

static IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    All,
    Any,
    ForEach,
    Keys,
    Sort,
    ObjectIndex(String),
    GroupBy(String),
    SortBy(String),
    Select(Predicate),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Predicate {
    /// `.key == literal`
    Equality(String, Literal),
}

/// Left-to-right pipeline; empty is identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Expr {
    ops: Vec<Operator>,
}

impl Expr {
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn then(&self, op: Operator) -> Self {
        let mut ops = Vec::with_capacity(self.ops.len() + 1);
        ops.extend_from_slice(&self.ops);
        ops.push(op);
        Self { ops }
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl FromIterator<Operator> for Expr {
    fn from_iter<I: IntoIterator<Item = Operator>>(iter: I) -> Self {
        Self { ops: iter.into_iter().collect() }
    }
}

/// A synthesized answer: a pipeline, or a record assembled field by field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Program {
    Pipeline(Expr),
    Record(Vec<(String, Program)>),
}

impl Program {
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl From<Expr> for Program {
    fn from(expr: Expr) -> Self {
        Program::Pipeline(expr)
    }
}

// ------------------------------- Rendering -------------------------------- //

fn write_path(f: &mut fmt::Formatter<'_>, key: &str) -> fmt::Result {
    if IDENT.is_match(key) {
        write!(f, ".{key}")
    } else {
        write!(f, ".{}", Literal::Str(key.to_string()))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::All => write!(f, "all"),
            Operator::Any => write!(f, "any"),
            Operator::ForEach => write!(f, ".[]"),
            Operator::Keys => write!(f, "keys"),
            Operator::Sort => write!(f, "sort"),
            Operator::ObjectIndex(key) => write_path(f, key),
            Operator::GroupBy(key) => {
                write!(f, "group_by(")?;
                write_path(f, key)?;
                write!(f, ")")
            }
            Operator::SortBy(key) => {
                write!(f, "sort_by(")?;
                write_path(f, key)?;
                write!(f, ")")
            }
            Operator::Select(pred) => write!(f, "select({pred})"),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Equality(key, lit) => {
                write_path(f, key)?;
                write!(f, " == {lit}")
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ops.is_empty() {
            return write!(f, ".");
        }
        for (i, op) in self.ops.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{op}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Program::Pipeline(expr) => write!(f, "{expr}"),
            Program::Record(fields) => {
                write!(f, "{{")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    if IDENT.is_match(key) {
                        write!(f, "{key}: ")?;
                    } else {
                        write!(f, "{}: ", Literal::Str(key.clone()))?;
                    }
                    match value {
                        Program::Pipeline(expr) if expr.len() > 1 => write!(f, "({expr})")?,
                        other => write!(f, "{other}")?,
                    }
                }
                write!(f, "}}")
            }
        }
    }
}
