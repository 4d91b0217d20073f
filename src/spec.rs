//! Examples, constant pools and the verifier.
//!
//! A [`Spec`] answers one question for the search: does this candidate
//! reproduce every example, and if not, how far off is it? Distance is the
//! number of scalar leaves of the expected output that the actual output
//! lacks (multiset difference), so partial progress still ranks candidates.
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ScorePolicy;
use crate::expr::Expr;
use crate::jq_exec::Oracle;

// ------------------------------- Literals -------------------------------- //

/// A constant usable in `select(.k == c)`; exactly one kind per literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Int(i) => write!(f, "{i}"),
            Literal::Str(s) => {
                let quoted = serde_json::to_string(s).map_err(|_| fmt::Error)?;
                f.write_str(&quoted)
            }
        }
    }
}

/// Caller-supplied constants partitioned by kind.
#[derive(Debug, Clone, Default)]
pub struct Constants {
    bools: Vec<Literal>,
    ints: Vec<Literal>,
    strs: Vec<Literal>,
}

impl Constants {
    pub fn new(literals: &[Literal]) -> Self {
        let mut out = Self::default();
        for lit in literals {
            let pool = match lit {
                Literal::Bool(_) => &mut out.bools,
                Literal::Int(_) => &mut out.ints,
                Literal::Str(_) => &mut out.strs,
            };
            pool.push(lit.clone());
        }
        out
    }

    pub fn bools(&self) -> impl Iterator<Item = &Literal> {
        self.bools.iter()
    }

    pub fn ints(&self) -> impl Iterator<Item = &Literal> {
        self.ints.iter()
    }

    pub fn strs(&self) -> impl Iterator<Item = &Literal> {
        self.strs.iter()
    }

    pub fn all(&self) -> Vec<Literal> {
        self.bools
            .iter()
            .chain(&self.ints)
            .chain(&self.strs)
            .cloned()
            .collect()
    }
}

// ------------------------------- Examples -------------------------------- //

/// One input value and the stream the expression must produce from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    pub input: Value,
    pub output: Vec<Value>,
}

impl Example {
    pub fn new(input: Value, output: Vec<Value>) -> Self {
        Self { input, output }
    }
}

// ------------------------------- Leaves ---------------------------------- //

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Leaf {
    Bool(bool),
    Int(i128),
    Str(String),
}

/// Multiset of bool/int/string leaves reachable through object values and
/// array elements. Null and floats are not counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeafBag {
    counts: BTreeMap<Leaf, usize>,
}

impl LeafBag {
    pub fn of_stream(values: &[Value]) -> Self {
        let mut bag = Self::default();
        for v in values {
            bag.collect(v);
        }
        bag
    }

    fn collect(&mut self, value: &Value) {
        let leaf = match value {
            Value::Object(map) => {
                map.values().for_each(|v| self.collect(v));
                return;
            }
            Value::Array(xs) => {
                xs.iter().for_each(|v| self.collect(v));
                return;
            }
            Value::Bool(b) => Leaf::Bool(*b),
            Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => Leaf::Int(i as i128),
                (None, Some(u)) => Leaf::Int(u as i128),
                (None, None) => return,
            },
            Value::String(s) => Leaf::Str(s.clone()),
            Value::Null => return,
        };
        *self.counts.entry(leaf).or_insert(0) += 1;
    }

    /// `|self \ other|` as multisets.
    pub fn missing_from(&self, other: &LeafBag) -> usize {
        self.counts
            .iter()
            .map(|(leaf, n)| n.saturating_sub(other.counts.get(leaf).copied().unwrap_or(0)))
            .sum()
    }
}

// ------------------------------- Spec ------------------------------------ //

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Rendered text when every example matched.
    pub matched: Option<String>,
    pub score: usize,
}

impl Verdict {
    pub fn is_match(&self) -> bool {
        self.matched.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Spec {
    examples: Vec<Example>,
    expected_leaves: Vec<LeafBag>,
    constants: Constants,
    policy: ScorePolicy,
}

impl Spec {
    pub fn new(examples: Vec<Example>, constants: &[Literal]) -> Self {
        let expected_leaves = examples
            .iter()
            .map(|ex| LeafBag::of_stream(&ex.output))
            .collect();
        Self {
            examples,
            expected_leaves,
            constants: Constants::new(constants),
            policy: ScorePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ScorePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn constants(&self) -> &Constants {
        &self.constants
    }

    pub fn policy(&self) -> ScorePolicy {
        self.policy
    }

    pub fn verify<O: Oracle>(&self, oracle: &O, expr: &Expr) -> Verdict {
        self.verify_text(oracle, &expr.render())
    }

    /// Run `text` on every example. Oracle failures count as an empty
    /// output stream, never as an error of the call.
    pub fn verify_text<O: Oracle>(&self, oracle: &O, text: &str) -> Verdict {
        let mut score = 0;
        let mut matched = true;

        for (example, expected) in self.examples.iter().zip(&self.expected_leaves) {
            let actual = match oracle.run(text, &example.input) {
                Ok(values) => values,
                Err(error) => {
                    tracing::trace!(filter = text, %error, "oracle rejected candidate");
                    Vec::new()
                }
            };
            if actual == example.output {
                continue;
            }
            matched = false;
            score += expected.missing_from(&LeafBag::of_stream(&actual));
            if self.policy == ScorePolicy::FirstMismatch {
                break;
            }
        }

        if matched {
            Verdict { matched: Some(text.to_string()), score: 0 }
        } else {
            Verdict { matched: None, score }
        }
    }
}

// ------------------------------- Tests ------------------------------------ //
