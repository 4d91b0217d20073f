//! Schema lattice over JSON example values.
//!
//! Every example value is classified into a closed set of shapes, and the
//! shapes of several values are combined with an intersection (meet). The
//! resulting schema drives the rule generator in [`rules`], which lists the
//! operators that are type-correct on a value of that shape.
//!
//! Lattice facts the search relies on:
//! - `Any` is the identity of intersection; `None` absorbs everything.
//! - Intersection never mutates an operand; it always builds a new schema.
//! - Dict-ness, not key overlap, decides whether two dicts meet to `None`.
pub mod rules;

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

pub use rules::Rule;

// ------------------------------- Schema ---------------------------------- //

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Schema {
    /// Empty set: heterogeneous evidence, floats, null.
    None,
    /// No evidence yet (empty collections).
    #[default]
    Any,
    Bool,
    Int,
    Str,
    List {
        elem: Box<Schema>,
    },
    Dict {
        fields: IndexMap<String, Schema>,
        /// Meet of every field schema; the element type of `.[]` over the dict.
        values: Box<Schema>,
    },
}

impl Schema {
    pub fn list(elem: Schema) -> Self {
        Schema::List { elem: Box::new(elem) }
    }

    pub fn dict(fields: IndexMap<String, Schema>) -> Self {
        let values = meet_all(fields.values().cloned());
        Schema::Dict { fields, values: Box::new(values) }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Schema::None)
    }

    /// Classify a single value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Bool(_) => Schema::Bool,
            Value::Number(n) if n.is_i64() || n.is_u64() => Schema::Int,
            Value::Number(_) => Schema::None,
            Value::String(_) => Schema::Str,
            Value::Array(xs) => Schema::list(meet_all(xs.iter().map(Schema::of))),
            Value::Object(map) => observe_object(map),
            Value::Null => Schema::None,
        }
    }

    /// Common schema of all given values; `Any` when there are none.
    pub fn common<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a Value>,
    {
        meet_all(values.into_iter().map(Schema::of))
    }

    /// Meet (⊓) of two schemas.
    pub fn intersect(&self, other: &Schema) -> Schema {
        match (self, other) {
            (Schema::Any, x) | (x, Schema::Any) => x.clone(),
            (Schema::None, _) | (_, Schema::None) => Schema::None,
            (Schema::Bool, Schema::Bool) => Schema::Bool,
            (Schema::Int, Schema::Int) => Schema::Int,
            (Schema::Str, Schema::Str) => Schema::Str,
            (Schema::List { elem: a }, Schema::List { elem: b }) => Schema::list(a.intersect(b)),
            (
                Schema::Dict { fields: fa, values: va },
                Schema::Dict { fields: fb, values: vb },
            ) => {
                let fields = fa
                    .iter()
                    .filter_map(|(k, sa)| fb.get(k).map(|sb| (k.clone(), sa.intersect(sb))))
                    .collect();
                Schema::Dict { fields, values: Box::new(va.intersect(vb)) }
            }
            _ => Schema::None,
        }
    }
}

fn observe_object(map: &Map<String, Value>) -> Schema {
    let fields = map
        .iter()
        .map(|(k, v)| (k.clone(), Schema::of(v)))
        .collect::<IndexMap<_, _>>();
    Schema::dict(fields)
}

/// Fold intersection seeded with `Any`.
pub fn meet_all<I>(schemas: I) -> Schema
where
    I: IntoIterator<Item = Schema>,
{
    schemas
        .into_iter()
        .fold(Schema::Any, |acc, s| acc.intersect(&s))
}

// ------------------------------- Display --------------------------------- //

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::None => write!(f, "None"),
            Schema::Any => write!(f, "Any"),
            Schema::Bool => write!(f, "Bool"),
            Schema::Int => write!(f, "Int"),
            Schema::Str => write!(f, "Str"),
            Schema::List { elem } => write!(f, "List[{elem}]"),
            Schema::Dict { fields, values } => {
                write!(f, "Dict{{")?;
                for (i, (k, s)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {s}")?;
                }
                write!(f, "}}{{{values}}}")
            }
        }
    }
}

// ------------------------------- Tests ------------------------------------ //
