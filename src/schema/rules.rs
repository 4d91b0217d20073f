//! Grammar filter: the operators that are legal on a value of a given schema.
//!
//! | operator   | input          | output            |
//! |------------|----------------|-------------------|
//! | `all/any`  | list bool      | bool              |
//! | `.[]`      | list 'a        | 'a                |
//! | `.[]`      | dict v         | v                 |
//! | `group_by` | list dict      | list (list dict)  |
//! | `keys`     | dict           | list str          |
//! | `.k`       | dict           | field k           |
//! | `select`   | dict           | dict              |
//! | `sort`     | list 'a        | list 'a           |
//! | `sort_by`  | list dict      | list dict         |
use super::Schema;
use crate::expr::{Operator, Predicate};
use crate::spec::{Constants, Literal};

/// One legal expansion: append `op`, and the pipeline now yields `output`.
#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    pub op: Operator,
    pub output: Schema,
}

impl Rule {
    fn new(op: Operator, output: Schema) -> Self {
        Self { op, output }
    }
}

impl Schema {
    pub fn rules(&self, constants: &Constants) -> Vec<Rule> {
        match self {
            Schema::Dict { fields, values } => dict_rules(self, fields, values, constants),
            Schema::List { elem } => list_rules(self, elem),
            // `Any` only shows up transiently for empty collections.
            Schema::None | Schema::Any | Schema::Bool | Schema::Int | Schema::Str => Vec::new(),
        }
    }
}

fn dict_rules(
    this: &Schema,
    fields: &indexmap::IndexMap<String, Schema>,
    values: &Schema,
    constants: &Constants,
) -> Vec<Rule> {
    let mut out = Vec::new();

    for (key, field) in fields {
        out.push(Rule::new(Operator::ObjectIndex(key.clone()), field.clone()));

        let select = |lit: &Literal| {
            let pred = Predicate::Equality(key.clone(), lit.clone());
            Rule::new(Operator::Select(pred), this.clone())
        };
        if matches!(field, Schema::Bool | Schema::Any) {
            out.extend(constants.bools().map(select));
        }
        if matches!(field, Schema::Int | Schema::Any) {
            out.extend(constants.ints().map(select));
        }
        if matches!(field, Schema::Str | Schema::Any) {
            out.extend(constants.strs().map(select));
        }
    }

    out.push(Rule::new(Operator::ForEach, values.clone()));
    out.push(Rule::new(Operator::Keys, Schema::list(Schema::Str)));
    out
}

fn list_rules(this: &Schema, elem: &Schema) -> Vec<Rule> {
    let mut out = Vec::new();

    if matches!(elem, Schema::Bool | Schema::Any) {
        out.push(Rule::new(Operator::All, Schema::Bool));
        out.push(Rule::new(Operator::Any, Schema::Bool));
    }

    if let Schema::Dict { fields, .. } = elem {
        for key in fields.keys() {
            out.push(Rule::new(Operator::GroupBy(key.clone()), Schema::list(this.clone())));
            out.push(Rule::new(Operator::SortBy(key.clone()), this.clone()));
        }
    }

    // `sort` maps a list onto itself; the depth bound stops the loop.
    out.push(Rule::new(Operator::ForEach, elem.clone()));
    out.push(Rule::new(Operator::Sort, this.clone()));
    out
}
