//! Programming-by-example for a small jq subset.
//!
//! Give input/output examples (and optionally constants for `select`), get
//! back the first pipeline over `.k`, `.[]`, `keys`, `sort`, `sort_by`,
//! `group_by`, `select`, `all` and `any` that reproduces every example. When
//! no pipeline fits and the outputs are records, the record is assembled one
//! field at a time.
//!
//! ```no_run
//! use jq_synth::{synthesize, Example};
//! use serde_json::json;
//!
//! let examples = vec![Example::new(json!({"a": 1, "b": 2}), vec![json!(1), json!(2)])];
//! assert_eq!(synthesize(&examples, &[], 3).unwrap(), ".[]");
//! ```
pub mod config;
pub mod document;
pub mod error;
pub mod expr;
pub mod jq_exec;
pub mod logging;
pub mod path_de;
pub mod schema;
pub mod search;
pub mod spec;
pub mod synth;

pub use config::{ScorePolicy, SynthConfig};
pub use document::Document;
pub use error::{DocumentError, SynthError};
pub use expr::{Expr, Operator, Predicate, Program};
pub use jq_exec::{Jaq, Oracle};
pub use schema::Schema;
pub use spec::{Example, Literal, Spec, Verdict};
pub use synth::{synthesize, synthesize_many, Synthesizer};
