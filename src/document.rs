//! Specification documents: examples, optional constants, optional reference
//! expression.
//!
//! ```json
//! {
//!   "examples": [{ "input": {"x": 42}, "output": [{"x": 42}] }],
//!   "constants": [42],
//!   "expression": "select(.x == 42)"
//! }
//! ```
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DocumentError;
use crate::path_de;
use crate::spec::{Example, Literal};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub examples: Vec<Example>,
    #[serde(default)]
    pub constants: Vec<Literal>,
    /// Known answer, used by fixture suites for reporting only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

impl Document {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DocumentError> {
        path_de::from_slice_with_path::<Document>(bytes)?.validated()
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, DocumentError> {
        path_de::from_value_with_path::<Document>(value)?.validated()
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_slice(&bytes)
    }

    fn validated(self) -> Result<Self, DocumentError> {
        if self.examples.is_empty() {
            return Err(DocumentError::NoExamples);
        }
        Ok(self)
    }
}
