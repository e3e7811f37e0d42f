//! Program description files.
//!
//! A program file lists operations in execution order:
//!
//! ```yaml
//! name: distance to previous a
//! operations:
//!   - type: initial
//!     symbol: a
//!   - type: attention
//!     name: dist
//!     tie: leftmost
//!     mask: "j<i"
//!     score: Q_a(j)
//!     value: i - j
//!     default: -1
//! ```
//!
//! Expression fields accept any YAML scalar, so `default: -1` and
//! `mask: 1` need no quoting.

use brasp_core::{BraspError, Operation, Program};
use serde::de::{Deserializer, Error as _};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ProgramFileError {
    #[error("PROGRAM/io: {0}")]
    Io(#[from] std::io::Error),

    #[error("PROGRAM/yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("PROGRAM/operation {index}: {source}")]
    Operation {
        index: usize,
        #[source]
        source: BraspError,
    },
}

/// Top-level program file structure
#[derive(Debug, Clone, Deserialize)]
pub struct ProgramFile {
    #[serde(default)]
    pub name: Option<String>,
    pub operations: Vec<OperationSpec>,
}

/// One entry of `operations:`, before validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OperationSpec {
    Initial {
        #[serde(deserialize_with = "scalar")]
        symbol: String,
    },
    Boolean {
        name: String,
        #[serde(deserialize_with = "scalar")]
        expression: String,
    },
    Attention {
        name: String,
        tie: String,
        #[serde(deserialize_with = "scalar")]
        mask: String,
        #[serde(deserialize_with = "scalar")]
        score: String,
        #[serde(deserialize_with = "scalar")]
        value: String,
        #[serde(deserialize_with = "scalar")]
        default: String,
    },
}

impl OperationSpec {
    /// Run the validating constructor for this entry.
    pub fn build(&self) -> Result<Operation, BraspError> {
        match self {
            OperationSpec::Initial { symbol } => Operation::initial(symbol),
            OperationSpec::Boolean { name, expression } => Operation::boolean(name.as_str(), expression),
            OperationSpec::Attention { name, tie, mask, score, value, default } => {
                Operation::attention(name.as_str(), tie, mask, score, value, default)
            }
        }
    }
}

impl ProgramFile {
    pub fn from_yaml(yaml: &str) -> Result<Self, ProgramFileError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Validate every entry, stopping at the first bad one.
    pub fn build(&self) -> Result<Program, ProgramFileError> {
        self.operations
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                spec.build()
                    .map_err(|source| ProgramFileError::Operation { index, source })
            })
            .collect()
    }
}

/// Read, parse and validate the program file at `path`.
pub fn load_program(path: impl AsRef<Path>) -> Result<Program, ProgramFileError> {
    let path = path.as_ref();
    let yaml = std::fs::read_to_string(path)?;
    let file = ProgramFile::from_yaml(&yaml)?;
    let program = file.build()?;
    debug!(
        path = %path.display(),
        name = file.name.as_deref().unwrap_or(""),
        operations = program.len(),
        "loaded program"
    );
    Ok(program)
}

fn scalar<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!("expected a scalar, got {:?}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISTANCE: &str = r#"
name: distance
operations:
  - type: initial
    symbol: a
  - type: attention
    name: dist
    tie: leftmost
    mask: "j<i"
    score: Q_a(j)
    value: i - j
    default: -1
"#;

    #[test]
    fn test_parse_entries() {
        let file = ProgramFile::from_yaml(DISTANCE).unwrap();
        assert_eq!(file.name.as_deref(), Some("distance"));
        assert_eq!(file.operations[0], OperationSpec::Initial { symbol: "a".to_string() });
        assert!(matches!(
            &file.operations[1],
            OperationSpec::Attention { default, .. } if default == "-1"
        ));
    }

    #[test]
    fn test_build_program() {
        let program = ProgramFile::from_yaml(DISTANCE).unwrap().build().unwrap();
        assert_eq!(program.operation_names(), ["Q_a", "dist"]);
    }

    #[test]
    fn test_numeric_scalars_become_expressions() {
        let yaml = r#"
operations:
  - type: attention
    name: any
    tie: rightmost
    mask: 1
    score: 1
    value: j
    default: 0.5
"#;
        let file = ProgramFile::from_yaml(yaml).unwrap();
        let program = file.build().unwrap();
        assert_eq!(
            program.operations()[0].to_string(),
            "any(i) := rightmost [1, 1] j : 0.5"
        );
    }

    #[test]
    fn test_invalid_entry_reports_index() {
        let yaml = r#"
operations:
  - type: initial
    symbol: a
  - type: boolean
    name: bad
    expression: Q_a(i) + k
"#;
        let err = ProgramFile::from_yaml(yaml).unwrap().build().unwrap_err();
        assert!(matches!(
            err,
            ProgramFileError::Operation { index: 1, source: BraspError::ValidationError(_) }
        ));
        assert!(err.to_string().starts_with("PROGRAM/operation 1: VALIDATION/"));
    }

    #[test]
    fn test_unknown_type_is_a_yaml_error() {
        let yaml = "operations:\n  - type: softmax\n    name: x\n";
        assert!(matches!(ProgramFile::from_yaml(yaml), Err(ProgramFileError::Yaml(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = load_program("/nonexistent/program.yaml").unwrap_err();
        assert!(matches!(err, ProgramFileError::Io(_)));
    }
}
