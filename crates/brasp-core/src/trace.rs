//! Data Model: traces, the trace table and execution reports
use crate::error::BraspError;
use crate::operation::OperationKind;
use crate::scope::Binding;
use brasp_expr::EvalError;
use brasp_expr::Value;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

/// Per-position outputs of one operation, index-aligned with the input.
pub type Trace = Vec<Value>;

/// Traces by operation name, in the order the names were first written.
///
/// Writing a name that is already present replaces its trace in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TraceTable {
    traces: IndexMap<String, Trace>,
}

impl TraceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&[Value]> {
        self.traces.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.traces.contains_key(name)
    }

    /// Store `trace` under `name`, returning the trace it shadowed, if any.
    pub fn insert(&mut self, name: impl Into<String>, trace: Trace) -> Option<Trace> {
        self.traces.insert(name.into(), trace)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.traces.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.traces.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    /// Content hash of the whole table, stable across identical runs.
    pub fn fingerprint(&self) -> String {
        hash_json(self)
    }

    /// Resolve the names `operation` reads against the traces produced so
    /// far. A name with no trace yet fails the operation at position 0.
    pub(crate) fn bind<'t>(
        &'t self,
        operation: &str,
        names: &'t [String],
    ) -> Result<Vec<Binding<'t>>, BraspError> {
        names
            .iter()
            .map(|name| match self.get(name) {
                Some(trace) => Ok((name.as_str(), trace)),
                None => Err(BraspError::evaluation(
                    operation,
                    0,
                    EvalError::UnboundName(name.clone()),
                )),
            })
            .collect()
    }
}

/// Outcome of one `execute_with` call.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub traces: TraceTable,
    /// One entry per operation, in program order.
    pub proofs: Vec<OperationProof>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationProof {
    pub name: String,
    pub kind: OperationKind,
    pub trace_hash: String,
    pub elapsed_us: u64,
}

pub(crate) fn hash_trace(trace: &[Value]) -> String {
    hash_json(&trace)
}

fn hash_json<T: Serialize + ?Sized>(value: &T) -> String {
    let bytes = serde_json::to_vec(value).unwrap_or_default();
    format!("blake3:{}", blake3::hash(&bytes))
}
