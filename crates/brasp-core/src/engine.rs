//! Execution engine: replays a program over an input sequence
//!
//! Operations run strictly in program order. Each one reads the traces of
//! earlier operations by name and writes its own trace under its name.
use crate::attention::AttentionOperation;
use crate::context::{DuplicateNamePolicy, ExecutionContext};
use crate::error::BraspError;
use crate::input::InputSequence;
use crate::operation::{BooleanOperation, InitialOperation, Operation};
use crate::program::Program;
use crate::scope::PositionScope;
use crate::trace::{hash_trace, ExecutionReport, OperationProof, Trace, TraceTable};
use brasp_expr::{evaluate, Value};
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// Run `program` over `input`, returning every operation's trace.
///
/// Fails with [`BraspError::InputError`] unless every element of `input`
/// is a single character, and with [`BraspError::EvaluationError`] if any
/// expression cannot be evaluated; no partial table is returned.
pub fn execute<S: AsRef<str>>(program: &Program, input: &[S]) -> Result<TraceTable, BraspError> {
    let input = InputSequence::from_symbols(input)?;
    execute_with(program, &input, &ExecutionContext::default()).map(|report| report.traces)
}

/// Run `program` over `input` under `ctx`, with per-operation proofs.
pub fn execute_with(
    program: &Program,
    input: &InputSequence,
    ctx: &ExecutionContext,
) -> Result<ExecutionReport, BraspError> {
    if ctx.duplicate_names == DuplicateNamePolicy::Reject {
        if let Some(name) = program.duplicate_names().first() {
            return Err(BraspError::validation(format!(
                "operation name `{}` is used more than once",
                name
            )));
        }
    }

    let started_at = Utc::now();
    info!(
        run_id = %ctx.run_id,
        operations = program.len(),
        input_len = input.len(),
        "executing program"
    );

    let mut traces = TraceTable::new();
    let mut proofs = Vec::with_capacity(program.len());

    for operation in program.operations() {
        let start = Instant::now();
        let output = match operation {
            Operation::Initial(op) => run_initial(op, input),
            Operation::Boolean(op) => run_boolean(op, &traces, input.len())?,
            Operation::Attention(op) => run_attention(op, &traces, input.len())?,
        };
        let elapsed_us = start.elapsed().as_micros() as u64;

        debug!(
            run_id = %ctx.run_id,
            operation = operation.name(),
            kind = %operation.kind(),
            elapsed_us,
            "operation complete"
        );

        proofs.push(OperationProof {
            name: operation.name().to_string(),
            kind: operation.kind(),
            trace_hash: hash_trace(&output),
            elapsed_us,
        });

        if traces.insert(operation.name(), output).is_some() {
            warn!(
                run_id = %ctx.run_id,
                operation = operation.name(),
                "duplicate operation name shadows an earlier trace"
            );
        }
    }

    Ok(ExecutionReport {
        run_id: ctx.run_id.clone(),
        started_at,
        traces,
        proofs,
    })
}

fn run_initial(op: &InitialOperation, input: &InputSequence) -> Trace {
    input
        .symbols()
        .iter()
        .map(|c| Value::Num(if *c == op.symbol() { 1.0 } else { 0.0 }))
        .collect()
}

/// Boolean expressions may also read a called function by its bare name,
/// which resolves at `i`.
fn run_boolean(op: &BooleanOperation, traces: &TraceTable, n: usize) -> Result<Trace, BraspError> {
    if n == 0 {
        return Ok(Vec::new());
    }
    let bindings = traces.bind(op.name(), op.functions())?;
    (0..n)
        .map(|i| {
            let scope = PositionScope::point(i, &bindings).with_bare_names();
            evaluate(op.bound(), &scope).map_err(|e| BraspError::evaluation(op.name(), i, e))
        })
        .collect()
}

/// For each output position `i`: score every partner `j`, fall back to the
/// default when all scores are exactly 0, otherwise read the value at the
/// partner chosen by the tie-break among scores of exactly 1.
///
/// A score that is neither 0 nor 1 blocks the fallback but is never
/// selected; if no score is exactly 1 the partner is `i` itself.
///
/// Only `i`, `j` and the `f@i`/`f@j` forms are in scope; a bare function
/// name is unbound.
fn run_attention(op: &AttentionOperation, traces: &TraceTable, n: usize) -> Result<Trace, BraspError> {
    if n == 0 {
        return Ok(Vec::new());
    }
    let bindings = traces.bind(op.name(), op.functions())?;
    let compiled = op.compiled();
    let mut output = Vec::with_capacity(n);
    let mut scores = Vec::with_capacity(n);

    for i in 0..n {
        let fail = |e| BraspError::evaluation(op.name(), i, e);

        scores.clear();
        for j in 0..n {
            let score = evaluate(&compiled.score, &PositionScope::pair(i, j, &bindings)).map_err(fail)?;
            scores.push(score.as_f64());
        }

        let value = if scores.iter().all(|s| *s == 0.0) {
            trace!(operation = op.name(), position = i, "no partner scored, using default");
            evaluate(&compiled.default, &PositionScope::point(i, &bindings))
        } else {
            let partner = op.tie().select(&scores).unwrap_or(i);
            trace!(operation = op.name(), position = i, partner, "attending");
            evaluate(&compiled.value, &PositionScope::pair(i, partner, &bindings))
        }
        .map_err(fail)?;

        output.push(value);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brasp_expr::EvalError;

    fn nums(values: &[f64]) -> Trace {
        values.iter().copied().map(Value::Num).collect()
    }

    fn run(program: &Program, word: &str) -> Result<TraceTable, BraspError> {
        let input = InputSequence::from_word(word);
        execute_with(program, &input, &ExecutionContext::default()).map(|r| r.traces)
    }

    #[test]
    fn test_initial_detects_symbol() {
        let program = Program::new().with(Operation::initial("a").unwrap());
        let traces = run(&program, "aba").unwrap();
        assert_eq!(traces.get("Q_a").unwrap(), nums(&[1.0, 0.0, 1.0]));
    }

    #[test]
    fn test_boolean_reads_earlier_traces() {
        let program = Program::new()
            .with(Operation::initial("a").unwrap())
            .with(Operation::boolean("shifted", "Q_a(i) + 10 * i").unwrap());
        let traces = run(&program, "ab").unwrap();
        assert_eq!(traces.get("shifted").unwrap(), nums(&[1.0, 10.0]));
    }

    #[test]
    fn test_boolean_keeps_boolean_values() {
        let program = Program::new()
            .with(Operation::initial("a").unwrap())
            .with(Operation::boolean("not_a", "not Q_a(i)").unwrap());
        let traces = run(&program, "ab").unwrap();
        assert_eq!(
            traces.get("not_a").unwrap(),
            [Value::Bool(false), Value::Bool(true)]
        );
    }

    #[test]
    fn test_mid_valued_score_blocks_fallback_without_being_selected() {
        // every partner scores 2: no fallback, no eligible partner, so j = i
        let program = Program::new().with(
            Operation::attention("A", "leftmost", "1", "2", "j * 10", "-1").unwrap(),
        );
        let traces = run(&program, "xyz").unwrap();
        assert_eq!(traces.get("A").unwrap(), nums(&[0.0, 10.0, 20.0]));
    }

    #[test]
    fn test_mask_cannot_be_loosened_by_score() {
        let program = Program::new().with(
            Operation::attention("A", "rightmost", "j<i", "1", "j", "-1").unwrap(),
        );
        let traces = run(&program, "xyz").unwrap();
        assert_eq!(traces.get("A").unwrap(), nums(&[-1.0, 0.0, 1.0]));
    }

    #[test]
    fn test_masked_pairs_are_not_scored() {
        // 1 / (i - j) would divide by zero on the diagonal
        let program = Program::new().with(
            Operation::attention("A", "leftmost", "j<i", "1 / (i - j) == 1", "j", "-1").unwrap(),
        );
        let traces = run(&program, "xyz").unwrap();
        assert_eq!(traces.get("A").unwrap(), nums(&[-1.0, 0.0, 1.0]));
    }

    #[test]
    fn test_bare_name_in_boolean_reads_output_position() {
        let program = Program::new()
            .with(Operation::initial("a").unwrap())
            .with(Operation::boolean("twice", "Q_a(i) + Q_a").unwrap());
        let traces = run(&program, "ab").unwrap();
        assert_eq!(traces.get("twice").unwrap(), nums(&[2.0, 0.0]));
    }

    #[test]
    fn test_bare_name_in_attention_is_unbound() {
        let program = Program::new()
            .with(Operation::initial("a").unwrap())
            .with(Operation::attention("A", "leftmost", "1", "Q_a(j) and Q_a", "j", "-1").unwrap());
        let err = run(&program, "aba").unwrap_err();
        assert_eq!(
            err,
            BraspError::EvaluationError {
                operation: "A".to_string(),
                position: 0,
                source: EvalError::UnboundName("Q_a".to_string()),
            }
        );
    }

    #[test]
    fn test_forward_reference_is_an_evaluation_error() {
        let program = Program::new()
            .with(Operation::boolean("early", "later(i)").unwrap())
            .with(Operation::initial("a").unwrap());
        let err = run(&program, "a").unwrap_err();
        assert_eq!(
            err,
            BraspError::EvaluationError {
                operation: "early".to_string(),
                position: 0,
                source: EvalError::UnboundName("later".to_string()),
            }
        );
    }

    #[test]
    fn test_forward_reference_fails_even_when_short_circuited() {
        let program = Program::new()
            .with(Operation::boolean("early", "1 or later(i)").unwrap())
            .with(Operation::boolean("later", "1").unwrap());
        let err = run(&program, "ab").unwrap_err();
        assert!(matches!(
            err,
            BraspError::EvaluationError { ref operation, position: 0, source: EvalError::UnboundName(ref name) }
                if operation == "early" && name == "later"
        ));
    }

    #[test]
    fn test_forward_reference_fails_even_when_default_is_taken() {
        // score 0 everywhere, so the value expression is never evaluated
        let program = Program::new()
            .with(Operation::attention("A", "leftmost", "1", "0", "missing(j)", "-1").unwrap());
        let err = run(&program, "ab").unwrap_err();
        assert!(matches!(
            err,
            BraspError::EvaluationError { position: 0, source: EvalError::UnboundName(ref name), .. }
                if name == "missing"
        ));
    }

    #[test]
    fn test_empty_input_produces_empty_traces() {
        let program = Program::new()
            .with(Operation::initial("a").unwrap())
            .with(Operation::attention("A", "leftmost", "1", "Q_a(j)", "j", "0").unwrap());
        let traces = run(&program, "").unwrap();
        assert_eq!(traces.len(), 2);
        assert!(traces.get("A").unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_names_shadow_by_default() {
        let program = Program::new()
            .with(Operation::boolean("x", "1").unwrap())
            .with(Operation::boolean("y", "x(i) + 1").unwrap())
            .with(Operation::boolean("x", "5").unwrap());
        let report = execute_with(&program, &"ab".into(), &ExecutionContext::default()).unwrap();

        assert_eq!(report.traces.names().collect::<Vec<_>>(), ["x", "y"]);
        assert_eq!(report.traces.get("x").unwrap(), nums(&[5.0, 5.0]));
        assert_eq!(report.traces.get("y").unwrap(), nums(&[2.0, 2.0]));
        assert_eq!(report.proofs.len(), 3);
    }

    #[test]
    fn test_duplicate_names_can_be_rejected() {
        let program = Program::new()
            .with(Operation::initial("a").unwrap())
            .with(Operation::initial("a").unwrap());
        let ctx = ExecutionContext::new().with_duplicate_names(DuplicateNamePolicy::Reject);
        let err = execute_with(&program, &"a".into(), &ctx).unwrap_err();
        assert!(matches!(err, BraspError::ValidationError(msg) if msg.contains("Q_a")));
    }

    #[test]
    fn test_report_carries_run_id_and_hashes() {
        let program = Program::new().with(Operation::initial("a").unwrap());
        let ctx = ExecutionContext::new().with_run_id("run-1");
        let report = execute_with(&program, &"ab".into(), &ctx).unwrap();

        assert_eq!(report.run_id, "run-1");
        assert_eq!(report.proofs[0].name, "Q_a");
        assert_eq!(report.proofs[0].trace_hash, hash_trace(report.traces.get("Q_a").unwrap()));
    }
}
