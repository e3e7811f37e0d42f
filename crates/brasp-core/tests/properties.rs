//! Property tests over arbitrary words.

use brasp_core::{execute, Operation, Program, Value};
use quickcheck_macros::quickcheck;

fn word(chars: &[char]) -> Vec<String> {
    chars.iter().map(|c| c.to_string()).collect()
}

#[quickcheck]
fn initial_marks_exactly_matching_positions(chars: Vec<char>, symbol: char) -> bool {
    let program = Program::new().with(Operation::initial(&symbol.to_string()).unwrap());
    let traces = execute(&program, &word(&chars)).unwrap();
    let name = format!("Q_{}", symbol);

    traces
        .get(&name)
        .unwrap()
        .iter()
        .zip(&chars)
        .all(|(value, c)| *value == Value::Num(if *c == symbol { 1.0 } else { 0.0 }))
}

#[quickcheck]
fn every_trace_has_input_length(chars: Vec<char>) -> bool {
    let program = Program::new()
        .with(Operation::initial("a").unwrap())
        .with(Operation::boolean("not_a", "not Q_a(i)").unwrap())
        .with(Operation::attention("prev_a", "rightmost", "j<i", "Q_a(j)", "i - j", "0").unwrap());
    let traces = execute(&program, &word(&chars)).unwrap();

    traces.len() == 3 && traces.iter().all(|(_, trace)| trace.len() == chars.len())
}

#[quickcheck]
fn strict_past_mask_never_reads_current_position(chars: Vec<char>) -> bool {
    // leftmost admitted partner is always j = 0
    let program = Program::new()
        .with(Operation::initial("a").unwrap())
        .with(Operation::attention("back", "leftmost", "j<i", "1", "i - j", "0").unwrap());
    let traces = execute(&program, &word(&chars)).unwrap();

    traces
        .get("back")
        .unwrap()
        .iter()
        .enumerate()
        .all(|(i, v)| if i == 0 { *v == Value::Num(0.0) } else { *v == Value::Num(i as f64) })
}
