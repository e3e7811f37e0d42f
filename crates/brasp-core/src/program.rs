//! Program: an ordered, mutable list of operations
use crate::engine;
use crate::error::BraspError;
use crate::operation::Operation;
use crate::trace::TraceTable;
use serde::Serialize;

/// Operations run in the order they were added. Names are not required to
/// be unique; see [`DuplicateNamePolicy`](crate::DuplicateNamePolicy).
///
/// A `Program` is a plain owned value. To keep running it while editing,
/// clone it and execute the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Program {
    operations: Vec<Operation>,
}

impl Program {
    /// Create an empty program
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation (builder style)
    pub fn with(mut self, operation: impl Into<Operation>) -> Self {
        self.add(operation);
        self
    }

    pub fn add(&mut self, operation: impl Into<Operation>) {
        self.operations.push(operation.into());
    }

    /// Remove every operation equal to `operation`; returns how many went.
    pub fn remove(&mut self, operation: &Operation) -> usize {
        let before = self.operations.len();
        self.operations.retain(|op| op != operation);
        before - self.operations.len()
    }

    /// Remove every operation called `name`; returns how many went.
    pub fn remove_by_name(&mut self, name: &str) -> usize {
        let before = self.operations.len();
        self.operations.retain(|op| op.name() != name);
        before - self.operations.len()
    }

    pub fn clear(&mut self) {
        self.operations.clear();
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn operation_names(&self) -> Vec<&str> {
        self.operations.iter().map(Operation::name).collect()
    }

    /// The last operation called `name`, i.e. the one whose trace survives.
    pub fn get(&self, name: &str) -> Option<&Operation> {
        self.operations.iter().rev().find(|op| op.name() == name)
    }

    /// Names that appear more than once, in order of first repetition.
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        let mut duplicates: Vec<&str> = Vec::new();
        for name in self.operations.iter().map(Operation::name) {
            if seen.contains(&name) {
                if !duplicates.contains(&name) {
                    duplicates.push(name);
                }
            } else {
                seen.push(name);
            }
        }
        duplicates
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Run this program over `input` with a default context.
    pub fn execute<S: AsRef<str>>(&self, input: &[S]) -> Result<TraceTable, BraspError> {
        engine::execute(self, input)
    }
}

impl FromIterator<Operation> for Program {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self { operations: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Program {
        Program::new()
            .with(Operation::initial("a").unwrap())
            .with(Operation::initial("b").unwrap())
            .with(Operation::boolean("either", "Q_a(i) or Q_b(i)").unwrap())
    }

    #[test]
    fn test_add_preserves_order() {
        let program = sample();
        assert_eq!(program.operation_names(), ["Q_a", "Q_b", "either"]);
        assert_eq!(program.len(), 3);
    }

    #[test]
    fn test_remove_by_equality() {
        let mut program = sample();
        let q_b = Operation::initial("b").unwrap();
        assert_eq!(program.remove(&q_b), 1);
        assert_eq!(program.operation_names(), ["Q_a", "either"]);
        assert_eq!(program.remove(&q_b), 0);
    }

    #[test]
    fn test_remove_by_name_removes_all_matches() {
        let mut program = sample()
            .with(Operation::boolean("either", "Q_a(i)").unwrap());
        assert_eq!(program.remove_by_name("either"), 2);
        assert_eq!(program.operation_names(), ["Q_a", "Q_b"]);
    }

    #[test]
    fn test_clear() {
        let mut program = sample();
        program.clear();
        assert!(program.is_empty());
    }

    #[test]
    fn test_duplicates_are_accepted_and_reported() {
        let program = sample()
            .with(Operation::initial("a").unwrap())
            .with(Operation::boolean("either", "1").unwrap())
            .with(Operation::boolean("either", "0").unwrap());

        assert_eq!(program.len(), 6);
        assert_eq!(program.duplicate_names(), ["Q_a", "either"]);
        assert_eq!(program.get("either").unwrap().body(), "0");
    }
}
