//! BRASP Core: programs of Initial, Boolean and Attention operations and
//! the engine that runs them over an input sequence.
//!
//! ```
//! use brasp_core::{Operation, Program, Value};
//!
//! let program = Program::new()
//!     .with(Operation::initial("a").unwrap())
//!     .with(Operation::attention("prev_a", "rightmost", "j<i", "1", "Q_a(j)", "0").unwrap());
//!
//! let traces = program.execute(&["b", "a", "b"]).unwrap();
//! assert_eq!(traces.get("Q_a").unwrap(), [Value::Num(0.0), Value::Num(1.0), Value::Num(0.0)]);
//! assert_eq!(traces.get("prev_a").unwrap(), [Value::Num(0.0), Value::Num(0.0), Value::Num(1.0)]);
//! ```

pub mod attention;
pub mod context;
pub mod engine;
pub mod error;
pub mod input;
pub mod operation;
pub mod program;
pub mod scope;
pub mod trace;

pub use attention::{AttentionOperation, Mask, TieBreak};
pub use brasp_expr::{Expression, Value};
pub use context::{DuplicateNamePolicy, ExecutionContext};
pub use engine::{execute, execute_with};
pub use error::BraspError;
pub use input::InputSequence;
pub use operation::{BooleanOperation, InitialOperation, Operation, OperationKind};
pub use program::Program;
pub use trace::{ExecutionReport, OperationProof, Trace, TraceTable};

pub const BRASP_VERSION: &str = env!("CARGO_PKG_VERSION");
