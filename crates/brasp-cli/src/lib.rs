//! BRASP command-line support: program files and trace rendering.
pub mod output;
pub mod program_file;

pub use output::{format_value, render_json, render_program, render_table};
pub use program_file::{load_program, OperationSpec, ProgramFile, ProgramFileError};
