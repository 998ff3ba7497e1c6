//! AST to IR lowering.
//!
//! Runs after a clean parse and translates the program into the linear
//! stack-machine form. The first structural error (undeclared variable,
//! type mismatch, bad cast) aborts the pass.

pub mod context;
pub mod expr;
pub mod stmt;

pub use context::Gen;

use crate::frontend::ast::Program;
use crate::frontend::token::LexedToken;
use crate::ir::{FrameConvention, IRModule};

/// Cells used for the heap string produced by the number-to-string
/// conversion foreigns.
pub(crate) const NUMBER_STRING_CELLS: i32 = 32;

/// Cells used for the heap string GIMMEH reads a line into.
pub(crate) const READ_LINE_CELLS: i32 = 256;

#[derive(Debug, Clone, Copy)]
pub struct CodegenOptions {
    pub stack_size: i32,
    pub heap_size: i32,
    pub frame: FrameConvention,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        CodegenOptions {
            stack_size: 1024,
            heap_size: 1024,
            frame: FrameConvention::BaseIsStackTop,
        }
    }
}

/// A fatal lowering problem, anchored to the offending token.
#[derive(Debug, Clone)]
pub struct LowerError {
    pub message: String,
    pub token: LexedToken,
}

/// Lowers a parsed program into an IR module executable on the stack VM.
pub fn lower(program: &Program, options: CodegenOptions) -> Result<IRModule, LowerError> {
    let mut gen = Gen::new(options);
    gen.lower_program(program)?;
    Ok(gen.finish())
}
