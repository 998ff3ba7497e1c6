pub mod backend;
pub mod frontend;
pub mod ir;

use std::fmt;
use thiserror::Error;

pub use ir::codegen::CodegenOptions;
pub use ir::FrameConvention;

/// A user-visible problem anchored to a `[start, end)` byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub start: usize,
    pub end: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}: {}", self.start, self.end, self.message)
    }
}

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("{} parse error(s)", .0.len())]
    Parse(Vec<Diagnostic>),

    #[error("lowering failed: {0}")]
    Lower(Diagnostic),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CompileError {
    /// Every diagnostic this error carries, in source order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            CompileError::Parse(diagnostics) => diagnostics.clone(),
            CompileError::Lower(diagnostic) => vec![diagnostic.clone()],
            CompileError::Io(_) => Vec::new(),
        }
    }
}

/// Lexes and parses a source buffer. Recovering: always returns a
/// program plus whatever diagnostics survived error filtering.
pub fn parse_source(source: &str) -> (frontend::ast::Program, Vec<Diagnostic>) {
    let tokens = frontend::lexer::lex(source);
    let outcome = frontend::parser::parse(tokens);
    let diagnostics = outcome
        .errors
        .iter()
        .map(|error| Diagnostic {
            start: error.token.start,
            end: error.token.end,
            message: error.message.clone(),
        })
        .collect();
    (outcome.program, diagnostics)
}

pub fn compile_to_ir(source: &str, options: CodegenOptions) -> Result<ir::IRModule, CompileError> {
    let (program, diagnostics) = parse_source(source);
    if !diagnostics.is_empty() {
        return Err(CompileError::Parse(diagnostics));
    }

    ir::codegen::lower(&program, options).map_err(|error| {
        CompileError::Lower(Diagnostic {
            start: error.token.start,
            end: error.token.end,
            message: error.message,
        })
    })
}

/// Compiles source text directly to a C translation unit for the stack
/// VM runtime.
pub fn compile_to_c(source: &str, options: CodegenOptions) -> Result<String, CompileError> {
    let module = compile_to_ir(source, options)?;
    let target = backend::c_vm::CVm::new(module.frame);
    Ok(module.assemble(&target))
}
