// Keep types reachable as `crate::ir::*`
pub mod ir;
pub use ir::*;

pub mod codegen;
pub mod symbol_table;
