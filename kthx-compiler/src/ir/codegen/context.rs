use crate::frontend::token::LexedToken;
use crate::ir::codegen::{CodegenOptions, LowerError};
use crate::ir::symbol_table::{SymbolTable, Ty};
use crate::ir::{IRFunctionEntry, IRModule, IRStatement};

/// Allocates slot registers. A slot pins one stack cell; releasing a slot
/// makes its register reusable while the high-water mark decides how many
/// register cells the entry reserves.
#[derive(Debug, Default)]
pub struct SlotAllocator {
    in_use: Vec<bool>,
}

impl SlotAllocator {
    pub fn acquire(&mut self) -> i32 {
        for (slot, used) in self.in_use.iter_mut().enumerate() {
            if !*used {
                *used = true;
                return slot as i32;
            }
        }
        self.in_use.push(true);
        (self.in_use.len() - 1) as i32
    }

    pub fn release(&mut self, slot: i32) {
        if let Some(used) = self.in_use.get_mut(slot as usize) {
            *used = false;
        }
    }

    pub fn high_water(&self) -> i32 {
        self.in_use.len() as i32
    }
}

/// A lowered expression: its value sits in a pinned stack cell addressed
/// by `slot`, with the statically known type.
#[derive(Debug, Clone, Copy)]
pub struct Operand {
    pub slot: i32,
    pub ty: Ty,
}

/// Orchestrates lowering: owns the entry body under construction, the
/// slot allocator, and the symbol table.
pub struct Gen {
    entry: Vec<IRStatement>,
    pub(crate) slots: SlotAllocator,
    pub(crate) symbols: SymbolTable,
    options: CodegenOptions,
}

impl Gen {
    pub fn new(options: CodegenOptions) -> Self {
        Gen {
            entry: Vec::new(),
            slots: SlotAllocator::default(),
            symbols: SymbolTable::new(),
            options,
        }
    }

    pub fn finish(self) -> IRModule {
        IRModule {
            functions: Vec::new(),
            entry: IRFunctionEntry::new(
                self.options.stack_size,
                self.options.heap_size,
                self.entry,
            ),
            slot_count: self.slots.high_water(),
            frame: self.options.frame,
        }
    }

    pub fn make_error(&self, token: &LexedToken, message: impl Into<String>) -> LowerError {
        LowerError {
            message: message.into(),
            token: token.clone(),
        }
    }

    // ── emission primitives ─────────────────────────────────────────────

    pub fn emit(&mut self, statement: IRStatement) {
        self.entry.push(statement);
    }

    pub fn emit_all(&mut self, statements: impl IntoIterator<Item = IRStatement>) {
        self.entry.extend(statements);
    }

    /// Pins the value on top of the stack into a fresh slot register.
    pub fn pin(&mut self) -> i32 {
        let slot = self.slots.acquire();
        self.emit(IRStatement::Hook(slot));
        slot
    }

    /// Pushes a copy of the pinned cell's value.
    pub fn read(&mut self, slot: i32) {
        self.emit_all([IRStatement::RefHook(slot), IRStatement::Copy]);
    }

    /// Pops the stack top into the pinned cell.
    pub fn write(&mut self, slot: i32) {
        self.emit_all([IRStatement::RefHook(slot), IRStatement::Mov]);
    }

    /// Pops and discards the stack top. The loop body pushes 0, so the
    /// second test always fails and the net effect is a single pop.
    pub fn discard(&mut self) {
        self.emit_all([
            IRStatement::BeginWhile,
            IRStatement::Push(0.0),
            IRStatement::EndWhile,
        ]);
    }

    /// Pops the stack top; when it is nonzero, stores `value` into the
    /// pinned cell. The one-shot loop is the machine's only conditional.
    pub fn store_if_nonzero(&mut self, slot: i32, value: f32) {
        self.emit_all([IRStatement::BeginWhile, IRStatement::Push(value)]);
        self.write(slot);
        self.emit_all([IRStatement::Push(0.0), IRStatement::EndWhile]);
    }

    /// Releases the heap string addressed through `slot`.
    pub fn free_yarn(&mut self, slot: i32, size: i32) {
        self.emit(IRStatement::Push(size as f32));
        self.read(slot);
        self.emit(IRStatement::Free);
    }
}
