use std::collections::HashMap;

/// Static type of a value or variable. YARN carries the length of its
/// heap string in cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ty {
    Number,
    Numbar,
    Troof,
    Yarn(i32),
    Noob,
}

impl Ty {
    pub fn name(&self) -> &'static str {
        match self {
            Ty::Number => "NUMBER",
            Ty::Numbar => "NUMBAR",
            Ty::Troof => "TROOF",
            Ty::Yarn(_) => "YARN",
            Ty::Noob => "NOOB",
        }
    }

    /// Type equality ignoring YARN lengths.
    pub fn matches(&self, other: &Ty) -> bool {
        matches!(
            (self, other),
            (Ty::Number, Ty::Number)
                | (Ty::Numbar, Ty::Numbar)
                | (Ty::Troof, Ty::Troof)
                | (Ty::Yarn(_), Ty::Yarn(_))
                | (Ty::Noob, Ty::Noob)
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Ty::Number | Ty::Numbar)
    }

    pub fn yarn_size(&self) -> Option<i32> {
        match self {
            Ty::Yarn(size) => Some(*size),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Symbol {
    /// Slot register holding the address of the variable's pinned cell.
    pub slot: i32,
    pub ty: Ty,
}

/// Flat scope: the language subset has no nesting, so one map per
/// function is enough.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a symbol; returns the existing entry on redeclaration.
    pub fn declare(&mut self, name: String, symbol: Symbol) -> Result<(), Symbol> {
        if let Some(existing) = self.symbols.get(&name) {
            return Err(existing.clone());
        }
        self.symbols.insert(name, symbol);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    /// Updates the static type after an assignment or cast.
    pub fn retype(&mut self, name: &str, ty: Ty) {
        if let Some(symbol) = self.symbols.get_mut(name) {
            symbol.ty = ty;
        }
    }
}
