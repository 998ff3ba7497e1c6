use crate::frontend::ast::{AssignTarget, Expr, Ident, Program, Stmt, TypeAnnotation, TypeKeyword};
use crate::ir::codegen::context::Gen;
use crate::ir::codegen::{LowerError, NUMBER_STRING_CELLS, READ_LINE_CELLS};
use crate::ir::symbol_table::{Symbol, Ty};
use crate::ir::IRStatement;

impl Gen {
    pub fn lower_program(&mut self, program: &Program) -> Result<(), LowerError> {
        for statement in &program.statements {
            self.lower_stmt(statement)?;
        }
        Ok(())
    }

    fn lower_stmt(&mut self, statement: &Stmt) -> Result<(), LowerError> {
        match statement {
            Stmt::Expression { expr } => {
                let operand = self.lower_expr(expr)?;
                if let Ty::Yarn(size) = operand.ty {
                    self.free_yarn(operand.slot, size);
                }
                self.discard();
                self.slots.release(operand.slot);
                Ok(())
            }
            Stmt::Declare { ident, ty } => self.declare_variable(ident, ty.as_ref()),
            Stmt::Assign { target, value } => self.lower_assign(target, value),
            Stmt::Cast { ident, ty } => self.lower_cast(ident, ty),
            Stmt::Visible {
                args,
                suppress_newline,
                ..
            } => self.lower_visible(args, *suppress_newline),
            Stmt::Gimmeh { ident, .. } => self.lower_gimmeh(ident),
            Stmt::End { .. } => {
                self.emit(IRStatement::Halt);
                Ok(())
            }
        }
    }

    pub(crate) fn declare_variable(
        &mut self,
        ident: &Ident,
        annotation: Option<&TypeAnnotation>,
    ) -> Result<(), LowerError> {
        let ty = match annotation.map(|a| a.ty) {
            None | Some(TypeKeyword::Noob) => Ty::Noob,
            Some(TypeKeyword::Number) => Ty::Number,
            Some(TypeKeyword::Numbar) => Ty::Numbar,
            Some(TypeKeyword::Troof) => Ty::Troof,
            Some(TypeKeyword::Yarn) => Ty::Yarn(1),
        };

        // the variable's storage cell; YARN variables start with a
        // one-cell heap string so overwrites can free uniformly
        match ty {
            Ty::Yarn(_) => self.emit_all([IRStatement::Push(1.0), IRStatement::Allocate]),
            _ => self.emit(IRStatement::Push(0.0)),
        }
        let slot = self.pin();

        if self
            .symbols
            .declare(ident.name.clone(), Symbol { slot, ty })
            .is_err()
        {
            return Err(self.make_error(
                &ident.token,
                format!("Variable {} already declared", ident.name),
            ));
        }
        Ok(())
    }

    fn lower_assign(&mut self, target: &AssignTarget, value: &Expr) -> Result<(), LowerError> {
        if let AssignTarget::Declaration { ident, ty } = target {
            self.declare_variable(ident, ty.as_ref())?;
        }

        let ident = target.ident();
        let symbol = match self.symbols.lookup(&ident.name) {
            Some(symbol) => symbol.clone(),
            None => {
                return Err(self.make_error(
                    &ident.token,
                    format!("Variable {} not declared", ident.name),
                ))
            }
        };

        let operand = self.lower_expr(value)?;

        // a NOOB variable adopts the type of its first assignment
        if !matches!(symbol.ty, Ty::Noob) && !symbol.ty.matches(&operand.ty) {
            return Err(self.make_error(
                value.token(),
                format!(
                    "Variable {} is of type {} but expression is of type {}",
                    ident.name,
                    symbol.ty.name(),
                    operand.ty.name()
                ),
            ));
        }

        if let Ty::Yarn(old_size) = symbol.ty {
            self.free_yarn(symbol.slot, old_size);
        }
        self.write(symbol.slot);
        self.slots.release(operand.slot);
        self.symbols.retype(&ident.name, operand.ty);
        Ok(())
    }

    fn lower_cast(&mut self, ident: &Ident, annotation: &TypeAnnotation) -> Result<(), LowerError> {
        let symbol = match self.symbols.lookup(&ident.name) {
            Some(symbol) => symbol.clone(),
            None => {
                return Err(self.make_error(
                    &ident.token,
                    format!("Variable {} not declared", ident.name),
                ))
            }
        };
        let slot = symbol.slot;
        let target = annotation.ty;

        let new_ty = match (symbol.ty, target) {
            (Ty::Noob, TypeKeyword::Noob) => Ty::Noob,
            (Ty::Noob, _) => {
                return Err(self.make_error(
                    &ident.token,
                    format!("Cannot convert type NOOB to {}", target),
                ))
            }
            (Ty::Number, TypeKeyword::Number)
            | (Ty::Numbar, TypeKeyword::Numbar)
            | (Ty::Troof, TypeKeyword::Troof) => symbol.ty,
            (Ty::Yarn(size), TypeKeyword::Yarn) => Ty::Yarn(size),
            (Ty::Number, TypeKeyword::Numbar) => {
                self.read(slot);
                self.emit(IRStatement::CallForeign("int_to_float".to_string()));
                self.write(slot);
                Ty::Numbar
            }
            (Ty::Numbar, TypeKeyword::Number) => {
                self.read(slot);
                self.emit(IRStatement::CallForeign("float_to_int".to_string()));
                self.write(slot);
                Ty::Number
            }
            // TROOF cells already hold 0 or 1
            (Ty::Troof, TypeKeyword::Number) => Ty::Number,
            (Ty::Troof, TypeKeyword::Numbar) => Ty::Numbar,
            (Ty::Number | Ty::Numbar, TypeKeyword::Troof) => {
                self.read(slot);
                self.emit(IRStatement::Push(0.0));
                self.write(slot);
                self.store_if_nonzero(slot, 1.0);
                Ty::Troof
            }
            (Ty::Number | Ty::Troof, TypeKeyword::Yarn) => {
                self.read(slot);
                self.emit(IRStatement::CallForeign("int_to_string".to_string()));
                self.write(slot);
                Ty::Yarn(NUMBER_STRING_CELLS)
            }
            (Ty::Numbar, TypeKeyword::Yarn) => {
                self.read(slot);
                self.emit(IRStatement::CallForeign("float_to_string".to_string()));
                self.write(slot);
                Ty::Yarn(NUMBER_STRING_CELLS)
            }
            (Ty::Yarn(size), TypeKeyword::Number) => {
                self.read(slot);
                self.emit(IRStatement::Push(size as f32));
                self.emit(IRStatement::CallForeign("string_to_int".to_string()));
                self.free_yarn(slot, size);
                self.write(slot);
                Ty::Number
            }
            (Ty::Yarn(size), TypeKeyword::Numbar) => {
                self.read(slot);
                self.emit(IRStatement::Push(size as f32));
                self.emit(IRStatement::CallForeign("string_to_float".to_string()));
                self.free_yarn(slot, size);
                self.write(slot);
                Ty::Numbar
            }
            (Ty::Yarn(size), TypeKeyword::Troof) => {
                self.free_yarn(slot, size);
                self.emit(IRStatement::Push(if size > 0 { 1.0 } else { 0.0 }));
                self.write(slot);
                Ty::Troof
            }
            (Ty::Yarn(size), TypeKeyword::Noob) => {
                self.free_yarn(slot, size);
                self.emit(IRStatement::Push(0.0));
                self.write(slot);
                Ty::Noob
            }
            (_, TypeKeyword::Noob) => {
                self.emit(IRStatement::Push(0.0));
                self.write(slot);
                Ty::Noob
            }
        };

        self.symbols.retype(&ident.name, new_ty);
        Ok(())
    }

    fn lower_visible(&mut self, args: &[Expr], suppress_newline: bool) -> Result<(), LowerError> {
        for arg in args {
            let operand = self.lower_expr(arg)?;
            match operand.ty {
                Ty::Yarn(size) => {
                    self.read(operand.slot);
                    self.emit(IRStatement::Push(size as f32));
                    self.emit(IRStatement::CallForeign("print_string".to_string()));
                    self.free_yarn(operand.slot, size);
                    self.discard();
                }
                Ty::Number | Ty::Troof => {
                    self.read(operand.slot);
                    self.emit(IRStatement::CallForeign("int_to_string".to_string()));
                    let converted = self.pin();
                    self.read(converted);
                    self.emit(IRStatement::Push(NUMBER_STRING_CELLS as f32));
                    self.emit(IRStatement::CallForeign("print_string".to_string()));
                    self.free_yarn(converted, NUMBER_STRING_CELLS);
                    self.discard();
                    self.discard();
                    self.slots.release(converted);
                }
                Ty::Numbar => {
                    self.read(operand.slot);
                    self.emit(IRStatement::CallForeign("prn".to_string()));
                    self.discard();
                }
                Ty::Noob => {
                    return Err(self.make_error(arg.token(), "Cannot print NOOB value"));
                }
            }
            self.slots.release(operand.slot);
        }

        if !suppress_newline {
            self.emit(IRStatement::CallForeign("prend".to_string()));
        }
        Ok(())
    }

    fn lower_gimmeh(&mut self, ident: &Ident) -> Result<(), LowerError> {
        let symbol = match self.symbols.lookup(&ident.name) {
            Some(symbol) => symbol.clone(),
            None => {
                return Err(self.make_error(
                    &ident.token,
                    format!("Variable {} not declared", ident.name),
                ))
            }
        };
        let size = match symbol.ty {
            Ty::Yarn(size) => size,
            _ => {
                return Err(self.make_error(
                    &ident.token,
                    format!("Variable {} is not of type YARN", ident.name),
                ))
            }
        };

        self.free_yarn(symbol.slot, size);
        self.emit(IRStatement::CallForeign("read_string".to_string()));
        self.write(symbol.slot);
        self.symbols.retype(&ident.name, Ty::Yarn(READ_LINE_CELLS));
        Ok(())
    }
}
