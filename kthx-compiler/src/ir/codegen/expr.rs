use crate::frontend::ast::{ArithOp, BoolOp, CmpOp, Expr, Ident, NaryOp, TypeKeyword};
use crate::frontend::token::{LexedToken, Token};
use crate::ir::codegen::context::{Gen, Operand};
use crate::ir::codegen::{LowerError, NUMBER_STRING_CELLS};
use crate::ir::symbol_table::Ty;
use crate::ir::IRStatement;

impl Gen {
    /// Lowers one expression. The value ends up in a fresh pinned stack
    /// cell; every sub-expression cell is consumed or dropped here, so an
    /// expression nets exactly one cell.
    pub fn lower_expr(&mut self, expr: &Expr) -> Result<Operand, LowerError> {
        match expr {
            Expr::Number { token } => self.lower_number(token),
            Expr::Numbar { token } => self.lower_numbar(token),
            Expr::Yarn { token } => self.lower_yarn_literal(token),
            Expr::Troof { token } => self.lower_troof(token),
            Expr::Variable { ident } => self.lower_variable(ident),
            Expr::Arith {
                op, left, right, ..
            } => match op {
                ArithOp::Sum => self.lower_arith(IRStatement::Add, false, left, right),
                ArithOp::Diff => self.lower_arith(IRStatement::Subtract, false, left, right),
                ArithOp::Produkt => self.lower_arith(IRStatement::Multiply, false, left, right),
                ArithOp::Quoshunt => self.lower_arith(IRStatement::Divide, false, left, right),
                ArithOp::Mod => self.lower_arith(IRStatement::Modulo, true, left, right),
                ArithOp::Biggr => self.lower_extremum(true, left, right),
                ArithOp::Smallr => self.lower_extremum(false, left, right),
            },
            Expr::Bool {
                op, left, right, ..
            } => self.lower_bool(*op, left, right),
            Expr::Not { operand, .. } => self.lower_not(operand),
            Expr::Nary { op, operands, .. } => self.lower_nary(*op, operands),
            Expr::Cmp {
                op, left, right, ..
            } => self.lower_cmp(*op, left, right),
            Expr::Smoosh {
                keyword, operands, ..
            } => self.lower_smoosh(keyword, operands),
            Expr::Maek { operand, ty, .. } => self.lower_maek(operand, ty.ty),
        }
    }

    fn lower_number(&mut self, token: &LexedToken) -> Result<Operand, LowerError> {
        let text = match &token.token {
            Token::NumberLiteral(text) => text.clone(),
            _ => return Err(self.make_error(token, "Expected NUMBER literal")),
        };
        let value: i32 = text
            .parse()
            .map_err(|_| self.make_error(token, "NUMBER literal out of range"))?;
        self.emit(IRStatement::Push(value as f32));
        let slot = self.pin();
        Ok(Operand {
            slot,
            ty: Ty::Number,
        })
    }

    fn lower_numbar(&mut self, token: &LexedToken) -> Result<Operand, LowerError> {
        let text = match &token.token {
            Token::NumbarLiteral(text) => text.clone(),
            _ => return Err(self.make_error(token, "Expected NUMBAR literal")),
        };
        let value: f32 = text
            .parse()
            .map_err(|_| self.make_error(token, "Invalid NUMBAR literal"))?;
        self.emit(IRStatement::Push(value));
        let slot = self.pin();
        Ok(Operand {
            slot,
            ty: Ty::Numbar,
        })
    }

    fn lower_troof(&mut self, token: &LexedToken) -> Result<Operand, LowerError> {
        let value = match token.token {
            Token::Win => 1.0,
            Token::Fail => 0.0,
            _ => return Err(self.make_error(token, "Expected TROOF literal")),
        };
        self.emit(IRStatement::Push(value));
        let slot = self.pin();
        Ok(Operand {
            slot,
            ty: Ty::Troof,
        })
    }

    fn lower_yarn_literal(&mut self, token: &LexedToken) -> Result<Operand, LowerError> {
        let text = match &token.token {
            Token::StringLiteral(text) => text.clone(),
            _ => return Err(self.make_error(token, "Expected YARN literal")),
        };
        let size = text.chars().count() as i32;

        self.emit_all([IRStatement::Push(size as f32), IRStatement::Allocate]);
        let slot = self.pin();
        for ch in text.chars() {
            self.emit(IRStatement::Push(ch as u32 as f32));
        }
        self.read(slot);
        self.emit(IRStatement::Store(size));

        Ok(Operand {
            slot,
            ty: Ty::Yarn(size),
        })
    }

    fn lower_variable(&mut self, ident: &Ident) -> Result<Operand, LowerError> {
        let symbol = match self.symbols.lookup(&ident.name) {
            Some(symbol) => symbol.clone(),
            None => {
                return Err(
                    self.make_error(&ident.token, format!("Variable {} not found", ident.name))
                )
            }
        };
        match symbol.ty {
            // YARN references copy the string so the expression owns its
            // own heap region
            Ty::Yarn(size) => {
                self.emit_all([IRStatement::Push(size as f32), IRStatement::Allocate]);
                let slot = self.pin();
                self.read(symbol.slot);
                self.emit(IRStatement::Load(size));
                self.read(slot);
                self.emit(IRStatement::Store(size));
                Ok(Operand {
                    slot,
                    ty: Ty::Yarn(size),
                })
            }
            ty => {
                self.read(symbol.slot);
                let slot = self.pin();
                Ok(Operand { slot, ty })
            }
        }
    }

    fn numeric_join(
        &self,
        left: &Operand,
        left_token: &LexedToken,
        right: &Operand,
        right_token: &LexedToken,
    ) -> Result<Ty, LowerError> {
        if !left.ty.is_numeric() {
            return Err(self.make_error(left_token, "Expected NUMBER or NUMBAR type"));
        }
        if !right.ty.is_numeric() {
            return Err(self.make_error(right_token, "Expected NUMBER or NUMBAR type"));
        }
        if matches!(left.ty, Ty::Numbar) || matches!(right.ty, Ty::Numbar) {
            Ok(Ty::Numbar)
        } else {
            Ok(Ty::Number)
        }
    }

    fn require_troof(&self, operand: &Operand, token: &LexedToken) -> Result<(), LowerError> {
        if matches!(operand.ty, Ty::Troof) {
            Ok(())
        } else {
            Err(self.make_error(token, "Expected TROOF type"))
        }
    }

    fn lower_arith(
        &mut self,
        opcode: IRStatement,
        integer_only: bool,
        left: &Expr,
        right: &Expr,
    ) -> Result<Operand, LowerError> {
        let l = self.lower_expr(left)?;
        let r = self.lower_expr(right)?;

        let ty = if integer_only {
            if !matches!(l.ty, Ty::Number) {
                return Err(self.make_error(left.token(), "Expected NUMBER type"));
            }
            if !matches!(r.ty, Ty::Number) {
                return Err(self.make_error(right.token(), "Expected NUMBER type"));
            }
            Ty::Number
        } else {
            self.numeric_join(&l, left.token(), &r, right.token())?
        };

        // left was pushed first, so Subtract/Divide compute left op right
        self.emit(opcode);
        self.slots.release(l.slot);
        self.slots.release(r.slot);
        let slot = self.pin();
        Ok(Operand { slot, ty })
    }

    /// BIGGR and SMALLR: (l + r ± |l - r|) / 2.
    fn lower_extremum(
        &mut self,
        maximum: bool,
        left: &Expr,
        right: &Expr,
    ) -> Result<Operand, LowerError> {
        self.emit(IRStatement::Push(0.0));
        let result = self.pin();

        let l = self.lower_expr(left)?;
        let r = self.lower_expr(right)?;
        let ty = self.numeric_join(&l, left.token(), &r, right.token())?;

        self.read(l.slot);
        self.read(r.slot);
        self.emit(IRStatement::Add);
        self.read(l.slot);
        self.read(r.slot);
        self.emit(IRStatement::Subtract);
        let diff = self.pin();
        self.read(diff);
        self.emit(IRStatement::Sign);
        self.emit(IRStatement::Multiply);
        self.emit(if maximum {
            IRStatement::Add
        } else {
            IRStatement::Subtract
        });
        self.emit_all([IRStatement::Push(2.0), IRStatement::Divide]);
        self.write(result);

        self.discard();
        self.discard();
        self.slots.release(l.slot);
        self.slots.release(r.slot);
        self.slots.release(diff);
        Ok(Operand { slot: result, ty })
    }

    fn lower_bool(&mut self, op: BoolOp, left: &Expr, right: &Expr) -> Result<Operand, LowerError> {
        self.emit(IRStatement::Push(0.0));
        let result = self.pin();

        let l = self.lower_expr(left)?;
        self.require_troof(&l, left.token())?;
        let r = self.lower_expr(right)?;
        self.require_troof(&r, right.token())?;

        match op {
            BoolOp::Both => self.emit(IRStatement::Multiply),
            BoolOp::Either => self.emit(IRStatement::Add),
            BoolOp::Won => self.emit_all([
                IRStatement::Add,
                IRStatement::Push(2.0),
                IRStatement::Modulo,
            ]),
        }
        self.store_if_nonzero(result, 1.0);

        self.slots.release(l.slot);
        self.slots.release(r.slot);
        Ok(Operand {
            slot: result,
            ty: Ty::Troof,
        })
    }

    fn lower_not(&mut self, operand: &Expr) -> Result<Operand, LowerError> {
        let o = self.lower_expr(operand)?;
        self.require_troof(&o, operand.token())?;
        self.emit_all([
            IRStatement::Push(1.0),
            IRStatement::Add,
            IRStatement::Push(2.0),
            IRStatement::Modulo,
        ]);
        Ok(Operand {
            slot: o.slot,
            ty: Ty::Troof,
        })
    }

    fn lower_nary(&mut self, op: NaryOp, operands: &[Expr]) -> Result<Operand, LowerError> {
        match op {
            NaryOp::All => {
                self.emit(IRStatement::Push(1.0));
                let result = self.pin();
                // running conjunction lives in one cell below the operands
                self.emit(IRStatement::Push(1.0));
                let acc = self.pin();

                for operand in operands {
                    let o = self.lower_expr(operand)?;
                    self.require_troof(&o, operand.token())?;
                    self.emit(IRStatement::Multiply);
                    self.slots.release(o.slot);

                    self.read(acc);
                    self.emit_all([
                        IRStatement::Push(1.0),
                        IRStatement::Add,
                        IRStatement::Push(2.0),
                        IRStatement::Modulo,
                    ]);
                    self.store_if_nonzero(result, 0.0);
                }

                self.discard();
                self.slots.release(acc);
                Ok(Operand {
                    slot: result,
                    ty: Ty::Troof,
                })
            }
            NaryOp::Any => {
                self.emit(IRStatement::Push(0.0));
                let result = self.pin();

                for operand in operands {
                    let o = self.lower_expr(operand)?;
                    self.require_troof(&o, operand.token())?;
                    self.store_if_nonzero(result, 1.0);
                    self.slots.release(o.slot);
                }

                Ok(Operand {
                    slot: result,
                    ty: Ty::Troof,
                })
            }
        }
    }

    fn lower_cmp(&mut self, op: CmpOp, left: &Expr, right: &Expr) -> Result<Operand, LowerError> {
        self.emit(IRStatement::Push(1.0));
        let result = self.pin();

        let l = self.lower_expr(left)?;
        let r = self.lower_expr(right)?;

        match (l.ty, r.ty) {
            (lt, rt) if lt.is_numeric() && rt.is_numeric() => {
                self.emit(IRStatement::Subtract);
                self.store_if_nonzero(result, 0.0);
            }
            (Ty::Troof, Ty::Troof) => {
                self.emit(IRStatement::Subtract);
                self.store_if_nonzero(result, 0.0);
            }
            (Ty::Yarn(left_size), Ty::Yarn(right_size)) => {
                if left_size != right_size {
                    // statically unequal
                    self.emit(IRStatement::Push(0.0));
                    self.write(result);
                } else {
                    for i in 0..left_size {
                        self.read(l.slot);
                        self.emit_all([
                            IRStatement::Push(i as f32),
                            IRStatement::Add,
                            IRStatement::Load(1),
                        ]);
                        self.read(r.slot);
                        self.emit_all([
                            IRStatement::Push(i as f32),
                            IRStatement::Add,
                            IRStatement::Load(1),
                        ]);
                        self.emit(IRStatement::Subtract);
                        self.store_if_nonzero(result, 0.0);
                    }
                }
                // free both strings before their address cells go away
                self.free_yarn(l.slot, left_size);
                self.free_yarn(r.slot, right_size);
                self.discard();
                self.discard();
            }
            (Ty::Noob, _) | (_, Ty::Noob) => {
                return Err(self.make_error(left.token(), "Cannot compare NOOB values"));
            }
            _ => {
                return Err(self.make_error(
                    right.token(),
                    format!("Expected {} type but got {}", l.ty.name(), r.ty.name()),
                ));
            }
        }

        self.slots.release(l.slot);
        self.slots.release(r.slot);

        if matches!(op, CmpOp::Diffrint) {
            self.read(result);
            self.emit_all([
                IRStatement::Push(1.0),
                IRStatement::Add,
                IRStatement::Push(2.0),
                IRStatement::Modulo,
            ]);
            self.write(result);
        }

        Ok(Operand {
            slot: result,
            ty: Ty::Troof,
        })
    }

    fn lower_smoosh(
        &mut self,
        keyword: &LexedToken,
        operands: &[Expr],
    ) -> Result<Operand, LowerError> {
        let mut parts: Vec<(i32, i32)> = Vec::new();
        for operand in operands {
            let o = self.lower_expr(operand)?;
            let size = match o.ty.yarn_size() {
                Some(size) => size,
                None => return Err(self.make_error(operand.token(), "Expected YARN type")),
            };
            parts.push((o.slot, size));
        }
        let (first, _) = match parts.first() {
            Some(part) => *part,
            None => return Err(self.make_error(keyword, "SMOOSH requires at least one operand")),
        };

        let total: i32 = parts.iter().map(|(_, size)| size).sum();
        self.emit_all([IRStatement::Push(total as f32), IRStatement::Allocate]);
        let dest = self.pin();

        let mut offset = 0;
        for (slot, size) in &parts {
            self.read(*slot);
            self.emit(IRStatement::Load(*size));
            self.read(dest);
            self.emit_all([IRStatement::Push(offset as f32), IRStatement::Add]);
            self.emit(IRStatement::Store(*size));
            self.free_yarn(*slot, *size);
            offset += size;
        }

        // fold the result address down into the first operand's cell,
        // then drop the remaining operand cells
        self.write(first);
        for _ in 1..parts.len() {
            self.discard();
        }
        self.slots.release(dest);
        for (slot, _) in &parts[1..] {
            self.slots.release(*slot);
        }

        Ok(Operand {
            slot: first,
            ty: Ty::Yarn(total),
        })
    }

    fn lower_maek(&mut self, operand: &Expr, target: TypeKeyword) -> Result<Operand, LowerError> {
        let src = self.lower_expr(operand)?;
        let slot = src.slot;

        let operand_result = match (src.ty, target) {
            (Ty::Noob, TypeKeyword::Noob) => src,
            (Ty::Noob, _) => {
                return Err(self.make_error(
                    operand.token(),
                    format!("Cannot convert type NOOB to {}", target),
                ))
            }
            (Ty::Number, TypeKeyword::Number)
            | (Ty::Numbar, TypeKeyword::Numbar)
            | (Ty::Troof, TypeKeyword::Troof)
            | (Ty::Yarn(_), TypeKeyword::Yarn) => src,
            (Ty::Number, TypeKeyword::Numbar) => {
                self.emit(IRStatement::CallForeign("int_to_float".to_string()));
                Operand {
                    slot,
                    ty: Ty::Numbar,
                }
            }
            (Ty::Numbar, TypeKeyword::Number) => {
                self.emit(IRStatement::CallForeign("float_to_int".to_string()));
                Operand {
                    slot,
                    ty: Ty::Number,
                }
            }
            (Ty::Troof, TypeKeyword::Number) => Operand {
                slot,
                ty: Ty::Number,
            },
            (Ty::Troof, TypeKeyword::Numbar) => Operand {
                slot,
                ty: Ty::Numbar,
            },
            (Ty::Number | Ty::Numbar, TypeKeyword::Troof) => {
                self.emit(IRStatement::Push(0.0));
                let flag = self.pin();
                self.read(slot);
                self.store_if_nonzero(flag, 1.0);
                self.write(slot);
                self.slots.release(flag);
                Operand { slot, ty: Ty::Troof }
            }
            (Ty::Number | Ty::Troof, TypeKeyword::Yarn) => {
                self.emit(IRStatement::CallForeign("int_to_string".to_string()));
                Operand {
                    slot,
                    ty: Ty::Yarn(NUMBER_STRING_CELLS),
                }
            }
            (Ty::Numbar, TypeKeyword::Yarn) => {
                self.emit(IRStatement::CallForeign("float_to_string".to_string()));
                Operand {
                    slot,
                    ty: Ty::Yarn(NUMBER_STRING_CELLS),
                }
            }
            (Ty::Yarn(size), TypeKeyword::Number) => {
                self.read(slot);
                self.emit(IRStatement::Push(size as f32));
                self.emit(IRStatement::CallForeign("string_to_int".to_string()));
                self.free_yarn(slot, size);
                self.write(slot);
                Operand {
                    slot,
                    ty: Ty::Number,
                }
            }
            (Ty::Yarn(size), TypeKeyword::Numbar) => {
                self.read(slot);
                self.emit(IRStatement::Push(size as f32));
                self.emit(IRStatement::CallForeign("string_to_float".to_string()));
                self.free_yarn(slot, size);
                self.write(slot);
                Operand {
                    slot,
                    ty: Ty::Numbar,
                }
            }
            (Ty::Yarn(size), TypeKeyword::Troof) => {
                self.free_yarn(slot, size);
                self.emit(IRStatement::Push(if size > 0 { 1.0 } else { 0.0 }));
                self.write(slot);
                Operand { slot, ty: Ty::Troof }
            }
            (Ty::Yarn(size), TypeKeyword::Noob) => {
                self.free_yarn(slot, size);
                self.emit(IRStatement::Push(0.0));
                self.write(slot);
                Operand { slot, ty: Ty::Noob }
            }
            (Ty::Number | Ty::Numbar | Ty::Troof, TypeKeyword::Noob) => {
                self.emit(IRStatement::Push(0.0));
                self.write(slot);
                Operand { slot, ty: Ty::Noob }
            }
        };

        Ok(operand_result)
    }
}
