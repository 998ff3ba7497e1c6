use super::Target;
use crate::ir::FrameConvention;

use std::io::{Error, ErrorKind, Result, Write};
use std::path::Path;
use std::process::{Command, Stdio};

/// The C translation-unit target: the bundled runtime followed by a
/// `main` that replays the IR as `machine_*` calls.
pub struct CVm {
    frame: FrameConvention,
}

impl CVm {
    pub fn new(frame: FrameConvention) -> Self {
        CVm { frame }
    }
}

impl Target for CVm {
    fn name(&self) -> char {
        'c'
    }

    fn is_standard(&self) -> bool {
        true
    }

    fn std(&self) -> String {
        String::from(include_str!("runtime/std.c"))
    }

    fn core_prelude(&self) -> String {
        String::from(include_str!("runtime/core.c"))
    }

    fn core_postlude(&self) -> String {
        String::new()
    }

    fn begin_entry_point(&self, stack_size: i32, heap_size: i32) -> String {
        format!(
            "int main() {{\nmachine *vm = machine_new({}, {});\n",
            stack_size, heap_size
        )
    }

    fn end_entry_point(&self) -> String {
        String::from("\nmachine_drop(vm);\nreturn 0;\n}\n")
    }

    fn establish_stack_frame(&self) -> String {
        match self.frame {
            FrameConvention::BaseIsStackTop => {
                String::from("machine_establish_stack_frame(vm);\n")
            }
            FrameConvention::BaseBelowTop => {
                String::from("machine_establish_stack_frame_below(vm);\n")
            }
        }
    }

    fn end_stack_frame(&self, arg_size: i32, locals_size: i32) -> String {
        format!("machine_end_stack_frame(vm, {}, {});\n", arg_size, locals_size)
    }

    fn set_return_register(&self) -> String {
        String::from("machine_set_return_register(vm);\n")
    }

    fn access_return_register(&self) -> String {
        String::from("machine_access_return_register(vm);\n")
    }

    fn load_base_ptr(&self) -> String {
        String::from("machine_load_base_ptr(vm);\n")
    }

    fn push(&self, n: f32) -> String {
        format!("machine_push(vm, {:?});\n", n)
    }

    fn add(&self) -> String {
        String::from("machine_add(vm);\n")
    }

    fn subtract(&self) -> String {
        String::from("machine_subtract(vm);\n")
    }

    fn multiply(&self) -> String {
        String::from("machine_multiply(vm);\n")
    }

    fn divide(&self) -> String {
        String::from("machine_divide(vm);\n")
    }

    fn modulo(&self) -> String {
        String::from("machine_modulo(vm);\n")
    }

    fn sign(&self) -> String {
        String::from("machine_sign(vm);\n")
    }

    fn allocate(&self) -> String {
        String::from("machine_allocate(vm);\n")
    }

    fn free(&self) -> String {
        String::from("machine_free(vm);\n")
    }

    fn store(&self, cells: i32) -> String {
        format!("machine_store(vm, {});\n", cells)
    }

    fn load(&self, cells: i32) -> String {
        format!("machine_load(vm, {});\n", cells)
    }

    fn copy(&self) -> String {
        String::from("machine_copy(vm);\n")
    }

    fn mov(&self) -> String {
        String::from("machine_mov(vm);\n")
    }

    fn hook(&self, slot: i32) -> String {
        format!("machine_hook(vm, {});\n", slot)
    }

    fn ref_hook(&self, slot: i32) -> String {
        format!("machine_ref_hook(vm, {});\n", slot)
    }

    fn fn_header(&self, name: &str) -> String {
        format!("void {}(machine* vm);\n", name)
    }

    fn fn_definition(&self, name: &str, body: &str) -> String {
        format!("void {}(machine* vm) {{\n{}}}\n", name, body)
    }

    fn call_fn(&self, name: &str) -> String {
        // a placeholder return address; the C call stack carries the real one
        format!("machine_push(vm, 1);\n{}(vm);\n", name)
    }

    fn call_foreign_fn(&self, name: &str) -> String {
        format!("{}(vm);\n", name)
    }

    fn begin_while(&self) -> String {
        String::from("while (machine_pop(vm)) {\n")
    }

    fn end_while(&self) -> String {
        String::from("}\n")
    }

    fn halt(&self) -> String {
        String::from("machine_halt(vm);\n")
    }
}

/// Pipes the translation unit to an external C compiler's stdin,
/// producing an executable at `out`.
pub fn build_with_cc(code: &str, cc: &Path, out: &Path) -> Result<()> {
    let mut child = Command::new(cc)
        .arg("-O2")
        .arg("-o")
        .arg(out)
        .args(["-x", "c", "-"])
        .stdin(Stdio::piped())
        .spawn()?;

    match child.stdin.as_mut() {
        Some(stdin) => stdin.write_all(code.as_bytes())?,
        None => {
            return Err(Error::new(
                ErrorKind::Other,
                "unable to open the C compiler's stdin",
            ))
        }
    }

    let status = child.wait()?;
    if !status.success() {
        return Err(Error::new(
            ErrorKind::Other,
            format!("C compiler exited with {}", status),
        ));
    }
    Ok(())
}
