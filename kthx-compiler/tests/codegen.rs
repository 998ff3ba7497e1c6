use kthx_compiler::ir::{FrameConvention, IRModule, IRStatement};
use kthx_compiler::{compile_to_ir, CodegenOptions, CompileError, Diagnostic};

fn lower_ok(source: &str) -> IRModule {
    compile_to_ir(source, CodegenOptions::default()).unwrap_or_else(|e| {
        panic!("expected clean lowering for {:?}: {:?}", source, e);
    })
}

fn lower_err(source: &str) -> Diagnostic {
    match compile_to_ir(source, CodegenOptions::default()) {
        Ok(_) => panic!("expected a lowering error for {:?}", source),
        Err(CompileError::Lower(diagnostic)) => diagnostic,
        Err(other) => panic!("expected a lowering error, got {:?}", other),
    }
}

fn foreign_calls(module: &IRModule) -> Vec<String> {
    module
        .entry
        .statements
        .iter()
        .filter_map(|s| match s {
            IRStatement::CallForeign(name) => Some(name.clone()),
            _ => None,
        })
        .collect()
}

fn count(module: &IRModule, wanted: &IRStatement) -> usize {
    module
        .entry
        .statements
        .iter()
        .filter(|s| *s == wanted)
        .count()
}

// ── whole-program shapes ─────────────────────────────────────────────────

#[test]
fn empty_program_lowers_to_halt() {
    let module = lower_ok("HAI 1.2\nKTHXBYE");
    assert_eq!(module.entry.statements, vec![IRStatement::Halt]);
    assert!(module.functions.is_empty());
    assert_eq!(module.slot_count, 0);
    assert_eq!(module.entry.stack_size, 1024);
    assert_eq!(module.entry.heap_size, 1024);
}

#[test]
fn declare_add_print() {
    let source = "HAI 1.2\nI HAS A x ITZ NUMBER\nx R SUM OF 1 AN 2\nVISIBLE x\nKTHXBYE";
    let module = lower_ok(source);

    assert_eq!(count(&module, &IRStatement::Add), 1);
    let foreigns = foreign_calls(&module);
    assert!(foreigns.contains(&"int_to_string".to_string()));
    assert!(foreigns.contains(&"print_string".to_string()));
    assert!(foreigns.contains(&"prend".to_string()));
    assert!(matches!(
        module.entry.statements.last(),
        Some(IRStatement::Halt)
    ));
    assert!(module.slot_count > 0);
}

#[test]
fn exclamation_suppresses_prend() {
    let module = lower_ok("HAI 1.2\nVISIBLE \"hi\"!\nKTHXBYE");
    assert!(!foreign_calls(&module).contains(&"prend".to_string()));
}

#[test]
fn numbar_prints_through_prn() {
    let source = "HAI 1.2\nI HAS A n ITZ NUMBAR\nn R 3.5\nVISIBLE PRODUKT OF n AN 2\nKTHXBYE";
    let module = lower_ok(source);
    assert_eq!(count(&module, &IRStatement::Multiply), 1);
    assert!(foreign_calls(&module).contains(&"prn".to_string()));
    assert_eq!(count(&module, &IRStatement::Push(3.5)), 1);
}

#[test]
fn custom_machine_sizes_flow_through() {
    let options = CodegenOptions {
        stack_size: 64,
        heap_size: 32,
        frame: FrameConvention::BaseIsStackTop,
    };
    let module = compile_to_ir("HAI 1.2\nKTHXBYE", options).unwrap();
    assert_eq!(module.entry.stack_size, 64);
    assert_eq!(module.entry.heap_size, 32);
}

#[test]
fn frame_convention_is_carried_by_the_module() {
    let options = CodegenOptions {
        frame: FrameConvention::BaseBelowTop,
        ..CodegenOptions::default()
    };
    let module = compile_to_ir("HAI 1.2\nKTHXBYE", options).unwrap();
    assert_eq!(module.frame, FrameConvention::BaseBelowTop);
}

// ── strings ──────────────────────────────────────────────────────────────

#[test]
fn yarn_literal_allocates_and_stores_its_length() {
    let module = lower_ok("HAI 1.2\nI HAS A s ITZ YARN\ns R \"abc\"\nKTHXBYE");
    assert!(count(&module, &IRStatement::Store(3)) >= 1);
    // the declaration reserves a one-cell placeholder string
    assert!(count(&module, &IRStatement::Allocate) >= 2);
}

#[test]
fn yarn_copies_use_matching_load_and_store_sizes() {
    let module = lower_ok("HAI 1.2\nI HAS A s ITZ YARN\ns R \"abc\"\nVISIBLE s\nKTHXBYE");
    assert!(count(&module, &IRStatement::Load(3)) >= 1);
    assert!(count(&module, &IRStatement::Store(3)) >= 2);
}

#[test]
fn smoosh_concatenates_into_one_allocation() {
    let module = lower_ok("HAI 1.2\nVISIBLE SMOOSH \"ab\" AN \"cd\" MKAY\nKTHXBYE");
    // 4-cell result buffer plus the two literal allocations
    assert!(count(&module, &IRStatement::Push(4.0)) >= 2);
    assert!(count(&module, &IRStatement::Allocate) >= 3);
    assert!(count(&module, &IRStatement::Free) >= 3);
}

#[test]
fn yarn_comparison_of_unequal_lengths_is_static() {
    let module = lower_ok("HAI 1.2\nBOTH SAEM \"a\" AN \"ab\"\nKTHXBYE");
    // no per-cell compare loop is emitted
    assert_eq!(count(&module, &IRStatement::Load(1)), 0);
}

#[test]
fn yarn_comparison_of_equal_lengths_compares_cells() {
    let module = lower_ok("HAI 1.2\nBOTH SAEM \"ab\" AN \"cd\"\nKTHXBYE");
    assert_eq!(count(&module, &IRStatement::Load(1)), 4);
}

#[test]
fn gimmeh_reads_a_line() {
    let module = lower_ok("HAI 1.2\nI HAS A s ITZ YARN\nGIMMEH s\nKTHXBYE");
    assert!(foreign_calls(&module).contains(&"read_string".to_string()));
}

// ── casts ────────────────────────────────────────────────────────────────

#[test]
fn cast_statement_converts_in_place() {
    let source = "HAI 1.2\nI HAS A x ITZ NUMBER\nx R 5\nx IS NOW A YARN\nVISIBLE x\nKTHXBYE";
    let module = lower_ok(source);
    let foreigns = foreign_calls(&module);
    assert!(foreigns.iter().filter(|n| *n == "int_to_string").count() >= 1);
    assert!(foreigns.contains(&"print_string".to_string()));
}

#[test]
fn maek_number_to_numbar() {
    let module = lower_ok("HAI 1.2\nMAEK 1 A NUMBAR\nKTHXBYE");
    assert!(foreign_calls(&module).contains(&"int_to_float".to_string()));
}

#[test]
fn maek_yarn_to_number_parses_and_frees() {
    let module = lower_ok("HAI 1.2\nMAEK \"12\" A NUMBER\nKTHXBYE");
    assert!(foreign_calls(&module).contains(&"string_to_int".to_string()));
    assert!(count(&module, &IRStatement::Free) >= 1);
}

// ── logic ────────────────────────────────────────────────────────────────

#[test]
fn all_of_multiplies_the_conjunction() {
    let module = lower_ok("HAI 1.2\nALL OF WIN AN FAIL MKAY\nKTHXBYE");
    assert!(count(&module, &IRStatement::Multiply) >= 2);
    assert!(count(&module, &IRStatement::BeginWhile) >= 1);
}

#[test]
fn any_of_uses_the_one_shot_loop() {
    let module = lower_ok("HAI 1.2\nANY OF FAIL AN WIN MKAY\nKTHXBYE");
    assert!(count(&module, &IRStatement::BeginWhile) >= 2);
}

#[test]
fn biggr_uses_sign() {
    let module = lower_ok("HAI 1.2\nBIGGR OF 1 AN 2\nKTHXBYE");
    assert_eq!(count(&module, &IRStatement::Sign), 1);
}

// ── structural invariants ────────────────────────────────────────────────

#[test]
fn every_call_references_a_defined_function() {
    let source = "HAI 1.2\nI HAS A x ITZ NUMBER\nx R SUM OF 1 AN 2\nVISIBLE x\nKTHXBYE";
    let module = lower_ok(source);
    let defined: Vec<&str> = module.functions.iter().map(|f| f.name.as_str()).collect();
    for statement in &module.entry.statements {
        if let IRStatement::Call(name) = statement {
            assert!(defined.contains(&name.as_str()), "undefined call {}", name);
        }
    }
}

#[test]
fn every_foreign_call_is_in_the_runtime_table() {
    let table = [
        "prn",
        "prs",
        "prh",
        "prc",
        "prend",
        "getch",
        "print_string",
        "read_string",
        "float_to_int",
        "int_to_float",
        "string_to_int",
        "string_to_float",
        "int_to_string",
        "float_to_string",
    ];
    let source = "HAI 1.2\nI HAS A s ITZ YARN\ns R \"hi\"\nGIMMEH s\nVISIBLE s 1 2.5\nMAEK \"3\" A NUMBAR\nKTHXBYE";
    let module = lower_ok(source);
    for name in foreign_calls(&module) {
        assert!(table.contains(&name.as_str()), "unknown foreign {}", name);
    }
}

// ── lowering errors ──────────────────────────────────────────────────────

#[test]
fn undeclared_variable_reference() {
    let diagnostic = lower_err("HAI 1.2\nVISIBLE y\nKTHXBYE");
    assert_eq!(diagnostic.message, "Variable y not found");
}

#[test]
fn redeclaration_is_an_error() {
    let diagnostic = lower_err("HAI 1.2\nI HAS A x ITZ NUMBER\nI HAS A x ITZ NUMBER\nKTHXBYE");
    assert_eq!(diagnostic.message, "Variable x already declared");
}

#[test]
fn assignment_type_mismatch() {
    let diagnostic = lower_err("HAI 1.2\nI HAS A x ITZ NUMBER\nx R WIN\nKTHXBYE");
    assert_eq!(
        diagnostic.message,
        "Variable x is of type NUMBER but expression is of type TROOF"
    );
}

#[test]
fn noob_variable_adopts_first_assignment_type() {
    let module = lower_ok("HAI 1.2\nI HAS A x\nx R WIN\nVISIBLE x\nKTHXBYE");
    assert!(foreign_calls(&module).contains(&"int_to_string".to_string()));
}

#[test]
fn mod_requires_numbers() {
    let diagnostic = lower_err("HAI 1.2\nMOD OF 1.5 AN 2\nKTHXBYE");
    assert_eq!(diagnostic.message, "Expected NUMBER type");
}

#[test]
fn logic_requires_troof() {
    let diagnostic = lower_err("HAI 1.2\nBOTH OF 1 AN WIN\nKTHXBYE");
    assert_eq!(diagnostic.message, "Expected TROOF type");
}

#[test]
fn gimmeh_requires_yarn() {
    let diagnostic = lower_err("HAI 1.2\nI HAS A x ITZ NUMBER\nGIMMEH x\nKTHXBYE");
    assert_eq!(diagnostic.message, "Variable x is not of type YARN");
}

#[test]
fn noob_cannot_be_cast() {
    let diagnostic = lower_err("HAI 1.2\nI HAS A x\nMAEK x A NUMBER\nKTHXBYE");
    assert_eq!(diagnostic.message, "Cannot convert type NOOB to NUMBER");
}

#[test]
fn noob_cannot_be_printed() {
    let diagnostic = lower_err("HAI 1.2\nI HAS A x\nVISIBLE x\nKTHXBYE");
    assert_eq!(diagnostic.message, "Cannot print NOOB value");
}

#[test]
fn parse_errors_block_lowering() {
    let result = compile_to_ir("HAI 1.2\nSUM OF 1\nKTHXBYE", CodegenOptions::default());
    assert!(matches!(result, Err(CompileError::Parse(errors)) if errors.len() == 1));
}
