use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use kthx_compiler::backend::c_vm;
use kthx_compiler::{compile_to_c, CodegenOptions, CompileError, FrameConvention};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "compile")]
#[command(about = "A LOLCODE compiler targeting a simple stack virtual machine")]
struct Args {
    /// Path to the source file to compile
    file: PathBuf,

    /// C compiler used to build the emitted translation unit into an
    /// executable; without it the translation unit is written as-is
    #[arg(long)]
    cc: Option<PathBuf>,

    /// Output target
    #[arg(long, value_enum, default_value_t = TargetOpt::C)]
    target: TargetOpt,

    /// Output path (the C file, or the executable when --cc is given)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Stack size of the generated machine, in cells
    #[arg(long, default_value_t = 1024)]
    stack_size: i32,

    /// Heap size of the generated machine, in cells
    #[arg(long, default_value_t = 1024)]
    heap_size: i32,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum TargetOpt {
    C,
    Asm,
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    if matches!(args.target, TargetOpt::Asm) {
        bail!("the asm target is not supported by this build; use --target c");
    }

    let source = fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;

    let options = CodegenOptions {
        stack_size: args.stack_size,
        heap_size: args.heap_size,
        frame: FrameConvention::BaseIsStackTop,
    };

    let code = match compile_to_c(&source, options) {
        Ok(code) => code,
        Err(err) => {
            report(&args.file, &err);
            std::process::exit(1);
        }
    };

    match &args.cc {
        Some(cc) => {
            let out = args.out.clone().unwrap_or_else(|| PathBuf::from("main"));
            c_vm::build_with_cc(&code, cc, &out)
                .with_context(|| format!("building {}", out.display()))?;
        }
        None => {
            let out = args.out.clone().unwrap_or_else(|| PathBuf::from("out.c"));
            fs::write(&out, code).with_context(|| format!("writing {}", out.display()))?;
        }
    }

    Ok(())
}

fn report(path: &Path, err: &CompileError) {
    let diagnostics = err.diagnostics();
    if diagnostics.is_empty() {
        eprintln!("{}: {}", path.display(), err);
        return;
    }
    for diagnostic in diagnostics {
        eprintln!("{}:{}", path.display(), diagnostic);
    }
}
