use std::env;
use std::fs;
use std::io::{self, Write};

use cmmc::{codegen, isa, lexer, parser, symtab, vm::Vm};

struct Args {
    compile_path: Option<String>,
    out_path: String,
    run_path: Option<String>,
    verbose_symtab: bool,
}

fn parse_args(raw: &[String]) -> Result<Args, String> {
    let mut compile_path = None;
    let mut out_path = "a.out".to_string();
    let mut run_path = None;
    let mut verbose_symtab = false;

    let mut i = 0;
    while i < raw.len() {
        match raw[i].as_str() {
            "-c" => {
                compile_path = Some(take_value(raw, &mut i, "-c")?);
            }
            "-o" => {
                out_path = take_value(raw, &mut i, "-o")?;
            }
            "-r" => {
                run_path = Some(take_value(raw, &mut i, "-r")?);
            }
            "-v" => {
                verbose_symtab = true;
                i += 1;
            }
            other => return Err(format!("unrecognized argument: {other}")),
        }
    }

    Ok(Args { compile_path, out_path, run_path, verbose_symtab })
}

fn take_value(raw: &[String], i: &mut usize, flag: &str) -> Result<String, String> {
    let value = raw.get(*i + 1).ok_or_else(|| format!("{flag} requires a value"))?;
    *i += 2;
    Ok(value.clone())
}

fn main() {
    env_logger::init();

    let raw_args: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&raw_args) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            std::process::exit(1);
        }
    };

    if let Err(code) = run(&args) {
        std::process::exit(code);
    }
}

fn run(args: &Args) -> Result<(), i32> {
    if let Some(source_path) = &args.compile_path {
        compile(source_path, &args.out_path, args.verbose_symtab)?;
    }

    if let Some(instr_path) = &args.run_path {
        execute(instr_path)?;
    }

    Ok(())
}

fn compile(source_path: &str, out_path: &str, verbose_symtab: bool) -> Result<(), i32> {
    let source = fs::read_to_string(source_path).map_err(|err| {
        eprintln!("failed to read {source_path}: {err}");
        1
    })?;

    let tokens = lexer::tokenize(&source).map_err(|err| {
        eprintln!("{err}");
        1
    })?;
    log::debug!("lexed {} tokens", tokens.len());

    let program = parser::parse(&tokens).map_err(|err| {
        eprintln!("{err}");
        1
    })?;
    log::debug!("parsed {} top-level declarations", program.decls.len());

    let table = symtab::build(&program);
    if verbose_symtab {
        log::info!("symbol table:\n{}", table.fmt_table());
    }

    let code = codegen::generate(&program, &table);
    log::debug!("generated {} instructions", code.len());

    fs::write(out_path, isa::serialize(&code)).map_err(|err| {
        eprintln!("failed to write {out_path}: {err}");
        1
    })?;

    Ok(())
}

fn execute(instr_path: &str) -> Result<(), i32> {
    let text = fs::read_to_string(instr_path).map_err(|err| {
        eprintln!("failed to read {instr_path}: {err}");
        1
    })?;

    let code = isa::deserialize(&text).map_err(|err| {
        eprintln!("malformed instruction file: {err}");
        1
    })?;
    log::debug!("loaded {} instructions", code.len());

    let stdin = io::stdin();
    let mut stdin = stdin.lock();
    let mut stdout = io::stdout().lock();
    Vm::new().run(&code, &mut stdin, &mut stdout);
    stdout.flush().ok();

    Ok(())
}
