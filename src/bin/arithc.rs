//! Command-line driver for the arithc compiler

use anyhow::{bail, Context};
use arithc::compiler::{format_asm, format_ir, format_tree};
use arithc::{
    parse_ir, CompileOptions, CompileResult, Compiler, ScalarType, TypeMap, TypePolicy,
};
use clap::{Parser, ValueEnum};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

/// Compile arithmetic assignment statements to two-register assembly
#[derive(Parser, Debug)]
#[command(name = "arithc", version, about, long_about = None)]
struct Args {
    /// Statement to compile, e.g. "x = (1 + 2) * y"
    statement: Option<String>,

    /// Read statements from a file, one per non-empty line
    #[arg(short, long, conflicts_with = "statement")]
    file: Option<PathBuf>,

    /// Declare an identifier type (repeatable)
    #[arg(short = 't', long = "type", value_name = "NAME=int|float", value_parser = parse_declaration)]
    types: Vec<(String, ScalarType)>,

    /// Stage to print
    #[arg(long, value_enum, default_value_t = Emit::All)]
    emit: Emit,

    /// Skip the IR optimizer
    #[arg(long)]
    no_opt: bool,

    /// Reject identifiers that are read without a declared type
    #[arg(long)]
    strict_types: bool,

    /// Print identifiers as ID<n> in trees
    #[arg(long)]
    display_ids: bool,

    /// Treat the input as IR text (`;` separates lines) and run only the backend
    #[arg(long)]
    from_ir: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Emit {
    Tokens,
    Tree,
    Semantic,
    Ir,
    Opt,
    Asm,
    All,
}

fn parse_declaration(text: &str) -> Result<(String, ScalarType), String> {
    let (name, ty) = text
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=TYPE, got '{}'", text))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing identifier in '{}'", text));
    }
    let ty = ty.trim().parse::<ScalarType>().map_err(|e| e.to_string())?;
    Ok((name.to_string(), ty))
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_max_level(level)
        .init();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when at least one statement failed
fn run(args: &Args) -> anyhow::Result<bool> {
    let types: TypeMap = args.types.iter().cloned().collect();
    let compiler = Compiler::new(CompileOptions {
        optimize: !args.no_opt,
        type_policy: if args.strict_types {
            TypePolicy::Strict
        } else {
            TypePolicy::Permissive
        },
    });

    let input = match (&args.statement, &args.file) {
        (Some(statement), _) => statement.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => bail!("no statement given (pass STATEMENT or --file)"),
    };

    if args.from_ir {
        let text = input.replace(';', "\n");
        let ir = parse_ir(&text).context("invalid IR input")?;
        let (optimized, assembly) = compiler.compile_ir(&ir, &types);
        if args.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "optimized_ir": optimized,
                    "assembly": assembly,
                }))?
            );
        } else {
            if matches!(args.emit, Emit::Opt | Emit::All) {
                section("Optimized IR", &format_ir(&optimized), args.emit);
            }
            if matches!(args.emit, Emit::Asm | Emit::All) {
                section("Assembly", &format_asm(&assembly), args.emit);
            }
        }
        return Ok(true);
    }

    let mut ok = true;
    for (number, line) in input.lines().enumerate() {
        let statement = line.trim();
        if statement.is_empty() {
            continue;
        }

        match compiler.compile(statement, &types) {
            Ok(result) => {
                if args.json {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                } else {
                    print_result(&result, args);
                }
            }
            Err(err) => {
                ok = false;
                let err = anyhow::Error::new(err)
                    .context(format!("line {}: '{}'", number + 1, statement));
                eprintln!("error: {:#}", err);
            }
        }
    }
    Ok(ok)
}

fn print_result(result: &CompileResult, args: &Args) {
    let names = args.display_ids.then_some(&result.display_names);
    let wants = |stage: Emit| args.emit == stage || args.emit == Emit::All;

    if wants(Emit::Tokens) {
        let tokens: String = result
            .tokens
            .iter()
            .map(|token| format!("{}\n", token))
            .collect();
        section("Tokens", &tokens, args.emit);
    }
    if wants(Emit::Tree) {
        section("Syntax tree", &format_tree(&result.syntax_tree, names), args.emit);
    }
    if wants(Emit::Semantic) {
        section("Semantic tree", &format_tree(&result.semantic_tree, names), args.emit);
    }
    if wants(Emit::Ir) {
        section("IR", &format_ir(&result.ir), args.emit);
    }
    if wants(Emit::Opt) {
        section("Optimized IR", &format_ir(&result.optimized_ir), args.emit);
    }
    if wants(Emit::Asm) {
        section("Assembly", &format_asm(&result.assembly), args.emit);
    }
}

/// Prints one stage; headings only appear when every stage is shown
fn section(title: &str, body: &str, emit: Emit) {
    if emit == Emit::All {
        println!("{}:", title);
    }
    print!("{}", body);
    if emit == Emit::All {
        println!();
    }
}
