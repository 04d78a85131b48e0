//! The `hscc` command-line driver.
//!
//! Chains the front end's phases -- parse, kind-check, type-check and
//! elaborate -- over a single source file and reports diagnostics.
//! Grounded on `snowc::main` (the `clap` derive `Cli`/`Commands` shape,
//! the `Result<(), String>` error-bubbling idiom, and `report_diagnostics`).

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hscc", version, about = "The hsc front end driver")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse, kind-check and type-check a module, reporting diagnostics.
    Check {
        /// Path to a `.hs` source file.
        file: PathBuf,
        /// Also print each top-level binder's elaborated polytype.
        #[arg(long = "dump-types")]
        dump_types: bool,
    },
    /// Parse a module and print its concrete syntax tree.
    DumpAst {
        file: PathBuf,
    },
    /// Run kind checking alone and print the resolved type constructor
    /// environment.
    DumpKinds {
        file: PathBuf,
    },
    /// Start an interactive read-eval-elaborate-print loop.
    Repl,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { file, dump_types } => check(&file, dump_types),
        Commands::DumpAst { file } => dump_ast(&file),
        Commands::DumpKinds { file } => dump_kinds(&file),
        Commands::Repl => hsc_repl::run_repl(&hsc_repl::ReplConfig::default()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn read_source(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("failed to read '{}': {e}", path.display()))
}

/// Run the full pipeline over `path`: parse -> kind-check -> type-check
/// -> elaborate. Reports every accumulated diagnostic before returning.
fn check(path: &Path, dump_types: bool) -> Result<(), String> {
    let source = read_source(path)?;
    let parsed = hsc_parser::parse(&source);
    let file_name = path.display().to_string();

    let mut has_errors = report_parse_errors(&source, &file_name, &parsed);

    let Some(file) = parsed.source_file() else {
        return Err("parsing produced no module".to_string());
    };

    let (module, kind_errors, type_errors) = hsc_typeck::typecheck(&file);

    for err in &kind_errors {
        has_errors = true;
        eprintln!("error: {err}");
    }
    for err in &type_errors {
        has_errors = true;
        let rendered = hsc_typeck::diagnostics::render_diagnostic(err, &source, &file_name);
        eprint!("{rendered}");
    }

    if has_errors {
        return Err(format!("compilation of '{}' failed due to errors above", path.display()));
    }

    eprintln!("  Checked: {} ({} binding group(s))", path.display(), module.bindings.len());

    if dump_types {
        for gen_bind in &module.bindings {
            for decl in &gen_bind.decls {
                let scheme = hsc_typeck::ty::Scheme {
                    vars: gen_bind.quantified.clone(),
                    context: gen_bind.dict_params.iter().map(|d| d.constraint.clone()).collect(),
                    ty: decl.ty.clone(),
                };
                println!("{} :: {}", decl.name, scheme);
            }
        }
    }

    Ok(())
}

fn dump_ast(path: &Path) -> Result<(), String> {
    let source = read_source(path)?;
    let parsed = hsc_parser::parse(&source);
    let file_name = path.display().to_string();
    let has_errors = report_parse_errors(&source, &file_name, &parsed);
    println!("{:#?}", parsed.syntax());
    if has_errors {
        return Err(format!("'{}' has syntax errors (tree printed above is partial)", path.display()));
    }
    Ok(())
}

fn dump_kinds(path: &Path) -> Result<(), String> {
    let source = read_source(path)?;
    let parsed = hsc_parser::parse(&source);
    let file_name = path.display().to_string();
    let mut has_errors = report_parse_errors(&source, &file_name, &parsed);

    let Some(file) = parsed.source_file() else {
        return Err("parsing produced no module".to_string());
    };
    let (tce, _class_param_kinds, kind_errors) = hsc_kinds::check_module(&file);

    for err in &kind_errors {
        has_errors = true;
        eprintln!("error: {err}");
    }

    let mut entries: Vec<_> = tce.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    for (name, info) in entries {
        println!("{name} :: {}", info.kind);
    }

    if has_errors {
        return Err(format!("kind checking of '{}' failed due to errors above", path.display()));
    }
    Ok(())
}

/// Render every parse error with `ariadne`, matching `snowc`'s own
/// `report_diagnostics` for parse errors. Returns whether any were found.
fn report_parse_errors(source: &str, file_name: &str, parsed: &hsc_parser::Parse) -> bool {
    use ariadne::{Label, Report, ReportKind, Source};

    let mut has_errors = false;
    for error in &parsed.errors {
        has_errors = true;
        let start = error.span.start as usize;
        let end = (error.span.end as usize).max(start + 1);
        let _ = Report::<std::ops::Range<usize>>::build(ReportKind::Error, start..end)
            .with_message("Parse error")
            .with_label(Label::new(start..end).with_message(&error.message))
            .finish()
            .eprint(Source::from(source));
        let _ = file_name;
    }
    has_errors
}
