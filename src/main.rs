use abap_js::cli::{self, CliError, TranslateOptions, TranslateResult, TranslateStats};
use clap::{Parser as ClapParser, Subcommand};
use color_print::{ceprintln, cformat};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(ClapParser)]
#[command(name = "abapjs")]
#[command(about = "abapjs - Translate ABAP statements into JavaScript")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate ABAP source to JavaScript
    Translate {
        /// ABAP source file (reads stdin if neither FILE nor --source is given)
        file: Option<PathBuf>,

        /// ABAP source given inline
        #[arg(short, long, conflicts_with = "file")]
        source: Option<String>,

        /// JSON file mapping methods to their parameter order
        #[arg(long)]
        signatures: Option<PathBuf>,

        /// Only validate syntax, don't generate
        #[arg(long)]
        syntax_only: bool,

        /// Print a JSON report instead of plain JavaScript
        #[arg(long)]
        json: bool,

        /// Report per-stage diagnostics on stderr
        #[arg(short, long)]
        verbose: bool,

        /// Restart generated names at unique1
        #[arg(long)]
        fresh: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let (json, result) = match cli.command {
        Commands::Translate {
            file,
            source,
            signatures,
            syntax_only,
            json,
            verbose,
            fresh,
        } => (
            json,
            run_translate(file, source, signatures, syntax_only, json, verbose, fresh),
        ),
    };

    if let Err(e) = result {
        if json {
            println!("{}", e.to_json());
        } else {
            ceprintln!("<r,s>error</>: {}", e);
        }
        std::process::exit(1);
    }
}

fn read_source(file: Option<PathBuf>, source: Option<String>) -> Result<String, CliError> {
    match (source, file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => Ok(fs::read_to_string(path)?),
        (None, None) if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
        (None, None) => Err(CliError::NoInput),
    }
}

fn run_translate(
    file: Option<PathBuf>,
    source: Option<String>,
    signatures: Option<PathBuf>,
    syntax_only: bool,
    json: bool,
    verbose: bool,
    fresh: bool,
) -> Result<(), CliError> {
    let source = read_source(file, source)?;
    let signatures = signatures.map(fs::read_to_string).transpose()?;

    let options = TranslateOptions {
        source,
        signatures,
        syntax_only,
        fresh,
    };

    let result = cli::execute_translate(&options)?;

    if verbose {
        report(result.stats());
    }

    if json {
        println!("{}", result.to_json());
        return Ok(());
    }

    match result {
        TranslateResult::SyntaxValid(_) => println!("Syntax is valid"),
        TranslateResult::Success { javascript, .. } => println!("{}", javascript),
    }
    Ok(())
}

fn report(stats: &TranslateStats) {
    eprintln!("{}", cformat!("<c>tokens</>      {}", stats.tokens));
    eprintln!("{}", cformat!("<c>statements</>  {}", stats.statements));
    for (name, descriptor) in &stats.symbols {
        eprintln!("{}", cformat!("<g>symbol</>      {}: {}", name, descriptor));
    }
    for name in &stats.reserved_collisions {
        ceprintln!(
            "<y,s>warning</>: '{}' looks like a generated name and may clash with loop counters",
            name
        );
    }
}
