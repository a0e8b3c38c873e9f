use std::{fs, path::PathBuf, process, rc::Rc, time::Instant};

use clap::Parser;
use stackc::{
    ast::{ast::Tree, printer::render},
    compiler::compiler::compile,
    display_error,
    errors::errors::Error,
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::type_checker::type_check,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "stackc",
    about = "Compiles a program to bytecode for the stack machine",
    version
)]
struct Cli {
    /// Source file to compile
    file: PathBuf,

    /// Print the tree as parsed
    #[arg(long)]
    ast: bool,

    /// Print the tree after analysis
    #[arg(long)]
    decorated: bool,

    /// Write the bytecode listing here instead of stdout
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    // RUST_LOG takes precedence over the flag
    let default_filter = if cli.verbose { "stackc=debug" } else { "stackc=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with_writer(std::io::stderr)
        .init();

    let source = match fs::read_to_string(&cli.file) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("Error: cannot read {}: {}", cli.file.display(), error);
            process::exit(1);
        }
    };
    let file_name = cli
        .file
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| cli.file.display().to_string());

    let start = Instant::now();

    let tokens = match tokenize(source.clone(), Some(file_name.clone())) {
        Ok(tokens) => tokens,
        Err(error) => fail(&error, &source, None),
    };
    info!("tokenized in {:?}", start.elapsed());

    let parse_start = Instant::now();
    let (parser, parsed) = parse(tokens, Rc::new(file_name));
    let mut tree = match parsed {
        Ok(tree) => tree,
        Err(error) => fail(&error, &source, Some(parser.tree())),
    };
    info!("parsed in {:?}", parse_start.elapsed());

    if cli.ast {
        print!("{}", render(&tree));
    }

    let type_check_start = Instant::now();
    let intrinsics = match type_check(&mut tree) {
        Ok(intrinsics) => intrinsics,
        Err(error) => fail(&error, &source, Some(&tree)),
    };
    info!("type checked in {:?}", type_check_start.elapsed());

    if cli.decorated {
        print!("{}", render(&tree));
    }

    let compile_start = Instant::now();
    let program = compile(&mut tree, &intrinsics);
    info!("compiled in {:?}", compile_start.elapsed());
    info!("total time: {:?}", start.elapsed());

    match cli.output {
        Some(path) => {
            if let Err(error) = fs::write(&path, program.to_string()) {
                eprintln!("Error: cannot write {}: {}", path.display(), error);
                process::exit(1);
            }
        }
        None => print!("{}", program),
    }
}

/// Reports a compile error with the tree as it stood, then exits.
fn fail(error: &Error, source: &str, tree: Option<&Tree>) -> ! {
    display_error(error, source);
    if let Some(tree) = tree {
        eprint!("{}", render(tree));
    }
    process::exit(1);
}
