use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::Parser;
use vslc::codegen::Target;
use vslc::driver::{self, DumpFlags};
use vslc::raw::RawNode;
use vslc::CompileError;

/// Command-line driver for the VSL compiler core. Reads a JSON-encoded
/// external AST from stdin and writes the requested dumps to stdout.
#[derive(Parser, Debug)]
#[command(name = "vslc", about = "VSL compiler core driver")]
struct Args {
    /// Print the tree before simplification
    #[arg(short = 't')]
    tree_before: bool,

    /// Print the tree after simplification
    #[arg(short = 'T')]
    tree_after: bool,

    /// Print the symbol and string tables
    #[arg(short = 's')]
    tables: bool,

    /// Emit assembly
    #[arg(short = 'c')]
    assembly: bool,

    /// Target platform for code generation
    #[arg(long, value_enum, default_value_t = TargetArg::Linux)]
    target: TargetArg,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum TargetArg {
    Linux,
    Macos,
}

impl From<TargetArg> for Target {
    fn from(arg: TargetArg) -> Target {
        match arg {
            TargetArg::Linux => Target::Linux,
            TargetArg::Macos => Target::MacOS,
        }
    }
}

#[derive(Debug)]
enum Error {
    ReadStdin(io::Error),
    WriteStdout(io::Error),
    Malformed(serde_json::Error),
    Compile(CompileError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::ReadStdin(err) => write!(f, "reading stdin failed: {err}"),
            Error::WriteStdout(err) => write!(f, "writing stdout failed: {err}"),
            Error::Malformed(err) => write!(f, "malformed input AST: {err}"),
            Error::Compile(err) => write!(f, "{err}"),
        }
    }
}

impl From<CompileError> for Error {
    fn from(err: CompileError) -> Error {
        Error::Compile(err)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Error> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input).map_err(Error::ReadStdin)?;
    let raw: RawNode = serde_json::from_str(&input).map_err(Error::Malformed)?;

    let flags = DumpFlags {
        tree_before_simplify: args.tree_before,
        tree_after_simplify: args.tree_after,
        tables: args.tables,
        assembly: args.assembly,
    };
    let output = driver::compile(raw, args.target.into(), flags)?;

    let mut stdout = io::stdout().lock();
    for section in output.sections {
        stdout.write_all(section.as_bytes()).map_err(Error::WriteStdout)?;
        stdout.write_all(b"\n").map_err(Error::WriteStdout)?;
    }
    Ok(())
}
