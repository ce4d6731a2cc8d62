//! Pipeline inspection tool.
//!
//! Runs a Silt source file through the pipeline and prints the requested
//! stage: the raw token stream, the parse diagnostics, or the rendered
//! source. Token and error dumps are JSON so they can feed other tooling.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::Parser;

use silt::api::{self, OutputFormat, ProcessArgs};

#[derive(Parser)]
#[command(
    name = "silt",
    version,
    about = "Inspect the Silt parsing pipeline stage by stage"
)]
struct Args {
    /// Input file; `-` reads stdin.
    input: PathBuf,
    /// Stage to emit: tokens, errors, or render.
    #[arg(long, default_value = "render")]
    stage: String,
}

fn main() {
    let args = Args::parse();
    let format = match args.stage.parse::<OutputFormat>() {
        Ok(format) => format,
        Err(message) => {
            eprintln!("error: {}", message);
            process::exit(2);
        }
    };
    let (content, source_path) = match read_input(&args.input) {
        Ok(pair) => pair,
        Err(err) => {
            eprintln!("error: {}: {}", args.input.display(), err);
            process::exit(1);
        }
    };
    match api::process(ProcessArgs {
        content,
        source_path,
        format,
    }) {
        Ok(output) => {
            print!("{}", output);
            if !output.ends_with('\n') {
                println!();
            }
        }
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    }
}

fn read_input(path: &PathBuf) -> Result<(String, String), io::Error> {
    if path.to_str() == Some("-") {
        let mut content = String::new();
        io::stdin().read_to_string(&mut content)?;
        return Ok((content, "<stdin>".to_string()));
    }
    let content = fs::read_to_string(path)?;
    Ok((content, path.display().to_string()))
}
