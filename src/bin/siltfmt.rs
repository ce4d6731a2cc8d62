//! Canonical formatter driver.
//!
//! Formats Silt source files in place, walks directories, and supports a
//! check mode for CI. `-` (or no paths) formats stdin to stdout.

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

#[derive(Parser)]
#[command(
    name = "siltfmt",
    version,
    about = "Canonical formatter for Silt source files"
)]
struct Args {
    /// Files or directories to format. `-` (or nothing) reads stdin and
    /// writes the formatted source to stdout.
    paths: Vec<PathBuf>,
    /// Don't rewrite anything; list files whose formatting would change
    /// and exit nonzero if there are any.
    #[arg(long)]
    check: bool,
}

fn main() {
    let args = Args::parse();
    let code = match run(&args) {
        Ok(code) => code,
        Err(err) => {
            report_error(&err.to_string());
            1
        }
    };
    process::exit(code);
}

fn run(args: &Args) -> Result<i32, Box<dyn std::error::Error>> {
    let stdin_mode =
        args.paths.is_empty() || (args.paths.len() == 1 && args.paths[0].to_str() == Some("-"));
    if stdin_mode {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        return match silt::api::format_source(&source) {
            Ok(formatted) => {
                io::stdout().write_all(formatted.as_bytes())?;
                Ok(0)
            }
            Err(silt::api::ProcessError::Parse(messages)) => {
                for message in messages {
                    report_error(&format!("<stdin>:{}", message));
                }
                Ok(1)
            }
            Err(err) => Err(Box::new(err)),
        };
    }

    let mut changed = false;
    let mut failed = false;
    for path in &args.paths {
        let files = if path.is_dir() {
            silt::collect_silt_files(path)?
        } else {
            vec![path.clone()]
        };
        for file in files {
            match silt::format_file(&file, args.check) {
                Ok(silt::FileStatus::Unchanged) => {}
                Ok(silt::FileStatus::Rewritten) | Ok(silt::FileStatus::WouldChange) => {
                    println!("{}", file.display());
                    changed = true;
                }
                Err(err) => {
                    report_error(&format!("{}: {}", file.display(), err));
                    failed = true;
                }
            }
        }
    }
    if failed {
        return Ok(1);
    }
    Ok(if args.check && changed { 1 } else { 0 })
}

fn report_error(message: &str) {
    let choice = if atty::is(atty::Stream::Stderr) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stderr = StandardStream::stderr(choice);
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = write!(stderr, "error: ");
    let _ = stderr.reset();
    let _ = writeln!(stderr, "{}", message);
}
