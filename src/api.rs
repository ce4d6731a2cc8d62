//! Processing API.
//!
//! Pure functions for running source text through the pipeline and
//! serializing intermediate products. This module contains no I/O, CLI
//! handling, or process exits; the binaries are thin wrappers around it
//! and everything here is directly testable.

use std::error::Error;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::ast::Ast;
use crate::token::TokenIndex;
use crate::{parse, tokenize};

/// Which pipeline product to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// The flat token stream, as JSON.
    Tokens,
    /// Parse diagnostics with positions, as JSON.
    Errors,
    /// Canonical formatted source.
    Render,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tokens" => Ok(OutputFormat::Tokens),
            "errors" => Ok(OutputFormat::Errors),
            "render" => Ok(OutputFormat::Render),
            _ => Err(format!(
                "unknown stage: {} (expected tokens, errors, or render)",
                s
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProcessArgs {
    pub content: String,
    pub source_path: String,
    pub format: OutputFormat,
}

#[derive(Debug)]
pub enum ProcessError {
    /// The source has syntax errors; one rendered message per error.
    Parse(Vec<String>),
    Serialization(String),
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::Parse(messages) => {
                write!(f, "{}", messages.join("\n"))
            }
            ProcessError::Serialization(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl Error for ProcessError {}

/// One diagnostic as emitted by the `errors` stage.
#[derive(Debug, Serialize)]
struct ErrorReport {
    message: String,
    token: TokenIndex,
    line: usize,
    column: usize,
}

/// Run `content` through the pipeline and emit the requested stage. The
/// JSON stages carry the source path so dumps stay attributable when they
/// are collected from many files.
pub fn process(args: ProcessArgs) -> Result<String, ProcessError> {
    match args.format {
        OutputFormat::Tokens => {
            let tokens = tokenize(&args.content);
            let dump = serde_json::json!({
                "source": args.source_path,
                "tokens": tokens,
            });
            serde_json::to_string_pretty(&dump)
                .map_err(|e| ProcessError::Serialization(e.to_string()))
        }
        OutputFormat::Errors => {
            let ast = parse(&args.content);
            let reports: Vec<ErrorReport> = ast
                .errors
                .iter()
                .map(|parse_error| {
                    let location = ast.token_location(0, parse_error.token);
                    ErrorReport {
                        message: ast.error_message(parse_error),
                        token: parse_error.token,
                        line: location.line,
                        column: location.column,
                    }
                })
                .collect();
            let dump = serde_json::json!({
                "source": args.source_path,
                "errors": reports,
            });
            serde_json::to_string_pretty(&dump)
                .map_err(|e| ProcessError::Serialization(e.to_string()))
        }
        OutputFormat::Render => format_source(&args.content),
    }
}

/// Parse and render; syntax errors come back as positioned messages.
pub fn format_source(source: &str) -> Result<String, ProcessError> {
    let ast = parse(source);
    if !ast.errors.is_empty() {
        return Err(ProcessError::Parse(error_messages(&ast)));
    }
    Ok(ast.render())
}

/// Render every diagnostic as `line:column: message`, 1-based.
pub fn error_messages(ast: &Ast) -> Vec<String> {
    ast.errors
        .iter()
        .map(|parse_error| {
            let location = ast.token_location(0, parse_error.token);
            format!(
                "{}:{}: {}",
                location.line + 1,
                location.column + 1,
                ast.error_message(parse_error)
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_stage_formats_source() {
        let output = process(ProcessArgs {
            content: "const x=1;\n".to_string(),
            source_path: "test.silt".to_string(),
            format: OutputFormat::Render,
        })
        .unwrap();
        assert_eq!(output, "const x = 1;\n");
    }

    #[test]
    fn tokens_stage_is_json_with_source_attribution() {
        let output = process(ProcessArgs {
            content: "const".to_string(),
            source_path: "test.silt".to_string(),
            format: OutputFormat::Tokens,
        })
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["source"], "test.silt");
        assert!(value["tokens"].is_array());
    }

    #[test]
    fn errors_stage_reports_positions() {
        let output = process(ProcessArgs {
            content: "const = 1;\n".to_string(),
            source_path: "test.silt".to_string(),
            format: OutputFormat::Errors,
        })
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["source"], "test.silt");
        assert!(!value["errors"].as_array().unwrap().is_empty());
    }

    #[test]
    fn format_source_refuses_errors() {
        assert!(format_source("const = ;\n").is_err());
    }

    #[test]
    fn unknown_stage_is_rejected() {
        assert!("ast-dump".parse::<OutputFormat>().is_err());
    }
}
