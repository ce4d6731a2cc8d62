//! Silt parser, AST, and canonical formatter.
//!
//! This crate is the syntax core for the Silt systems language: a
//! tokenizer producing a flat `(tag, offset)` token stream, a
//! recursive-descent parser that fills a cache-friendly structure-of-arrays
//! AST, token-geometry queries that recompute any node's source span on
//! demand, and a renderer that prints the tree back as canonical source.
//!
//! ## Pipeline
//!
//! `Source text` → [`tokenize`] → [`parse`] → [`Ast`] → [`Ast::render`]
//!
//! The parser never fails: syntax problems are collected into
//! [`Ast::errors`] and the tree is still produced. Rendering refuses trees
//! with errors, and is idempotent: formatting already-formatted source is
//! a no-op.
//!
//! ```
//! let ast = silt::parse("const x=foo(1,2);\n");
//! assert!(ast.errors.is_empty());
//! assert_eq!(ast.render(), "const x = foo(1, 2);\n");
//! ```
//!
//! For dumping intermediate pipeline stages (token streams, diagnostics)
//! see [`api`], which backs the `silt` inspection binary; `siltfmt` is the
//! file-level formatter driver.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

pub mod api;
pub mod ast;
pub mod parser;
pub mod render;
pub mod token;
pub mod tokenizer;

pub use ast::{Ast, Location, NodeIndex, ParseError, ParseErrorTag};
pub use parser::parse;
pub use token::{Tag as TokenTag, Token, TokenIndex};
pub use tokenizer::tokenize;

impl Ast {
    /// Render the tree as canonical formatted source.
    ///
    /// Panics if the tree has parse errors; check [`Ast::errors`] first.
    pub fn render(&self) -> String {
        render::render_tree(self)
    }
}

/// What [`format_file`] did (or would do) to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// Already canonically formatted.
    Unchanged,
    /// Rewritten in place.
    Rewritten,
    /// Would be rewritten; left alone because of check mode.
    WouldChange,
}

/// Format one file in place, or report what would change in check mode.
pub fn format_file(path: &Path, check_only: bool) -> Result<FileStatus, Box<dyn Error>> {
    let source = fs::read_to_string(path)?;
    let formatted = api::format_source(&source)?;
    if formatted == source {
        return Ok(FileStatus::Unchanged);
    }
    if check_only {
        return Ok(FileStatus::WouldChange);
    }
    fs::write(path, formatted)?;
    Ok(FileStatus::Rewritten)
}

/// Collect all `.silt` files under a directory, sorted for stable output.
pub fn collect_silt_files<P: AsRef<Path>>(root: P) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(root.as_ref()) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().map_or(false, |ext| ext == "silt") {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}
