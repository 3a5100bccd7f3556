//! A TOML parser for lint tooling.
//!
//! Parses TOML 1.0 and 1.1 documents into a lossless AST: every node, token
//! and comment carries its exact byte range and line/column span, duplicate
//! keys are rejected with positions, and table headers record the key path
//! they resolved to. The tree is what a lint rule wants to traverse, not a
//! deserialization target.
//!
//! ```
//! use toml_lint_ast::{parse, ParserOptions, Span};
//!
//! let ast = parse("title = \"example\"\n", &ParserOptions::default()).unwrap();
//! let top = ast.top_level_table();
//! assert_eq!(ast[top].kind.type_name(), "TOMLTopLevelTable");
//! assert_eq!(ast[top].range, Span::new(0, 17));
//! ```

pub mod ast;
mod context;
pub mod convert;
mod cursor;
pub mod error;
pub mod options;
mod parser;
mod resolver;
pub mod span;
pub mod token;
mod tokenizer;
pub mod visitor_keys;

pub use ast::{Ast, DateTimeKind, KeySegment, NodeId, NodeKind, StringStyle, TableKind, ValueKind};
pub use convert::{to_plain, PlainTable, PlainValue};
pub use error::{ErrorCode, ParseError};
pub use options::{ParserOptions, TomlVersion};
pub use span::{LineCol, Loc, Span};
pub use token::{Comment, Token, TokenKind};
pub use visitor_keys::VISITOR_KEYS;

/// Parses a TOML document into its AST.
pub fn parse<'t>(text: &'t str, options: &ParserOptions) -> Result<Ast<'t>, ParseError> {
    parser::parse_ast(text, options.version())
}

/// Data a lint framework needs beyond the tree itself.
#[derive(Copy, Clone, Debug)]
pub struct LintServices {
    pub is_toml: bool,
}

/// The result of [`parse_for_lint`].
pub struct LintParse<'t> {
    pub ast: Ast<'t>,
    /// Traversal table for visitors; see [`visitor_keys`].
    pub visitor_keys: &'static [(&'static str, &'static [&'static str])],
    pub services: LintServices,
}

/// Parses a document and bundles the traversal table and adapter services
/// a lint framework consumes alongside the AST.
pub fn parse_for_lint<'t>(
    text: &'t str,
    options: &ParserOptions,
) -> Result<LintParse<'t>, ParseError> {
    Ok(LintParse {
        ast: parse(text, options)?,
        visitor_keys: VISITOR_KEYS,
        services: LintServices { is_toml: true },
    })
}
