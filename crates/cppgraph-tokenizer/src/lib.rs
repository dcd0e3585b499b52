//! cppgraph Tokenizer
//!
//! Extracts the build-relevant parts of C++ source text: preprocessor
//! conditionals, defines, includes and module declarations. Everything else
//! is skipped, so this is not a general C++ lexer.
//!
//! ## Modules
//!
//! - `cursor` - Bounds-checked cursor shared by all scanners
//! - `condition` - `#if` expression parsing into flat condition elements
//! - `preprocessor` - `#define`, `#undef`, `#if*`, `#include` and friends
//! - `declaration` - `module`, `import` and `export` declarations
//! - `token` - Token types and their source rendering
//!
//! Malformed input never produces an error. The offending construct yields
//! no token and scanning resumes at the next plausible position.

pub mod condition;
pub mod cursor;
pub mod declaration;
pub mod preprocessor;
mod stl;
pub mod token;

pub use cppgraph_core::Visibility;
pub use stl::is_stl_header;
pub use token::{ConditionElement, Token};

use cursor::{is_identifier_byte, Cursor};
use std::path::Path;

/// Tokenize a whole source buffer.
///
/// The result depends only on `source`; tokenizing the same text twice
/// yields equal sequences.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut cursor = Cursor::new(source);
    let mut tokens = Vec::new();
    // declarations only start at the first token of a line
    let mut line_start = true;

    while !cursor.at_end() {
        match cursor.current_char() {
            b'\n' => {
                cursor.advance();
                line_start = true;
            }
            _ if cursor.is_space() => cursor.advance(),
            b'#' => {
                preprocessor::directive(&mut cursor, &mut tokens);
                line_start = true;
            }
            b'/' if cursor.is_line_comment() => {
                cursor.skip_comment();
                line_start = true;
            }
            b'/' if cursor.is_multiline_comment() => cursor.skip_comment(),
            c => {
                match c {
                    b'"' => cursor.skip_string(),
                    b'\'' => cursor.skip_char_literal(),
                    c if c.is_ascii_digit() => skip_number(&mut cursor),
                    c if is_identifier_byte(c) => {
                        let word = cursor.identifier();

                        let keyword = matches!(word.as_str(), "module" | "import" | "export");
                        if line_start && keyword {
                            declaration::declaration(&mut cursor, &word, &mut tokens);
                        }
                    }
                    _ => cursor.advance(),
                }
                line_start = false;
            }
        }
    }

    tokens
}

/// Read and tokenize a file. Invalid UTF-8 is replaced rather than rejected.
pub fn tokenize_file(path: &Path) -> std::io::Result<Vec<Token>> {
    let bytes = std::fs::read(path)?;
    Ok(tokenize(&String::from_utf8_lossy(&bytes)))
}

// numbers may contain digit separators: 1'000'000
fn skip_number(cursor: &mut Cursor<'_>) {
    while !cursor.at_end() {
        let c = cursor.current_char();
        if is_identifier_byte(c) || c == b'.' || c == b'\'' {
            cursor.advance();
        } else {
            return;
        }
    }
}

#[cfg(test)]
mod tests;
