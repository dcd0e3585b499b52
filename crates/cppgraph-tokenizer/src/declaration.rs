//! Module declarations and imports outside of directives
//!
//! Handles `module`, `import` and their `export` forms. Entered with the
//! cursor just past the keyword.

use crate::condition::delimited;
use crate::cursor::{is_identifier_byte, Cursor};
use crate::token::Token;
use cppgraph_core::Visibility;

pub fn declaration(cursor: &mut Cursor<'_>, keyword: &str, tokens: &mut Vec<Token>) {
    match keyword {
        "module" => module(cursor, Visibility::Private, tokens),
        "import" => import(cursor, Visibility::Private, tokens),
        "export" => export(cursor, tokens),
        _ => {}
    }
}

fn export(cursor: &mut Cursor<'_>, tokens: &mut Vec<Token>) {
    cursor.skip_space_comment_newline();
    let start = cursor.pos();

    match cursor.identifier().as_str() {
        "module" => module(cursor, Visibility::Exported, tokens),
        "import" => import(cursor, Visibility::Exported, tokens),
        _ => cursor.rewind(start),
    }
}

fn module(cursor: &mut Cursor<'_>, visibility: Visibility, tokens: &mut Vec<Token>) {
    cursor.skip_space_comment_newline();

    // global module fragment `module;`
    if cursor.current_char() == b';' {
        cursor.advance();
        return;
    }

    let Some(name) = module_name(cursor) else {
        return skip_statement(cursor);
    };

    cursor.skip_space_comment_newline();

    match cursor.current_char() {
        b';' => {
            cursor.advance();
            tokens.push(Token::Module { name, visibility });
        }
        b':' => {
            cursor.advance();
            cursor.skip_space_comment_newline();

            match partition_name(cursor) {
                Some(partition) => tokens.push(Token::ModulePartition {
                    module: name,
                    name: partition,
                    visibility,
                }),
                None => skip_statement(cursor),
            }
        }
        _ => skip_statement(cursor),
    }
}

fn import(cursor: &mut Cursor<'_>, visibility: Visibility, tokens: &mut Vec<Token>) {
    cursor.skip_space_comment_newline();

    match cursor.current_char() {
        b':' => {
            cursor.advance();
            cursor.skip_space_comment_newline();

            match partition_name(cursor) {
                Some(name) => tokens.push(Token::ImportModulePartition { name, visibility }),
                None => skip_statement(cursor),
            }
        }
        b'"' => {
            if let Some(name) = header_name(cursor, b'"') {
                tokens.push(Token::ImportIncludeLocal { name, visibility });
            }
        }
        b'<' => {
            if let Some(name) = header_name(cursor, b'>') {
                tokens.push(Token::ImportIncludeExternal { name, visibility });
            }
        }
        _ => match module_name(cursor) {
            Some(name) if end_of_statement(cursor) => {
                tokens.push(Token::ImportModule { name, visibility })
            }
            _ => skip_statement(cursor),
        },
    }
}

/// `name` followed by `;`. Consumes the `;` on success.
fn partition_name(cursor: &mut Cursor<'_>) -> Option<String> {
    let name = module_name(cursor)?;
    end_of_statement(cursor).then_some(name)
}

/// Quoted or bracketed header name followed by `;`. An unterminated name
/// leaves the cursor at the end of its line.
fn header_name(cursor: &mut Cursor<'_>, close: u8) -> Option<String> {
    let name = delimited(cursor, close)?;

    if end_of_statement(cursor) {
        Some(name)
    } else {
        skip_statement(cursor);
        None
    }
}

fn end_of_statement(cursor: &mut Cursor<'_>) -> bool {
    cursor.skip_space_comment_newline();

    if cursor.current_char() == b';' {
        cursor.advance();
        true
    } else {
        false
    }
}

/// Identifier characters and `.`, e.g. `my.module`.
fn module_name(cursor: &mut Cursor<'_>) -> Option<String> {
    let begin = cursor.pos();

    while !cursor.at_end() {
        let c = cursor.current_char();
        if is_identifier_byte(c) || c == b'.' {
            cursor.advance();
        } else {
            break;
        }
    }

    let name = cursor.lexeme(begin, cursor.pos());
    (!name.is_empty()).then_some(name)
}

/// Skip past the next `;` of a malformed declaration. Stops on the `\n`
/// before a directive line so the directive is still scanned.
fn skip_statement(cursor: &mut Cursor<'_>) {
    while !cursor.at_end() {
        if cursor.is_comment() {
            cursor.skip_comment();
            continue;
        }

        let c = cursor.current_char();

        if c == b'\n' && directive_follows(cursor) {
            return;
        }

        cursor.advance();

        if c == b';' {
            return;
        }
    }
}

/// True when the line after the `\n` at the cursor starts with `#`.
fn directive_follows(cursor: &Cursor<'_>) -> bool {
    let mut pos = cursor.pos() + 1;

    while matches!(cursor.char_at(pos), b' ' | b'\t' | b'\r') {
        pos += 1;
    }

    cursor.char_at(pos) == b'#'
}
