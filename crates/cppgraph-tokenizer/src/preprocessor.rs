//! Preprocessor directive scanner
//!
//! Entered with the cursor on `#`. Each directive contributes zero, one or
//! (for `#elif*`) two tokens and leaves the cursor on the `\n` that ends the
//! logical line, or at the end of the buffer.

use crate::condition::{delimited, parse_condition, parse_ifdef, parse_ifndef};
use crate::cursor::Cursor;
use crate::stl::is_stl_header;
use crate::token::Token;

pub fn directive(cursor: &mut Cursor<'_>, tokens: &mut Vec<Token>) {
    cursor.advance();
    cursor.skip_space_comment_macronewline();

    match cursor.identifier().as_str() {
        "define" => define(cursor, tokens),
        "undef" => undef(cursor, tokens),
        "if" => {
            let elements = parse_condition(cursor);
            tokens.push(Token::If { elements });
        }
        "ifdef" => {
            let elements = parse_ifdef(cursor);
            tokens.push(Token::If { elements });
        }
        "ifndef" => {
            let elements = parse_ifndef(cursor);
            tokens.push(Token::If { elements });
        }
        "else" => tokens.push(Token::Else),
        "elif" => {
            tokens.push(Token::Else);
            let elements = parse_condition(cursor);
            tokens.push(Token::If { elements });
        }
        "elifdef" => {
            tokens.push(Token::Else);
            let elements = parse_ifdef(cursor);
            tokens.push(Token::If { elements });
        }
        "elifndef" => {
            tokens.push(Token::Else);
            let elements = parse_ifndef(cursor);
            tokens.push(Token::If { elements });
        }
        "endif" => tokens.push(Token::EndIf),
        "include" | "import" => include(cursor, tokens),
        _ => {}
    }

    cursor.skip_macro();
}

fn define(cursor: &mut Cursor<'_>, tokens: &mut Vec<Token>) {
    cursor.skip_space_comment_macronewline();
    let name = define_name(cursor);

    if name.is_empty() {
        return;
    }

    cursor.skip_space_comment_macronewline();
    let value = define_value(cursor);
    tokens.push(Token::Define { name, value });
}

/// Macro name including the parameter list of a function-like macro.
fn define_name(cursor: &mut Cursor<'_>) -> String {
    let begin = cursor.pos();
    let name = cursor.identifier();

    if name.is_empty() || cursor.current_char() != b'(' {
        return name;
    }

    while !cursor.at_end() && !cursor.is_end_of_line() {
        let c = cursor.current_char();
        cursor.advance();

        if c == b')' {
            return cursor.lexeme(begin, cursor.pos());
        }
    }

    name
}

/// The rest of the logical line. Physical lines joined by a trailing
/// backslash are trimmed and joined with a single space.
fn define_value(cursor: &mut Cursor<'_>) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();

    while !cursor.at_end() && !cursor.is_end_of_line() {
        if cursor.is_line_comment() {
            cursor.skip_to_end_of_line();
        } else if cursor.is_multiline_comment() {
            cursor.skip_multiline_comment();
            line.push(' ');
        } else if cursor.current_char() == b'\\' && continues_line(cursor) {
            cursor.skip_line();
            lines.push(std::mem::take(&mut line));
        } else if cursor.current_char() == b'"' {
            let begin = cursor.pos();
            cursor.skip_string();
            line.push_str(&cursor.lexeme(begin, cursor.pos()));
        } else {
            let begin = cursor.pos();
            cursor.advance();
            line.push_str(&cursor.lexeme(begin, cursor.pos()));
        }
    }

    lines.push(line);
    lines
        .iter()
        .map(|l| Cursor::trim(l))
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A backslash followed only by spaces up to the end of the line.
fn continues_line(cursor: &Cursor<'_>) -> bool {
    let mut pos = cursor.pos() + 1;

    loop {
        match cursor.char_at(pos) {
            b' ' | b'\t' | b'\r' => pos += 1,
            b'\n' | 0 => return true,
            _ => return false,
        }
    }
}

fn undef(cursor: &mut Cursor<'_>, tokens: &mut Vec<Token>) {
    cursor.skip_space_comment_macronewline();
    let name = cursor.identifier();

    if !name.is_empty() {
        tokens.push(Token::Undef { name });
    }
}

fn include(cursor: &mut Cursor<'_>, tokens: &mut Vec<Token>) {
    cursor.skip_space_comment_macronewline();

    let token = match cursor.current_char() {
        b'"' => delimited(cursor, b'"').map(|name| Token::IncludeLocal { name }),
        b'<' => delimited(cursor, b'>').map(|name| {
            if is_stl_header(&name) {
                Token::IncludeStl { name }
            } else {
                Token::IncludeExternal { name }
            }
        }),
        _ => None,
    };

    if let Some(token) = token {
        tokens.push(token);
    }
}
