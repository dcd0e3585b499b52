//! `#if` expression parsing
//!
//! Produces a flat list of [`ConditionElement`]s rather than a tree. The
//! parser stops at the end of the logical directive line and never fails:
//! text it does not understand is skipped.

use crate::cursor::Cursor;
use crate::token::ConditionElement;

/// Parse the expression following `#if`/`#elif` up to the end of the line.
pub fn parse_condition(cursor: &mut Cursor<'_>) -> Vec<ConditionElement> {
    let mut elements = Vec::new();
    cursor.skip_space_comment_macronewline();

    while !cursor.at_end() && !cursor.is_end_of_line() {
        let before = cursor.pos();
        element(cursor, &mut elements);

        if cursor.pos() == before {
            cursor.advance();
        }

        cursor.skip_space_comment_macronewline();
    }

    elements
}

/// `#ifdef NAME`
pub fn parse_ifdef(cursor: &mut Cursor<'_>) -> Vec<ConditionElement> {
    cursor.skip_space_comment_macronewline();
    let name = cursor.identifier();
    cursor.skip_macro();

    if name.is_empty() {
        Vec::new()
    } else {
        vec![ConditionElement::Defined { name }]
    }
}

/// `#ifndef NAME`, always `Not` followed by `Defined`.
pub fn parse_ifndef(cursor: &mut Cursor<'_>) -> Vec<ConditionElement> {
    let mut elements = parse_ifdef(cursor);

    if !elements.is_empty() {
        elements.insert(0, ConditionElement::Not);
    }

    elements
}

fn element(cursor: &mut Cursor<'_>, elements: &mut Vec<ConditionElement>) {
    match (cursor.current_char(), cursor.peek()) {
        (b'!', b'=') => {
            // `!=` without a left operand
            cursor.advance_by(2);
        }
        (b'!', _) => {
            cursor.advance();
            negation(cursor, elements);
        }
        (b'(', _) => {
            cursor.advance();
            elements.push(ConditionElement::LeftBracket);
        }
        (b')', _) => {
            cursor.advance();
            elements.push(ConditionElement::RightBracket);
        }
        (b'&', b'&') => {
            cursor.advance_by(2);
            elements.push(ConditionElement::And);
        }
        (b'|', b'|') => {
            cursor.advance_by(2);
            elements.push(ConditionElement::Or);
        }
        _ => operand(cursor, elements),
    }
}

fn negation(cursor: &mut Cursor<'_>, elements: &mut Vec<ConditionElement>) {
    cursor.skip_space_comment_macronewline();
    let start = cursor.pos();

    if cursor.identifier() == "defined" {
        if let Some(name) = defined_operand(cursor) {
            elements.push(ConditionElement::NotDefined { name });
        }
    } else {
        cursor.rewind(start);
        elements.push(ConditionElement::Not);
    }
}

fn operand(cursor: &mut Cursor<'_>, elements: &mut Vec<ConditionElement>) {
    let left = cursor.value();

    match left.as_str() {
        "" => {}
        "defined" => {
            if let Some(name) = defined_operand(cursor) {
                elements.push(ConditionElement::Defined { name });
            }
        }
        "__has_include" => {
            if let Some(element) = has_include(cursor) {
                elements.push(element);
            }
        }
        _ => comparison(cursor, left, elements),
    }
}

#[derive(Clone, Copy)]
enum Relation {
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEquals,
    GreaterThan,
    GreaterThanOrEquals,
}

impl Relation {
    fn at(cursor: &Cursor<'_>) -> Option<(Self, usize)> {
        match (cursor.current_char(), cursor.peek()) {
            (b'=', b'=') => Some((Self::Equals, 2)),
            (b'!', b'=') => Some((Self::NotEquals, 2)),
            (b'<', b'=') => Some((Self::LessThanOrEquals, 2)),
            (b'<', _) => Some((Self::LessThan, 1)),
            (b'>', b'=') => Some((Self::GreaterThanOrEquals, 2)),
            (b'>', _) => Some((Self::GreaterThan, 1)),
            _ => None,
        }
    }

    fn element(self, left: String, right: String) -> ConditionElement {
        match self {
            Self::Equals => ConditionElement::Equals { left, right },
            Self::NotEquals => ConditionElement::NotEquals { left, right },
            Self::LessThan => ConditionElement::LessThan { left, right },
            Self::LessThanOrEquals => ConditionElement::LessThanOrEquals { left, right },
            Self::GreaterThan => ConditionElement::GreaterThan { left, right },
            Self::GreaterThanOrEquals => ConditionElement::GreaterThanOrEquals { left, right },
        }
    }
}

fn comparison(cursor: &mut Cursor<'_>, left: String, elements: &mut Vec<ConditionElement>) {
    cursor.skip_space_comment_macronewline();

    match Relation::at(cursor) {
        Some((relation, len)) => {
            cursor.advance_by(len);
            cursor.skip_space_comment_macronewline();
            let right = cursor.value();
            elements.push(relation.element(left, right));
        }
        None => {
            // a bare macro is true when it is not zero
            elements.push(ConditionElement::Not);
            elements.push(ConditionElement::Equals {
                left,
                right: "0".into(),
            });
        }
    }
}

/// Operand of `defined`: either `(NAME)` or `NAME`.
fn defined_operand(cursor: &mut Cursor<'_>) -> Option<String> {
    cursor.skip_space_comment_macronewline();

    if cursor.current_char() == b'(' {
        cursor.advance();
        cursor.skip_space_comment_macronewline();
        let name = cursor.identifier();
        cursor.skip_space_comment_macronewline();

        if cursor.current_char() == b')' && !name.is_empty() {
            cursor.advance();
            return Some(name);
        }
    } else {
        let name = cursor.identifier();

        if !name.is_empty() {
            return Some(name);
        }
    }

    cursor.skip_macro();
    None
}

fn has_include(cursor: &mut Cursor<'_>) -> Option<ConditionElement> {
    cursor.skip_space_comment_macronewline();

    if cursor.current_char() == b'(' {
        cursor.advance();
        cursor.skip_space_comment_macronewline();

        let element = match cursor.current_char() {
            b'"' => delimited(cursor, b'"').map(|name| ConditionElement::HasIncludeLocal { name }),
            b'<' => {
                delimited(cursor, b'>').map(|name| ConditionElement::HasIncludeExternal { name })
            }
            _ => None,
        };

        cursor.skip_space_comment_macronewline();

        if let Some(element) = element {
            if cursor.current_char() == b')' {
                cursor.advance();
                return Some(element);
            }
        }
    }

    cursor.skip_macro();
    None
}

/// Read a name enclosed by the opening delimiter at the cursor and `close`.
/// The name must end on the same line. Returns the trimmed name.
pub(crate) fn delimited(cursor: &mut Cursor<'_>, close: u8) -> Option<String> {
    cursor.advance();
    let begin = cursor.pos();

    while !cursor.at_end() && !cursor.is_end_of_line() {
        if cursor.current_char() == close {
            let name = cursor.lexeme(begin, cursor.pos());
            cursor.advance();
            return Some(Cursor::trim(&name).to_string());
        }
        cursor.advance();
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Vec<ConditionElement> {
        let mut cursor = Cursor::new(text);
        parse_condition(&mut cursor)
    }

    #[test]
    fn test_stops_at_end_of_line() {
        let mut cursor = Cursor::new("A > 1\n#endif");
        let elements = parse_condition(&mut cursor);
        assert_eq!(elements.len(), 1);
        assert!(cursor.is_end_of_line());
    }

    #[test]
    fn test_unknown_characters_are_skipped() {
        let elements = parse("A + 1 == 2");
        assert!(!elements.is_empty());
    }

    #[test]
    fn test_negated_bracket() {
        assert_eq!(
            parse("!(A)"),
            vec![
                ConditionElement::Not,
                ConditionElement::LeftBracket,
                ConditionElement::Not,
                ConditionElement::Equals {
                    left: "A".into(),
                    right: "0".into()
                },
                ConditionElement::RightBracket,
            ]
        );
    }

    #[test]
    fn test_defined_without_brackets() {
        assert_eq!(
            parse("defined A || !defined B"),
            vec![
                ConditionElement::Defined { name: "A".into() },
                ConditionElement::Or,
                ConditionElement::NotDefined { name: "B".into() },
            ]
        );
    }

    #[test]
    fn test_trailing_line_comment() {
        let mut cursor = Cursor::new("A == 1 // note\n#endif");
        let elements = parse_condition(&mut cursor);
        assert_eq!(elements.len(), 1);
        assert!(cursor.is_end_of_line());
    }
}
