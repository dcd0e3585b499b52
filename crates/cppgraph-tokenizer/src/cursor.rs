//! Cursor over a source buffer
//!
//! Every operation is total: reading at or past the end yields `0` and
//! advancing never moves beyond the buffer length.

/// Byte cursor used by all scanners.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    source: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source: source.as_bytes(),
            pos: 0,
        }
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Move back to a previously saved position.
    pub fn rewind(&mut self, pos: usize) {
        self.pos = pos.min(self.source.len());
    }

    pub fn char_at(&self, pos: usize) -> u8 {
        self.source.get(pos).copied().unwrap_or(0)
    }

    pub fn current_char(&self) -> u8 {
        self.char_at(self.pos)
    }

    pub fn peek(&self) -> u8 {
        self.char_at(self.pos + 1)
    }

    pub fn previous_char(&self) -> u8 {
        match self.pos {
            0 => 0,
            p => self.char_at(p - 1),
        }
    }

    pub fn advance(&mut self) {
        self.advance_by(1);
    }

    pub fn advance_by(&mut self, count: usize) {
        self.pos = (self.pos + count).min(self.source.len());
    }

    /// Up to `count` bytes starting at the cursor.
    pub fn current_view(&self, count: usize) -> &'a [u8] {
        let start = self.pos.min(self.source.len());
        let end = (start + count).min(self.source.len());
        &self.source[start..end]
    }

    pub fn starts_with(&self, text: &str) -> bool {
        self.current_view(text.len()) == text.as_bytes()
    }

    /// Text between two positions, lossily decoded.
    pub fn lexeme(&self, begin: usize, end: usize) -> String {
        let end = end.min(self.source.len());
        let begin = begin.min(end);
        String::from_utf8_lossy(&self.source[begin..end]).into_owned()
    }

    /// Space, tab, carriage return, vertical tab or form feed.
    pub fn is_space(&self) -> bool {
        matches!(self.current_char(), b' ' | b'\t' | b'\r' | 0x0b | 0x0c)
    }

    /// Any space character including `\n`.
    pub fn is_current_char_space(&self) -> bool {
        self.is_space() || self.is_end_of_line()
    }

    pub fn is_end_of_line(&self) -> bool {
        self.current_char() == b'\n'
    }

    pub fn is_line_comment(&self) -> bool {
        self.current_char() == b'/' && self.peek() == b'/'
    }

    pub fn is_multiline_comment(&self) -> bool {
        self.current_char() == b'/' && self.peek() == b'*'
    }

    pub fn is_comment(&self) -> bool {
        self.is_line_comment() || self.is_multiline_comment()
    }

    pub fn is_identifier_char(&self) -> bool {
        is_identifier_byte(self.current_char())
    }

    /// Advance past the next `\n` (inclusive) or to the end.
    pub fn skip_line(&mut self) {
        while !self.at_end() {
            let c = self.current_char();
            self.advance();
            if c == b'\n' {
                return;
            }
        }
    }

    /// Advance up to, but not past, the next `\n`.
    pub fn skip_to_end_of_line(&mut self) {
        while !self.at_end() && !self.is_end_of_line() {
            self.advance();
        }
    }

    /// Skip a `//` or `/* */` comment at the cursor. An unterminated block
    /// comment runs to the end of the buffer.
    pub fn skip_comment(&mut self) {
        if self.is_line_comment() {
            self.skip_line();
        } else if self.is_multiline_comment() {
            self.skip_multiline_comment();
        }
    }

    pub fn skip_multiline_comment(&mut self) {
        self.advance_by(2);

        while !self.at_end() {
            if self.current_char() == b'*' && self.peek() == b'/' {
                self.advance_by(2);
                return;
            }
            self.advance();
        }
    }

    /// Skip spaces, newlines and comments.
    pub fn skip_space_comment_newline(&mut self) {
        while !self.at_end() {
            if self.is_comment() {
                self.skip_comment();
            } else if self.is_current_char_space() {
                self.advance();
            } else {
                return;
            }
        }
    }

    /// Skip spaces and comments on the current logical directive line.
    ///
    /// A backslash continues the line onto the next one. A `//` comment
    /// ends the line, leaving the cursor on its `\n`.
    pub fn skip_space_comment_macronewline(&mut self) {
        while !self.at_end() {
            if self.is_line_comment() {
                self.skip_to_end_of_line();
            } else if self.current_char() == b'\\' {
                self.skip_line();
            } else if self.is_multiline_comment() {
                self.skip_multiline_comment();
            } else if self.is_space() {
                self.advance();
            } else {
                return;
            }
        }
    }

    /// Skip the remainder of a directive including its continuation lines.
    /// The cursor stops on the terminating `\n`.
    pub fn skip_macro(&mut self) {
        while !self.at_end() {
            if self.is_line_comment() {
                self.skip_to_end_of_line();
            } else if self.current_char() == b'\\' {
                self.skip_line();
            } else if self.is_multiline_comment() {
                self.skip_multiline_comment();
            } else if self.is_end_of_line() {
                return;
            } else {
                self.advance();
            }
        }
    }

    /// Run of `_` and ASCII alphanumerics.
    pub fn identifier(&mut self) -> String {
        let begin = self.pos;
        while !self.at_end() && self.is_identifier_char() {
            self.advance();
        }
        self.lexeme(begin, self.pos)
    }

    /// A quoted string (quotes kept) or an identifier.
    pub fn value(&mut self) -> String {
        let begin = self.pos;

        if self.current_char() == b'"' {
            self.skip_string();
            self.lexeme(begin, self.pos)
        } else {
            self.identifier()
        }
    }

    /// Skip a string literal starting at the opening quote. A preceding `R`
    /// makes it a raw string.
    pub fn skip_string(&mut self) {
        if self.previous_char() == b'R' {
            self.skip_raw_string();
        } else {
            self.skip_regular_string();
        }
    }

    /// Skip a character literal starting at the opening `'`. Stops at the
    /// end of the line when unterminated.
    pub fn skip_char_literal(&mut self) {
        self.advance();

        while !self.at_end() && !self.is_end_of_line() {
            match self.current_char() {
                b'\\' => self.advance_by(2),
                b'\'' => {
                    self.advance();
                    return;
                }
                _ => self.advance(),
            }
        }
    }

    fn skip_regular_string(&mut self) {
        self.advance();

        while !self.at_end() && !self.is_end_of_line() {
            match self.current_char() {
                b'\\' => self.advance_by(2),
                b'"' => {
                    self.advance();
                    return;
                }
                _ => self.advance(),
            }
        }
    }

    // R"delim( ... )delim"
    fn skip_raw_string(&mut self) {
        self.advance();
        let begin = self.pos;

        while !self.at_end() && self.current_char() != b'(' {
            if self.is_end_of_line() {
                return;
            }
            self.advance();
        }

        let mut terminator = Vec::with_capacity(self.pos - begin + 2);
        terminator.push(b')');
        terminator.extend_from_slice(&self.source[begin..self.pos]);
        terminator.push(b'"');

        while !self.at_end() {
            if self.current_view(terminator.len()) == terminator.as_slice() {
                self.advance_by(terminator.len());
                return;
            }
            self.advance();
        }
    }

    /// Trim ASCII whitespace from both ends.
    pub fn trim(input: &str) -> &str {
        input.trim_matches(|c: char| c.is_ascii_whitespace() || c == '\x0b')
    }
}

pub fn is_identifier_byte(c: u8) -> bool {
    c == b'_' || c.is_ascii_alphanumeric()
}
