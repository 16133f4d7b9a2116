/// A maximal run of ASCII letters, digits and underscores within one line.
///
/// `start`/`end` are byte offsets into the line text (end-exclusive); since
/// tokens are ASCII they are also valid char boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Lazily yields the tokens of a single line.
pub struct Tokens<'a> {
    bytes: &'a [u8],
    line: &'a str,
    line_number: usize,
    pos: usize,
    escapes: bool,
}

/// Tokenize one line. With `escapes` enabled, the character following an
/// unescaped backslash belongs to the escape sequence (`\n`, `\t`, ...) and
/// never starts a token, so `"Hello\nworld"` yields `Hello`, `world`.
pub fn tokenize(line: &str, line_number: usize, escapes: bool) -> Tokens<'_> {
    Tokens {
        bytes: line.as_bytes(),
        line,
        line_number,
        pos: 0,
        escapes,
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let len = self.bytes.len();
        while self.pos < len && !is_word_byte(self.bytes[self.pos]) {
            if self.escapes && self.bytes[self.pos] == b'\\' {
                let run_start = self.pos;
                while self.pos < len && self.bytes[self.pos] == b'\\' {
                    self.pos += 1;
                }
                // An odd run ends in an escape backslash.
                if (self.pos - run_start) % 2 == 1 && self.pos < len && is_word_byte(self.bytes[self.pos]) {
                    self.pos += 1;
                }
                continue;
            }
            self.pos += 1;
        }
        if self.pos >= len {
            return None;
        }

        let start = self.pos;
        while self.pos < len && is_word_byte(self.bytes[self.pos]) {
            self.pos += 1;
        }
        Some(Token {
            text: self.line[start..self.pos].to_string(),
            line: self.line_number,
            start,
            end: self.pos,
        })
    }
}
