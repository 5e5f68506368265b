use crate::span::Span;

/// Single-character punctuation recognised by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punct {
    BraceOpen,
    BraceClose,
    BracketOpen,
    BracketClose,
    Colon,
    Comma,
}

impl Punct {
    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'{' => Some(Self::BraceOpen),
            b'}' => Some(Self::BraceClose),
            b'[' => Some(Self::BracketOpen),
            b']' => Some(Self::BracketClose),
            b':' => Some(Self::Colon),
            b',' => Some(Self::Comma),
            _ => None,
        }
    }
}

/// Keyword literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    True,
    False,
    Null,
}

/// The default keyword table.
pub const JSON_KEYWORDS: &[(&str, Keyword)] = &[
    ("true", Keyword::True),
    ("false", Keyword::False),
    ("null", Keyword::Null),
];

/// Lexical classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Punct(Punct),
    /// Quoted run, quotes included in the span.
    String,
    Number,
    Keyword(Keyword),
    /// Run of spaces, tabs or carriage returns.
    Whitespace,
    /// A single `\n`.
    Eol,
    /// End of the tokenized range.
    Eos,
    /// Unrecognised byte, unknown identifier or unterminated string.
    Error,
}

/// A lexical token with an absolute span into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn is_punct(&self, punct: Punct) -> bool {
        self.kind == TokenKind::Punct(punct)
    }

    /// True for end-of-stream and error tokens.
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, TokenKind::Eos | TokenKind::Error)
    }
}

/// Byte-level JSON lexer over a sub-range of a source buffer.
///
/// Strings are located, not decoded: a backslash skips the following byte
/// when searching for the closing quote, and escapes are left in place.
/// Numbers are the maximal run of digits, `.`, `e`, `E`, `+` and `-` that
/// starts with a digit or `-`; the run is not validated.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    src: &'a [u8],
    pos: usize,
    end: usize,
    pushed: Option<Token>,
    keywords: &'static [(&'static str, Keyword)],
}

impl<'a> Tokenizer<'a> {
    /// Tokenize the whole source.
    pub fn new(source: &'a str) -> Self {
        Self::with_range(source, 0, source.len())
    }

    /// Tokenize `len` bytes starting at `start`. The range is clamped to the source.
    pub fn with_range(source: &'a str, start: usize, len: usize) -> Self {
        let src = source.as_bytes();
        let start = start.min(src.len());
        let end = start.saturating_add(len).min(src.len());
        Self {
            src,
            pos: start,
            end,
            pushed: None,
            keywords: JSON_KEYWORDS,
        }
    }

    /// Replace the keyword table.
    pub fn set_keywords(&mut self, keywords: &'static [(&'static str, Keyword)]) {
        self.keywords = keywords;
    }

    /// Current cursor offset (absolute). Ignores a pushed-back token.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Offset one past the last byte of the range.
    pub fn range_end(&self) -> usize {
        self.end
    }

    /// Reposition the cursor and drop any pushed-back token.
    pub fn reset(&mut self, start: usize, len: usize) {
        self.pos = start.min(self.src.len());
        self.end = self.pos.saturating_add(len).min(self.src.len());
        self.pushed = None;
    }

    /// Return a token to be yielded again by the next fetch.
    ///
    /// Only one token of lookahead is held; if the slot is already taken the
    /// token is handed back as `Err`.
    pub fn push_token(&mut self, token: Token) -> Result<(), Token> {
        if self.pushed.is_some() {
            return Err(token);
        }
        self.pushed = Some(token);
        Ok(())
    }

    /// Fetch the next token, skipping whitespace and end-of-line tokens.
    pub fn next_significant(&mut self) -> Token {
        loop {
            let token = self.next_token();
            if !matches!(token.kind, TokenKind::Whitespace | TokenKind::Eol) {
                return token;
            }
        }
    }

    /// Fetch the next raw token, including whitespace and end-of-line.
    pub fn next_token(&mut self) -> Token {
        if let Some(token) = self.pushed.take() {
            return token;
        }

        let start = self.pos;
        let Some(&byte) = self.peek() else {
            return self.token(TokenKind::Eos, start);
        };

        if let Some(punct) = Punct::from_byte(byte) {
            self.pos += 1;
            return self.token(TokenKind::Punct(punct), start);
        }

        match byte {
            b'\n' => {
                self.pos += 1;
                self.token(TokenKind::Eol, start)
            }
            b' ' | b'\t' | b'\r' => {
                while matches!(self.peek(), Some(b' ' | b'\t' | b'\r')) {
                    self.pos += 1;
                }
                self.token(TokenKind::Whitespace, start)
            }
            b'"' => self.read_string(start),
            b'-' | b'0'..=b'9' => {
                while self.peek().is_some_and(|b| is_number_byte(*b)) {
                    self.pos += 1;
                }
                self.token(TokenKind::Number, start)
            }
            b if b.is_ascii_alphabetic() => self.read_keyword(start),
            _ => {
                self.pos += utf8_len(byte);
                self.pos = self.pos.min(self.end);
                self.token(TokenKind::Error, start)
            }
        }
    }

    fn read_string(&mut self, start: usize) -> Token {
        self.pos += 1;
        while let Some(&byte) = self.peek() {
            self.pos += 1;
            match byte {
                b'"' => return self.token(TokenKind::String, start),
                b'\\' if self.pos < self.end => self.pos += 1,
                _ => {}
            }
        }
        self.token(TokenKind::Error, start)
    }

    fn read_keyword(&mut self, start: usize) -> Token {
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_')
        {
            self.pos += 1;
        }
        let word = &self.src[start..self.pos];
        let kind = self
            .keywords
            .iter()
            .find(|(literal, _)| literal.as_bytes() == word)
            .map_or(TokenKind::Error, |(_, keyword)| TokenKind::Keyword(*keyword));
        self.token(kind, start)
    }

    fn peek(&self) -> Option<&u8> {
        if self.pos < self.end {
            self.src.get(self.pos)
        } else {
            None
        }
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            span: Span::new(start, self.pos - start),
        }
    }
}

pub(crate) fn is_number_byte(byte: u8) -> bool {
    byte.is_ascii_digit() || matches!(byte, b'.' | b'e' | b'E' | b'+' | b'-')
}

fn utf8_len(lead: u8) -> usize {
    match lead {
        0xF0..=0xF7 => 4,
        0xE0..=0xEF => 3,
        0xC0..=0xDF => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut tok = Tokenizer::new(src);
        let mut out = Vec::new();
        loop {
            let token = tok.next_token();
            out.push(token.kind);
            if token.is_terminal() {
                break;
            }
        }
        out
    }

    #[test]
    fn punctuation_and_scalars() {
        assert_eq!(
            kinds(r#"{"a":[1,true]}"#),
            vec![
                TokenKind::Punct(Punct::BraceOpen),
                TokenKind::String,
                TokenKind::Punct(Punct::Colon),
                TokenKind::Punct(Punct::BracketOpen),
                TokenKind::Number,
                TokenKind::Punct(Punct::Comma),
                TokenKind::Keyword(Keyword::True),
                TokenKind::Punct(Punct::BracketClose),
                TokenKind::Punct(Punct::BraceClose),
                TokenKind::Eos,
            ]
        );
    }

    #[test]
    fn whitespace_and_eol_are_distinct_tokens() {
        assert_eq!(
            kinds(" \t\nnull"),
            vec![
                TokenKind::Whitespace,
                TokenKind::Eol,
                TokenKind::Keyword(Keyword::Null),
                TokenKind::Eos
            ]
        );
    }

    #[test]
    fn next_significant_skips_layout() {
        let mut tok = Tokenizer::new("  \n  false ");
        let token = tok.next_significant();
        assert_eq!(token.kind, TokenKind::Keyword(Keyword::False));
        assert_eq!(token.span, Span::new(5, 5));
        assert_eq!(tok.next_significant().kind, TokenKind::Eos);
    }

    #[test]
    fn string_span_includes_quotes_and_skips_escaped_quote() {
        let src = r#""a\"b" 1"#;
        let mut tok = Tokenizer::new(src);
        let token = tok.next_token();
        assert_eq!(token.kind, TokenKind::String);
        assert_eq!(token.span.slice(src), r#""a\"b""#);
    }

    #[test]
    fn unterminated_string_is_error() {
        let mut tok = Tokenizer::new("\"abc");
        assert_eq!(tok.next_token().kind, TokenKind::Error);
        assert_eq!(tok.next_token().kind, TokenKind::Eos);
    }

    #[test]
    fn number_run_is_not_validated() {
        let src = "-1.5e+3-- ";
        let mut tok = Tokenizer::new(src);
        let token = tok.next_token();
        assert_eq!(token.kind, TokenKind::Number);
        assert_eq!(token.span.slice(src), "-1.5e+3--");
    }

    #[test]
    fn unknown_identifier_and_byte_are_errors() {
        assert_eq!(kinds("nope")[0], TokenKind::Error);
        assert_eq!(kinds("@")[0], TokenKind::Error);
        assert_eq!(kinds("é")[..2], [TokenKind::Error, TokenKind::Eos]);
    }

    #[test]
    fn custom_keyword_table() {
        static KEYWORDS: &[(&str, Keyword)] = &[("yes", Keyword::True)];
        let mut tok = Tokenizer::new("yes true");
        tok.set_keywords(KEYWORDS);
        assert_eq!(tok.next_significant().kind, TokenKind::Keyword(Keyword::True));
        assert_eq!(tok.next_significant().kind, TokenKind::Error);
    }

    #[test]
    fn single_token_lookahead() {
        let mut tok = Tokenizer::new("1 2");
        let first = tok.next_significant();
        assert!(tok.push_token(first).is_ok());
        assert_eq!(tok.push_token(first), Err(first));
        assert_eq!(tok.next_significant(), first);
        assert_eq!(tok.next_significant().span, Span::new(2, 1));
    }

    #[test]
    fn sub_range_uses_absolute_offsets() {
        let src = r#"{"a":[7,8]}"#;
        let mut tok = Tokenizer::with_range(src, 5, 5);
        assert!(tok.next_token().is_punct(Punct::BracketOpen));
        let seven = tok.next_token();
        assert_eq!(seven.span, Span::new(6, 1));
        assert_eq!(seven.span.slice(src), "7");
        tok.next_token();
        tok.next_token();
        assert!(tok.next_token().is_punct(Punct::BracketClose));
        assert_eq!(tok.next_token().kind, TokenKind::Eos);
    }

    #[test]
    fn range_is_clamped() {
        let mut tok = Tokenizer::with_range("12", 1, 100);
        assert_eq!(tok.next_token().span, Span::new(1, 1));
        assert_eq!(tok.range_end(), 2);
    }
}
