#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenKind {
    /// Run of ASCII letters
    Word,
    /// Run of ASCII digits
    Number,
    /// A single space character
    Space,
    /// Any other single character, including every non-ASCII code point
    Symbol,
}

/// Atomic comparison unit
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token {
    kind: TokenKind,
    text: String,
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Split text into words, numbers, single spaces and single other characters.
///
/// Lossless: concatenating the returned tokens yields `text` again.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = text;

    while let Some(first) = rest.chars().next() {
        let (kind, len) = if first.is_ascii_alphabetic() {
            (TokenKind::Word, run_len(rest, |c| c.is_ascii_alphabetic()))
        } else if first.is_ascii_digit() {
            (TokenKind::Number, run_len(rest, |c| c.is_ascii_digit()))
        } else if first == ' ' {
            (TokenKind::Space, 1)
        } else {
            (TokenKind::Symbol, first.len_utf8())
        };

        let (head, tail) = rest.split_at(len);
        tokens.push(Token {
            kind,
            text: head.to_string(),
        });
        rest = tail;
    }

    tokens
}

/// Byte length of the leading run of ASCII characters matching `pred`
fn run_len(s: &str, pred: impl Fn(u8) -> bool) -> usize {
    s.bytes().take_while(|b| pred(*b)).count()
}

/// Concatenate token text with no separator
pub fn join_tokens(tokens: &[Token]) -> String {
    tokens.iter().map(Token::as_str).collect()
}
