//! Tokenizer for binding-template fragments.

use std::fmt;

use super::ExprError;

/// Operator symbols, longest first so `===` wins over `==` and `=`.
const SYMBOLS: &[&str] = &[
    "===", "!==", "==", "!=", "<=", ">=", "&&", "||", "<", ">", "!", "+", "-", "*", "/", "%",
];

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    Symbol(&'static str),
    Assign,
    Dot,
    LParen,
    RParen,
    LBracket,
    RBracket,
    /// `;`
    Semi,
    /// A line break; separates statements, ignored inside expressions.
    Newline,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "number {}", n),
            Self::Str(s) => write!(f, "string '{}'", s),
            Self::Ident(i) => write!(f, "'{}'", i),
            Self::Symbol(s) => write!(f, "'{}'", s),
            Self::Assign => f.write_str("'='"),
            Self::Dot => f.write_str("'.'"),
            Self::LParen => f.write_str("'('"),
            Self::RParen => f.write_str("')'"),
            Self::LBracket => f.write_str("'['"),
            Self::RBracket => f.write_str("']'"),
            Self::Semi => f.write_str("';'"),
            Self::Newline => f.write_str("line break"),
        }
    }
}

/// A token with its byte offset in the fragment.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub offset: usize,
}

pub(crate) fn tokenize(source: &str) -> Result<Vec<Spanned>, ExprError> {
    let mut tokens = Vec::new();
    let bytes = source.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let offset = i;

        if b == b'\n' {
            tokens.push(Spanned { token: Token::Newline, offset });
            i += 1;
            continue;
        }
        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        if b.is_ascii_digit() || (b == b'.' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit)) {
            let (number, end) = lex_number(source, i)?;
            tokens.push(Spanned { token: Token::Number(number), offset });
            i = end;
            continue;
        }

        if b == b'\'' || b == b'"' {
            let (text, end) = lex_string(source, i)?;
            tokens.push(Spanned { token: Token::Str(text), offset });
            i = end;
            continue;
        }

        if is_ident_start(b) {
            let mut end = i + 1;
            while end < bytes.len() && is_ident_continue(bytes[end]) {
                end += 1;
            }
            tokens.push(Spanned {
                token: Token::Ident(source[i..end].to_string()),
                offset,
            });
            i = end;
            continue;
        }

        let single = match b {
            b'.' => Some(Token::Dot),
            b'(' => Some(Token::LParen),
            b')' => Some(Token::RParen),
            b'[' => Some(Token::LBracket),
            b']' => Some(Token::RBracket),
            b';' => Some(Token::Semi),
            _ => None,
        };
        if let Some(token) = single {
            tokens.push(Spanned { token, offset });
            i += 1;
            continue;
        }

        let rest = &source[i..];
        if let Some(symbol) = SYMBOLS.iter().find(|s| rest.starts_with(**s)) {
            tokens.push(Spanned { token: Token::Symbol(symbol), offset });
            i += symbol.len();
            continue;
        }
        if b == b'=' {
            tokens.push(Spanned { token: Token::Assign, offset });
            i += 1;
            continue;
        }

        let ch = rest.chars().next().unwrap_or('\u{FFFD}');
        return Err(ExprError::UnexpectedChar { ch, offset });
    }

    Ok(tokens)
}

fn lex_number(source: &str, start: usize) -> Result<(f64, usize), ExprError> {
    let bytes = source.as_bytes();
    let mut end = start;
    while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
        end += 1;
    }
    // Exponent: 1e3, 2.5E-4
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp = end + 1;
        if exp < bytes.len() && (bytes[exp] == b'+' || bytes[exp] == b'-') {
            exp += 1;
        }
        if exp < bytes.len() && bytes[exp].is_ascii_digit() {
            while exp < bytes.len() && bytes[exp].is_ascii_digit() {
                exp += 1;
            }
            end = exp;
        }
    }
    let text = &source[start..end];
    text.parse::<f64>()
        .map(|n| (n, end))
        .map_err(|_| ExprError::InvalidNumber {
            text: text.to_string(),
            offset: start,
        })
}

fn lex_string(source: &str, start: usize) -> Result<(String, usize), ExprError> {
    let mut chars = source[start..].char_indices();
    let (_, quote) = chars.next().ok_or(ExprError::UnterminatedString { offset: start })?;
    let mut text = String::new();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            c if c == quote => return Ok((text, start + idx + c.len_utf8())),
            '\\' => match chars.next() {
                Some((_, 'n')) => text.push('\n'),
                Some((_, 't')) => text.push('\t'),
                Some((_, escaped)) => text.push(escaped),
                None => break,
            },
            c => text.push(c),
        }
    }
    Err(ExprError::UnterminatedString { offset: start })
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn comparison_tokens() {
        assert_eq!(
            kinds("this.amount >= 1.5e2"),
            vec![
                Token::Ident("this".into()),
                Token::Dot,
                Token::Ident("amount".into()),
                Token::Symbol(">="),
                Token::Number(150.0),
            ]
        );
    }

    #[test]
    fn strict_equality_beats_assignment() {
        assert_eq!(
            kinds("a === 'US' ; b = \"x\""),
            vec![
                Token::Ident("a".into()),
                Token::Symbol("==="),
                Token::Str("US".into()),
                Token::Semi,
                Token::Ident("b".into()),
                Token::Assign,
                Token::Str("x".into()),
            ]
        );
    }

    #[test]
    fn string_escapes() {
        assert_eq!(kinds(r"'it\'s'"), vec![Token::Str("it's".into())]);
    }

    #[test]
    fn unterminated_string() {
        assert_eq!(
            tokenize("'open").unwrap_err(),
            ExprError::UnterminatedString { offset: 0 }
        );
    }

    #[test]
    fn single_ampersand_is_rejected() {
        assert_eq!(
            tokenize("a & b").unwrap_err(),
            ExprError::UnexpectedChar { ch: '&', offset: 2 }
        );
    }
}
