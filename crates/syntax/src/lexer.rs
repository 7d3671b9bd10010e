//! Hand-written lexer for the definition mini-language.
//!
//! The alphabet is small: parentheses, the `define`/`lambda`/`exists`/
//! `@exists` keywords, boolean literals, numbers, quoted strings,
//! `YYYY-MM-DD` dates, identifiers (including the operator names of the
//! builtin library), `:` and the type arrow `=>`.

use chrono::NaiveDate;

use crate::error::SyntaxError;

/// The kind of a lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    LParen,
    RParen,
    Define,
    Lambda,
    Exists,
    /// `@exists`: a quantifier whose bindings answer the question.
    ExistsMarked,
    True,
    False,
    Number(f64),
    Str(String),
    Date(NaiveDate),
    Ident(String),
    /// The type arrow `=>`.
    Arrow,
    Colon,
}

impl TokenKind {
    /// A short description for error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::Define => "'define'".to_string(),
            TokenKind::Lambda => "'lambda'".to_string(),
            TokenKind::Exists => "'exists'".to_string(),
            TokenKind::ExistsMarked => "'@exists'".to_string(),
            TokenKind::True => "'True'".to_string(),
            TokenKind::False => "'False'".to_string(),
            TokenKind::Number(n) => format!("number {n}"),
            TokenKind::Str(s) => format!("string \"{s}\""),
            TokenKind::Date(d) => format!("date {d}"),
            TokenKind::Ident(name) => format!("identifier '{name}'"),
            TokenKind::Arrow => "'=>'".to_string(),
            TokenKind::Colon => "':'".to_string(),
        }
    }
}

/// A token with its byte offset in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

/// Lex definition source into a token sequence.
pub fn lex(source: &str) -> Result<Vec<Token>, SyntaxError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let b = bytes[pos];
        match b {
            b' ' | b'\t' | b'\r' | b'\n' => pos += 1,
            b'(' => {
                tokens.push(Token {
                    kind: TokenKind::LParen,
                    offset: pos,
                });
                pos += 1;
            }
            b')' => {
                tokens.push(Token {
                    kind: TokenKind::RParen,
                    offset: pos,
                });
                pos += 1;
            }
            b':' => {
                tokens.push(Token {
                    kind: TokenKind::Colon,
                    offset: pos,
                });
                pos += 1;
            }
            b'"' => {
                let start = pos;
                pos += 1;
                let content_start = pos;
                while pos < bytes.len() && bytes[pos] != b'"' {
                    pos += 1;
                }
                if pos >= bytes.len() {
                    return Err(SyntaxError::UnterminatedString { offset: start });
                }
                tokens.push(Token {
                    kind: TokenKind::Str(source[content_start..pos].to_string()),
                    offset: start,
                });
                pos += 1;
            }
            b'=' => {
                let start = pos;
                match bytes.get(pos + 1) {
                    Some(b'>') => {
                        tokens.push(Token {
                            kind: TokenKind::Arrow,
                            offset: start,
                        });
                        pos += 2;
                    }
                    Some(b'=') => {
                        tokens.push(Token {
                            kind: TokenKind::Ident("==".to_string()),
                            offset: start,
                        });
                        pos += 2;
                    }
                    _ => {
                        return Err(SyntaxError::IllegalCharacter {
                            ch: '=',
                            offset: start,
                        })
                    }
                }
            }
            b'!' => {
                if bytes.get(pos + 1) == Some(&b'=') {
                    tokens.push(Token {
                        kind: TokenKind::Ident("!=".to_string()),
                        offset: pos,
                    });
                    pos += 2;
                } else {
                    return Err(SyntaxError::IllegalCharacter {
                        ch: '!',
                        offset: pos,
                    });
                }
            }
            b'<' | b'>' => {
                let mut op = (b as char).to_string();
                if bytes.get(pos + 1) == Some(&b'=') {
                    op.push('=');
                }
                let len = op.len();
                tokens.push(Token {
                    kind: TokenKind::Ident(op),
                    offset: pos,
                });
                pos += len;
            }
            b'+' | b'-' | b'*' | b'/' => {
                tokens.push(Token {
                    kind: TokenKind::Ident((b as char).to_string()),
                    offset: pos,
                });
                pos += 1;
            }
            b'@' => {
                let start = pos;
                if source[pos..].starts_with("@exists") {
                    tokens.push(Token {
                        kind: TokenKind::ExistsMarked,
                        offset: start,
                    });
                    pos += "@exists".len();
                } else {
                    return Err(SyntaxError::IllegalCharacter {
                        ch: '@',
                        offset: start,
                    });
                }
            }
            b'0'..=b'9' => {
                let start = pos;
                let (kind, next) = scan_numeric(source, pos)?;
                tokens.push(Token {
                    kind,
                    offset: start,
                });
                pos = next;
            }
            b'A'..=b'Z' | b'a'..=b'z' => {
                let start = pos;
                while pos < bytes.len() && bytes[pos].is_ascii_alphanumeric() {
                    pos += 1;
                }
                let word = &source[start..pos];
                let kind = match word {
                    "define" => TokenKind::Define,
                    "lambda" => TokenKind::Lambda,
                    "exists" => TokenKind::Exists,
                    "True" => TokenKind::True,
                    "False" => TokenKind::False,
                    other => TokenKind::Ident(other.to_string()),
                };
                tokens.push(Token {
                    kind,
                    offset: start,
                });
            }
            other => {
                return Err(SyntaxError::IllegalCharacter {
                    ch: other as char,
                    offset: pos,
                })
            }
        }
    }
    Ok(tokens)
}

/// Scan a number or a `YYYY-MM-DD` date literal starting at `pos`.
fn scan_numeric(source: &str, pos: usize) -> Result<(TokenKind, usize), SyntaxError> {
    let bytes = source.as_bytes();

    // date lookahead: exactly 4-2-2 digit groups
    if is_date_at(bytes, pos) {
        let text = &source[pos..pos + 10];
        let year: i32 = text[0..4].parse().unwrap_or(0);
        let month: u32 = text[5..7].parse().unwrap_or(0);
        let day: u32 = text[8..10].parse().unwrap_or(0);
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            SyntaxError::InvalidDate {
                text: text.to_string(),
            }
        })?;
        return Ok((TokenKind::Date(date), pos + 10));
    }

    let mut end = pos;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' && bytes.get(end + 1).is_some_and(|b| b.is_ascii_digit()) {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    // the grammar guarantees this parses
    let number: f64 = source[pos..end].parse().expect("scanned digits");
    Ok((TokenKind::Number(number), end))
}

fn is_date_at(bytes: &[u8], pos: usize) -> bool {
    if pos + 10 > bytes.len() {
        return false;
    }
    let digits = |range: std::ops::Range<usize>| range.into_iter().all(|i| bytes[i].is_ascii_digit());
    digits(pos..pos + 4)
        && bytes[pos + 4] == b'-'
        && digits(pos + 5..pos + 7)
        && bytes[pos + 7] == b'-'
        && digits(pos + 8..pos + 10)
}
