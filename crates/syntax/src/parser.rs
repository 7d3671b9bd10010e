//! Recursive descent parser for the definition mini-language.
//!
//! The grammar, S-expression shaped:
//!
//! ```text
//! program    := define* term?
//! define     := ( define NAME term )
//! term       := lambda | quantifier | NAME | literal | ( term+ )
//! lambda     := ( lambda ( param+ ) term )
//! quantifier := ( exists ( param+ ) term ) | ( @exists ( param+ ) term )
//! param      := NAME : type
//! type       := type => type | ( type ) | NAME        -- => right-associative
//! literal    := NUMBER | STRING | DATE | True | False
//! ```
//!
//! Application lists left-associate. A multi-parameter `lambda` or `exists`
//! desugars into nested single binders, inner binders first, so occurrences
//! are captured with the right De Bruijn indices as each binder is built.
//! Identifiers resolve against a [`NamingContext`]; bound names yield an
//! independent copy of their prototype, unbound names a free variable.

use lambdaqa_core::{AtomTag, LambdaTerm, LambdaType, NamingContext, Value};

use crate::error::SyntaxError;
use crate::lexer::{lex, Token, TokenKind};

/// Parser for combinator definitions and standalone terms.
///
/// Owns its naming context; `(define name term)` mutates it and records the
/// last-defined pair so callers can pick up freshly parsed combinators.
#[derive(Debug, Clone)]
pub struct TermParser {
    context: NamingContext,
    last_defined: Option<(String, LambdaTerm)>,
}

impl TermParser {
    /// Parser over an explicit context.
    pub fn new(context: NamingContext) -> Self {
        Self {
            context,
            last_defined: None,
        }
    }

    /// Parser over the standard builtin library.
    pub fn with_std_builtins() -> Self {
        Self::new(NamingContext::std_builtins())
    }

    /// The current naming context.
    pub fn context(&self) -> &NamingContext {
        &self.context
    }

    /// Consume the parser, keeping the accumulated context.
    pub fn into_context(self) -> NamingContext {
        self.context
    }

    /// The macro name and term of the most recent `define`.
    pub fn last_defined(&self) -> Option<(&str, &LambdaTerm)> {
        self.last_defined
            .as_ref()
            .map(|(name, term)| (name.as_str(), term))
    }

    /// Parse one program: any number of definitions, optionally followed by
    /// a closing term. Returns the term when present.
    pub fn parse_code(&mut self, source: &str) -> Result<Option<LambdaTerm>, SyntaxError> {
        let tokens = lex(source)?;
        let mut cursor = Cursor::new(tokens);
        let mut result = None;

        while !cursor.at_end() {
            if cursor.peek_define() {
                self.parse_define(&mut cursor)?;
            } else {
                result = Some(self.parse_term(&mut cursor)?);
                break;
            }
        }
        if let Some(tok) = cursor.peek() {
            return Err(SyntaxError::UnexpectedToken {
                expected: "end of input",
                got: tok.kind.describe(),
                offset: tok.offset,
            });
        }
        Ok(result)
    }

    /// Source a multi-line definition file body. `#` starts a comment,
    /// blank lines are skipped.
    pub fn source_defines(&mut self, text: &str) -> Result<(), SyntaxError> {
        for line in text.lines() {
            let line = line.split('#').next().unwrap_or("");
            if line.trim().is_empty() {
                continue;
            }
            self.parse_code(line)?;
        }
        Ok(())
    }

    fn parse_define(&mut self, cursor: &mut Cursor) -> Result<(), SyntaxError> {
        cursor.expect_lparen()?;
        cursor.expect(|k| matches!(k, TokenKind::Define), "'define'")?;
        let name = cursor.expect_ident()?;
        let term = self.parse_term(cursor)?;
        cursor.expect_rparen()?;
        self.context.define(name.clone(), term.clone());
        self.last_defined = Some((name, term));
        Ok(())
    }

    fn parse_term(&mut self, cursor: &mut Cursor) -> Result<LambdaTerm, SyntaxError> {
        let tok = cursor.peek_required("a term")?.clone();
        match tok.kind {
            TokenKind::LParen => match cursor.peek2() {
                Some(TokenKind::Lambda) => self.parse_lambda(cursor),
                Some(TokenKind::Exists) => self.parse_quantifier(cursor, false),
                Some(TokenKind::ExistsMarked) => self.parse_quantifier(cursor, true),
                _ => self.parse_application(cursor),
            },
            TokenKind::Ident(name) => {
                cursor.advance();
                Ok(self.resolve(&name))
            }
            TokenKind::Number(n) => {
                cursor.advance();
                Ok(LambdaTerm::literal(Value::Num(n)))
            }
            TokenKind::Str(s) => {
                cursor.advance();
                Ok(LambdaTerm::literal(Value::Str(s)))
            }
            TokenKind::Date(d) => {
                cursor.advance();
                Ok(LambdaTerm::literal(Value::Date(d)))
            }
            TokenKind::True => {
                cursor.advance();
                Ok(LambdaTerm::literal(Value::Bool(true)))
            }
            TokenKind::False => {
                cursor.advance();
                Ok(LambdaTerm::literal(Value::Bool(false)))
            }
            other => Err(SyntaxError::UnexpectedToken {
                expected: "a term",
                got: other.describe(),
                offset: tok.offset,
            }),
        }
    }

    /// `( term+ )`, folded into left-associated applications.
    fn parse_application(&mut self, cursor: &mut Cursor) -> Result<LambdaTerm, SyntaxError> {
        cursor.expect_lparen()?;
        let mut term = self.parse_term(cursor)?;
        while !cursor.peek_rparen() {
            let arg = self.parse_term(cursor)?;
            term = LambdaTerm::application(term, arg);
        }
        cursor.expect_rparen()?;
        Ok(term)
    }

    fn parse_lambda(&mut self, cursor: &mut Cursor) -> Result<LambdaTerm, SyntaxError> {
        cursor.expect_lparen()?;
        cursor.expect(|k| matches!(k, TokenKind::Lambda), "'lambda'")?;
        let mut params = self.parse_params(cursor)?;
        let body = self.parse_term(cursor)?;
        cursor.expect_rparen()?;

        let (name, ttype) = params.pop().expect("parse_params yields at least one");
        let mut term = LambdaTerm::abstraction(name, ttype, body);
        while let Some((name, ttype)) = params.pop() {
            term = LambdaTerm::abstraction(name, ttype, term);
        }
        Ok(term)
    }

    fn parse_quantifier(
        &mut self,
        cursor: &mut Cursor,
        answer_marked: bool,
    ) -> Result<LambdaTerm, SyntaxError> {
        cursor.expect_lparen()?;
        cursor.expect(
            |k| matches!(k, TokenKind::Exists | TokenKind::ExistsMarked),
            "'exists'",
        )?;
        let mut params = self.parse_params(cursor)?;
        let body = self.parse_term(cursor)?;
        cursor.expect_rparen()?;

        let (name, ttype) = params.pop().expect("parse_params yields at least one");
        let mut term = LambdaTerm::exists(name, ttype, body, answer_marked);
        while let Some((name, ttype)) = params.pop() {
            term = LambdaTerm::exists(name, ttype, term, answer_marked);
        }
        Ok(term)
    }

    /// `( param+ )` where `param := NAME : type`.
    fn parse_params(
        &mut self,
        cursor: &mut Cursor,
    ) -> Result<Vec<(String, LambdaType)>, SyntaxError> {
        cursor.expect_lparen()?;
        let mut params = Vec::new();
        loop {
            let name = cursor.expect_ident()?;
            cursor.expect(|k| matches!(k, TokenKind::Colon), "':'")?;
            let ttype = self.parse_type(cursor)?;
            params.push((name, ttype));
            if cursor.peek_rparen() {
                break;
            }
        }
        cursor.expect_rparen()?;
        Ok(params)
    }

    /// `type := atom (=> type)?`, right-associative.
    fn parse_type(&mut self, cursor: &mut Cursor) -> Result<LambdaType, SyntaxError> {
        let left = self.parse_type_atom(cursor)?;
        if cursor.peek_arrow() {
            cursor.advance();
            let right = self.parse_type(cursor)?;
            return Ok(LambdaType::concat(&left, &right));
        }
        Ok(left)
    }

    fn parse_type_atom(&mut self, cursor: &mut Cursor) -> Result<LambdaType, SyntaxError> {
        let tok = cursor.peek_required("a type")?.clone();
        match tok.kind {
            TokenKind::LParen => {
                cursor.advance();
                let inner = self.parse_type(cursor)?;
                cursor.expect_rparen()?;
                Ok(inner)
            }
            TokenKind::Ident(name) => {
                cursor.advance();
                let tag = AtomTag::from_name(&name).ok_or(SyntaxError::UnknownTypeName {
                    name,
                    offset: tok.offset,
                })?;
                Ok(LambdaType::atom(tag))
            }
            other => Err(SyntaxError::UnexpectedToken {
                expected: "a type",
                got: other.describe(),
                offset: tok.offset,
            }),
        }
    }

    fn resolve(&self, name: &str) -> LambdaTerm {
        match self.context.lookup(name) {
            Some(term) => term,
            None => LambdaTerm::variable(name),
        }
    }
}

/// A token cursor with single- and double-token lookahead.
#[derive(Debug)]
struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl Cursor {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek2(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos + 1).map(|t| &t.kind)
    }

    fn peek_required(&self, expected: &'static str) -> Result<&Token, SyntaxError> {
        self.peek().ok_or(SyntaxError::UnexpectedEof { expected })
    }

    fn peek_define(&self) -> bool {
        matches!(self.peek().map(|t| &t.kind), Some(TokenKind::LParen))
            && matches!(self.peek2(), Some(TokenKind::Define))
    }

    fn peek_rparen(&self) -> bool {
        matches!(self.peek().map(|t| &t.kind), Some(TokenKind::RParen))
    }

    fn peek_arrow(&self) -> bool {
        matches!(self.peek().map(|t| &t.kind), Some(TokenKind::Arrow))
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn expect(
        &mut self,
        pred: impl Fn(&TokenKind) -> bool,
        expected: &'static str,
    ) -> Result<Token, SyntaxError> {
        let tok = self.peek_required(expected)?.clone();
        if pred(&tok.kind) {
            self.advance();
            Ok(tok)
        } else {
            Err(SyntaxError::UnexpectedToken {
                expected,
                got: tok.kind.describe(),
                offset: tok.offset,
            })
        }
    }

    fn expect_lparen(&mut self) -> Result<(), SyntaxError> {
        self.expect(|k| matches!(k, TokenKind::LParen), "'('")?;
        Ok(())
    }

    fn expect_rparen(&mut self) -> Result<(), SyntaxError> {
        self.expect(|k| matches!(k, TokenKind::RParen), "')'")?;
        Ok(())
    }

    fn expect_ident(&mut self) -> Result<String, SyntaxError> {
        let tok = self.expect(|k| matches!(k, TokenKind::Ident(_)), "an identifier")?;
        match tok.kind {
            TokenKind::Ident(name) => Ok(name),
            _ => unreachable!("expect checked the kind"),
        }
    }
}
