use std::{f64::consts::PI, ops::Range};

use super::{
    lexer::{Spanned, Token},
    Expr, ParseError,
};

/// Maximum nesting of parentheses and calls.
const MAX_NESTING: usize = 128;
/// Maximum height of the expression tree.
const MAX_HEIGHT: usize = 1024;

/// Expression with the height of its tree.
type Node = (Expr, usize);

/// Recursive descent parser over the tokens of a plain expression.
///
/// ```text
/// expr    = term (("+" | "-") term)*
/// term    = unary (("*" | "/") unary)*
/// unary   = ("-" | "+")* primary
/// primary = number | "pi" | "π" | symbol | call | "(" expr ")"
/// call    = ident "(" expr ("," expr)* ")"
/// ```
pub(crate) struct Parser<'a, S> {
    source: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
    symbols: &'a [S],
    nesting: usize,
}

impl<'a, S: AsRef<str>> Parser<'a, S> {
    pub(crate) fn new(source: &'a str, tokens: Vec<Spanned>, symbols: &'a [S]) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            symbols,
            nesting: 0,
        }
    }

    pub(crate) fn parse(mut self) -> Result<Expr, ParseError> {
        let (expr, _) = self.expr()?;

        match self.bump() {
            None => Ok(expr),
            Some((Token::RParen, span)) => Err(ParseError::UnmatchedParen { offset: span.start }),
            Some((_, span)) => Err(self.unexpected(span)),
        }
    }

    fn expr(&mut self) -> Result<Node, ParseError> {
        let mut lhs = self.term()?;

        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.bump();
                    lhs = binary(Expr::Add, lhs, self.term()?)?;
                }
                Some(Token::Minus) => {
                    self.bump();
                    lhs = binary(Expr::Sub, lhs, self.term()?)?;
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn term(&mut self) -> Result<Node, ParseError> {
        let mut lhs = self.unary()?;

        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.bump();
                    lhs = binary(Expr::Mul, lhs, self.unary()?)?;
                }
                Some(Token::Slash) => {
                    self.bump();
                    lhs = binary(Expr::Div, lhs, self.unary()?)?;
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn unary(&mut self) -> Result<Node, ParseError> {
        let mut negate = false;

        while let Some(sign @ (Token::Minus | Token::Plus)) = self.peek() {
            self.bump();
            negate ^= sign == Token::Minus;
        }

        let operand = self.primary()?;
        if negate {
            unary(Expr::Neg, operand)
        } else {
            Ok(operand)
        }
    }

    fn primary(&mut self) -> Result<Node, ParseError> {
        let (token, span) = self.bump().ok_or(ParseError::UnexpectedEnd)?;
        let source = self.source;
        let text = &source[span.clone()];

        match token {
            Token::Number => text
                .parse()
                .map(|num| (Expr::Num(num), 1))
                .map_err(|_| self.unexpected(span)),
            Token::Pi => Ok((Expr::Num(PI), 1)),
            Token::Ident if self.peek() == Some(Token::LParen) => {
                self.nested(|parser| parser.call(text))
            }
            Token::Ident => match self.slot(text) {
                Some(slot) => Ok((Expr::Var(slot), 1)),
                None if text == "pi" => Ok((Expr::Num(PI), 1)),
                None => Err(ParseError::UnknownSymbol(text.to_owned())),
            },
            Token::LParen => self.nested(|parser| {
                let inner = parser.expr()?;
                parser.close(span.start)?;
                Ok(inner)
            }),
            Token::RParen => Err(ParseError::UnmatchedParen { offset: span.start }),
            _ => Err(self.unexpected(span)),
        }
    }

    fn call(&mut self, name: &str) -> Result<Node, ParseError> {
        let (_, open) = self.bump().ok_or(ParseError::UnexpectedEnd)?;

        let mut args = vec![self.expr()?];
        while self.peek() == Some(Token::Comma) {
            self.bump();
            args.push(self.expr()?);
        }
        self.close(open.start)?;

        match name {
            "pow" => {
                let [base, exp] = exact(name, args)?;
                binary(Expr::Pow, base, exp)
            }
            "sqrt" => {
                let [arg] = exact(name, args)?;
                unary(Expr::Sqrt, arg)
            }
            _ => Err(ParseError::UnknownFunction(name.to_owned())),
        }
    }

    fn nested<F>(&mut self, parse: F) -> Result<Node, ParseError>
    where
        F: FnOnce(&mut Self) -> Result<Node, ParseError>,
    {
        if self.nesting >= MAX_NESTING {
            return Err(ParseError::TooDeep);
        }

        self.nesting += 1;
        let result = parse(self);
        self.nesting -= 1;
        result
    }

    fn close(&mut self, open: usize) -> Result<(), ParseError> {
        match self.bump() {
            Some((Token::RParen, _)) => Ok(()),
            Some((_, span)) => Err(self.unexpected(span)),
            None => Err(ParseError::UnclosedParen { offset: open }),
        }
    }

    fn slot(&self, name: &str) -> Option<usize> {
        self.symbols
            .iter()
            .position(|symbol| symbol.as_ref() == name)
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|(token, _)| *token)
    }

    fn bump(&mut self) -> Option<Spanned> {
        let next = self.tokens.get(self.pos).cloned();
        if next.is_some() {
            self.pos += 1;
        }
        next
    }

    fn unexpected(&self, span: Range<usize>) -> ParseError {
        ParseError::UnexpectedToken {
            offset: span.start,
            found: self.source[span].to_owned(),
        }
    }
}

fn unary(make: fn(Box<Expr>) -> Expr, (arg, height): Node) -> Result<Node, ParseError> {
    checked_height(height + 1).map(|height| (make(Box::new(arg)), height))
}

fn binary(
    make: fn(Box<Expr>, Box<Expr>) -> Expr,
    (lhs, lhs_height): Node,
    (rhs, rhs_height): Node,
) -> Result<Node, ParseError> {
    checked_height(lhs_height.max(rhs_height) + 1)
        .map(|height| (make(Box::new(lhs), Box::new(rhs)), height))
}

fn checked_height(height: usize) -> Result<usize, ParseError> {
    if height > MAX_HEIGHT {
        Err(ParseError::TooDeep)
    } else {
        Ok(height)
    }
}

fn exact<const N: usize>(name: &str, args: Vec<Node>) -> Result<[Node; N], ParseError> {
    let found = args.len();
    args.try_into().map_err(|_| ParseError::Arity {
        name: name.to_owned(),
        expected: N,
        found,
    })
}
