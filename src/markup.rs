//! Normalization of formula markup into a plain residual expression.
//!
//! Formulas are stored in a LaTeX-like markup (`E = mc^2`,
//! `\frac{1}{2}mv^2`, `\sqrt{a^2 + b^2}`). [`normalize`] rewrites such a
//! formula into the `LHS-(RHS)` form understood by the [expression
//! compiler](crate::expr):
//!
//! ```rust
//! use formulary::markup::normalize;
//!
//! let residual = normalize("E = mc^2", &["E", "m", "c"]).unwrap();
//! assert_eq!(residual, "E-(m*pow(c,2))");
//! ```
//!
//! Supported markup:
//!
//! * `\frac{a}{b}` (and `\dfrac`, `\tfrac`), nested or not.
//! * `\cdot`, `\times`, `·`, `×` and `*` for multiplication, `\div` and `/`
//!   for division. Juxtaposed operands are multiplied.
//! * `base^exp` where the base is the preceding operand and the exponent is a
//!   single operand or a braced group.
//! * `\sqrt{x}` and `\sqrt[n]{x}`.
//! * `\left(`, `\right)`, braced groups and brackets as grouping.
//! * `\pi` and `π`.
//! * Subscripts `v_0` and `v_{max}`.
//!
//! Runs of letters and digits are split into the variable symbols of the
//! equation by longest match. Letters not covered by any symbol become
//! single-letter symbols and digits become numbers. So `mc` is `m*c` unless
//! the equation has a variable `mc`, and `x2` is `x*2` unless it has a
//! variable `x2`.
//!
//! Parentheses are not validated here, an unmatched one is passed through to
//! the compiler. Braced groups nest at most 64 deep.

use std::ops::Range;

use logos::Logos;
use thiserror::Error;

/// Maximum nesting of braced groups.
const MAX_NESTING: usize = 64;

/// Error encountered while normalizing a formula.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    /// A character that is not part of the supported markup.
    #[error("invalid character `{text}` at offset {offset}")]
    InvalidCharacter {
        /// Byte offset in the formula.
        offset: usize,
        /// The offending text.
        text: String,
    },
    /// The formula has no `=`.
    #[error("formula is not an equation")]
    MissingEquality,
    /// The formula has more than one `=`.
    #[error("second `=` at offset {offset}")]
    MultipleEqualities {
        /// Byte offset of the second `=`.
        offset: usize,
    },
    /// An `=` inside a group.
    #[error("`=` inside a group at offset {offset}")]
    NestedEquality {
        /// Byte offset of the `=`.
        offset: usize,
    },
    /// One side of the equality is empty.
    #[error("one side of the equation is empty")]
    EmptySide,
    /// A macro that is not supported.
    #[error("unsupported macro `{0}`")]
    UnsupportedMacro(String),
    /// A macro is not followed by its braced argument.
    #[error("`{command}` at offset {offset} expects a braced argument")]
    MissingArgument {
        /// The macro.
        command: String,
        /// Byte offset of the macro.
        offset: usize,
    },
    /// A brace (or bracket) is not closed or not opened.
    #[error("unbalanced brace at offset {offset}")]
    UnbalancedBraces {
        /// Byte offset of the offending brace.
        offset: usize,
    },
    /// `^` or `_` has nothing to attach to.
    #[error("dangling `^` or `_` at offset {offset}")]
    DanglingOperator {
        /// Byte offset of the operator.
        offset: usize,
    },
    /// A subscript that is not made of letters and digits.
    #[error("invalid subscript at offset {offset}")]
    InvalidSubscript {
        /// Byte offset of the `_`.
        offset: usize,
    },
    /// Groups are nested too deeply.
    #[error("groups nested too deeply at offset {offset}")]
    TooDeep {
        /// Byte offset of the group that exceeds the limit.
        offset: usize,
    },
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
enum Token {
    #[regex(r"\\[A-Za-z]+")]
    Command,
    #[regex(r"\\[,;:! ]")]
    Space,
    #[regex(r"([0-9]+(\.[0-9]*)?|\.[0-9]+)")]
    Number,
    #[regex(r"[A-Za-z][A-Za-z0-9]*")]
    Word,
    #[token("π")]
    Pi,
    #[token("^")]
    Caret,
    #[token("_")]
    Underscore,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    #[token("·")]
    #[token("×")]
    Times,
    #[token("/")]
    Slash,
    #[token("=")]
    Equals,
}

#[derive(Debug, Clone, PartialEq)]
enum Item {
    Symbol(String),
    Operand(String),
    Operator(char),
    Open,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum End {
    Input,
    Brace(usize),
    Bracket(usize),
}

/// Rewrites the formula into `LHS-(RHS)` form.
///
/// `symbols` are the variable symbols of the equation, used for splitting
/// runs of letters.
pub fn normalize<S: AsRef<str>>(formula: &str, symbols: &[S]) -> Result<String, MarkupError> {
    Normalizer::new(formula, symbols)?.run()
}

struct Normalizer<'a> {
    source: &'a str,
    tokens: Vec<(Token, Range<usize>)>,
    pos: usize,
    symbols: Vec<&'a str>,
    equalities: Vec<(usize, usize)>,
    nesting: usize,
}

impl<'a> Normalizer<'a> {
    fn new<S: AsRef<str>>(source: &'a str, symbols: &'a [S]) -> Result<Self, MarkupError> {
        let tokens = Token::lexer(source)
            .spanned()
            .map(|(token, span)| match token {
                Ok(token) => Ok((token, span)),
                Err(()) => Err(MarkupError::InvalidCharacter {
                    offset: span.start,
                    text: source[span].to_owned(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let symbols: Vec<&str> = symbols
            .iter()
            .map(|symbol| symbol.as_ref())
            .filter(|s| {
                s.bytes().next().map_or(false, |b| b.is_ascii_alphabetic())
                    && s.bytes().all(|b| b.is_ascii_alphanumeric())
            })
            .collect();

        Ok(Self {
            source,
            tokens,
            pos: 0,
            symbols,
            equalities: Vec::new(),
            nesting: 0,
        })
    }

    fn run(mut self) -> Result<String, MarkupError> {
        let mut items = self.sequence(End::Input)?;

        let split = match self.equalities.as_slice() {
            [] => return Err(MarkupError::MissingEquality),
            [(index, _)] => *index,
            [_, (_, offset), ..] => {
                return Err(MarkupError::MultipleEqualities { offset: *offset })
            }
        };

        let rhs = items.split_off(split);
        if items.is_empty() || rhs.is_empty() {
            return Err(MarkupError::EmptySide);
        }

        Ok(format!("{}-({})", render(&items), render(&rhs)))
    }

    fn sequence(&mut self, end: End) -> Result<Vec<Item>, MarkupError> {
        let source = self.source;
        let mut items = Vec::new();
        // Items before this index belong to the left side of the equality.
        let mut floor = 0;
        let mut depth = 0usize;

        loop {
            let Some((token, span)) = self.bump() else {
                return match end {
                    End::Input => Ok(items),
                    End::Brace(offset) | End::Bracket(offset) => {
                        Err(MarkupError::UnbalancedBraces { offset })
                    }
                };
            };

            match token {
                Token::RBrace => {
                    return match end {
                        End::Brace(_) => Ok(items),
                        _ => Err(MarkupError::UnbalancedBraces { offset: span.start }),
                    };
                }
                Token::RBracket if matches!(end, End::Bracket(_)) => return Ok(items),
                Token::Equals => {
                    if end != End::Input || depth > 0 {
                        return Err(MarkupError::NestedEquality { offset: span.start });
                    }
                    self.equalities.push((items.len(), span.start));
                    floor = items.len();
                }
                Token::LParen | Token::LBracket => {
                    depth += 1;
                    items.push(Item::Open);
                }
                Token::RParen | Token::RBracket => {
                    depth = depth.saturating_sub(1);
                    items.push(Item::Close);
                }
                Token::Plus => items.push(Item::Operator('+')),
                Token::Minus => items.push(Item::Operator('-')),
                Token::Times => items.push(Item::Operator('*')),
                Token::Slash => items.push(Item::Operator('/')),
                Token::Space => {}
                Token::Caret => self.power(&mut items, floor, span.start)?,
                Token::Underscore => self.subscript(&mut items, floor, span.start)?,
                Token::Command => match &source[span.clone()] {
                    "\\left" | "\\right" => {}
                    "\\cdot" | "\\times" => items.push(Item::Operator('*')),
                    "\\div" => items.push(Item::Operator('/')),
                    _ => items.extend(self.atom(token, span)?),
                },
                Token::Number | Token::Word | Token::Pi | Token::LBrace => {
                    items.extend(self.atom(token, span)?)
                }
            }
        }
    }

    /// Operands produced by a token that starts an operand. A run of letters
    /// produces one operand per symbol, anything else a single operand.
    fn atom(&mut self, token: Token, span: Range<usize>) -> Result<Vec<Item>, MarkupError> {
        let source = self.source;
        let text = &source[span.clone()];

        match token {
            Token::Number => Ok(vec![Item::Operand(text.to_owned())]),
            Token::Word => Ok(self.split(text)),
            Token::Pi => Ok(vec![Item::Operand("pi".to_owned())]),
            Token::LBrace => {
                let inner = self.group(span.start)?;
                Ok(vec![Item::Operand(format!("({})", inner))])
            }
            Token::Command => self.command(text, span.start).map(|item| vec![item]),
            _ => Err(MarkupError::DanglingOperator { offset: span.start }),
        }
    }

    fn command(&mut self, command: &str, offset: usize) -> Result<Item, MarkupError> {
        match command {
            "\\frac" | "\\dfrac" | "\\tfrac" => {
                let num = self.argument(command, offset)?;
                let den = self.argument(command, offset)?;
                Ok(Item::Operand(format!("(({})/({}))", num, den)))
            }
            "\\sqrt" => {
                let index = match self.peek() {
                    Some((Token::LBracket, span)) => {
                        self.bump();
                        let index = self.nested(span.start, |normalizer| {
                            normalizer.sequence(End::Bracket(span.start))
                        })?;
                        Some(render(&index))
                    }
                    _ => None,
                };
                let radicand = self.argument(command, offset)?;

                match index {
                    Some(index) => Ok(Item::Operand(format!("pow({},1/({}))", radicand, index))),
                    None => Ok(Item::Operand(format!("sqrt({})", radicand))),
                }
            }
            "\\pi" => Ok(Item::Operand("pi".to_owned())),
            _ => Err(MarkupError::UnsupportedMacro(command.to_owned())),
        }
    }

    fn argument(&mut self, command: &str, offset: usize) -> Result<String, MarkupError> {
        match self.bump() {
            Some((Token::LBrace, span)) => self.group(span.start),
            _ => Err(MarkupError::MissingArgument {
                command: command.to_owned(),
                offset,
            }),
        }
    }

    fn group(&mut self, open: usize) -> Result<String, MarkupError> {
        self.nested(open, |normalizer| normalizer.sequence(End::Brace(open)))
            .map(|items| render(&items))
    }

    fn nested<F>(&mut self, offset: usize, sequence: F) -> Result<Vec<Item>, MarkupError>
    where
        F: FnOnce(&mut Self) -> Result<Vec<Item>, MarkupError>,
    {
        if self.nesting >= MAX_NESTING {
            return Err(MarkupError::TooDeep { offset });
        }

        self.nesting += 1;
        let result = sequence(self);
        self.nesting -= 1;
        result
    }

    fn power(
        &mut self,
        items: &mut Vec<Item>,
        floor: usize,
        offset: usize,
    ) -> Result<(), MarkupError> {
        let dangling = MarkupError::DanglingOperator { offset };

        let base = match items.last() {
            Some(Item::Symbol(_) | Item::Operand(_)) if items.len() > floor => {
                render(&items.split_off(items.len() - 1))
            }
            Some(Item::Close) => {
                let open = matching_open(&items[floor..]).ok_or(dangling.clone())?;
                render(&items.split_off(floor + open))
            }
            _ => return Err(dangling),
        };

        let (exp, rest) = match self.bump() {
            Some((Token::LBrace, span)) => (self.group(span.start)?, Vec::new()),
            Some((Token::Minus, _)) => {
                let (token, span) = self.bump().ok_or(dangling.clone())?;
                let (exp, rest) = first(self.atom(token, span)?).ok_or(dangling)?;
                (format!("-{}", exp), rest)
            }
            Some((token, span)) => first(self.atom(token, span)?).ok_or(dangling)?,
            None => return Err(dangling),
        };

        items.push(Item::Operand(format!("pow({},{})", base, exp)));
        items.extend(rest);
        Ok(())
    }

    fn subscript(
        &mut self,
        items: &mut Vec<Item>,
        floor: usize,
        offset: usize,
    ) -> Result<(), MarkupError> {
        let symbol = match items.last() {
            Some(Item::Symbol(_)) if items.len() > floor => match items.pop() {
                Some(Item::Symbol(symbol)) => symbol,
                _ => return Err(MarkupError::DanglingOperator { offset }),
            },
            _ => return Err(MarkupError::DanglingOperator { offset }),
        };

        let subscript = match self.bump() {
            Some((Token::Word | Token::Number, span)) => self.source[span].to_owned(),
            Some((Token::LBrace, _)) => {
                let mut subscript = String::new();
                loop {
                    match self.bump() {
                        Some((Token::Word | Token::Number, span)) => {
                            subscript.push_str(&self.source[span])
                        }
                        Some((Token::RBrace, _)) if !subscript.is_empty() => break,
                        _ => return Err(MarkupError::InvalidSubscript { offset }),
                    }
                }
                subscript
            }
            Some(_) => return Err(MarkupError::InvalidSubscript { offset }),
            None => return Err(MarkupError::DanglingOperator { offset }),
        };

        items.push(Item::Symbol(format!("{}_{}", symbol, subscript)));
        Ok(())
    }

    fn split(&self, word: &str) -> Vec<Item> {
        let mut items = Vec::new();
        let mut rest = word;

        while !rest.is_empty() {
            let symbol = self
                .symbols
                .iter()
                .filter(|symbol| rest.starts_with(**symbol))
                .map(|symbol| symbol.len())
                .max();
            let digits = rest.bytes().take_while(u8::is_ascii_digit).count();

            let (item, len) = match symbol {
                Some(len) => (Item::Symbol(rest[..len].to_owned()), len),
                None if digits > 0 => (Item::Operand(rest[..digits].to_owned()), digits),
                None => (Item::Symbol(rest[..1].to_owned()), 1),
            };

            items.push(item);
            rest = &rest[len..];
        }

        items
    }

    fn peek(&self) -> Option<(Token, Range<usize>)> {
        self.tokens.get(self.pos).cloned()
    }

    fn bump(&mut self) -> Option<(Token, Range<usize>)> {
        let next = self.peek();
        if next.is_some() {
            self.pos += 1;
        }
        next
    }
}

/// Splits the first operand text off the items.
fn first(mut items: Vec<Item>) -> Option<(String, Vec<Item>)> {
    if items.is_empty() {
        return None;
    }

    match items.remove(0) {
        Item::Symbol(text) | Item::Operand(text) => Some((text, items)),
        _ => None,
    }
}

/// Index of the `Open` item matching the trailing `Close` item.
fn matching_open(items: &[Item]) -> Option<usize> {
    let mut depth = 0usize;

    for (index, item) in items.iter().enumerate().rev() {
        match item {
            Item::Close => depth += 1,
            Item::Open => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }

    None
}

fn render(items: &[Item]) -> String {
    let mut out = String::new();
    let mut after_operand = false;

    for item in items {
        match item {
            Item::Symbol(text) | Item::Operand(text) => {
                if after_operand {
                    out.push('*');
                }
                out.push_str(text);
                after_operand = true;
            }
            Item::Open => {
                if after_operand {
                    out.push('*');
                }
                out.push('(');
                after_operand = false;
            }
            Item::Close => {
                out.push(')');
                after_operand = true;
            }
            Item::Operator(op) => {
                out.push(*op);
                after_operand = false;
            }
        }
    }

    out
}
