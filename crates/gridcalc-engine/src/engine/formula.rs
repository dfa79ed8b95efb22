//! Formula tokenizing, parsing and validation.
//!
//! A formula is scanned once into a list of tokens in postfix order. The same
//! [`Formula`] value then feeds validation (here), dependency extraction
//! ([`super::extract_dependencies`]) and evaluation ([`super::evaluate`]), so
//! what validates and what evaluates can never drift apart.
//!
//! Grammar, whitespace-separated where tokens would otherwise merge:
//!
//! - number: `[0-9]+(\.[0-9]+)?`
//! - reference: one letter and one digit, `[A-Za-z][0-9]`
//! - operator: `+ - * /`
//! - call: `name(arg, ...)`, where each argument is a number, a reference or
//!   a range `ref:ref`; a range must be the only argument of its call.
//!
//! Postfix is the native notation (`5 0 /`, `A1 2 *`). A token sequence that
//! is not valid postfix but is a plain infix chain (`A1+1`, `B1*2-3`) is
//! rewritten to postfix with `*` and `/` binding tighter than `+` and `-`.

use super::{CellRef, FormulaError};
use crate::builtins::FunctionRegistry;

/// A binary arithmetic operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    fn from_byte(b: u8) -> Option<Operator> {
        match b {
            b'+' => Some(Operator::Add),
            b'-' => Some(Operator::Sub),
            b'*' => Some(Operator::Mul),
            b'/' => Some(Operator::Div),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
        }
    }

    fn precedence(self) -> u8 {
        match self {
            Operator::Add | Operator::Sub => 1,
            Operator::Mul | Operator::Div => 2,
        }
    }

    /// Apply to `a` (pushed first) and `b` (pushed last).
    ///
    /// Dividing by zero yields `a` unchanged rather than an error or infinity.
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            Operator::Add => a + b,
            Operator::Sub => a - b,
            Operator::Mul => a * b,
            Operator::Div => {
                if b == 0.0 {
                    a
                } else {
                    a / b
                }
            }
        }
    }
}

/// One argument of a function call.
#[derive(Clone, Debug, PartialEq)]
pub enum Argument {
    Number(f64),
    Ref(CellRef),
    /// Two corners of a rectangular block, in the order they were written.
    Range(CellRef, CellRef),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Number(f64),
    Ref(CellRef),
    Operator(Operator),
    Call { name: String, args: Vec<Argument> },
}

impl Token {
    fn is_operand(&self) -> bool {
        !matches!(self, Token::Operator(_))
    }
}

/// A parsed formula: its tokens in postfix order.
///
/// The default (no tokens) is the blank formula, which evaluates to 0.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Formula {
    tokens: Vec<Token>,
}

impl Formula {
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn is_blank(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Validate formula text against a `rows` x `columns` grid.
///
/// The empty string is always valid and parses to the blank formula. Nothing
/// outside the returned value is touched, so a rejected formula has no side
/// effects.
pub fn validate(
    text: &str,
    rows: usize,
    columns: usize,
    registry: &FunctionRegistry,
) -> Result<Formula, FormulaError> {
    let formula = parse_formula(text, registry)?;
    check_bounds(&formula, rows, columns)?;
    Ok(formula)
}

/// Parse formula text without checking references against a grid size.
pub fn parse_formula(text: &str, registry: &FunctionRegistry) -> Result<Formula, FormulaError> {
    if text.is_empty() {
        return Ok(Formula::default());
    }

    let mut lexer = Lexer::new(text, registry);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }

    let tokens = match check_stack_balance(&tokens) {
        Ok(()) => tokens.into_iter().map(|t| t.token).collect(),
        Err(postfix_err) => infix_to_postfix(tokens).ok_or(postfix_err)?,
    };
    Ok(Formula { tokens })
}

fn check_bounds(formula: &Formula, rows: usize, columns: usize) -> Result<(), FormulaError> {
    let out_of_bounds = |reference: CellRef| FormulaError::OutOfBounds {
        reference,
        rows,
        columns,
    };
    for token in formula.tokens() {
        match token {
            Token::Ref(cell) if !cell.in_bounds(rows, columns) => {
                return Err(out_of_bounds(*cell));
            }
            Token::Call { args, .. } => {
                for arg in args {
                    let corners = match arg {
                        Argument::Number(_) => continue,
                        Argument::Ref(cell) => [*cell, *cell],
                        Argument::Range(a, b) => [*a, *b],
                    };
                    if let Some(bad) = corners.into_iter().find(|c| !c.in_bounds(rows, columns)) {
                        return Err(out_of_bounds(bad));
                    }
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// A token plus the 1-based position it started at.
#[derive(Debug)]
struct Spanned {
    token: Token,
    pos: usize,
}

/// Running operand count: +1 per operand, -1 per operator, must stay >= 1
/// after every token and end at exactly 1.
fn check_stack_balance(tokens: &[Spanned]) -> Result<(), FormulaError> {
    let mut depth = 0usize;
    for spanned in tokens {
        match spanned.token {
            Token::Operator(op) => {
                if depth < 2 {
                    return Err(FormulaError::MissingOperand {
                        op: op.symbol(),
                        pos: spanned.pos,
                    });
                }
                depth -= 1;
            }
            _ => depth += 1,
        }
    }
    match depth {
        0 => Err(FormulaError::NoValue),
        1 => Ok(()),
        n => Err(FormulaError::LeftoverOperands { count: n - 1 }),
    }
}

/// Rewrite `operand (operator operand)*` into postfix order.
/// Returns None if the tokens do not alternate that way.
fn infix_to_postfix(tokens: Vec<Spanned>) -> Option<Vec<Token>> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut pending: Vec<Operator> = Vec::new();
    let mut expect_operand = true;

    for Spanned { token, .. } in tokens {
        if token.is_operand() {
            if !expect_operand {
                return None;
            }
            output.push(token);
            expect_operand = false;
            continue;
        }

        let Token::Operator(op) = token else {
            return None;
        };
        if expect_operand {
            return None;
        }
        while pending
            .last()
            .is_some_and(|top| top.precedence() >= op.precedence())
        {
            if let Some(top) = pending.pop() {
                output.push(Token::Operator(top));
            }
        }
        pending.push(op);
        expect_operand = true;
    }

    if expect_operand {
        return None;
    }
    output.extend(pending.into_iter().rev().map(Token::Operator));
    Some(output)
}

struct Lexer<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    registry: &'a FunctionRegistry,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str, registry: &'a FunctionRegistry) -> Self {
        Lexer {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            registry,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Error for whatever character sits at `at` (a byte offset).
    fn unexpected_at(&self, at: usize) -> FormulaError {
        let ch = self.text[at..].chars().next().unwrap_or('\0');
        FormulaError::UnexpectedChar {
            ch,
            pos: self.text[..at].chars().count() + 1,
        }
    }

    fn column(&self, at: usize) -> usize {
        self.text[..at].chars().count() + 1
    }

    fn next_token(&mut self) -> Result<Option<Spanned>, FormulaError> {
        self.skip_whitespace();
        let Some(b) = self.peek() else {
            return Ok(None);
        };
        let start = self.pos;

        let token = if let Some(op) = Operator::from_byte(b) {
            self.pos += 1;
            Token::Operator(op)
        } else if b.is_ascii_digit() {
            Token::Number(self.number()?)
        } else if b.is_ascii_alphabetic() {
            self.reference_or_call()?
        } else {
            return Err(self.unexpected_at(start));
        };

        Ok(Some(Spanned {
            token,
            pos: self.column(start),
        }))
    }

    fn eat_digits(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    fn number(&mut self) -> Result<f64, FormulaError> {
        let start = self.pos;
        let malformed = FormulaError::MalformedNumber {
            pos: self.column(start),
        };

        self.eat_digits();
        if self.peek() == Some(b'.') {
            self.pos += 1;
            if !self.peek().is_some_and(|b| b.is_ascii_digit()) {
                return Err(malformed);
            }
            self.eat_digits();
        }
        // `12a` or `1.5.2` would otherwise lex as two operands stuck together.
        if self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'.')
        {
            return Err(malformed);
        }

        self.text[start..self.pos].parse::<f64>().map_err(|_| malformed)
    }

    /// Lex a reference if one starts here. Consumes nothing when the next
    /// two characters are not a letter followed by a digit.
    fn reference(&mut self) -> Result<Option<CellRef>, FormulaError> {
        let (Some(letter), Some(digit)) = (self.peek(), self.peek_at(1)) else {
            return Ok(None);
        };
        if !letter.is_ascii_alphabetic() || !digit.is_ascii_digit() {
            return Ok(None);
        }
        match self.peek_at(2) {
            Some(b) if b.is_ascii_digit() => {
                return Err(FormulaError::RowNotAddressable {
                    pos: self.column(self.pos),
                });
            }
            Some(b) if b.is_ascii_alphabetic() || b == b'.' => {
                return Err(self.unexpected_at(self.pos + 2));
            }
            _ => {}
        }
        self.pos += 2;
        Ok(Some(CellRef::from_ascii(letter, digit)))
    }

    fn reference_or_call(&mut self) -> Result<Token, FormulaError> {
        if let Some(cell) = self.reference()? {
            return Ok(Token::Ref(cell));
        }

        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        let name = self.text[start..self.pos].to_string();

        if self.peek() != Some(b'(') {
            return Err(FormulaError::UnknownIdentifier {
                name,
                pos: self.column(start),
            });
        }
        if !self.registry.is_function(&name) {
            return Err(FormulaError::UnknownFunction { name });
        }
        self.pos += 1;

        let args = self.arguments(&name)?;
        Ok(Token::Call { name, args })
    }

    /// Lex call arguments up to and including the closing parenthesis.
    fn arguments(&mut self, name: &str) -> Result<Vec<Argument>, FormulaError> {
        let unterminated = || FormulaError::UnterminatedCall {
            name: name.to_string(),
        };
        let mut args = Vec::new();

        self.skip_whitespace();
        if self.peek() == Some(b')') {
            self.pos += 1;
            return Ok(args);
        }

        loop {
            self.skip_whitespace();
            let arg_start = self.pos;
            let arg = match self.peek() {
                None => return Err(unterminated()),
                Some(b',') | Some(b')') => {
                    return Err(FormulaError::EmptyArgument {
                        name: name.to_string(),
                        pos: self.column(arg_start),
                    });
                }
                Some(b) if b.is_ascii_digit() => Argument::Number(self.number()?),
                Some(_) => self.reference_argument(name)?,
            };
            args.push(arg);

            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b')') => {
                    self.pos += 1;
                    break;
                }
                None => return Err(unterminated()),
                Some(_) => return Err(self.unexpected_at(self.pos)),
            }
        }

        if args.len() > 1 && args.iter().any(|a| matches!(a, Argument::Range(..))) {
            return Err(FormulaError::MixedArguments {
                name: name.to_string(),
            });
        }
        Ok(args)
    }

    fn reference_argument(&mut self, name: &str) -> Result<Argument, FormulaError> {
        let invalid = |lexer: &Self| FormulaError::InvalidArgument {
            name: name.to_string(),
            pos: lexer.column(lexer.pos),
        };

        let Some(first) = self.reference()? else {
            return Err(invalid(self));
        };

        self.skip_whitespace();
        if self.peek() != Some(b':') {
            return Ok(Argument::Ref(first));
        }
        self.pos += 1;
        self.skip_whitespace();
        match self.reference()? {
            Some(second) => Ok(Argument::Range(first, second)),
            None => Err(invalid(self)),
        }
    }
}
