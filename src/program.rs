//! Textual program format.
//!
//! A program lists its variables, then one edge per statement:
//!
//! ```text
//! x y
//! L0 x := 4 L1
//! L1 assume(x = y + 1) L2
//! L2 assert (EVEN x ODD y) (SUM x y = SUM x x) L3
//! L3 skip L4
//! ```
//!
//! Statements are `skip`, `v := value`, `assume(relation)` and
//! `assert (atoms...) ...`, where a value is an integer, a variable,
//! `u + c`, `u - c` or `?`. Relations are `v = value`, `v != value`,
//! `true` or `false`. Text after `#` is ignored.
//!
//! # Examples
//!
//! ```
//! use absint_rs::program::parse_program;
//!
//! let program = parse_program("x\nL0 x := 1 L1\nL1 assert (ODD x) L2").unwrap();
//! assert_eq!(program.edges.len(), 2);
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use log::debug;
use num_bigint::BigInt;

use crate::ast::{Assertion, AssertionAtom, Assumption, Clause, Statement, Value};
use crate::error::{Error, Result};

/// An edge `source --statement--> target` between labelled program points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub source: usize,
    pub statement: Statement,
    pub target: usize,
}

impl Edge {
    pub fn new(source: usize, statement: Statement, target: usize) -> Self {
        Self {
            source,
            statement,
            target,
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{} {} L{}", self.source, self.statement, self.target)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub variables: BTreeSet<String>,
    pub edges: Vec<Edge>,
}

impl Program {
    pub fn new<S: Into<String>>(variables: impl IntoIterator<Item = S>, edges: Vec<Edge>) -> Self {
        Self {
            variables: variables.into_iter().map(Into::into).collect(),
            edges,
        }
    }

    /// Reads and parses a program file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        parse_program(&content)
    }
}

impl FromStr for Program {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_program(s)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.variables.iter().map(String::as_str).collect();
        writeln!(f, "{}", names.join(" "))?;
        for edge in &self.edges {
            writeln!(f, "{}", edge)?;
        }
        Ok(())
    }
}

/// Parses a program in the textual format described in the module docs.
pub fn parse_program(source: &str) -> Result<Program> {
    let tokens = tokenize(source)?;
    debug!("parse_program: {} tokens", tokens.len());
    Parser::new(tokens).program()
}

// ─── Lexer ───

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Label(usize),
    Number(BigInt),
    Skip,
    Assume,
    Assert,
    True,
    False,
    Sum,
    Even,
    Odd,
    LParen,
    RParen,
    Plus,
    Minus,
    Eq,
    Ne,
    Assign,
    Question,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "`{}`", name),
            Token::Label(label) => write!(f, "`L{}`", label),
            Token::Number(n) => write!(f, "`{}`", n),
            Token::Skip => write!(f, "`skip`"),
            Token::Assume => write!(f, "`assume`"),
            Token::Assert => write!(f, "`assert`"),
            Token::True => write!(f, "`true`"),
            Token::False => write!(f, "`false`"),
            Token::Sum => write!(f, "`SUM`"),
            Token::Even => write!(f, "`EVEN`"),
            Token::Odd => write!(f, "`ODD`"),
            Token::LParen => write!(f, "`(`"),
            Token::RParen => write!(f, "`)`"),
            Token::Plus => write!(f, "`+`"),
            Token::Minus => write!(f, "`-`"),
            Token::Eq => write!(f, "`=`"),
            Token::Ne => write!(f, "`!=`"),
            Token::Assign => write!(f, "`:=`"),
            Token::Question => write!(f, "`?`"),
        }
    }
}

#[derive(Debug, Clone)]
struct Spanned {
    token: Token,
    line: usize,
}

fn tokenize(source: &str) -> Result<Vec<Spanned>> {
    let mut tokens = Vec::new();
    for (index, text) in source.lines().enumerate() {
        let line = index + 1;
        let error = |message: String| Error::Parse { line, message };
        let chars: Vec<char> = text.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            let token = match c {
                _ if c.is_whitespace() => {
                    i += 1;
                    continue;
                }
                '#' => break,
                '(' => Token::LParen,
                ')' => Token::RParen,
                '+' => Token::Plus,
                '-' => Token::Minus,
                '=' => Token::Eq,
                '?' => Token::Question,
                ':' | '!' => {
                    if chars.get(i + 1) != Some(&'=') {
                        return Err(error(format!("expected `=` after `{}`", c)));
                    }
                    i += 1;
                    if c == ':' {
                        Token::Assign
                    } else {
                        Token::Ne
                    }
                }
                _ if c.is_ascii_digit() => {
                    let start = i;
                    while i + 1 < chars.len() && chars[i + 1].is_ascii_digit() {
                        i += 1;
                    }
                    let digits: String = chars[start..=i].iter().collect();
                    let value = digits
                        .parse::<BigInt>()
                        .map_err(|e| error(format!("invalid number `{}`: {}", digits, e)))?;
                    Token::Number(value)
                }
                _ if c.is_ascii_alphabetic() || c == '_' => {
                    let start = i;
                    while i + 1 < chars.len() && (chars[i + 1].is_ascii_alphanumeric() || chars[i + 1] == '_') {
                        i += 1;
                    }
                    let word: String = chars[start..=i].iter().collect();
                    word_token(&word).ok_or_else(|| error(format!("unexpected word `{}`", word)))?
                }
                _ => return Err(error(format!("unexpected character `{}`", c))),
            };
            tokens.push(Spanned { token, line });
            i += 1;
        }
    }
    Ok(tokens)
}

fn word_token(word: &str) -> Option<Token> {
    let token = match word {
        "skip" => Token::Skip,
        "assume" => Token::Assume,
        "assert" => Token::Assert,
        "true" => Token::True,
        "false" => Token::False,
        "SUM" => Token::Sum,
        "EVEN" => Token::Even,
        "ODD" => Token::Odd,
        _ => {
            if let Some(digits) = word.strip_prefix('L') {
                if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                    return digits.parse().ok().map(Token::Label);
                }
            }
            if word.starts_with(|c: char| c.is_ascii_lowercase() || c == '_') {
                Token::Ident(word.to_string())
            } else {
                return None;
            }
        }
    };
    Some(token)
}

// ─── Parser ───

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Spanned>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |s| s.line)
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::Parse {
            line: self.line(),
            message: message.into(),
        }
    }

    fn unexpected(&self, expected: &str) -> Error {
        match self.peek() {
            Some(token) => self.error(format!("expected {}, found {}", expected, token)),
            None => self.error(format!("expected {}, found end of input", expected)),
        }
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|s| s.token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        if self.eat(&expected) {
            Ok(())
        } else {
            Err(self.unexpected(&expected.to_string()))
        }
    }

    fn ident(&mut self) -> Result<String> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.unexpected("a variable")),
        }
    }

    fn label(&mut self) -> Result<usize> {
        match self.peek() {
            Some(&Token::Label(label)) => {
                self.pos += 1;
                Ok(label)
            }
            _ => Err(self.unexpected("a label")),
        }
    }

    fn number(&mut self) -> Result<BigInt> {
        match self.peek() {
            Some(Token::Number(n)) => {
                let n = n.clone();
                self.pos += 1;
                Ok(n)
            }
            _ => Err(self.unexpected("a number")),
        }
    }

    fn program(mut self) -> Result<Program> {
        let mut variables = BTreeSet::new();
        while let Some(Token::Ident(_)) = self.peek() {
            let name = self.ident()?;
            if !variables.insert(name.clone()) {
                return Err(self.error(format!("variable `{}` declared twice", name)));
            }
        }

        let mut edges = Vec::new();
        while self.peek().is_some() {
            let source = self.label()?;
            let statement = self.statement()?;
            let target = self.label()?;
            edges.push(Edge::new(source, statement, target));
        }

        Ok(Program { variables, edges })
    }

    fn statement(&mut self) -> Result<Statement> {
        match self.peek() {
            Some(Token::Skip) => {
                self.pos += 1;
                Ok(Statement::Skip)
            }
            Some(Token::Ident(_)) => {
                let variable = self.ident()?;
                self.expect(Token::Assign)?;
                let value = self.value()?;
                Ok(Statement::Assign { variable, value })
            }
            Some(Token::Assume) => {
                self.pos += 1;
                let assumption = if self.eat(&Token::LParen) {
                    let assumption = self.assumption()?;
                    self.expect(Token::RParen)?;
                    assumption
                } else {
                    self.assumption()?
                };
                Ok(Statement::Assume(assumption))
            }
            Some(Token::Assert) => {
                self.pos += 1;
                let mut clauses = vec![self.clause()?];
                while self.peek() == Some(&Token::LParen) {
                    clauses.push(self.clause()?);
                }
                Ok(Statement::Assert(Assertion::new(clauses)))
            }
            _ => Err(self.unexpected("a statement")),
        }
    }

    fn value(&mut self) -> Result<Value> {
        match self.peek() {
            Some(Token::Question) => {
                self.pos += 1;
                Ok(Value::Unknown)
            }
            Some(Token::Number(_)) => Ok(Value::Const(self.number()?)),
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(Value::Const(-self.number()?))
            }
            Some(Token::Ident(_)) => {
                let name = self.ident()?;
                if self.eat(&Token::Plus) {
                    Ok(Value::plus(name, self.number()?))
                } else if self.eat(&Token::Minus) {
                    Ok(Value::minus(name, self.number()?))
                } else {
                    Ok(Value::Var(name))
                }
            }
            _ => Err(self.unexpected("a value")),
        }
    }

    fn assumption(&mut self) -> Result<Assumption> {
        if self.eat(&Token::True) {
            return Ok(Assumption::True);
        }
        if self.eat(&Token::False) {
            return Ok(Assumption::False);
        }
        let variable = self.ident()?;
        let is_equal = if self.eat(&Token::Eq) {
            true
        } else if self.eat(&Token::Ne) {
            false
        } else {
            return Err(self.unexpected("`=` or `!=`"));
        };
        let value = self.value()?;
        Ok(Assumption::Relation {
            variable,
            is_equal,
            value,
        })
    }

    fn clause(&mut self) -> Result<Clause> {
        self.expect(Token::LParen)?;
        let mut atoms = vec![self.atom()?];
        while self.peek() != Some(&Token::RParen) {
            atoms.push(self.atom()?);
        }
        self.expect(Token::RParen)?;
        Ok(atoms)
    }

    fn atom(&mut self) -> Result<AssertionAtom> {
        match self.peek() {
            Some(Token::Even) | Some(Token::Odd) => {
                let is_even = self.advance() == Some(Token::Even);
                let variable = self.ident()?;
                Ok(AssertionAtom::Parity { is_even, variable })
            }
            Some(Token::Sum) => {
                self.pos += 1;
                let left = self.variable_list()?;
                self.expect(Token::Eq)?;
                self.expect(Token::Sum)?;
                let right = self.variable_list()?;
                Ok(AssertionAtom::Sum { left, right })
            }
            _ => Err(self.unexpected("`EVEN`, `ODD` or `SUM`")),
        }
    }

    fn variable_list(&mut self) -> Result<Vec<String>> {
        let mut names = vec![self.ident()?];
        while let Some(Token::Ident(_)) = self.peek() {
            names.push(self.ident()?);
        }
        Ok(names)
    }
}
