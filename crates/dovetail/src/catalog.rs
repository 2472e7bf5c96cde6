//! Per-category token automata

use std::fmt;

use crate::{
    dfa::{BuildError, Dfa, DfaBuilder},
    token::TokenKind,
};

/// Keywords, built-in calls, operators and punctuation, in priority order
pub const LITERALS: &[(&str, TokenKind)] = &[
    ("integer", TokenKind::Integer),
    ("bool", TokenKind::Bool),
    ("global", TokenKind::Global),
    ("begin", TokenKind::Begin),
    ("end", TokenKind::End),
    ("program", TokenKind::Program),
    ("is", TokenKind::Is),
    ("procedure", TokenKind::Procedure),
    ("if", TokenKind::If),
    ("else", TokenKind::Else),
    ("then", TokenKind::Then),
    ("while", TokenKind::While),
    ("for", TokenKind::For),
    ("return", TokenKind::Return),
    ("get-bool", TokenKind::GetBool),
    ("get-integer", TokenKind::GetInteger),
    ("get-string", TokenKind::GetString),
    ("put-bool", TokenKind::PutBool),
    ("put-integer", TokenKind::PutInteger),
    ("put-string", TokenKind::PutString),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Multiply),
    ("/", TokenKind::Divide),
    (":=", TokenKind::Assign),
    ("==", TokenKind::Equals),
    (";", TokenKind::Semicolon),
    (":", TokenKind::Colon),
    (",", TokenKind::Comma),
    ("\"", TokenKind::Quote),
    ("[", TokenKind::LBracket),
    ("]", TokenKind::RBracket),
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    ("<", TokenKind::Less),
    (">", TokenKind::Greater),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
];

const WORD: [std::ops::RangeInclusive<char>; 3] = ['a'..='z', 'A'..='Z', '0'..='9'];
const BLANK: &str = " \t\r";

fn word_syms() -> impl Iterator<Item = char> { WORD.into_iter().flatten().chain(['_']) }

/// An ordered set of token automata
///
/// Order is priority: when two automata match the same text the earlier one
/// wins, whether the catalog is simulated side by side or merged.
#[derive(Debug, Clone)]
pub struct Catalog<T> {
    dfas: Vec<Dfa<T>>,
}

impl<T> Default for Catalog<T> {
    fn default() -> Self { Self::new() }
}

impl<T> FromIterator<Dfa<T>> for Catalog<T> {
    fn from_iter<I: IntoIterator<Item = Dfa<T>>>(iter: I) -> Self {
        Self {
            dfas: iter.into_iter().collect(),
        }
    }
}

impl<T> Catalog<T> {
    #[must_use]
    pub fn new() -> Self { Self { dfas: vec![] } }

    pub fn push(&mut self, dfa: Dfa<T>) -> &mut Self {
        self.dfas.push(dfa);
        self
    }

    /// Append an automaton for the exact text `text`
    ///
    /// # Errors
    /// Fails if `text` is empty.
    pub fn literal(&mut self, text: &str, tok: T) -> Result<&mut Self, BuildError> {
        Ok(self.push(Dfa::literal(text, tok)?))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize { self.dfas.len() }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool { self.dfas.is_empty() }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Dfa<T>> { self.dfas.iter() }

    #[inline]
    #[must_use]
    pub fn into_dfas(self) -> Vec<Dfa<T>> { self.dfas }
}

impl<T: Clone + PartialEq + fmt::Debug> Catalog<T> {
    /// Fold the whole catalog into one automaton, see [`Dfa::union_all`]
    #[must_use]
    pub fn merged(self) -> Option<Dfa<T>> { Dfa::union_all(self.dfas) }
}

impl<'a, T> IntoIterator for &'a Catalog<T> {
    type IntoIter = std::slice::Iter<'a, Dfa<T>>;
    type Item = &'a Dfa<T>;

    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

/// One or more letters, digits or underscores
///
/// Numbers go through here as well.
///
/// # Errors
/// Never fails for this fixed shape; the `Result` comes from the builder.
pub fn identifier<T>(tok: T) -> Result<Dfa<T>, BuildError> {
    let mut b = DfaBuilder::new();
    let start = b.start();
    let word = b.accept_state(tok);

    b.connect_all(start, word_syms(), word)?;
    b.connect_all(word, word_syms(), word)?;

    Ok(b.finish())
}

/// A run of spaces, tabs and carriage returns
///
/// # Errors
/// Never fails for this fixed shape.
pub fn whitespace<T>(tok: T) -> Result<Dfa<T>, BuildError> {
    let mut b = DfaBuilder::new();
    let start = b.start();
    let blank = b.accept_state(tok);

    b.connect_all(start, BLANK.chars(), blank)?;
    b.connect_all(blank, BLANK.chars(), blank)?;

    Ok(b.finish())
}

/// A single line feed
///
/// # Errors
/// Never fails for this fixed shape.
pub fn newline<T>(tok: T) -> Result<Dfa<T>, BuildError> { Dfa::literal("\n", tok) }

/// `//` up to and including the next line feed
///
/// Every symbol other than a line feed is treated the same inside the body.
///
/// # Errors
/// Never fails for this fixed shape.
pub fn line_comment<T>(tok: T) -> Result<Dfa<T>, BuildError> {
    let mut b = DfaBuilder::new();
    let start = b.start();
    let slash = b.state();
    let body = b.state();
    let done = b.accept_state(tok);

    b.connect(start, '/', slash)?;
    b.connect(slash, '/', body)?;
    b.connect_otherwise(body, body)?;
    b.connect(body, '\n', done)?;

    Ok(b.finish())
}

/// `end`, one or more blanks or line feeds, then `program.`
///
/// # Errors
/// Never fails for this fixed shape.
pub fn end_program<T>(tok: T) -> Result<Dfa<T>, BuildError> {
    let mut b = DfaBuilder::new();
    let mut at = b.start();

    for sym in "end".chars() {
        let next = b.state();
        b.connect(at, sym, next)?;
        at = next;
    }

    let gap = b.state();
    b.connect_all(at, BLANK.chars().chain(['\n']), gap)?;
    b.connect_all(gap, BLANK.chars().chain(['\n']), gap)?;
    at = gap;

    for sym in "program".chars() {
        let next = b.state();
        b.connect(at, sym, next)?;
        at = next;
    }

    let done = b.accept_state(tok);
    b.connect(at, '.', done)?;

    Ok(b.finish())
}

/// The catalog for the language
///
/// Literals come first so that a keyword beats an identifier of the same
/// length.
///
/// # Errors
/// Only fails if one of the fixed automata is malformed.
pub fn standard() -> Result<Catalog<TokenKind>, BuildError> {
    let mut catalog = Catalog::new();

    for &(text, tok) in LITERALS {
        catalog.literal(text, tok)?;
    }

    catalog
        .push(end_program(TokenKind::EndProgram)?)
        .push(identifier(TokenKind::Identifier)?)
        .push(whitespace(TokenKind::Ignore)?)
        .push(newline(TokenKind::Ignore)?)
        .push(line_comment(TokenKind::Ignore)?);

    Ok(catalog)
}
