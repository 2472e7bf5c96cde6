//! Token categories and the records the tokenizer produces

use std::fmt;

/// What the tokenizer needs to know about a token tag
pub trait Category: Clone + PartialEq + fmt::Debug {
    /// The tag emitted once input is exhausted
    fn end_of_stream() -> Self;

    /// The tag emitted for a symbol no automaton could start a match with
    fn unknown() -> Self;

    /// Whether matches of this tag are dropped instead of emitted
    fn is_ignored(&self) -> bool;

    #[inline]
    fn is_end_of_stream(&self) -> bool { *self == Self::end_of_stream() }
}

/// Token categories of the language
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenKind {
    Identifier,

    // keywords
    Integer,
    Bool,
    Global,
    Begin,
    End,
    Program,
    EndProgram,
    Is,
    Procedure,
    If,
    Else,
    Then,
    While,
    For,
    Return,

    // built-in calls
    GetBool,
    GetInteger,
    GetString,
    PutBool,
    PutInteger,
    PutString,

    // operators
    Plus,
    Minus,
    Multiply,
    Divide,
    Assign,
    Equals,

    // punctuation
    Semicolon,
    Colon,
    Comma,
    Quote,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Less,
    Greater,
    LParen,
    RParen,

    EndOfStream,
    Unknown,
    /// Whitespace, newlines and comments; never emitted
    Ignore,
}

impl TokenKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Identifier => "identifier",
            Self::Integer => "integer",
            Self::Bool => "bool",
            Self::Global => "global",
            Self::Begin => "begin",
            Self::End => "end",
            Self::Program => "program",
            Self::EndProgram => "end_program",
            Self::Is => "is",
            Self::Procedure => "procedure",
            Self::If => "if",
            Self::Else => "else",
            Self::Then => "then",
            Self::While => "while",
            Self::For => "for",
            Self::Return => "return",
            Self::GetBool => "get_bool",
            Self::GetInteger => "get_integer",
            Self::GetString => "get_string",
            Self::PutBool => "put_bool",
            Self::PutInteger => "put_integer",
            Self::PutString => "put_string",
            Self::Plus => "plus",
            Self::Minus => "minus",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
            Self::Assign => "assign",
            Self::Equals => "equals",
            Self::Semicolon => "semicolon",
            Self::Colon => "colon",
            Self::Comma => "comma",
            Self::Quote => "quote",
            Self::LBracket => "lbracket",
            Self::RBracket => "rbracket",
            Self::LBrace => "lbrace",
            Self::RBrace => "rbrace",
            Self::Less => "less",
            Self::Greater => "greater",
            Self::LParen => "lparen",
            Self::RParen => "rparen",
            Self::EndOfStream => "end_of_stream",
            Self::Unknown => "unknown",
            Self::Ignore => "ignore",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl Category for TokenKind {
    #[inline]
    fn end_of_stream() -> Self { Self::EndOfStream }

    #[inline]
    fn unknown() -> Self { Self::Unknown }

    #[inline]
    fn is_ignored(&self) -> bool { matches!(self, Self::Ignore) }
}

/// A category tag and the exact text it matched
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token<T = TokenKind> {
    kind: T,
    text: String,
}

impl<T> Token<T> {
    #[inline]
    pub fn new<S: Into<String>>(kind: T, text: S) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> &T { &self.kind }

    #[inline]
    #[must_use]
    pub fn text(&self) -> &str { &self.text }

    #[inline]
    #[must_use]
    pub fn into_parts(self) -> (T, String) { (self.kind, self.text) }
}

impl<T: fmt::Display> fmt::Display for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.kind, self.text)
    }
}

/// Line and column of the next symbol to be consumed
///
/// Lines count from 1.  The column is the number of symbols already consumed
/// on the current line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Default for Position {
    fn default() -> Self { Self { line: 1, column: 0 } }
}

impl Position {
    /// Account for one consumed symbol
    pub fn advance(&mut self, sym: char) {
        if sym == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
    }

    pub fn advance_str(&mut self, text: &str) { text.chars().for_each(|c| self.advance(c)); }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A token and the position its first symbol was read from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Spanned<T = TokenKind> {
    pub pos: Position,
    pub token: Token<T>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn position_counts_lines_and_columns() {
        let mut pos = Position::default();
        pos.advance_str("ab\ncd");
        assert_eq!(pos, Position { line: 2, column: 2 });

        pos.advance('\n');
        assert_eq!(pos.to_string(), "3:0");
    }

    #[test]
    fn categories() {
        assert!(TokenKind::Ignore.is_ignored());
        assert!(!TokenKind::Identifier.is_ignored());
        assert!(TokenKind::EndOfStream.is_end_of_stream());
        assert!(!TokenKind::Unknown.is_end_of_stream());
        assert_eq!(
            Token::new(TokenKind::EndProgram, "end program.").to_string(),
            "end_program(\"end program.\")"
        );
    }
}
