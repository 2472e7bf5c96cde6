use arbitrary::Arbitrary;
use dovetail::{ByteSource, StrSource, Strategy, Token, Tokenizer, catalog::LITERALS};

#[derive(Debug, Clone, Copy, Arbitrary)]
pub enum Piece {
    Literal(u8),
    Symbol(char),
    Blank,
    Newline,
}

#[derive(Debug, Clone, Arbitrary)]
pub struct Input(Vec<Piece>);

impl Input {
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();

        for piece in &self.0 {
            match *piece {
                Piece::Literal(i) => out.push_str(LITERALS[usize::from(i) % LITERALS.len()].0),
                Piece::Symbol(c) => out.push(c),
                Piece::Blank => out.push(' '),
                Piece::Newline => out.push('\n'),
            }
        }

        out
    }
}

fn lex_str(text: &str, strategy: Strategy) -> Vec<Token> {
    Tokenizer::new(StrSource::new(text), strategy)
        .unwrap()
        .tokens()
        .collect()
}

/// Both simulation strategies must produce the same stream
pub fn check_strategies(text: &str) {
    let merged = lex_str(text, Strategy::Merged);
    let dovetail = lex_str(text, Strategy::Dovetail);
    assert_eq!(merged, dovetail, "{text:?}");
    assert!(merged.len() <= text.chars().count() + 1);
}

/// Reading ASCII text as bytes must not change the stream
pub fn check_bytes(text: &str) {
    if !text.is_ascii() {
        return;
    }

    let mut src = ByteSource::new(text.as_bytes());
    let bytes: Vec<_> = Tokenizer::new(&mut src, Strategy::Dovetail)
        .unwrap()
        .tokens()
        .collect();
    src.finish().unwrap();

    assert_eq!(bytes, lex_str(text, Strategy::Merged), "{text:?}");
}
