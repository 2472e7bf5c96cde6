//! Symbol sources the tokenizer reads from

use std::{
    io::{self, BufReader, Read},
    iter::Peekable,
    str::Chars,
};

use tracing::warn;

/// A forward-only stream of symbols with one symbol of lookahead
pub trait CharSource {
    /// The next symbol, without advancing
    fn peek(&mut self) -> Option<char>;

    /// The next symbol, advancing past it; `None` at end of input
    fn consume(&mut self) -> Option<char>;
}

impl<S: CharSource + ?Sized> CharSource for &mut S {
    #[inline]
    fn peek(&mut self) -> Option<char> { S::peek(self) }

    #[inline]
    fn consume(&mut self) -> Option<char> { S::consume(self) }
}

/// Unicode scalars of an in-memory string
#[derive(Debug, Clone)]
pub struct StrSource<'a>(Peekable<Chars<'a>>);

impl<'a> StrSource<'a> {
    #[inline]
    #[must_use]
    pub fn new(text: &'a str) -> Self { Self(text.chars().peekable()) }
}

impl<'a> From<&'a str> for StrSource<'a> {
    #[inline]
    fn from(text: &'a str) -> Self { Self::new(text) }
}

impl CharSource for StrSource<'_> {
    #[inline]
    fn peek(&mut self) -> Option<char> { self.0.peek().copied() }

    #[inline]
    fn consume(&mut self) -> Option<char> { self.0.next() }
}

/// One symbol per byte of a reader, U+0000 through U+00FF
///
/// The first read error ends the stream; it is kept for
/// [`finish`](Self::finish).
#[derive(Debug)]
pub struct ByteSource<R> {
    bytes: io::Bytes<BufReader<R>>,
    peeked: Option<Option<u8>>,
    error: Option<io::Error>,
}

impl<R: Read> ByteSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            bytes: BufReader::new(reader).bytes(),
            peeked: None,
            error: None,
        }
    }

    fn fill(&mut self) -> Option<u8> {
        if self.peeked.is_none() {
            let next = match self.bytes.next() {
                Some(Ok(b)) => Some(b),
                Some(Err(e)) => {
                    warn!("Read failed, treating it as end of input: {e}");
                    self.error = Some(e);
                    None
                },
                None => None,
            };

            self.peeked = Some(next);
        }

        self.peeked.flatten()
    }

    /// Surface the read error that ended the stream early, if any
    ///
    /// # Errors
    /// Returns the first error the underlying reader produced.
    pub fn finish(self) -> io::Result<()> { self.error.map_or(Ok(()), Err) }
}

impl<R: Read> CharSource for ByteSource<R> {
    #[inline]
    fn peek(&mut self) -> Option<char> { self.fill().map(char::from) }

    fn consume(&mut self) -> Option<char> {
        let b = self.fill()?;
        self.peeked = None;
        Some(char::from(b))
    }
}
