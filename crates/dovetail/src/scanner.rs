//! The tokenizer engine

use std::collections::VecDeque;

use hashbrown::HashMap;
use tracing::{debug, trace};

use crate::{
    autom::{Automaton, Status},
    catalog::{self, Catalog},
    dfa::{BuildError, StateId},
    source::CharSource,
    token::{Category, Position, Spanned, Token, TokenKind},
};

/// How the catalog is simulated
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Strategy {
    /// Fold the catalog into one automaton up front
    #[default]
    Merged,
    /// Step every catalog automaton side by side
    Dovetail,
}

enum Scan<T> {
    Match(T, String),
    Unknown(char),
    End,
}

/// Smallest dead-end table worth sweeping
const MIN_PRUNE: usize = 1024;

/// The path one automaton took during a single scan
#[derive(Debug, Default)]
struct Trail {
    states: Vec<StateId>,
    /// Length of `states` at the last round this automaton was a candidate
    hit: usize,
    /// Set once the automaton walked into a known dead end; holds whether it
    /// would have stayed live to the end of input
    dead_end: Option<bool>,
}

impl Trail {
    fn clear(&mut self) {
        self.states.clear();
        self.hit = 0;
        self.dead_end = None;
    }
}

/// Produces tokens from a [`CharSource`] by simulating a catalog of
/// automata one symbol at a time
///
/// Each round consumes exactly one symbol and advances every live automaton
/// by it before deciding anything.  An automaton that just reached a final
/// state becomes a candidate unless the lookahead symbol would keep it in a
/// final state; the longest candidate wins, with ties going to the earliest
/// catalog entry.  Scanning continues while any automaton can still take the
/// lookahead symbol.  Symbols read past the winning match are kept and
/// replayed for the next token, so the source is only ever read forward.
///
/// Replays are bounded by remembering every (automaton, state, offset)
/// reached after an automaton's last candidate.  Input is fixed, so reaching
/// one of those again can never produce a candidate and the automaton is
/// dropped from the round on the spot.
#[derive(Debug)]
pub struct Tokenizer<S, T = TokenKind> {
    source: S,
    automata: Vec<Automaton<T>>,
    trails: Vec<Trail>,
    dead_ends: HashMap<(usize, StateId, usize), bool>,
    prune_at: usize,
    pushback: VecDeque<char>,
    pos: Position,
    offset: usize,
    scanned: usize,
}

impl<S: CharSource> Tokenizer<S, TokenKind> {
    /// Build a tokenizer over the standard catalog
    ///
    /// # Errors
    /// Only fails if the standard catalog cannot be built.
    pub fn new(source: S, strategy: Strategy) -> Result<Self, BuildError> {
        Ok(Self::with_catalog(source, catalog::standard()?, strategy))
    }
}

impl<S: CharSource, T: Category> Tokenizer<S, T> {
    pub fn with_catalog(source: S, catalog: Catalog<T>, strategy: Strategy) -> Self {
        let automata: Vec<_> = match strategy {
            Strategy::Merged => catalog.merged().into_iter().map(Automaton::new).collect(),
            Strategy::Dovetail => catalog.into_dfas().into_iter().map(Automaton::new).collect(),
        };

        debug!(
            ?strategy,
            automata = automata.len(),
            states = automata.iter().map(|a| a.dfa().state_count()).sum::<usize>(),
            "Tokenizer ready"
        );

        Self {
            source,
            trails: automata.iter().map(|_| Trail::default()).collect(),
            automata,
            dead_ends: HashMap::new(),
            prune_at: MIN_PRUNE,
            pushback: VecDeque::new(),
            pos: Position::default(),
            offset: 0,
            scanned: 0,
        }
    }

    /// Position of the next symbol to be scanned
    #[inline]
    #[must_use]
    pub fn position(&self) -> Position { self.pos }

    /// Total symbols fed to the automata so far, replays included
    #[inline]
    #[must_use]
    pub fn symbols_scanned(&self) -> usize { self.scanned }

    #[inline]
    #[must_use]
    pub fn into_source(self) -> S { self.source }

    fn consume(&mut self) -> Option<char> {
        let sym = self
            .pushback
            .pop_front()
            .or_else(|| self.source.consume());
        self.scanned += usize::from(sym.is_some());
        sym
    }

    fn peek(&mut self) -> Option<char> {
        match self.pushback.front() {
            Some(&c) => Some(c),
            None => self.source.peek(),
        }
    }

    /// Commit the first `len` symbols of `text` and replay the rest
    fn commit(&mut self, mut text: String, len: usize) -> String {
        let split = text.char_indices().nth(len).map_or(text.len(), |(i, _)| i);
        let rest = text.split_off(split);

        for c in rest.chars().rev() {
            self.pushback.push_front(c);
        }

        self.advance(&text, len);
        text
    }

    fn advance(&mut self, text: &str, len: usize) {
        self.pos.advance_str(text);
        self.offset += len;

        if self.dead_ends.len() > self.prune_at {
            let offset = self.offset;
            self.dead_ends.retain(|&(_, _, at), _| at > offset);
            self.prune_at = (self.dead_ends.len() * 2).max(MIN_PRUNE);
        }
    }

    /// Remember where each automaton went after its last candidate
    fn record_dead_ends(&mut self, base: usize, at_eof: bool) {
        for (slot, (autom, trail)) in self.automata.iter().zip(&self.trails).enumerate() {
            let to_eof = trail
                .dead_end
                .unwrap_or_else(|| at_eof && autom.is_live());

            for (i, &state) in trail.states.iter().enumerate().skip(trail.hit) {
                self.dead_ends.insert((slot, state, base + i + 1), to_eof);
            }
        }
    }

    fn scan(&mut self) -> Scan<T> {
        for (autom, trail) in self.automata.iter_mut().zip(&mut self.trails) {
            autom.reset();
            trail.clear();
        }

        let base = self.offset;
        let mut text = String::new();
        let mut len = 0_usize;
        let mut best: Option<(T, usize)> = None;
        let mut at_eof = false;

        loop {
            let Some(sym) = self.consume() else {
                break;
            };
            let next = self.peek();
            text.push(sym);
            len += 1;

            // Every automaton live this round has consumed the same text, so
            // the first candidate in catalog order is the winner for this
            // length
            let mut candidate = None;
            for (slot, (autom, trail)) in
                self.automata.iter_mut().zip(&mut self.trails).enumerate()
            {
                if !autom.is_live() || trail.dead_end.is_some() {
                    continue;
                }

                let Some(state) = autom.step(sym) else {
                    continue;
                };

                if let Some(&to_eof) = self.dead_ends.get(&(slot, state, base + len)) {
                    trail.dead_end = Some(to_eof);
                    continue;
                }

                trail.states.push(state);

                if autom.status() == Status::Accepted
                    && !next.is_some_and(|n| autom.peek_accepts(n))
                {
                    trail.hit = trail.states.len();
                    if candidate.is_none() {
                        candidate = autom.token().cloned();
                    }
                }
            }

            trace!(?sym, ?next, ?candidate, len, "Scanned symbol");

            if let Some(tok) = candidate {
                best = Some((tok, len));
            }

            let Some(next) = next else {
                at_eof = true;
                break;
            };

            if !self
                .automata
                .iter()
                .zip(&self.trails)
                .any(|(a, t)| t.dead_end.is_none() && a.peek(next).is_some())
            {
                break;
            }
        }

        self.record_dead_ends(base, at_eof);

        if let Some((tok, len)) = best {
            let text = self.commit(text, len);
            return Scan::Match(tok, text);
        }

        let Some(first) = text.chars().next() else {
            return Scan::End;
        };

        let to_eof = self
            .automata
            .iter()
            .zip(&self.trails)
            .any(|(a, t)| t.dead_end.unwrap_or_else(|| at_eof && a.is_live()));

        if to_eof {
            while let Some(sym) = self.consume() {
                text.push(sym);
            }

            debug!(?text, "Dropping partial match at end of input");
            let len = text.chars().count();
            self.advance(&text, len);
            return Scan::End;
        }

        self.commit(text, 1);
        Scan::Unknown(first)
    }

    /// Scan the next significant token and the position it started at
    ///
    /// Returns an end-of-stream token once the input is exhausted, and keeps
    /// doing so if called again.
    pub fn next_spanned(&mut self) -> Spanned<T> {
        loop {
            let pos = self.pos;

            let token = match self.scan() {
                Scan::Match(tok, text) if tok.is_ignored() => {
                    trace!(?text, %pos, "Discarding ignored match");
                    continue;
                },
                Scan::Match(tok, text) => Token::new(tok, text),
                Scan::Unknown(sym) => {
                    debug!(?sym, %pos, "No automaton matches");
                    Token::new(T::unknown(), String::new())
                },
                Scan::End => {
                    return Spanned {
                        pos: self.pos,
                        token: Token::new(T::end_of_stream(), String::new()),
                    };
                },
            };

            return Spanned { pos, token };
        }
    }

    #[inline]
    pub fn next_token(&mut self) -> Token<T> { self.next_spanned().token }

    /// Iterate over tokens up to and including the first end-of-stream token
    pub fn tokens(&mut self) -> Tokens<'_, S, T> {
        Tokens {
            tokenizer: self,
            done: false,
        }
    }
}

/// Iterator returned by [`Tokenizer::tokens`]
#[derive(Debug)]
pub struct Tokens<'a, S, T> {
    tokenizer: &'a mut Tokenizer<S, T>,
    done: bool,
}

impl<S: CharSource, T: Category> Iterator for Tokens<'_, S, T> {
    type Item = Token<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let token = self.tokenizer.next_token();
        self.done = token.kind().is_end_of_stream();
        Some(token)
    }
}

#[cfg(test)]
mod test {
    use proptest::{prelude::*, strategy::Strategy as _};

    use super::{Strategy, *};
    use crate::{
        dfa::{Dfa, DfaBuilder},
        source::StrSource,
    };

    const STRATEGIES: [Strategy; 2] = [Strategy::Merged, Strategy::Dovetail];

    fn lex(input: &str, strategy: Strategy) -> Vec<Token> {
        Tokenizer::new(StrSource::new(input), strategy)
            .unwrap()
            .tokens()
            .collect()
    }

    fn tok(kind: TokenKind, text: &str) -> Token { Token::new(kind, text) }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tiny {
        First,
        Second,
        Blank,
        End,
        Unknown,
    }

    impl Category for Tiny {
        fn end_of_stream() -> Self { Self::End }

        fn unknown() -> Self { Self::Unknown }

        fn is_ignored(&self) -> bool { matches!(self, Self::Blank) }
    }

    #[test]
    fn same_length_ties_go_to_catalog_order() {
        for strategy in STRATEGIES {
            for (first, second) in [(Tiny::First, Tiny::Second), (Tiny::Second, Tiny::First)] {
                let catalog: Catalog<_> = [
                    Dfa::literal("ab", first).unwrap(),
                    Dfa::literal("ab", second).unwrap(),
                    Dfa::literal(" ", Tiny::Blank).unwrap(),
                ]
                .into_iter()
                .collect();

                let toks: Vec<_> =
                    Tokenizer::with_catalog(StrSource::new("ab ab"), catalog, strategy)
                        .tokens()
                        .map(|t| *t.kind())
                        .collect();

                assert_eq!(toks, [first, first, Tiny::End], "{strategy:?}");
            }
        }
    }

    #[test]
    fn keyword_vs_identifier() {
        for strategy in STRATEGIES {
            assert_eq!(lex("begin123 ", strategy), [
                tok(TokenKind::Identifier, "begin123"),
                tok(TokenKind::EndOfStream, ""),
            ]);

            assert_eq!(lex("begin begins", strategy), [
                tok(TokenKind::Begin, "begin"),
                tok(TokenKind::Identifier, "begins"),
                tok(TokenKind::EndOfStream, ""),
            ]);
        }
    }

    #[test]
    fn rewinds_to_last_accept() {
        for strategy in STRATEGIES {
            assert_eq!(lex("end programx", strategy), [
                tok(TokenKind::End, "end"),
                tok(TokenKind::Identifier, "programx"),
                tok(TokenKind::EndOfStream, ""),
            ]);

            assert_eq!(lex("put-x", strategy), [
                tok(TokenKind::Identifier, "put"),
                tok(TokenKind::Minus, "-"),
                tok(TokenKind::Identifier, "x"),
                tok(TokenKind::EndOfStream, ""),
            ]);
        }
    }

    #[test]
    fn unknown_advances() {
        for strategy in STRATEGIES {
            let mut t = Tokenizer::new(StrSource::new("#x = y"), strategy).unwrap();

            assert_eq!(t.next_token(), tok(TokenKind::Unknown, ""));
            assert_eq!(t.position(), Position { line: 1, column: 1 });
            assert_eq!(t.next_token(), tok(TokenKind::Identifier, "x"));
            assert_eq!(t.next_token(), tok(TokenKind::Unknown, ""));
            assert_eq!(t.next_token(), tok(TokenKind::Identifier, "y"));
            assert_eq!(t.next_token(), tok(TokenKind::EndOfStream, ""));
            assert_eq!(t.next_token(), tok(TokenKind::EndOfStream, ""));
        }
    }

    #[test]
    fn partial_match_at_end_is_dropped() {
        for strategy in STRATEGIES {
            assert_eq!(lex("x end prog", strategy), [
                tok(TokenKind::Identifier, "x"),
                tok(TokenKind::End, "end"),
                tok(TokenKind::Identifier, "prog"),
                tok(TokenKind::EndOfStream, ""),
            ]);

            let mut t = Tokenizer::new(StrSource::new("x put-"), strategy).unwrap();
            assert_eq!(t.next_token(), tok(TokenKind::Identifier, "x"));
            assert_eq!(t.next_token(), tok(TokenKind::Identifier, "put"));
            assert_eq!(t.next_token(), tok(TokenKind::Minus, "-"));
            assert_eq!(t.next_token(), tok(TokenKind::EndOfStream, ""));

            // The blank is discarded, then the `=` is a partial `==` dropped at
            // end of input
            let mut t = Tokenizer::new(StrSource::new("x ="), strategy).unwrap();
            assert_eq!(t.next_token(), tok(TokenKind::Identifier, "x"));
            assert_eq!(t.next_token(), tok(TokenKind::EndOfStream, ""));
            assert_eq!(t.position(), Position { line: 1, column: 3 });
        }
    }

    #[test]
    fn replays_stay_linear() {
        for strategy in STRATEGIES {
            for n in [500, 2000] {
                for input in ["/".repeat(n), "// a".repeat(n / 4)] {
                    let mut t = Tokenizer::new(StrSource::new(&input), strategy).unwrap();
                    let count = t.tokens().count();

                    assert!(count > n / 4, "{strategy:?} {n}");
                    assert!(
                        t.symbols_scanned() <= 4 * n,
                        "{strategy:?} {n}: scanned {}",
                        t.symbols_scanned()
                    );
                }
            }

            let mut t = Tokenizer::new(StrSource::new("//////"), strategy).unwrap();
            assert_eq!(
                t.tokens().collect::<Vec<_>>(),
                vec![tok(TokenKind::Divide, "/"); 6]
                    .into_iter()
                    .chain([tok(TokenKind::EndOfStream, "")])
                    .collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn known_dead_end_still_drops_to_end_of_input() {
        // `[ab]b*c`, which never completes on the input below
        let mut b = DfaBuilder::new();
        let start = b.start();
        let body = b.state();
        let done = b.accept_state(Tiny::Second);
        b.connect_all(start, ['a', 'b'], body).unwrap();
        b.connect(body, 'b', body).unwrap();
        b.connect(body, 'c', done).unwrap();
        let long = b.finish();

        for strategy in STRATEGIES {
            let catalog: Catalog<_> = [Dfa::literal("a", Tiny::First).unwrap(), long.clone()]
                .into_iter()
                .collect();
            let mut t = Tokenizer::with_catalog(StrSource::new("abbb"), catalog, strategy);

            assert_eq!(t.next_token(), Token::new(Tiny::First, "a"));
            assert_eq!(t.next_token(), Token::new(Tiny::End, ""));
            assert_eq!(t.position(), Position { line: 1, column: 4 });
            assert_eq!(t.next_token(), Token::new(Tiny::End, ""));
        }
    }

    #[test]
    fn positions() {
        let mut t = Tokenizer::new(
            StrSource::new("begin\n  x := 1; // set\n\ty"),
            Strategy::Dovetail,
        )
        .unwrap();

        let mut seen = vec![];
        loop {
            let Spanned { pos, token } = t.next_spanned();
            let end = token.kind().is_end_of_stream();
            seen.push((pos.line, pos.column, token.text().to_owned()));

            if end {
                break;
            }
        }

        assert_eq!(seen, [
            (1, 0, "begin".into()),
            (2, 2, "x".into()),
            (2, 4, ":=".into()),
            (2, 7, "1".into()),
            (2, 8, ";".into()),
            (3, 1, "y".into()),
            (3, 2, String::new()),
        ]);
    }

    const FRAGMENTS: &[&str] = &[
        "begin", "end", "program", "procedure", "pro", ".", " ", "\n", "\t", ":", "=", "/",
        "//", "x", "1", "#", "put-", "integer", "if", ";", "(", "\"",
    ];

    fn fragments() -> impl proptest::strategy::Strategy<Value = String> {
        prop::collection::vec(prop::sample::select(FRAGMENTS), 0..24).prop_map(|v| v.concat())
    }

    proptest! {
        #[test]
        fn strategies_agree(input in fragments()) {
            prop_assert_eq!(lex(&input, Strategy::Merged), lex(&input, Strategy::Dovetail));
        }

        #[test]
        fn strategies_agree_on_noise(input in "[a-z0-9 :=;,/\n#.\"(){}<>+*-]{0,48}") {
            prop_assert_eq!(lex(&input, Strategy::Merged), lex(&input, Strategy::Dovetail));
        }

        #[test]
        fn always_progresses(input in "[a-z0-9 :=;/\n#.-]{0,48}") {
            let toks = lex(&input, Strategy::Merged);

            prop_assert!(toks.len() <= input.chars().count() + 1);
            prop_assert_eq!(toks.last().map(Token::kind), Some(&TokenKind::EndOfStream));

            // Significant text comes out in input order
            let mut rest = input.as_str();
            for t in &toks {
                let at = rest.find(t.text());
                prop_assert!(at.is_some(), "{:?} not found in {:?}", t, rest);
                rest = &rest[at.unwrap_or(0) + t.text().len()..];
            }
        }
    }
}
