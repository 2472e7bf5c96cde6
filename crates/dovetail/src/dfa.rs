//! Deterministic automata stored as an arena of states

use std::{collections::BTreeMap, fmt};

pub use union::UnionStats;

mod union;

/// Index of a state within the arena of one [`Dfa`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct StateId(usize);

impl StateId {
    #[must_use]
    #[inline]
    pub fn id(self) -> usize { self.0 }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "q{}", self.0) }
}

#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Cannot build an automaton for an empty literal")]
    EmptyLiteral,
    #[error("The start state cannot be final")]
    AcceptingStart,
    #[error("No state {0} in this automaton")]
    NoState(StateId),
    #[error(
        "State {state} already moves to {existing} on {}, refusing to add an edge to {to}",
        fmt_edge(.symbol)
    )]
    Nondeterministic {
        state: StateId,
        symbol: Option<char>,
        existing: StateId,
        to: StateId,
    },
}

#[allow(clippy::ref_option)]
fn fmt_edge(symbol: &Option<char>) -> String {
    symbol.map_or_else(|| "any other symbol".into(), |c| format!("{c:?}"))
}

/// A single automaton state
///
/// `otherwise` is taken by every symbol without an explicit edge, which is
/// how "anything but a newline" is spelled over a Unicode alphabet.  A state
/// is final iff it carries an accept tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State<T> {
    edges: BTreeMap<char, StateId>,
    otherwise: Option<StateId>,
    accept: Option<T>,
}

impl<T> Default for State<T> {
    fn default() -> Self {
        Self {
            edges: BTreeMap::new(),
            otherwise: None,
            accept: None,
        }
    }
}

impl<T> State<T> {
    #[inline]
    #[must_use]
    pub fn edges(&self) -> &BTreeMap<char, StateId> { &self.edges }

    #[inline]
    #[must_use]
    pub fn otherwise(&self) -> Option<StateId> { self.otherwise }

    #[inline]
    #[must_use]
    pub fn accept(&self) -> Option<&T> { self.accept.as_ref() }

    #[inline]
    #[must_use]
    pub fn is_final(&self) -> bool { self.accept.is_some() }

    #[inline]
    #[must_use]
    pub fn next(&self, sym: char) -> Option<StateId> {
        self.edges.get(&sym).copied().or(self.otherwise)
    }
}

/// An immutable deterministic automaton
///
/// States are addressed by [`StateId`]; the graph may contain cycles and
/// shared successors.  Construct one with [`DfaBuilder`], [`Dfa::literal`],
/// or by merging two automata with [`Dfa::union`].
#[derive(Debug, Clone)]
pub struct Dfa<T> {
    states: Vec<State<T>>,
    start: StateId,
}

impl<T> Dfa<T> {
    #[inline]
    #[must_use]
    pub fn start(&self) -> StateId { self.start }

    #[inline]
    #[must_use]
    pub fn state_count(&self) -> usize { self.states.len() }

    #[inline]
    #[must_use]
    pub fn get(&self, id: StateId) -> Option<&State<T>> { self.states.get(id.0) }

    pub fn states(&self) -> impl ExactSizeIterator<Item = (StateId, &State<T>)> {
        self.states.iter().enumerate().map(|(i, s)| (StateId(i), s))
    }

    #[inline]
    #[must_use]
    pub fn next(&self, from: StateId, sym: char) -> Option<StateId> { self.get(from)?.next(sym) }

    #[inline]
    #[must_use]
    pub fn accept(&self, id: StateId) -> Option<&T> { self.get(id)?.accept() }

    #[inline]
    #[must_use]
    pub fn is_final(&self, id: StateId) -> bool { self.accept(id).is_some() }

    /// Run the whole input from the start state, returning the accept tag of
    /// the state it ends in
    pub fn accepts<I: IntoIterator<Item = char>>(&self, input: I) -> Option<&T> {
        let end = input
            .into_iter()
            .try_fold(self.start, |state, sym| self.next(state, sym))?;
        self.accept(end)
    }

    /// Build an automaton accepting exactly `text`
    ///
    /// # Errors
    /// Returns [`BuildError::EmptyLiteral`] if `text` is empty.
    pub fn literal(text: &str, tok: T) -> Result<Self, BuildError> {
        let syms: Vec<char> = text.chars().collect();
        let Some((&last, init)) = syms.split_last() else {
            return Err(BuildError::EmptyLiteral);
        };

        let mut b = DfaBuilder::new();
        let mut at = b.start();

        for &sym in init {
            let next = b.state();
            b.connect(at, sym, next)?;
            at = next;
        }

        let end = b.accept_state(tok);
        b.connect(at, last, end)?;

        Ok(b.finish())
    }
}

/// Mutable construction pass for a [`Dfa`]
#[derive(Debug)]
pub struct DfaBuilder<T> {
    states: Vec<State<T>>,
}

impl<T> Default for DfaBuilder<T> {
    fn default() -> Self { Self::new() }
}

impl<T> DfaBuilder<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: vec![State::default()],
        }
    }

    #[inline]
    #[must_use]
    pub fn start(&self) -> StateId { StateId(0) }

    fn push(&mut self, state: State<T>) -> StateId {
        let id = StateId(self.states.len());
        self.states.push(state);
        id
    }

    pub fn state(&mut self) -> StateId { self.push(State::default()) }

    pub fn accept_state(&mut self, tok: T) -> StateId {
        self.push(State {
            accept: Some(tok),
            ..State::default()
        })
    }

    fn get_mut(&mut self, id: StateId) -> Result<&mut State<T>, BuildError> {
        self.states.get_mut(id.0).ok_or(BuildError::NoState(id))
    }

    fn check(&self, id: StateId) -> Result<(), BuildError> {
        if id.0 < self.states.len() {
            Ok(())
        } else {
            Err(BuildError::NoState(id))
        }
    }

    /// Mark `id` as final with the given tag, or clear its tag with `None`
    ///
    /// Every match consumes at least one symbol, so the start state never
    /// carries a tag.
    ///
    /// # Errors
    /// Returns [`BuildError::NoState`] if `id` was not created by this builder
    /// and [`BuildError::AcceptingStart`] if `id` is the start state.
    pub fn set_accept(&mut self, id: StateId, tok: Option<T>) -> Result<Option<T>, BuildError> {
        if id == self.start() && tok.is_some() {
            return Err(BuildError::AcceptingStart);
        }

        let state = self.get_mut(id)?;
        Ok(std::mem::replace(&mut state.accept, tok))
    }

    /// Add the edge `from --sym--> to`
    ///
    /// Re-adding an identical edge is a no-op.
    ///
    /// # Errors
    /// Fails if either state is foreign to this builder or if `sym` already
    /// leads somewhere else from `from`.
    pub fn connect(&mut self, from: StateId, sym: char, to: StateId) -> Result<(), BuildError> {
        self.check(to)?;
        let state = self.get_mut(from)?;

        match state.edges.get(&sym) {
            Some(&existing) if existing != to => Err(BuildError::Nondeterministic {
                state: from,
                symbol: Some(sym),
                existing,
                to,
            }),
            Some(_) => Ok(()),
            None => {
                state.edges.insert(sym, to);
                Ok(())
            },
        }
    }

    /// Add `from --sym--> to` for every symbol in `syms`
    ///
    /// # Errors
    /// See [`connect`](Self::connect).
    pub fn connect_all<I: IntoIterator<Item = char>>(
        &mut self,
        from: StateId,
        syms: I,
        to: StateId,
    ) -> Result<(), BuildError> {
        syms.into_iter().try_for_each(|s| self.connect(from, s, to))
    }

    /// Route every symbol without an explicit edge out of `from` to `to`
    ///
    /// # Errors
    /// See [`connect`](Self::connect).
    pub fn connect_otherwise(&mut self, from: StateId, to: StateId) -> Result<(), BuildError> {
        self.check(to)?;
        let state = self.get_mut(from)?;

        match state.otherwise {
            Some(existing) if existing != to => Err(BuildError::Nondeterministic {
                state: from,
                symbol: None,
                existing,
                to,
            }),
            _ => {
                state.otherwise = Some(to);
                Ok(())
            },
        }
    }

    #[must_use]
    pub fn finish(self) -> Dfa<T> {
        Dfa {
            states: self.states,
            start: StateId(0),
        }
    }
}
