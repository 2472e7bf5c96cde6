//! Simulation cursor over a single [`Dfa`]

use std::fmt;

use crate::dfa::{Dfa, StateId};

/// Progress of an [`Automaton`] through its current match
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Still matching, not currently in a final state
    #[default]
    Running,
    /// Currently in a final state
    Accepted,
    /// The last symbol offered had no transition
    Rejected,
}

/// A [`Dfa`] together with the cursor of one in-progress match
///
/// The graph is never modified after construction; stepping only moves the
/// cursor and appends to the match text.  Call [`reset`](Self::reset) before
/// reusing a rejected automaton.
#[derive(Debug, Clone)]
pub struct Automaton<T> {
    dfa: Dfa<T>,
    state: StateId,
    text: String,
    status: Status,
}

impl<T> From<Dfa<T>> for Automaton<T> {
    #[inline]
    fn from(dfa: Dfa<T>) -> Self { Self::new(dfa) }
}

impl<T> Automaton<T> {
    #[must_use]
    pub fn new(dfa: Dfa<T>) -> Self {
        let mut me = Self {
            state: dfa.start(),
            dfa,
            text: String::new(),
            status: Status::Running,
        };
        me.reset();
        me
    }

    #[inline]
    #[must_use]
    pub fn dfa(&self) -> &Dfa<T> { &self.dfa }

    #[inline]
    #[must_use]
    pub fn into_dfa(self) -> Dfa<T> { self.dfa }

    #[inline]
    #[must_use]
    pub fn state(&self) -> StateId { self.state }

    #[inline]
    #[must_use]
    pub fn status(&self) -> Status { self.status }

    #[inline]
    #[must_use]
    pub fn is_live(&self) -> bool { self.status != Status::Rejected }

    /// Symbols consumed since the last reset
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str { &self.text }

    /// The tag of the current state, if it is final
    #[inline]
    #[must_use]
    pub fn token(&self) -> Option<&T> { self.dfa.accept(self.state) }

    fn status_of(&self, state: StateId) -> Status {
        if self.dfa.is_final(state) {
            Status::Accepted
        } else {
            Status::Running
        }
    }

    /// Return to the start state, clearing the match text
    ///
    /// The start state is never final, so this always leaves the automaton
    /// [`Running`](Status::Running).
    pub fn reset(&mut self) {
        self.state = self.dfa.start();
        self.text.clear();
        self.status = Status::Running;
    }

    /// Consume `sym`, returning the new state or `None` if there was no
    /// transition
    ///
    /// A rejected automaton stays rejected until it is reset.
    pub fn step(&mut self, sym: char) -> Option<StateId> {
        if self.status == Status::Rejected {
            return None;
        }

        let Some(next) = self.dfa.next(self.state, sym) else {
            self.status = Status::Rejected;
            return None;
        };

        self.text.push(sym);
        self.state = next;
        self.status = self.status_of(next);
        Some(next)
    }

    /// Look up the transition [`step`](Self::step) would take without taking
    /// it
    #[must_use]
    pub fn peek(&self, sym: char) -> Option<StateId> {
        if self.status == Status::Rejected {
            return None;
        }

        self.dfa.next(self.state, sym)
    }

    /// Whether consuming `sym` would land in a final state
    #[inline]
    #[must_use]
    pub fn peek_accepts(&self, sym: char) -> bool {
        self.peek(sym).is_some_and(|s| self.dfa.is_final(s))
    }
}

impl<T: Clone + PartialEq + fmt::Debug> Automaton<T> {
    /// Merge the graphs of two automata, see [`Dfa::union`]
    ///
    /// The result starts fresh regardless of either cursor.
    #[must_use]
    pub fn union(self, other: Self) -> Self { Self::new(self.dfa.union(other.dfa)) }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;
    use crate::dfa::DfaBuilder;

    fn number() -> Automaton<&'static str> {
        let mut b = DfaBuilder::new();
        let start = b.start();
        let digits = b.accept_state("num");
        b.connect_all(start, '0'..='9', digits).unwrap();
        b.connect_all(digits, '0'..='9', digits).unwrap();
        b.finish().into()
    }

    #[test]
    fn step_and_reject() {
        let mut a = number();
        assert_eq!(a.status(), Status::Running);
        assert_eq!(a.token(), None);

        assert!(a.step('4').is_some());
        assert_eq!(a.status(), Status::Accepted);
        assert!(a.step('2').is_some());
        assert_eq!(a.text(), "42");
        assert_eq!(a.token(), Some(&"num"));

        assert_eq!(a.step('x'), None);
        assert_eq!(a.status(), Status::Rejected);
        assert_eq!(a.text(), "42");

        // Stays rejected, even for a symbol that would have matched
        assert_eq!(a.step('1'), None);
        assert_eq!(a.status(), Status::Rejected);
        assert_eq!(a.peek('1'), None);

        a.reset();
        assert_eq!(a.status(), Status::Running);
        assert_eq!(a.text(), "");
        assert_eq!(a.state(), a.dfa().start());
    }

    #[test]
    fn peek_does_not_move() {
        let mut a = number();
        a.step('1');

        let state = a.state();
        assert!(a.peek('2').is_some());
        assert!(a.peek_accepts('2'));
        assert!(!a.peek_accepts('-'));
        assert_eq!(a.state(), state);
        assert_eq!(a.text(), "1");
        assert_eq!(a.status(), Status::Accepted);
    }

    #[test]
    fn literal_prefixes_and_mistakes() {
        let mut a = Automaton::new(Dfa::literal("put-integer", ()).unwrap());

        for (i, sym) in "put-integer".chars().enumerate() {
            assert!(a.step(sym).is_some());

            let expected = if i + 1 == "put-integer".len() {
                Status::Accepted
            } else {
                Status::Running
            };
            assert_eq!(a.status(), expected);
        }

        a.reset();
        for sym in "put-".chars() {
            a.step(sym);
        }
        assert_eq!(a.step('s'), None);
        assert_eq!(a.status(), Status::Rejected);
    }

    #[test]
    fn merged_automaton() {
        let a = number().union(Automaton::new(Dfa::literal("x", "x").unwrap()));
        let mut a2 = a.clone();

        a2.step('x');
        assert_eq!(a2.token(), Some(&"x"));
        assert_eq!(a.status(), Status::Running);
    }

    fn run(a: &mut Automaton<&'static str>, input: &str) -> (Status, String, StateId) {
        for sym in input.chars() {
            if a.step(sym).is_none() {
                break;
            }
        }

        (a.status(), a.text().to_owned(), a.state())
    }

    proptest! {
        #[test]
        fn reset_forgets_everything(input in "[0-9a ]{0,16}", noise in "[0-9a ]{0,16}") {
            let mut a = number();
            let first = run(&mut a, &input);

            a.reset();
            run(&mut a, &noise);
            a.reset();

            prop_assert_eq!(run(&mut a, &input), first);
        }
    }
}
