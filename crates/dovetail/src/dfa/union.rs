use std::{collections::VecDeque, fmt};

use hashbrown::HashMap;
use tracing::debug;

use super::{Dfa, State, StateId};

type Pair = (Option<StateId>, Option<StateId>);

/// Bookkeeping from a single [`Dfa::union`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnionStats {
    /// Number of states in the merged automaton
    pub states: usize,
    /// Number of merged states where both operands were final with different
    /// tags and the receiver's tag was kept
    pub shadowed: usize,
}

struct Merge<'a, T> {
    lhs: &'a Dfa<T>,
    rhs: &'a Dfa<T>,
    ids: HashMap<Pair, StateId>,
    states: Vec<State<T>>,
    queue: VecDeque<Pair>,
    shadowed: usize,
}

impl<'a, T: Clone + PartialEq + fmt::Debug> Merge<'a, T> {
    fn new(lhs: &'a Dfa<T>, rhs: &'a Dfa<T>) -> Self {
        Self {
            lhs,
            rhs,
            ids: HashMap::new(),
            states: Vec::new(),
            queue: VecDeque::new(),
            shadowed: 0,
        }
    }

    fn intern(&mut self, pair: Pair) -> StateId {
        let Self { ids, states, queue, .. } = self;

        *ids.entry(pair).or_insert_with(|| {
            let id = StateId(states.len());
            states.push(State::default());
            queue.push_back(pair);
            id
        })
    }

    fn accept(
        &mut self,
        (l, r): Pair,
        lhs: Option<&'a State<T>>,
        rhs: Option<&'a State<T>>,
    ) -> Option<T> {
        match (lhs.and_then(State::accept), rhs.and_then(State::accept)) {
            (Some(a), Some(b)) => {
                if a != b {
                    debug!(?l, ?r, kept = ?a, dropped = ?b, "Merged final states disagree");
                    self.shadowed += 1;
                }

                Some(a.clone())
            },
            (a, b) => a.or(b).cloned(),
        }
    }

    fn run(mut self) -> (Dfa<T>, UnionStats) {
        let (lhs, rhs) = (self.lhs, self.rhs);
        let start = self.intern((Some(lhs.start), Some(rhs.start)));

        while let Some(pair @ (l, r)) = self.queue.pop_front() {
            let id = self.ids[&pair];
            let ls = l.and_then(|l| lhs.get(l));
            let rs = r.and_then(|r| rhs.get(r));

            let accept = self.accept(pair, ls, rs);

            // Symbols only one side knows about pair up with the other side's
            // default edge, if it has one
            let syms: Vec<char> = {
                let mut syms: Vec<char> = ls
                    .into_iter()
                    .chain(rs)
                    .flat_map(|s| s.edges.keys().copied())
                    .collect();
                syms.sort_unstable();
                syms.dedup();
                syms
            };

            let mut state = State {
                accept,
                ..State::default()
            };

            for sym in syms {
                let next = (
                    ls.and_then(|s| s.next(sym)),
                    rs.and_then(|s| s.next(sym)),
                );
                state.edges.insert(sym, self.intern(next));
            }

            let otherwise = (
                ls.and_then(State::otherwise),
                rs.and_then(State::otherwise),
            );
            if otherwise != (None, None) {
                state.otherwise = Some(self.intern(otherwise));
            }

            self.states[id.0] = state;
        }

        let stats = UnionStats {
            states: self.states.len(),
            shadowed: self.shadowed,
        };

        (
            Dfa {
                states: self.states,
                start,
            },
            stats,
        )
    }
}

impl<T: Clone + PartialEq + fmt::Debug> Dfa<T> {
    /// Merge two automata into one recognizing the union of their languages
    ///
    /// Wherever both start states move on the same symbol the two successors
    /// are merged in turn, one level deeper, until the paths diverge; from
    /// there each side's subgraph is carried over unchanged.  A merged state
    /// that is final in both operands keeps `self`'s tag, so earlier automata
    /// take priority when folding a catalog.
    #[must_use]
    pub fn union(self, other: Self) -> Self { self.union_with_stats(other).0 }

    /// [`union`](Self::union), also reporting how many final states were
    /// shadowed by the receiver
    #[must_use]
    pub fn union_with_stats(self, other: Self) -> (Self, UnionStats) {
        let (dfa, stats) = Merge::new(&self, &other).run();
        debug!(
            lhs = self.state_count(),
            rhs = other.state_count(),
            merged = stats.states,
            shadowed = stats.shadowed,
            "Merged automata"
        );
        (dfa, stats)
    }

    /// Fold every automaton into one, merging each into the running
    /// accumulator in iteration order
    ///
    /// Returns `None` if the iterator is empty.
    pub fn union_all<I: IntoIterator<Item = Self>>(dfas: I) -> Option<Self> {
        dfas.into_iter().reduce(Self::union)
    }
}
