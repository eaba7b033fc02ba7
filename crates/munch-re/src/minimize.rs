use std::collections::BTreeMap;

use bit_set::BitSet;
use munch_util::UnionFind;

use crate::alphabet::Alphabet;
use crate::dfa::{Dfa, DfaId, DfaState};

// triangular table of "known distinguishable" flags, one per unordered pair of
// distinct states: row `high` holds the pairs (0..high, high)
struct PairTable {
    marks: Vec<bool>,
}

impl PairTable {
    fn new(n: usize) -> PairTable {
        PairTable {
            marks: vec![false; n * n.saturating_sub(1) / 2],
        }
    }

    fn slot(&self, a: usize, b: usize) -> usize {
        debug_assert_ne!(a, b);
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        high * (high - 1) / 2 + low
    }

    fn get(&self, a: usize, b: usize) -> bool {
        self.marks[self.slot(a, b)]
    }

    fn mark(&mut self, a: usize, b: usize) {
        let slot = self.slot(a, b);
        self.marks[slot] = true;
    }
}

// accepting vs non-accepting, or accepting with different tokens
fn initially_distinguishable(a: &DfaState, b: &DfaState) -> bool {
    if a.accepting != b.accepting {
        return true;
    }
    a.accepting && a.token_type() != b.token_type()
}

impl Dfa {
    /// Table-filling minimization. Accepting states producing different tokens
    /// are never merged.
    pub fn minimize(&self, alphabet: &Alphabet) -> Dfa {
        // with an empty alphabet no transition survives, matching determinization
        if !alphabet.is_empty() {
            for (_, state) in self.states() {
                for c in state.transitions.keys() {
                    assert!(alphabet.contains(*c), "alphabet is missing DFA symbol {:?}", c);
                }
            }
        }

        let n = self.states.len();
        let mut table = PairTable::new(n);

        for i in 0..n {
            for j in i + 1..n {
                if initially_distinguishable(&self.states[i], &self.states[j]) {
                    table.mark(i, j);
                }
            }
        }

        let mut changed = true;
        while changed {
            changed = false;
            for i in 0..n {
                for j in i + 1..n {
                    if table.get(i, j) {
                        continue;
                    }

                    let split = alphabet.iter().any(|c| {
                        match (self.states[i].next(c), self.states[j].next(c)) {
                            (Some(p), Some(q)) => p != q && table.get(p.index(), q.index()),
                            (None, None) => false,
                            _ => true,
                        }
                    });
                    if split {
                        table.mark(i, j);
                        changed = true;
                    }
                }
            }
        }

        let mut partition = UnionFind::new(n);
        for i in 0..n {
            for j in i + 1..n {
                if !table.get(i, j) {
                    partition.union(i, j);
                }
            }
        }
        let classes = partition.classes();

        let mut class_of: Vec<DfaId> = vec![DfaId::from_index(0); n];
        for (class, members) in classes.iter().enumerate() {
            for member in members {
                class_of[*member] = DfaId::from_index(class);
            }
        }

        let mut states: Vec<DfaState> = Vec::with_capacity(classes.len());
        for members in &classes {
            let mut nfa_states = BitSet::new();
            for member in members {
                nfa_states.union_with(&self.states[*member].nfa_states);
            }

            let accepting = members.iter().any(|m| self.states[*m].accepting);
            // members agree on the token type; keep the best priority among them
            let tag = members.iter()
                .filter_map(|m| self.states[*m].tag.as_ref())
                .min_by_key(|tag| tag.priority)
                .cloned();

            // any member works as representative since the class is closed under transitions
            let representative = &self.states[members[0]];
            let transitions: BTreeMap<char, DfaId> = representative.transitions.iter()
                .filter(|(c, _)| alphabet.contains(**c))
                .map(|(c, next)| (*c, class_of[next.index()]))
                .collect();

            states.push(DfaState {
                nfa_states,
                transitions,
                accepting,
                tag,
            });
        }

        Dfa {
            states,
            start: class_of[self.start.index()],
        }
    }
}
