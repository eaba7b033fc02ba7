use std::collections::{BTreeMap, HashMap, VecDeque};

use bit_set::BitSet;
use munch_util::make_type_idx;

use crate::alphabet::Alphabet;
use crate::combine::CombinedNfa;
use crate::nfa::{Nfa, StateId};
use crate::rules::{AcceptTag, TokenType};

make_type_idx!(pub DfaId, DfaState);

/// A DFA state is defined by the set of NFA states it stands for. Missing
/// transitions mean "no move".
#[derive(Debug, Clone)]
pub struct DfaState {
    pub(crate) nfa_states: BitSet,
    pub(crate) transitions: BTreeMap<char, DfaId>,
    pub(crate) accepting: bool,
    pub(crate) tag: Option<AcceptTag>,
}

impl DfaState {
    pub(crate) fn new(nfa_states: BitSet) -> DfaState {
        DfaState {
            nfa_states,
            transitions: BTreeMap::new(),
            accepting: false,
            tag: None,
        }
    }

    pub fn nfa_states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.nfa_states.iter().map(StateId::from_index)
    }

    pub fn transitions(&self) -> &BTreeMap<char, DfaId> {
        &self.transitions
    }

    pub fn next(&self, c: char) -> Option<DfaId> {
        self.transitions.get(&c).copied()
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    pub fn tag(&self) -> Option<&AcceptTag> {
        self.tag.as_ref()
    }

    pub fn token_type(&self) -> Option<&TokenType> {
        self.tag.as_ref().map(|tag| &tag.token_type)
    }
}

#[derive(Debug, Clone)]
pub struct Dfa {
    pub(crate) states: Vec<DfaState>,
    pub(crate) start: DfaId,
}

impl Dfa {
    /// Subset construction for a plain single-pattern NFA.
    pub fn from_nfa(nfa: &Nfa, alphabet: &Alphabet) -> Dfa {
        Self::subset_construction(nfa, alphabet, |_| None)
    }

    /// Subset construction for a rule-tagged NFA. Accepting DFA states take
    /// the tag of the highest-priority rule among their NFA states.
    pub fn from_combined(combined: &CombinedNfa, alphabet: &Alphabet) -> Dfa {
        Self::subset_construction(combined.nfa(), alphabet, |state| combined.tag(state))
    }

    fn subset_construction<F>(nfa: &Nfa, alphabet: &Alphabet, tag_of: F) -> Dfa
        where F: Fn(StateId) -> Option<AcceptTag>
    {
        // an empty alphabet leaves only the start closure, with no moves
        if !alphabet.is_empty() {
            for c in nfa.literals() {
                assert!(alphabet.contains(c), "alphabet is missing NFA symbol {:?}", c);
            }
        }

        let mut initial_configuration = BitSet::with_capacity(nfa.len());
        initial_configuration.insert(nfa.start.index());
        nfa.epsilon_closure(&mut initial_configuration);

        let mut states: Vec<DfaState> = Vec::new();
        // configuration -> id, so equal NFA-state sets always map to one DFA state
        let mut subsets: HashMap<BitSet, DfaId> = HashMap::new();
        let start = DfaId::from_push(&mut states, DfaState::new(initial_configuration.clone()));
        subsets.insert(initial_configuration, start);

        let mut work_queue: VecDeque<DfaId> = VecDeque::new();
        work_queue.push_back(start);

        while let Some(q) = work_queue.pop_front() {
            for c in alphabet.iter() {
                let mut t = nfa.step(&states[q].nfa_states, c);
                if t.is_empty() {
                    continue;
                }
                nfa.epsilon_closure(&mut t);

                let target = match subsets.get(&t) {
                    Some(existing) => *existing,
                    None => {
                        let id = DfaId::from_push(&mut states, DfaState::new(t.clone()));
                        subsets.insert(t, id);
                        work_queue.push_back(id);
                        id
                    }
                };
                states[q].transitions.insert(c, target);
            }
        }

        for state in states.iter_mut() {
            state.accepting = nfa.contains_accepting(&state.nfa_states);
            state.tag = state.nfa_states.iter()
                .filter_map(|i| tag_of(StateId::from_index(i)))
                .min_by_key(|tag| tag.priority);
        }

        Dfa { states, start }
    }

    pub fn start(&self) -> DfaId {
        self.start
    }

    pub fn state(&self, id: DfaId) -> &DfaState {
        &self.states[id]
    }

    pub fn states(&self) -> impl Iterator<Item = (DfaId, &DfaState)> + '_ {
        self.states.iter()
            .enumerate()
            .map(|(i, state)| (DfaId::from_index(i), state))
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn accepting_states(&self) -> impl Iterator<Item = DfaId> + '_ {
        self.states()
            .filter(|(_, state)| state.accepting)
            .map(|(id, _)| id)
    }

    /// Runs the whole input; `None` if the automaton gets stuck.
    pub fn run(&self, input: &str) -> Option<DfaId> {
        let mut state = self.start;
        for c in input.chars() {
            state = self.states[state].next(c)?;
        }
        Some(state)
    }

    pub fn accepts(&self, input: &str) -> bool {
        self.run(input).is_some_and(|state| self.states[state].accepting)
    }

    // transition shape with states renumbered in breadth-first order from the
    // start state, so two DFAs that differ only by state ids compare equal
    pub fn canonical_form(&self) -> Vec<(bool, Option<TokenType>, Vec<(char, usize)>)> {
        let mut order: Vec<Option<usize>> = vec![None; self.states.len()];
        let mut visit: Vec<DfaId> = vec![self.start];
        order[self.start.index()] = Some(0);

        let mut cursor = 0;
        while cursor < visit.len() {
            let id = visit[cursor];
            cursor += 1;
            for next in self.states[id].transitions.values() {
                if order[next.index()].is_none() {
                    order[next.index()] = Some(visit.len());
                    visit.push(*next);
                }
            }
        }

        visit.iter()
            .map(|id| {
                let state = &self.states[*id];
                let edges = state.transitions.iter()
                    .filter_map(|(c, next)| order[next.index()].map(|n| (*c, n)))
                    .collect();
                (state.accepting, state.token_type().cloned(), edges)
            })
            .collect()
    }
}
