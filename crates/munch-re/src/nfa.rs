use bit_set::BitSet;
use munch_util::make_type_idx;

use crate::alphabet::CONCAT;
use crate::regex::{expand_character_classes, to_postfix, RegexError};

// states live in one Vec per automaton and refer to each other by index,
// which keeps Kleene back-edges and union fan-in free of ownership cycles
make_type_idx!(pub StateId, NfaState);

/// A single NFA node. `None` labels are epsilon transitions.
#[derive(Debug, Clone, Default)]
pub struct NfaState {
    pub(crate) transitions: Vec<(Option<char>, StateId)>,
    pub(crate) accepting: bool,
}

impl NfaState {
    pub fn transitions(&self) -> &[(Option<char>, StateId)] {
        &self.transitions
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }
}

#[derive(Debug, Clone)]
pub struct Nfa {
    pub(crate) states: Vec<NfaState>,
    pub(crate) start: StateId,
    // a combined multi-rule NFA has no single end state
    pub(crate) end: Option<StateId>,
}

// (start, end) of a partially built automaton
type Fragment = (StateId, StateId);

fn new_state(states: &mut Vec<NfaState>) -> StateId {
    StateId::from_push(states, NfaState::default())
}

fn link(states: &mut [NfaState], from: StateId, label: Option<char>, to: StateId) {
    states[from].transitions.push((label, to));
}

fn pop_fragment(fragments: &mut Vec<Fragment>, operator: char) -> Result<Fragment, RegexError> {
    fragments.pop().ok_or(RegexError::MissingOperand(operator))
}

impl Nfa {
    /// Compiles a pattern (character classes allowed) into a Thompson NFA whose
    /// single end state is accepting.
    pub fn compile(pattern: &str) -> Result<Nfa, RegexError> {
        let mut states: Vec<NfaState> = Vec::new();
        let (start, end) = Self::build_into(pattern, &mut states)?;
        states[end].accepting = true;

        Ok(Nfa {
            states,
            start,
            end: Some(end),
        })
    }

    // compiles `pattern` into an existing arena so several rules can share one automaton
    pub(crate) fn build_into(pattern: &str, states: &mut Vec<NfaState>) -> Result<Fragment, RegexError> {
        let expanded = expand_character_classes(pattern)?;
        let postfix = to_postfix(&expanded)?;
        Self::from_postfix(&postfix, states)
    }

    // Thompson's construction over a postfix stream
    fn from_postfix(postfix: &str, states: &mut Vec<NfaState>) -> Result<Fragment, RegexError> {
        let mut fragments: Vec<Fragment> = Vec::new();

        for c in postfix.chars() {
            let fragment = match c {
                CONCAT => {
                    let (b_start, b_end) = pop_fragment(&mut fragments, c)?;
                    let (a_start, a_end) = pop_fragment(&mut fragments, c)?;
                    link(states, a_end, None, b_start);
                    (a_start, b_end)
                }
                '|' => {
                    let (b_start, b_end) = pop_fragment(&mut fragments, c)?;
                    let (a_start, a_end) = pop_fragment(&mut fragments, c)?;
                    let start = new_state(states);
                    let end = new_state(states);
                    link(states, start, None, a_start);
                    link(states, start, None, b_start);
                    link(states, a_end, None, end);
                    link(states, b_end, None, end);
                    (start, end)
                }
                '*' | '?' | '+' => {
                    let (inner_start, inner_end) = pop_fragment(&mut fragments, c)?;
                    let start = new_state(states);
                    let end = new_state(states);
                    link(states, start, None, inner_start);
                    // `+` must pass through the inner fragment at least once
                    if c != '+' {
                        link(states, start, None, end);
                    }
                    // `?` runs the inner fragment at most once
                    if c != '?' {
                        link(states, inner_end, None, inner_start);
                    }
                    link(states, inner_end, None, end);
                    (start, end)
                }
                '(' | ')' => return Err(RegexError::UnbalancedParentheses),
                literal => {
                    let start = new_state(states);
                    let end = new_state(states);
                    link(states, start, Some(literal), end);
                    (start, end)
                }
            };
            fragments.push(fragment);
        }

        match fragments.as_slice() {
            [fragment] => Ok(*fragment),
            [] => Err(RegexError::Empty),
            leftover => Err(RegexError::Dangling(leftover.len())),
        }
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn end(&self) -> Option<StateId> {
        self.end
    }

    pub fn state(&self, id: StateId) -> &NfaState {
        &self.states[id]
    }

    pub fn states(&self) -> impl Iterator<Item = (StateId, &NfaState)> + '_ {
        self.states.iter()
            .enumerate()
            .map(|(i, state)| (StateId::from_index(i), state))
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Every literal label used by some transition.
    pub fn literals(&self) -> impl Iterator<Item = char> + '_ {
        self.states.iter()
            .flat_map(|state| state.transitions.iter())
            .filter_map(|(label, _)| *label)
    }

    // grows `set` to everything reachable through epsilon edges, explicit stack so
    // long epsilon chains cannot overflow the call stack
    pub(crate) fn epsilon_closure(&self, set: &mut BitSet) {
        let mut stack: Vec<usize> = set.iter().collect();

        while let Some(i) = stack.pop() {
            for (label, next) in &self.states[i].transitions {
                if label.is_none() && set.insert(next.index()) {
                    stack.push(next.index());
                }
            }
        }
    }

    // states reachable from `set` by consuming exactly `c`, before closure
    pub(crate) fn step(&self, set: &BitSet, c: char) -> BitSet {
        let mut result = BitSet::with_capacity(self.states.len());

        for i in set.iter() {
            for (label, next) in &self.states[i].transitions {
                if *label == Some(c) {
                    result.insert(next.index());
                }
            }
        }

        result
    }

    pub(crate) fn contains_accepting(&self, set: &BitSet) -> bool {
        set.iter().any(|i| self.states[i].accepting)
    }

    /// Simulates the NFA directly on `input`.
    pub fn accepts(&self, input: &str) -> bool {
        let mut current = BitSet::with_capacity(self.states.len());
        current.insert(self.start.index());
        self.epsilon_closure(&mut current);

        for c in input.chars() {
            current = self.step(&current, c);
            if current.is_empty() {
                return false;
            }
            self.epsilon_closure(&mut current);
        }

        self.contains_accepting(&current)
    }
}
