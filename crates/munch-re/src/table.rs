use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::alphabet::Alphabet;
use crate::dfa::Dfa;
use crate::rules::{AcceptTag, TokenType};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("table has no error state")]
    NoStates,
    #[error("expected {expected} transition entries, found {found}")]
    DataLength { expected: usize, found: usize },
    #[error("expected {expected} accept entries, found {found}")]
    AcceptLength { expected: usize, found: usize },
    #[error("error state must not accept")]
    AcceptingErrorState,
    #[error("state {0} is out of range")]
    StateOutOfRange(u32),
}

// states = rows, 1 additional error state (the last row)
// alphabet symbols = columns, characters outside the alphabet always go to the error state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDfaTable")]
pub struct DfaTable {
    data: Vec<u32>,
    accept: Vec<Option<AcceptTag>>,
    alphabet: Alphabet,
    states: u32,
    initial_state: u32,
}

// unchecked shape of a saved table; only becomes a DfaTable through `try_from`
#[derive(Deserialize)]
struct RawDfaTable {
    data: Vec<u32>,
    accept: Vec<Option<AcceptTag>>,
    alphabet: Alphabet,
    states: u32,
    initial_state: u32,
}

impl TryFrom<RawDfaTable> for DfaTable {
    type Error = TableError;

    fn try_from(raw: RawDfaTable) -> Result<Self, Self::Error> {
        if raw.states == 0 {
            return Err(TableError::NoStates);
        }

        let num_states = raw.states as usize;
        let expected = num_states * raw.alphabet.len();
        if raw.data.len() != expected {
            return Err(TableError::DataLength { expected, found: raw.data.len() });
        }
        if raw.accept.len() != num_states {
            return Err(TableError::AcceptLength { expected: num_states, found: raw.accept.len() });
        }
        if raw.accept[num_states - 1].is_some() {
            return Err(TableError::AcceptingErrorState);
        }
        if let Some(bad) = std::iter::once(raw.initial_state)
            .chain(raw.data.iter().copied())
            .find(|state| *state >= raw.states)
        {
            return Err(TableError::StateOutOfRange(bad));
        }

        Ok(DfaTable {
            data: raw.data,
            accept: raw.accept,
            alphabet: raw.alphabet,
            states: raw.states,
            initial_state: raw.initial_state,
        })
    }
}

impl DfaTable {
    /// Flattens a rule-tagged DFA. Every accepting state must carry a tag.
    pub fn from_dfa(dfa: &Dfa, alphabet: &Alphabet) -> DfaTable {
        let num_states = dfa.len() + 1;
        let num_inputs = alphabet.len();
        let error_state = (num_states - 1) as u32;
        let mut data: Vec<u32> = vec![error_state; num_states * num_inputs];

        let mut accept: Vec<Option<AcceptTag>> = Vec::with_capacity(num_states);
        for (id, state) in dfa.states() {
            assert_eq!(
                state.is_accepting(),
                state.tag().is_some(),
                "table needs a token for every accepting state"
            );
            for (c, next) in state.transitions() {
                let column = alphabet.index_of(*c).expect("alphabet is missing DFA symbol");
                data[id.index() * num_inputs + column] = next.index() as u32;
            }
            accept.push(state.tag().cloned());
        }
        accept.push(None); // implicit error state

        DfaTable {
            data,
            accept,
            alphabet: alphabet.clone(),
            states: num_states as u32,
            initial_state: dfa.start().index() as u32,
        }
    }

    pub fn initial_state(&self) -> u32 {
        self.initial_state
    }

    pub fn error_state(&self) -> u32 {
        self.states - 1
    }

    pub fn is_error(&self, state: u32) -> bool {
        state == self.error_state()
    }

    pub fn next_state(&self, current_state: u32, c: char) -> u32 {
        if self.is_error(current_state) {
            return current_state;
        }
        match self.alphabet.index_of(c) {
            Some(column) => self.data[current_state as usize * self.alphabet.len() + column],
            None => self.error_state(),
        }
    }

    pub fn accept(&self, state: u32) -> Option<&AcceptTag> {
        self.accept[state as usize].as_ref()
    }

    pub fn token_type(&self, state: u32) -> Option<&TokenType> {
        self.accept(state).map(|tag| &tag.token_type)
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    // not counting the error state
    pub fn len(&self) -> usize {
        self.states as usize - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
