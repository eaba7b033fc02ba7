mod alphabet;
mod combine;
mod dfa;
mod graph;
mod minimize;
mod nfa;
mod regex;
mod rules;
mod table;


pub use alphabet::{is_operand, Alphabet, CONCAT, OPERATORS};
pub use combine::CombinedNfa;
pub use dfa::{Dfa, DfaId, DfaState};
pub use nfa::{Nfa, NfaState, StateId};
pub use regex::{expand_character_classes, insert_concatenation_operator, to_postfix, RegexError};
pub use rules::{AcceptTag, CompileError, Rule, RuleSet, TokenType};
pub use table::{DfaTable, TableError};
