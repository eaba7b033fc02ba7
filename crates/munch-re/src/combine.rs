use std::collections::HashMap;

use crate::nfa::{Nfa, NfaState, StateId};
use crate::rules::{AcceptTag, CompileError, RuleSet, TokenType};

/// One NFA for a whole rule set: a shared start state with an epsilon edge
/// into every rule's sub-automaton, and per-final-state token metadata.
#[derive(Debug, Clone)]
pub struct CombinedNfa {
    nfa: Nfa,
    token_types: HashMap<StateId, TokenType>,
    priorities: HashMap<StateId, u32>,
}

impl CombinedNfa {
    pub fn combine(rules: &RuleSet) -> Result<CombinedNfa, CompileError> {
        if rules.is_empty() {
            return Err(CompileError::EmptyRuleSet);
        }

        let mut states: Vec<NfaState> = Vec::new();
        let start = StateId::from_push(&mut states, NfaState::default());
        let mut token_types: HashMap<StateId, TokenType> = HashMap::with_capacity(rules.len());
        let mut priorities: HashMap<StateId, u32> = HashMap::with_capacity(rules.len());

        for rule in rules {
            let (rule_start, rule_end) = Nfa::build_into(rule.pattern(), &mut states)
                .map_err(|e| rule.malformed(e))?;

            states[rule_end].accepting = true;
            token_types.insert(rule_end, rule.token_type().clone());
            priorities.insert(rule_end, rule.priority());
            states[start].transitions.push((None, rule_start));
        }

        let nfa = Nfa {
            states,
            start,
            end: None,
        };

        Ok(CombinedNfa {
            nfa,
            token_types,
            priorities,
        })
    }

    pub fn nfa(&self) -> &Nfa {
        &self.nfa
    }

    pub fn is_accepting(&self, state: StateId) -> bool {
        self.token_types.contains_key(&state)
    }

    pub fn token_type(&self, state: StateId) -> Option<&TokenType> {
        self.token_types.get(&state)
    }

    pub fn priority(&self, state: StateId) -> Option<u32> {
        self.priorities.get(&state).copied()
    }

    pub fn tag(&self, state: StateId) -> Option<AcceptTag> {
        let token_type = self.token_type(state)?.clone();
        let priority = self.priority(state)?;
        Some(AcceptTag {
            token_type,
            priority,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regex::RegexError;

    #[test]
    fn every_rule_hangs_off_the_shared_start() {
        let rules: RuleSet = [("ab", "X"), ("a|c", "Y"), ("d*", "Z")].into_iter().collect();
        let combined = CombinedNfa::combine(&rules).unwrap();
        let nfa = combined.nfa();

        assert_eq!(nfa.end(), None);
        let start = nfa.state(nfa.start());
        assert_eq!(start.transitions().len(), 3);
        assert!(start.transitions().iter().all(|(label, _)| label.is_none()));

        let finals: Vec<(StateId, &NfaState)> = nfa.states()
            .filter(|(_, state)| state.is_accepting())
            .collect();
        assert_eq!(finals.len(), 3);

        let mut tags: Vec<AcceptTag> = finals.iter()
            .map(|(id, _)| combined.tag(*id).expect("final states are tagged"))
            .collect();
        tags.sort_by_key(|tag| tag.priority);
        let names: Vec<&str> = tags.iter().map(|tag| tag.token_type.name()).collect();
        assert_eq!(names, vec!["X", "Y", "Z"]);
        assert!(!combined.is_accepting(nfa.start()));
        assert_eq!(combined.priority(nfa.start()), None);
    }

    #[test]
    fn combined_language_is_the_union() {
        let rules: RuleSet = [("ab", "X"), ("c+", "Y")].into_iter().collect();
        let combined = CombinedNfa::combine(&rules).unwrap();
        assert!(combined.nfa().accepts("ab"));
        assert!(combined.nfa().accepts("ccc"));
        assert!(!combined.nfa().accepts("abc"));
        assert!(!combined.nfa().accepts(""));
    }

    #[test]
    fn empty_and_malformed_rule_sets() {
        assert_eq!(CombinedNfa::combine(&RuleSet::new()).unwrap_err(), CompileError::EmptyRuleSet);

        let rules: RuleSet = [("a", "A"), ("(b", "B")].into_iter().collect();
        assert_eq!(
            CombinedNfa::combine(&rules).unwrap_err(),
            CompileError::MalformedPattern {
                pattern: "(b".to_string(),
                source: RegexError::UnbalancedParentheses,
            }
        );
    }
}
