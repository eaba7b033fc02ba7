//! Property tests for the automaton pipeline: every stage must accept exactly
//! the same strings as the NFA it came from.

use munch_re::{Alphabet, CombinedNfa, Dfa, Nfa, RuleSet};
use proptest::prelude::*;

fn regex_strategy() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        Just("a".to_string()),
        Just("b".to_string()),
        Just("c".to_string()),
        Just("[a-b]".to_string()),
    ];

    leaf.prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{}{}", a, b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({}|{})", a, b)),
            inner.clone().prop_map(|a| format!("({})*", a)),
            inner.clone().prop_map(|a| format!("({})+", a)),
            inner.prop_map(|a| format!("({})?", a)),
        ]
    })
}

fn full_alphabet() -> Alphabet {
    "abc".chars().collect()
}

proptest! {
    #[test]
    fn determinization_preserves_language(
        re in regex_strategy(),
        inputs in prop::collection::vec("[abcd]{0,8}", 1..16),
    ) {
        let nfa = Nfa::compile(&re).unwrap();
        let alphabet = full_alphabet();
        let dfa = Dfa::from_nfa(&nfa, &alphabet);
        let minimized = dfa.minimize(&alphabet);

        for input in &inputs {
            let expected = nfa.accepts(input);
            prop_assert_eq!(dfa.accepts(input), expected, "{} on {:?}", re, input);
            prop_assert_eq!(minimized.accepts(input), expected, "{} on {:?}", re, input);
        }
        prop_assert!(minimized.len() <= dfa.len());
    }

    #[test]
    fn minimization_is_idempotent(re in regex_strategy()) {
        let nfa = Nfa::compile(&re).unwrap();
        let alphabet = full_alphabet();
        let once = Dfa::from_nfa(&nfa, &alphabet).minimize(&alphabet);
        let twice = once.minimize(&alphabet);

        prop_assert_eq!(once.len(), twice.len());
        prop_assert_eq!(once.canonical_form(), twice.canonical_form());
    }

    #[test]
    fn tagged_minimization_keeps_tokens(
        first in regex_strategy(),
        second in regex_strategy(),
        inputs in prop::collection::vec("[abc]{1,6}", 1..16),
    ) {
        let rules: RuleSet = [(first, "FIRST"), (second, "SECOND")].into_iter().collect();
        let alphabet = full_alphabet();
        let combined = CombinedNfa::combine(&rules).unwrap();
        let dfa = Dfa::from_combined(&combined, &alphabet);
        let minimized = dfa.minimize(&alphabet);

        for input in &inputs {
            let before = dfa.run(input).and_then(|s| dfa.state(s).token_type().cloned());
            let after = minimized.run(input).and_then(|s| minimized.state(s).token_type().cloned());
            prop_assert_eq!(before, after, "input {:?}", input);
        }
    }
}
