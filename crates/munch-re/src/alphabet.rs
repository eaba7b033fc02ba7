use serde::{Deserialize, Serialize};

/// Explicit concatenation marker inserted between implicitly concatenated
/// operands. It is reserved and can never be a literal.
pub const CONCAT: char = '·';

pub const OPERATORS: [char; 7] = ['|', '*', '?', '+', '(', ')', CONCAT];

pub fn is_operand(c: char) -> bool {
    !OPERATORS.contains(&c)
}

// the literal characters of a rule set, sorted and deduplicated so that
// subset construction and minimization visit symbols in the same order
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alphabet {
    symbols: Vec<char>,
}

impl Alphabet {
    /// Collects every operand character of already class-expanded patterns.
    pub fn from_expanded<'a, I>(patterns: I) -> Alphabet
        where I: IntoIterator<Item = &'a str>
    {
        patterns.into_iter()
            .flat_map(|pattern| pattern.chars())
            .filter(|c| is_operand(*c))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.symbols.iter().copied()
    }

    pub fn contains(&self, c: char) -> bool {
        self.symbols.binary_search(&c).is_ok()
    }

    // column of `c` in a transition table
    pub fn index_of(&self, c: char) -> Option<usize> {
        self.symbols.binary_search(&c).ok()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn as_slice(&self) -> &[char] {
        &self.symbols
    }
}

impl FromIterator<char> for Alphabet {
    fn from_iter<T: IntoIterator<Item = char>>(iter: T) -> Self {
        let mut symbols: Vec<char> = iter.into_iter().collect();
        symbols.sort_unstable();
        symbols.dedup();
        Alphabet { symbols }
    }
}

impl std::fmt::Debug for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.symbols.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operators_are_excluded() {
        let alphabet = Alphabet::from_expanded(["(a|b)*c+", "c?d·e"]);
        assert_eq!(alphabet.as_slice(), &['a', 'b', 'c', 'd', 'e']);
        assert!(alphabet.contains('c'));
        assert!(!alphabet.contains('*'));
        assert_eq!(alphabet.index_of('d'), Some(3));
        assert_eq!(alphabet.index_of('z'), None);
    }

    #[test]
    fn collected_alphabet_is_sorted() {
        let alphabet: Alphabet = "zyxxz".chars().collect();
        assert_eq!(alphabet.iter().collect::<String>(), "xyz");
        assert_eq!(alphabet.len(), 3);
        assert!(Alphabet::default().is_empty());
    }
}
