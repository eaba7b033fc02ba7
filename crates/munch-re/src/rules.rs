use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::alphabet::Alphabet;
use crate::regex::{expand_character_classes, RegexError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("malformed pattern `{pattern}`: {source}")]
    MalformedPattern {
        pattern: String,
        source: RegexError,
    },
    #[error("rule set is empty")]
    EmptyRuleSet,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenType(String);

impl TokenType {
    pub fn new(name: impl Into<String>) -> TokenType {
        TokenType(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TokenType {
    fn from(name: &str) -> Self {
        TokenType::new(name)
    }
}

impl From<String> for TokenType {
    fn from(name: String) -> Self {
        TokenType(name)
    }
}

/// What an accepting state resolves to: the token it produces and the
/// priority of the rule it came from (lower wins).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AcceptTag {
    pub token_type: TokenType,
    pub priority: u32,
}

// rules are only created through a RuleSet, which hands out priorities in
// declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    pattern: String,
    token_type: TokenType,
    priority: u32,
}

impl Rule {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn token_type(&self) -> &TokenType {
        &self.token_type
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn tag(&self) -> AcceptTag {
        AcceptTag {
            token_type: self.token_type.clone(),
            priority: self.priority,
        }
    }

    pub(crate) fn malformed(&self, source: RegexError) -> CompileError {
        CompileError::MalformedPattern {
            pattern: self.pattern.clone(),
            source,
        }
    }
}

/// An ordered list of rules. Each pushed rule gets the next priority, so the
/// first rule declared has priority 0 and wins every tie.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> RuleSet {
        RuleSet::default()
    }

    pub fn push(&mut self, pattern: impl Into<String>, token_type: impl Into<TokenType>) -> &Rule {
        let priority = self.rules.len() as u32;
        self.rules.push(Rule {
            pattern: pattern.into(),
            token_type: token_type.into(),
            priority,
        });
        &self.rules[self.rules.len() - 1]
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The literal characters used across all rules, after class expansion.
    pub fn alphabet(&self) -> Result<Alphabet, CompileError> {
        let mut expanded: Vec<String> = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            let pattern = expand_character_classes(&rule.pattern).map_err(|e| rule.malformed(e))?;
            expanded.push(pattern);
        }

        Ok(Alphabet::from_expanded(expanded.iter().map(String::as_str)))
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl<P: Into<String>, T: Into<TokenType>> FromIterator<(P, T)> for RuleSet {
    fn from_iter<I: IntoIterator<Item = (P, T)>>(iter: I) -> Self {
        let mut rules = RuleSet::new();
        for (pattern, token_type) in iter {
            rules.push(pattern, token_type);
        }
        rules
    }
}
