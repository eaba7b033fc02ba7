// rule definition text: one `regex;tokenName` per line, earlier lines win ties.
// blank lines, `#` comments and lines without a `;` are skipped and take no priority.

use munch_re::RuleSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleDefError {
    #[error("line {line}: empty pattern")]
    EmptyPattern { line: usize },
    #[error("line {line}: empty token name")]
    EmptyTokenName { line: usize },
}

pub fn parse_rule_defs(def_string: &str) -> Result<RuleSet, RuleDefError> {
    let mut rules = RuleSet::new();

    for (i, line) in def_string.lines().enumerate() {
        let line_number = i + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((pattern, name)) = line.split_once(';') else {
            continue;
        };
        let (pattern, name) = (pattern.trim(), name.trim());

        if pattern.is_empty() {
            return Err(RuleDefError::EmptyPattern { line: line_number });
        }
        if name.is_empty() {
            return Err(RuleDefError::EmptyTokenName { line: line_number });
        }

        rules.push(pattern, name);
    }

    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_lines() {
        let defs = "\
# identifiers and numbers
[a-z]+ ; ID

[0-9]+;NUM
  (<|>)=? ;CMP
while;WHILE
";
        let rules = parse_rule_defs(defs).unwrap();
        let parsed: Vec<(&str, &str, u32)> = rules.iter()
            .map(|r| (r.pattern(), r.token_type().name(), r.priority()))
            .collect();

        assert_eq!(
            parsed,
            vec![
                ("[a-z]+", "ID", 0),
                ("[0-9]+", "NUM", 1),
                ("(<|>)=?", "CMP", 2),
                ("while", "WHILE", 3),
            ]
        );
    }

    #[test]
    fn token_name_keeps_everything_after_first_separator() {
        let rules = parse_rule_defs("a;B;C").unwrap();
        assert_eq!(rules.rules()[0].pattern(), "a");
        assert_eq!(rules.rules()[0].token_type().name(), "B;C");
    }

    #[test]
    fn lines_without_separator_are_skipped() {
        let rules = parse_rule_defs("while\n[a-z]+;ID").unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.rules()[0].token_type().name(), "ID");
        assert_eq!(rules.rules()[0].priority(), 0);

        let rules = parse_rule_defs("(a|b)*\n[a-z]+;ID\n[0-9]+;NUM").unwrap();
        let names: Vec<&str> = rules.iter().map(|r| r.token_type().name()).collect();
        assert_eq!(names, vec!["ID", "NUM"]);
        assert_eq!(rules.rules()[1].priority(), 1);
    }

    #[test]
    fn malformed_lines() {
        assert_eq!(parse_rule_defs(" ;NAME").unwrap_err(), RuleDefError::EmptyPattern { line: 1 });
        assert_eq!(parse_rule_defs("\n\nab; ").unwrap_err(), RuleDefError::EmptyTokenName { line: 3 });
    }

    #[test]
    fn comments_only() {
        assert!(parse_rule_defs("# nothing\n\n   \nbare words\n").unwrap().is_empty());
    }
}
