// minimal regex dialect compiled by shunting-yard rather than recursive descent
//
// <regex>  ::= <regex> '|' <regex>      (union, precedence 1)
//           |  <regex> <regex>          (concatenation, precedence 2)
//           |  <regex> ('*' | '+' | '?') (postfix unary, precedence 3)
//           |  '(' <regex> ')'
//           |  '[' <class> ']'          (expanded to a union before anything else)
//           |  <char>
//
// <class>  ::= { <char> | <char> '-' <char> }
//
// there are no escapes: operator characters can never be literals

use thiserror::Error;

use crate::alphabet::{is_operand, CONCAT};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegexError {
    #[error("unbalanced parentheses")]
    UnbalancedParentheses,
    #[error("operator `{0}` is missing an operand")]
    MissingOperand(char),
    #[error("empty expression")]
    Empty,
    #[error("character class `[{0}]` matches nothing")]
    EmptyClass(String),
    #[error("reserved character `{0}` inside a character class")]
    ReservedInClass(char),
    #[error("{0} unconnected fragments left over")]
    Dangling(usize),
}

/// Rewrites every `[...]` class as a parenthesized union, e.g. `[a-c_]`
/// becomes `(a|b|c|_)`. A `[` without a closing `]` is left as a literal.
pub fn expand_character_classes(regex: &str) -> Result<String, RegexError> {
    let chars: Vec<char> = regex.chars().collect();
    let mut result = String::with_capacity(regex.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '[' {
            result.push(chars[i]);
            i += 1;
            continue;
        }

        let close = chars[i + 1..].iter().position(|c| *c == ']').map(|offset| i + 1 + offset);
        let Some(close) = close else {
            result.push('[');
            i += 1;
            continue;
        };

        let members = expand_class(&chars[i + 1..close])?;
        result.push('(');
        for (n, member) in members.iter().enumerate() {
            if n > 0 {
                result.push('|');
            }
            result.push(*member);
        }
        result.push(')');
        i = close + 1;
    }

    Ok(result)
}

fn expand_class(content: &[char]) -> Result<Vec<char>, RegexError> {
    let mut members: Vec<char> = Vec::new();
    let mut i = 0;

    while i < content.len() {
        // `x-y` is a range only when both ends are present, so a trailing `-` is literal
        if i + 2 < content.len() && content[i + 1] == '-' {
            let (low, high) = (content[i], content[i + 2]);
            members.extend((low as u32..=high as u32).filter_map(char::from_u32));
            i += 3;
        } else {
            members.push(content[i]);
            i += 1;
        }
    }

    if let Some(reserved) = members.iter().copied().find(|c| !is_operand(*c)) {
        return Err(RegexError::ReservedInClass(reserved));
    }
    if members.is_empty() {
        return Err(RegexError::EmptyClass(content.iter().collect()));
    }

    Ok(members)
}

// whether `left` followed by `right` is an implicit concatenation
fn needs_concatenation(left: char, right: char) -> bool {
    let left_ends_operand = is_operand(left) || matches!(left, ')' | '*' | '+' | '?');
    let right_starts_operand = is_operand(right) || right == '(';
    left_ends_operand && right_starts_operand
}

/// Makes concatenation explicit: `ab` becomes `a·b`, `(a)(b)` becomes `(a)·(b)`.
pub fn insert_concatenation_operator(regex: &str) -> String {
    let mut result = String::with_capacity(regex.len() * 2);
    let mut chars = regex.chars().peekable();

    while let Some(c) = chars.next() {
        result.push(c);
        if chars.peek().is_some_and(|next| needs_concatenation(c, *next)) {
            result.push(CONCAT);
        }
    }

    result
}

fn precedence(operator: char) -> u8 {
    match operator {
        '|' => 1,
        CONCAT => 2,
        '*' | '+' | '?' => 3,
        _ => 0,
    }
}

/// Converts an infix regex (without character classes) to postfix using the
/// shunting-yard algorithm. Concatenation markers are inserted first.
pub fn to_postfix(infix: &str) -> Result<String, RegexError> {
    let regex = insert_concatenation_operator(infix);
    let mut output = String::with_capacity(regex.len());
    let mut operators: Vec<char> = Vec::new();

    for c in regex.chars() {
        if is_operand(c) {
            output.push(c);
            continue;
        }

        match c {
            '(' => operators.push(c),
            ')' => loop {
                match operators.pop() {
                    Some('(') => break,
                    Some(operator) => output.push(operator),
                    None => return Err(RegexError::UnbalancedParentheses),
                }
            },
            _ => {
                while let Some(top) = operators.last().copied() {
                    if top == '(' || precedence(top) < precedence(c) {
                        break;
                    }
                    output.push(top);
                    operators.pop();
                }
                operators.push(c);
            }
        }
    }

    while let Some(operator) = operators.pop() {
        if operator == '(' {
            return Err(RegexError::UnbalancedParentheses);
        }
        output.push(operator);
    }

    Ok(output)
}
