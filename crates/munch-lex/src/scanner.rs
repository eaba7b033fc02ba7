use std::str::FromStr;

use munch_re::{Alphabet, CombinedNfa, CompileError, Dfa, DfaTable, Rule, RuleSet, TokenType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::token::Token;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("unrecognized lexeme `{0}`")]
    UnrecognizedLexeme(String),
}

/// What to do with the characters of a fragment left over after its longest match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrailingInput {
    /// Keep the match and silently drop the rest of the fragment.
    #[default]
    Drop,
    /// Keep matching from where the previous match ended.
    Rescan,
    /// Fail with `UnrecognizedLexeme` naming the whole fragment.
    Reject,
}

impl FromStr for TrailingInput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "drop" => Ok(TrailingInput::Drop),
            "rescan" => Ok(TrailingInput::Rescan),
            "reject" => Ok(TrailingInput::Reject),
            _ => Err(format!("Unknown trailing input policy: {}. Supported: drop, rescan, reject", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    pub trailing: TrailingInput,
}

/// A longest match inside one fragment; `start..end` are byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'scanner, 'input> {
    pub token_type: &'scanner TokenType,
    pub text: &'input str,
    pub start: usize,
    pub end: usize,
}

/// Intermediate automata handed to a trace callback while compiling.
#[derive(Debug, Clone, Copy)]
pub enum Stage<'a> {
    Alphabet(&'a Alphabet),
    Combined(&'a CombinedNfa),
    Determinized(&'a Dfa),
    Minimized(&'a Dfa),
}

/// Table-driven maximal munch over whitespace-separated fragments.
#[derive(Debug, Clone)]
pub struct DfaScanner {
    table: DfaTable,
    options: ScanOptions,
}

impl DfaScanner {
    pub fn new(table: DfaTable) -> DfaScanner {
        DfaScanner {
            table,
            options: ScanOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ScanOptions) -> DfaScanner {
        self.options = options;
        self
    }

    pub fn table(&self) -> &DfaTable {
        &self.table
    }

    pub fn options(&self) -> ScanOptions {
        self.options
    }

    // implements "maximal munch": walk until the automaton is stuck, remembering the
    // last accepting position. empty matches are never reported, and neither is
    // anything for a `start` past the end or inside a multi-byte character
    pub fn longest_match<'s, 'i>(&'s self, input: &'i str, start: usize) -> Option<Match<'s, 'i>> {
        if !input.is_char_boundary(start) {
            return None;
        }

        let mut state = self.table.initial_state();
        let mut last_accept: Option<(usize, &'s TokenType)> = None;

        for (offset, c) in input[start..].char_indices() {
            state = self.table.next_state(state, c);
            if self.table.is_error(state) {
                break;
            }
            if let Some(token_type) = self.table.token_type(state) {
                last_accept = Some((start + offset + c.len_utf8(), token_type));
            }
        }

        last_accept.map(|(end, token_type)| Match {
            token_type,
            text: &input[start..end],
            start,
            end,
        })
    }

    pub fn scan_fragment(&self, fragment: &str) -> Result<Vec<Token>, LexError> {
        let mut tokens: Vec<Token> = Vec::new();
        let mut cursor = 0;

        while cursor < fragment.len() {
            let Some(found) = self.longest_match(fragment, cursor) else {
                return Err(LexError::UnrecognizedLexeme(fragment[cursor..].to_string()));
            };
            tokens.push(Token::new(found.token_type.clone(), found.text));

            if found.end == fragment.len() {
                break;
            }
            match self.options.trailing {
                TrailingInput::Drop => break,
                TrailingInput::Reject => return Err(LexError::UnrecognizedLexeme(fragment.to_string())),
                TrailingInput::Rescan => cursor = found.end,
            }
        }

        Ok(tokens)
    }

    /// Tokenizes every fragment, stopping at the first one that cannot be matched.
    pub fn tokenize(&self, text: &str) -> Result<Vec<Token>, LexError> {
        let mut tokens: Vec<Token> = Vec::new();
        for fragment in text.split_whitespace() {
            tokens.extend(self.scan_fragment(fragment)?);
        }
        Ok(tokens)
    }

    /// Like `tokenize` but keeps going past unrecognized fragments.
    pub fn tokenize_lossy(&self, text: &str) -> (Vec<Token>, Vec<LexError>) {
        let mut tokens: Vec<Token> = Vec::new();
        let mut errors: Vec<LexError> = Vec::new();
        for fragment in text.split_whitespace() {
            match self.scan_fragment(fragment) {
                Ok(found) => tokens.extend(found),
                Err(e) => errors.push(e),
            }
        }
        (tokens, errors)
    }
}

/// A rule set compiled down to a minimal DFA plus the scanner that walks it.
/// Immutable once built, so it can be shared between threads for scanning.
#[derive(Debug, Clone)]
pub struct CompiledLexer {
    rules: RuleSet,
    alphabet: Alphabet,
    dfa: Dfa,
    scanner: DfaScanner,
}

pub fn compile_rules(rules: RuleSet) -> Result<CompiledLexer, LexError> {
    CompiledLexer::new(rules)
}

impl CompiledLexer {
    pub fn new(rules: RuleSet) -> Result<CompiledLexer, LexError> {
        Self::new_traced(rules, |_| {})
    }

    /// Compiles `rules`, handing every intermediate automaton to `trace`.
    pub fn new_traced<F>(rules: RuleSet, mut trace: F) -> Result<CompiledLexer, LexError>
        where F: FnMut(Stage<'_>)
    {
        let combined = CombinedNfa::combine(&rules)?;
        let alphabet = rules.alphabet()?;
        trace(Stage::Alphabet(&alphabet));
        trace(Stage::Combined(&combined));

        let dfa = Dfa::from_combined(&combined, &alphabet);
        trace(Stage::Determinized(&dfa));

        let dfa = dfa.minimize(&alphabet);
        trace(Stage::Minimized(&dfa));

        let scanner = DfaScanner::new(DfaTable::from_dfa(&dfa, &alphabet));

        Ok(CompiledLexer {
            rules,
            alphabet,
            dfa,
            scanner,
        })
    }

    pub fn with_options(mut self, options: ScanOptions) -> CompiledLexer {
        self.scanner = self.scanner.with_options(options);
        self
    }

    pub fn rules(&self) -> &[Rule] {
        self.rules.rules()
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn dfa(&self) -> &Dfa {
        &self.dfa
    }

    pub fn scanner(&self) -> &DfaScanner {
        &self.scanner
    }

    pub fn table(&self) -> &DfaTable {
        self.scanner.table()
    }

    pub fn longest_match<'s, 'i>(&'s self, input: &'i str, start: usize) -> Option<Match<'s, 'i>> {
        self.scanner.longest_match(input, start)
    }

    pub fn tokenize(&self, text: &str) -> Result<Vec<Token>, LexError> {
        self.scanner.tokenize(text)
    }

    pub fn tokenize_lossy(&self, text: &str) -> (Vec<Token>, Vec<LexError>) {
        self.scanner.tokenize_lossy(text)
    }
}
