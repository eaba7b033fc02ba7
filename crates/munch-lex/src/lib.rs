mod lexeme_def;
mod scanner;
mod token;

pub use lexeme_def::{parse_rule_defs, RuleDefError};
pub use scanner::{compile_rules, CompiledLexer, DfaScanner, LexError, Match, ScanOptions, Stage, TrailingInput};
pub use token::Token;

pub use munch_re::{Alphabet, CompileError, Dfa, DfaTable, Rule, RuleSet, TokenType};
