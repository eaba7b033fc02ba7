use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use munch_lex::{parse_rule_defs, CompiledLexer, RuleSet, ScanOptions, Stage, Token, TrailingInput};
use munch_re::Dfa;
use petgraph::dot::Dot;

#[derive(Parser)]
#[command(name = "munch")]
#[command(about = "Compiles prioritized regex rules into a maximal-munch lexer")]
#[command(version)]
struct Cli {
    /// Print every compilation stage to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tokenize text (or stdin) with a rule file
    Tokenize {
        /// Rule file, one `regex;tokenName` per line
        #[arg(short, long)]
        rules: PathBuf,

        /// What to do with characters left over after a fragment's longest match
        #[arg(short, long, default_value = "drop")]
        trailing: TrailingInput,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Report unrecognized fragments and keep going instead of stopping
        #[arg(short, long)]
        keep_going: bool,

        /// Input text, read from stdin when absent
        text: Vec<String>,
    },
    /// Write the compiled transition table as JSON
    Compile {
        #[arg(short, long)]
        rules: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print the DFA in Graphviz DOT format
    Dot {
        #[arg(short, long)]
        rules: PathBuf,

        /// Show the DFA before minimization
        #[arg(long)]
        unminimized: bool,
    },
    /// List rules in priority order and the alphabet they span
    Rules {
        #[arg(short, long)]
        rules: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn read_rules(path: &Path) -> Result<RuleSet> {
    let def_string = fs::read_to_string(path)
        .with_context(|| format!("failed to read rule file {}", path.display()))?;
    let rules = parse_rule_defs(&def_string)
        .with_context(|| format!("failed to parse rule file {}", path.display()))?;
    Ok(rules)
}

// compiles the rule file, optionally keeping the unminimized DFA around
fn build_lexer(path: &Path, verbose: bool, keep_unminimized: bool) -> Result<(CompiledLexer, Option<Dfa>)> {
    let rules = read_rules(path)?;
    if verbose {
        eprintln!("rules = {:?}", rules);
    }

    let mut unminimized: Option<Dfa> = None;
    let lexer = CompiledLexer::new_traced(rules, |stage| {
        match stage {
            Stage::Alphabet(alphabet) if verbose => eprintln!("alphabet = {:?}", alphabet),
            Stage::Combined(nfa) if verbose => {
                eprintln!("nfa ({} states) = {:?}", nfa.nfa().len(), nfa)
            }
            Stage::Determinized(dfa) => {
                if verbose {
                    eprintln!("dfa ({} states) = {:?}", dfa.len(), dfa);
                }
                if keep_unminimized {
                    unminimized = Some(dfa.clone());
                }
            }
            Stage::Minimized(dfa) if verbose => {
                eprintln!("minimized ({} states) = {:?}", dfa.len(), dfa)
            }
            _ => (),
        }
    })
    .with_context(|| format!("failed to compile rule file {}", path.display()))?;

    Ok((lexer, unminimized))
}

fn read_input(text: Vec<String>) -> Result<String> {
    if !text.is_empty() {
        return Ok(text.join(" "));
    }

    let mut input = String::new();
    io::stdin().read_to_string(&mut input).context("failed to read stdin")?;
    Ok(input)
}

fn print_tokens(tokens: &[Token], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for token in tokens {
                println!("'{}', {}", token.value(), token.token_type());
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(tokens)?),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Tokenize {
            rules,
            trailing,
            format,
            keep_going,
            text,
        } => {
            let (lexer, _) = build_lexer(&rules, cli.verbose, false)?;
            let lexer = lexer.with_options(ScanOptions { trailing });
            let input = read_input(text)?;

            if keep_going {
                let (tokens, errors) = lexer.tokenize_lossy(&input);
                print_tokens(&tokens, format)?;
                for error in &errors {
                    eprintln!("error: {}", error);
                }
                if !errors.is_empty() {
                    bail!("{} fragment(s) were not recognized", errors.len());
                }
            } else {
                let tokens = lexer.tokenize(&input)?;
                print_tokens(&tokens, format)?;
            }
        }
        Commands::Compile { rules, output } => {
            let (lexer, _) = build_lexer(&rules, cli.verbose, false)?;
            let serialized_table = serde_json::to_string(lexer.table())?;
            fs::write(&output, &serialized_table)
                .with_context(|| format!("failed to write {}", output.display()))?;

            println!("Wrote {}, {} bytes", output.display(), serialized_table.len());
        }
        Commands::Dot { rules, unminimized } => {
            let (lexer, before) = build_lexer(&rules, cli.verbose, unminimized)?;
            let dfa = before.as_ref().unwrap_or(lexer.dfa());
            let graph = dfa.to_graph();
            println!("{:?}", Dot::new(&graph));
        }
        Commands::Rules { rules } => {
            let (lexer, _) = build_lexer(&rules, cli.verbose, false)?;
            for rule in lexer.rules() {
                println!("{:>3}  '{}' -> {}", rule.priority(), rule.pattern(), rule.token_type());
            }
            println!("alphabet = {:?}", lexer.alphabet());
            println!("minimized DFA: {} states", lexer.dfa().len());
        }
    }

    Ok(())
}
