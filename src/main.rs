use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use hybrid_tst::loader::{self, LoadOptions};
use hybrid_tst::{HybridTst, WILDCARD};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Look words up in a JSON word list.
#[derive(Parser, Debug)]
#[command(version, about = "Query a JSON word list held in a hybrid ternary search tree.")]
struct Cli {
    /// JSON object mapping words to definitions
    #[arg(name = "DICTIONARY")]
    dictionary: PathBuf,

    /// Keep the case of words and queries instead of lower-casing them
    #[arg(long)]
    keep_case: bool,

    /// Skip words outside the 256-character alphabet instead of failing
    #[arg(long)]
    skip_invalid: bool,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the definition of a word
    Get { word: String },
    /// Print whether a word is stored
    Contains { word: String },
    /// List words starting with a prefix and define the first one
    Search { prefix: String },
    /// List words matching a pattern where '.' stands for any character
    Match { pattern: String },
    /// Print the longest stored word that prefixes the query
    Longest { query: String },
    /// List every word in traversal order
    Keys {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print tree statistics
    Stats {
        /// Also check the tree's structural invariants
        #[arg(long)]
        verify: bool,
    },
    /// Print the tree structure
    Dump,
    /// Read queries from stdin until an empty line
    Repl,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = LoadOptions {
        lowercase: !cli.keep_case,
        skip_invalid: cli.skip_invalid,
    };
    let loaded = loader::load_path(&cli.dictionary, &options)
        .with_context(|| format!("loading {}", cli.dictionary.display()))?;
    debug!(report = ?loaded.report, "dictionary ready");

    let session = Session {
        dict: loaded.dictionary,
        lowercase: options.lowercase,
    };
    let stdin = io::stdin();
    let stdout = io::stdout();
    let found = session.run(cli.command, stdin.lock(), &mut stdout.lock())?;
    Ok(if found {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Shorter words first, then lexicographic.
fn by_length_then_lex(words: &mut [String]) {
    words.sort_by(|a, b| {
        a.chars()
            .count()
            .cmp(&b.chars().count())
            .then_with(|| a.cmp(b))
    });
}

struct Session {
    dict: HybridTst<String>,
    lowercase: bool,
}

impl Session {
    fn normalize(&self, query: &str) -> String {
        if self.lowercase {
            query.to_lowercase()
        } else {
            query.to_string()
        }
    }

    /// Runs one command. Returns false when the query found nothing.
    fn run(
        &self,
        command: Command,
        input: impl BufRead,
        out: &mut impl Write,
    ) -> anyhow::Result<bool> {
        let found = match command {
            Command::Get { word } => {
                let word = self.normalize(&word);
                match self.dict.get(&word)? {
                    Some(definition) => {
                        writeln!(out, "{definition}")?;
                        true
                    }
                    None => {
                        writeln!(out, "'{word}' is not in the dictionary.")?;
                        false
                    }
                }
            }
            Command::Contains { word } => {
                let contains = self.dict.contains(&self.normalize(&word))?;
                writeln!(out, "{contains}")?;
                contains
            }
            Command::Search { prefix } => self.search(&self.normalize(&prefix), out)?,
            Command::Match { pattern } => self.wildcard(&self.normalize(&pattern), out)?,
            Command::Longest { query } => {
                let query = self.normalize(&query);
                match self.dict.longest_prefix_of(&query)? {
                    Some(prefix) => {
                        writeln!(out, "{prefix}")?;
                        true
                    }
                    None => {
                        writeln!(out, "No word in the dictionary prefixes '{query}'.")?;
                        false
                    }
                }
            }
            Command::Keys { limit } => {
                for (word, _) in self.dict.iter().take(limit.unwrap_or(usize::MAX)) {
                    writeln!(out, "{word}")?;
                }
                true
            }
            Command::Stats { verify } => self.stats(verify, out)?,
            Command::Dump => {
                write!(out, "{}", self.dict.debug_tree())?;
                true
            }
            Command::Repl => {
                self.repl(input, out)?;
                true
            }
        };
        Ok(found)
    }

    /// Prints matches for `prefix` and the definition of the first one.
    fn search(&self, prefix: &str, out: &mut impl Write) -> anyhow::Result<bool> {
        let mut words = self.dict.keys_with_prefix(prefix)?;
        if words.is_empty() {
            writeln!(out, "'{prefix}' is not in the dictionary.")?;
            return Ok(false);
        }
        by_length_then_lex(&mut words);
        for word in &words {
            writeln!(out, "{word}")?;
        }
        if let Some(definition) = self.dict.get(&words[0])? {
            writeln!(out)?;
            writeln!(out, "{}: {}", words[0], definition)?;
        }
        Ok(true)
    }

    fn wildcard(&self, pattern: &str, out: &mut impl Write) -> anyhow::Result<bool> {
        let mut words = self.dict.keys_that_match(pattern)?;
        if words.is_empty() {
            writeln!(out, "No words match '{pattern}'.")?;
            return Ok(false);
        }
        by_length_then_lex(&mut words);
        for word in &words {
            writeln!(out, "{word}")?;
        }
        Ok(true)
    }

    fn stats(&self, verify: bool, out: &mut impl Write) -> anyhow::Result<bool> {
        let stats = self.dict.stats();
        writeln!(out, "words:          {}", stats.len)?;
        writeln!(out, "nodes:          {}", stats.node_count)?;
        writeln!(out, "root slots:     {}", stats.root_slots)?;
        writeln!(out, "tree height:    {}", stats.height)?;
        match stats.average_depth {
            Some(avg) => writeln!(out, "average depth:  {avg:.3}")?,
            None => writeln!(out, "average depth:  n/a")?,
        }
        if !verify {
            return Ok(true);
        }

        let issues = self.dict.verify_integrity();
        if issues.is_empty() {
            writeln!(out, "integrity:      ok")?;
            return Ok(true);
        }
        for issue in &issues {
            writeln!(out, "integrity:      {issue}")?;
        }
        Ok(false)
    }

    /// A line containing the wildcard is a pattern query; anything else is
    /// a prefix search. Bad queries are reported and the loop continues.
    fn repl(&self, input: impl BufRead, out: &mut impl Write) -> anyhow::Result<()> {
        writeln!(
            out,
            "Enter a prefix to search, or a pattern with '{WILDCARD}' for any character. Empty line exits."
        )?;
        for line in input.lines() {
            let line = line?;
            let query = self.normalize(line.trim());
            if query.is_empty() {
                break;
            }
            let result = if query.contains(WILDCARD) {
                self.wildcard(&query, out)
            } else {
                self.search(&query, out)
            };
            if let Err(err) = result {
                writeln!(out, "error: {err}")?;
            }
            writeln!(out)?;
            out.flush()?;
        }
        Ok(())
    }
}
