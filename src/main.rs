use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use span_rewriter::config::{resolve_profile, Preset};
use span_rewriter::frontend::{self, parser::read_source, Dialect};
use span_rewriter::{
    write_atomic, MaterializationStep, PlannedInsertion, RuleSet, SourceText, TraversalStats,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser)]
#[command(name = "span-rewriter")]
#[command(about = "Insert-only source-to-source rewriting for C and C++", long_about = None)]
#[command(version)]
struct Cli {
    /// Source file to rewrite
    input: PathBuf,

    /// Built-in rule selection
    #[arg(short, long, value_enum, default_value_t = RulesArg::Augment)]
    rules: RulesArg,

    /// TOML rule profile (takes precedence over --rules)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input dialect (inferred from the file extension if not specified)
    #[arg(long, value_enum)]
    lang: Option<LangArg>,

    /// Show unified diff of changes instead of the rewritten text
    #[arg(short, long, conflicts_with = "output")]
    diff: bool,

    /// What to print
    #[arg(long, value_enum, default_value_t = Emit::Text)]
    emit: Emit,

    /// Write the result to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum RulesArg {
    /// Operator rewrite and signature augmentation
    Augment,
    /// Branch and function annotation
    Annotate,
    /// Every built-in rule
    All,
}

impl From<RulesArg> for Preset {
    fn from(arg: RulesArg) -> Self {
        match arg {
            RulesArg::Augment => Preset::Augment,
            RulesArg::Annotate => Preset::Annotate,
            RulesArg::All => Preset::All,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum LangArg {
    C,
    Cpp,
}

impl From<LangArg> for Dialect {
    fn from(arg: LangArg) -> Self {
        match arg {
            LangArg::C => Dialect::C,
            LangArg::Cpp => Dialect::Cpp,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// The rewritten source text
    Text,
    /// The planned insertions as JSON
    Edits,
}

#[derive(Serialize)]
struct EditReport<'a> {
    input: &'a Path,
    dialect: &'static str,
    rules: Vec<&'static str>,
    stats: TraversalStats,
    edits: Vec<PlannedInsertion>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if cli.diff && cli.emit == Emit::Edits {
        bail!("--diff only applies to --emit text");
    }

    // 1. Rule profile
    let profile = resolve_profile(cli.config.as_deref(), cli.rules.into())?;
    let rules = RuleSet::from_profile(&profile)?;
    debug!(rules = ?rules.names(), "rule set ready");

    // 2. Front-end: read, parse, lower
    let dialect = cli
        .lang
        .map(Dialect::from)
        .unwrap_or_else(|| Dialect::from_path(&cli.input));
    let source = SourceText::new(read_source(&cli.input)?);
    let root = frontend::parse(&source, dialect)
        .with_context(|| format!("failed to parse {}", cli.input.display()))?;

    // 3. Traverse and materialize
    let plan = MaterializationStep::new(&rules)
        .plan(&source, &root)
        .with_context(|| format!("failed to rewrite {}", cli.input.display()))?;

    let output = match cli.emit {
        Emit::Edits => {
            let report = EditReport {
                input: &cli.input,
                dialect: dialect.as_str(),
                rules: rules.names(),
                stats: plan.stats(),
                edits: plan.edits(),
            };
            let mut json = serde_json::to_string_pretty(&report)?;
            json.push('\n');
            json
        }
        Emit::Text => plan.materialize(),
    };

    if cli.diff {
        display_diff(&cli.input, source.as_str(), &output);
    } else if let Some(path) = &cli.output {
        write_atomic(path, &output)
            .with_context(|| format!("failed to write {}", path.display()))?;
    } else {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(output.as_bytes())?;
        stdout.flush()?;
    }

    Ok(())
}

/// Install a stderr subscriber honoring `RUST_LOG`.
fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("span_rewriter=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

/// Show unified diff between original and rewritten content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!("{}", format!("--- {} (original)", file.display()).dimmed());
    println!("{}", format!("+++ {} (rewritten)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}
