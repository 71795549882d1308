//! Command-line front end: fetch the diagnostic ROM corpus and run the emulator's tests.

mod config;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use corpus::{corpus_status, CorpusFetcher, FetchPolicy};
use driver::{DriverError, RunPlan, SequentialDriver, DEFAULT_SELECTOR};
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::HarnessConfig;

/// Text rendering helpers used by the CLI commands.
mod render {
    use corpus::{ArtifactStatus, CacheState, FetchSummary};
    use std::fmt::Write;
    use std::path::Path;

    /// One line per artifact followed by a cached/total tally.
    pub fn status(entries: &[ArtifactStatus]) -> String {
        let mut out = String::new();
        for entry in entries {
            let (label, size) = match entry.state {
                CacheState::Cached { bytes } => ("cached", bytes.to_string()),
                CacheState::Missing => ("missing", "-".to_owned()),
            };
            writeln!(out, "{label:<8}{size:>10}  {}", entry.id).expect("write status line");
        }
        let cached = entries.iter().filter(|e| e.is_cached()).count();
        writeln!(out, "{cached}/{} artifacts cached", entries.len()).expect("write tally");
        out
    }

    pub fn fetch_summary(summary: &FetchSummary, cache_root: &Path) -> String {
        format!(
            "fetched {}, skipped {} into {}\n",
            summary.fetched.len(),
            summary.skipped.len(),
            cache_root.display()
        )
    }
}

/// Regression harness for the 8080 emulator's diagnostic ROM suite.
#[derive(Parser, Debug)]
#[command(name = "cpu-harness", author, version, about, long_about = None)]
struct Cli {
    /// TOML file overriding the built-in configuration.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Archive root the artifact identifiers are appended to.
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    /// Directory the corpus is cached in.
    #[arg(long, global = true, value_name = "DIR")]
    cache_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download every manifest artifact missing from the cache.
    FetchCorpus {
        /// Re-download and overwrite artifacts that are already cached.
        #[arg(long)]
        refresh: bool,
    },
    /// List which artifacts are cached without touching the network.
    CorpusStatus,
    /// Run the emulator's single-ROM diagnostic test, one test thread, output uncaptured.
    TestSingle {
        /// Test-name filter handed to the emulator's test runner.
        #[arg(default_value = DEFAULT_SELECTOR)]
        selector: String,
    },
    /// Run the emulator's full-corpus test entry point.
    TestSuite,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config =
        HarnessConfig::load(cli.config.as_deref())?.with_overrides(cli.base_url, cli.cache_root);

    match cli.command {
        Command::FetchCorpus { refresh } => handle_fetch(&config, refresh),
        Command::CorpusStatus => handle_status(&config),
        Command::TestSingle { selector } => run_plan(config.plans().single_plan(&selector)?),
        Command::TestSuite => run_plan(config.plans().suite_plan()?),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Logs go to stderr so stdout carries only command echoes and emulator output.
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_fetch(config: &HarnessConfig, refresh: bool) -> Result<()> {
    let mut corpus = config.corpus();
    if refresh {
        corpus = corpus.with_policy(FetchPolicy::Overwrite);
    }

    let fetcher = CorpusFetcher::new(&corpus)?;
    let summary = fetcher
        .ensure_corpus(&corpus.manifest, &corpus.cache_root)
        .with_context(|| format!("populating {}", corpus.cache_root.display()))?;
    print!("{}", render::fetch_summary(&summary, &corpus.cache_root));
    Ok(())
}

fn handle_status(config: &HarnessConfig) -> Result<()> {
    let cache_root: &Path = &config.cache_root;
    let entries = corpus_status(&config.artifacts, cache_root)?;
    print!("{}", render::status(&entries));

    let missing = entries.iter().filter(|e| !e.is_cached()).count();
    if missing > 0 {
        bail!(
            "{missing} artifact(s) missing from {}; run `cpu-harness fetch-corpus`",
            cache_root.display()
        );
    }
    Ok(())
}

/// Runs `plan`; a failing step ends the process with that step's own exit code.
fn run_plan(plan: RunPlan) -> Result<()> {
    match SequentialDriver::system().run(&plan) {
        Ok(_) => Ok(()),
        Err(err @ (DriverError::NonZeroExit { .. } | DriverError::Terminated { .. })) => {
            error!("{err}");
            std::process::exit(err.exit_code());
        }
        Err(err) => Err(err.into()),
    }
}
