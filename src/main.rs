use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use human_panic::setup_panic;
use indicatif::{ProgressBar, ProgressStyle};
use miette::{miette, Context, IntoDiagnostic, Result};

use vigil_core::{GateStatus, VigilConfig};
use vigil_review::github::parse_pr_reference;
use vigil_review::orchestrator::Orchestrator;
use vigil_rules::RuleEngine;

const EXIT_FAILURE: i32 = 1;

#[derive(Parser)]
#[command(
    name = "vigil",
    version,
    about = "Automated PR review service",
    long_about = "Vigil reviews source-change submissions by fanning a diff out to a\n\
                   deterministic pattern scanner and a set of specialist reviewers, then\n\
                   aggregating everything into one severity-gated report.\n\n\
                   Examples:\n  \
                     vigil serve                         Run the webhook server\n  \
                     vigil review --pr owner/repo#123    Review one PR and post the report\n  \
                     vigil review --pr owner/repo#123 --dry-run\n  \
                     git diff | vigil scan               Pattern-scan a local diff\n  \
                     vigil scan --file changes.patch --format json"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (default: vigil.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the inbound webhook server
    #[command(long_about = "Run the inbound webhook server.\n\n\
        Accepts change-notification events on POST /webhook/github (HMAC-SHA256\n\
        signed) and answers health checks on GET /ping. Each accepted event is\n\
        acknowledged immediately and reviewed in a detached task.\n\n\
        Examples:\n  vigil serve\n  vigil serve --bind 127.0.0.1:8080")]
    Serve {
        /// Socket address to bind (overrides config)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Review one pull request and post the report
    #[command(long_about = "Review one pull request and post the report.\n\n\
        Runs the same pipeline the webhook triggers: pre-flight, concurrent\n\
        fan-out, aggregation, rendering, publish. With --dry-run the report\n\
        is printed instead of posted.\n\n\
        Examples:\n  vigil review --pr owner/repo#123\n  vigil review --pr owner/repo#123 --dry-run")]
    Review {
        /// Pull request reference (owner/repo#number)
        #[arg(long)]
        pr: String,

        /// Render the report to stdout instead of posting it
        #[arg(long)]
        dry_run: bool,
    },
    /// Run the pattern-rule scanner over a local diff
    #[command(long_about = "Run the pattern-rule scanner over a local diff.\n\n\
        Applies both rule tiers (fast secret/injection/XSS shapes and the\n\
        ten-group deep table) to a diff from stdin or a file. Exits 1 when\n\
        any CRITICAL finding is present.\n\n\
        Examples:\n  git diff | vigil scan\n  vigil scan --file changes.patch --format json")]
    Scan {
        /// Read the diff from a file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = ScanFormat::Text)]
        format: ScanFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ScanFormat {
    /// Human-readable finding lines
    Text,
    /// Machine-readable JSON
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_panic!();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { bind } => {
            init_tracing();
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            vigil_server::serve(config)
                .await
                .into_diagnostic()
                .wrap_err("server exited with an error")
        }
        Command::Review { pr, dry_run } => {
            init_tracing();
            let config = load_config(cli.config.as_deref())?;
            run_review(&config, &pr, dry_run).await
        }
        Command::Scan { file, format } => run_scan(file.as_deref(), format),
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Load `vigil.toml` (explicit path, or the default when present), then
/// overlay environment variables once.
fn load_config(path: Option<&std::path::Path>) -> Result<VigilConfig> {
    let mut config = match path {
        Some(path) => VigilConfig::from_file(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to load config from {}", path.display()))?,
        None => {
            let default = std::path::Path::new("vigil.toml");
            if default.exists() {
                VigilConfig::from_file(default)
                    .into_diagnostic()
                    .wrap_err("failed to load vigil.toml")?
            } else {
                VigilConfig::default()
            }
        }
    };
    config.apply_env();
    Ok(config)
}

async fn run_review(config: &VigilConfig, pr_ref: &str, dry_run: bool) -> Result<()> {
    let (owner, repo, number) = parse_pr_reference(pr_ref).into_diagnostic()?;
    let repo_full = format!("{owner}/{repo}");

    let orchestrator = Orchestrator::new(config)
        .into_diagnostic()
        .wrap_err("failed to build the review pipeline")?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").expect("spinner template is valid"),
    );
    spinner.set_message(format!("Reviewing {repo_full}#{number}..."));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let outcome = orchestrator.run(&repo_full, number, dry_run).await;
    spinner.finish_and_clear();

    let outcome = outcome
        .into_diagnostic()
        .wrap_err_with(|| format!("review of {repo_full}#{number} failed"))?;

    if dry_run {
        println!("{}", outcome.report);
    } else {
        println!(
            "Posted review for {repo_full}#{number}: {} ({} findings)",
            outcome.decision, outcome.findings_total
        );
    }

    if outcome.decision == GateStatus::Fail {
        std::process::exit(EXIT_FAILURE);
    }
    Ok(())
}

fn run_scan(file: Option<&std::path::Path>, format: ScanFormat) -> Result<()> {
    let diff = match file {
        Some(path) => std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read {}", path.display()))?,
        None => {
            if std::io::stdin().is_terminal() {
                return Err(miette!(
                    "no diff provided; pipe one in (git diff | vigil scan) or pass --file"
                ));
            }
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .into_diagnostic()
                .wrap_err("failed to read diff from stdin")?;
            buffer
        }
    };

    let engine = RuleEngine::new();
    let results = vec![engine.scan_fast(&diff), engine.scan_deep(&diff)];

    match format {
        ScanFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&results).into_diagnostic()?
            );
        }
        ScanFormat::Text => {
            let total: usize = results.iter().map(|r| r.findings.len()).sum();
            if total == 0 {
                println!("No findings.");
            }
            for result in &results {
                for finding in &result.findings {
                    let location = match finding.line {
                        Some(line) => format!(" line {line}"),
                        None => String::new(),
                    };
                    println!(
                        "[{}] {} ({}{location}): {}",
                        finding.severity, finding.category, result.producer, finding.description
                    );
                }
            }
        }
    }

    let has_critical = results
        .iter()
        .flat_map(|r| r.findings.iter())
        .any(|f| f.severity == vigil_core::Severity::Critical);
    if has_critical {
        std::process::exit(EXIT_FAILURE);
    }
    Ok(())
}
