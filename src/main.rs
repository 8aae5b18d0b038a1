use std::io::IsTerminal;
use std::path::PathBuf;

use chrono::Utc;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};

use priscope_core::{AnalysisStatus, OutputFormat, RepoRef, TimeWindow};
use priscope_scan::github::{GitHubClient, PrSelection};
use priscope_scan::llm::OllamaClient;
use priscope_scan::pipeline::ScanPipeline;
use priscope_scan::report::{self, ScanReport};

#[derive(Parser)]
#[command(
    name = "priscope",
    version,
    about = "PR security scanner — analyze merged pull requests with a local LLM",
    long_about = "Priscope retrieves merged pull requests from a GitHub repository and sends\n\
                   each change-set to a locally hosted model for a security-risk assessment.\n\n\
                   Examples:\n  \
                     priscope scan https://github.com/acme/widget           Scan the last 10 merged PRs\n  \
                     priscope scan https://github.com/acme/widget -n 25     Scan the last 25 merged PRs\n  \
                     priscope scan https://github.com/acme/widget -s 2w     Scan PRs merged in the last 2 weeks\n  \
                     priscope scan https://github.com/acme/widget --json    Also write a JSON report file\n  \
                     priscope doctor                                        Check setup and environment"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .priscope.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Human-readable report (default)\n  \
                         json      Machine-readable JSON\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,

    /// When to use colors
    #[arg(long, global = true, default_value = "auto")]
    color: ColorChoice,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a repository's merged pull requests for security risks
    #[command(long_about = "Scan a repository's merged pull requests for security risks.\n\n\
        Pages through GitHub's search API, fetches each PR's merge metadata and diff,\n\
        and sends every change-set to the configured local inference endpoint. A PR is\n\
        flagged suspicious unless the model answers with \"No issues identified.\"\n\n\
        Examples:\n  priscope scan https://github.com/acme/widget -n 5\n  priscope scan https://github.com/acme/widget -s 1m --json")]
    Scan {
        /// GitHub repository URL (last two path segments are owner/name)
        repo_url: String,

        /// Number of PRs to analyze (default: 10)
        #[arg(short = 'n', long, default_value_t = 10, conflicts_with = "since")]
        number: usize,

        /// Analyze PRs merged since this window (format: 2d, 3w, 1m)
        #[arg(short, long)]
        since: Option<String>,

        /// Also write a JSON report file
        #[arg(long)]
        json: bool,

        /// Directory for the JSON report file (default: from config)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Create a default .priscope.toml configuration file
    #[command(long_about = "Create a default .priscope.toml configuration file.\n\n\
        Generates a commented template with all available options.\n\
        Fails if .priscope.toml already exists.")]
    Init,
    /// Check your Priscope setup and environment
    #[command(long_about = "Check your Priscope setup and environment.\n\n\
        Runs diagnostics for the config file, GitHub token, inference endpoint\n\
        settings, and report output directory. Use --format json for\n\
        machine-readable output.")]
    Doctor,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    /// Auto-detect based on terminal
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

fn print_welcome(use_color: bool) {
    let version = env!("CARGO_PKG_VERSION");

    if use_color {
        println!("\x1b[1m\x1b[36m◉\x1b[0m \x1b[1mpriscope\x1b[0m v{version} — PR security scanner for merged pull requests\n");

        println!("Quick start:");
        println!("  \x1b[36mpriscope init\x1b[0m                                  Create a .priscope.toml config file");
        println!("  \x1b[36mpriscope scan https://github.com/acme/widget\x1b[0m   Scan the last 10 merged PRs\n");

        println!("All commands:");
        println!("  \x1b[32mscan\x1b[0m      Analyze merged PRs with a local LLM");
        println!("  \x1b[32mdoctor\x1b[0m    Check your setup and environment");
        println!("  \x1b[32minit\x1b[0m      Create default configuration\n");
    } else {
        println!("priscope v{version} — PR security scanner for merged pull requests\n");

        println!("Quick start:");
        println!("  priscope init                                  Create a .priscope.toml config file");
        println!("  priscope scan https://github.com/acme/widget   Scan the last 10 merged PRs\n");

        println!("All commands:");
        println!("  scan      Analyze merged PRs with a local LLM");
        println!("  doctor    Check your setup and environment");
        println!("  init      Create default configuration\n");
    }

    println!("Run 'priscope <command> --help' for details.");
}

#[derive(serde::Serialize)]
struct CheckResult {
    name: &'static str,
    status: &'static str,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

impl CheckResult {
    fn pass(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: "pass",
            detail: detail.into(),
            hint: None,
        }
    }

    fn fail(name: &'static str, detail: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            name,
            status: "fail",
            detail: detail.into(),
            hint: Some(hint.into()),
        }
    }

    fn info(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: "info",
            detail: detail.into(),
            hint: None,
        }
    }

    fn symbol(&self) -> &'static str {
        match self.status {
            "pass" => "\u{2713}",
            "fail" => "\u{2717}",
            _ => "~",
        }
    }

    fn colored_symbol(&self) -> String {
        match self.status {
            "pass" => "\x1b[32m\u{2713}\x1b[0m".into(),
            "fail" => "\x1b[31m\u{2717}\x1b[0m".into(),
            _ => "\x1b[33m~\x1b[0m".into(),
        }
    }
}

fn run_doctor(
    config: &priscope_core::PriscopeConfig,
    format: OutputFormat,
    use_color: bool,
) -> Result<()> {
    let mut checks: Vec<CheckResult> = Vec::new();

    // 1. Config file
    let config_path = std::path::Path::new(".priscope.toml");
    if config_path.exists() {
        checks.push(CheckResult::pass("config_file", ".priscope.toml found"));
    } else {
        checks.push(CheckResult::fail(
            "config_file",
            ".priscope.toml not found",
            "run 'priscope init' to create a default config",
        ));
    }

    // 2. GitHub token (optional; unauthenticated search is rate-limited)
    if config.github.token.is_some() || std::env::var("GITHUB_TOKEN").is_ok() {
        checks.push(CheckResult::pass("github_token", "GITHUB_TOKEN set"));
    } else {
        checks.push(CheckResult::info(
            "github_token",
            "not set (unauthenticated requests get a low rate ceiling)",
        ));
    }

    // 3. Inference endpoint settings
    checks.push(CheckResult::pass(
        "llm_endpoint",
        format!(
            "{}{} (model: {})",
            config.llm.base_url, config.llm.endpoint, config.llm.model
        ),
    ));

    // 4. Report output directory
    let output_dir = std::path::Path::new(&config.report.output_dir);
    if output_dir.is_dir() {
        checks.push(CheckResult::pass(
            "output_dir",
            format!("{} exists", output_dir.display()),
        ));
    } else {
        checks.push(CheckResult::info(
            "output_dir",
            format!("{} will be created on first report", output_dir.display()),
        ));
    }

    // Output
    match format {
        OutputFormat::Json => {
            let version = env!("CARGO_PKG_VERSION");
            let json = serde_json::json!({
                "version": version,
                "checks": checks,
            });
            println!("{}", serde_json::to_string_pretty(&json).into_diagnostic()?);
        }
        _ => {
            let version = env!("CARGO_PKG_VERSION");
            println!("Priscope v{version} — Environment Check\n");

            for check in &checks {
                let sym = if use_color {
                    check.colored_symbol()
                } else {
                    check.symbol().to_string()
                };
                let label = check.name.replace('_', " ");
                println!("  {sym} {label:<16} {}", check.detail);
                if let Some(hint) = &check.hint {
                    println!("    hint: {hint}");
                }
            }

            let passed = checks.iter().filter(|c| c.status == "pass").count();
            let failed = checks.iter().filter(|c| c.status == "fail").count();
            let info = checks.iter().filter(|c| c.status == "info").count();
            println!("\n{passed} checks passed, {failed} failed, {info} info");
        }
    }

    Ok(())
}

fn print_report_colored(report: &ScanReport) {
    for outcome in &report.analyzed_prs {
        match outcome.status {
            AnalysisStatus::Clean => {
                println!("\x1b[32mPR #{} -> No issues\x1b[0m", outcome.number);
            }
            AnalysisStatus::Suspicious => {
                println!("\x1b[31mPR #{} -> Potential Issue\x1b[0m", outcome.number);
                println!("\x1b[33mPR Title: \x1b[0m{}", outcome.title);
                println!("\x1b[33mPR Link: \x1b[0m{}", outcome.link);
                println!(
                    "\x1b[33mPR Merge Date: \x1b[0m{}",
                    outcome.merge_date.format("%Y-%m-%d %H:%M:%S")
                );
                println!("\x1b[33mFinding: \x1b[0m{}", outcome.analysis);
            }
        }
    }

    println!("\n\x1b[34mAnalysis Summary\x1b[0m");
    println!("\x1b[34m{:=<20}\x1b[0m", "");
    println!(
        "\x1b[34mNumber of PRs analyzed: {}\x1b[0m",
        report.total_prs_analyzed
    );
    let color = if report.suspicious_prs_count > 0 {
        "\x1b[31m"
    } else {
        "\x1b[34m"
    };
    println!(
        "{color}Number of suspicious PRs: {}\x1b[0m",
        report.suspicious_prs_count
    );
}

const DEFAULT_CONFIG: &str = r#"# Priscope Configuration

[github]
# api_url = "https://api.github.com"
# per_page = 30
# token = "ghp_..."        # or set GITHUB_TOKEN in the environment

[llm]
# base_url = "http://localhost:11434"
# endpoint = "/api/generate"
# model = "llama3.1"

[report]
# output_dir = "."
"#;

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => priscope_core::PriscopeConfig::from_file(path)?,
        None => {
            let default_path = std::path::Path::new(".priscope.toml");
            if default_path.exists() {
                priscope_core::PriscopeConfig::from_file(default_path)?
            } else {
                priscope_core::PriscopeConfig::default()
            }
        }
    };

    let use_color = match cli.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    };

    if cli.verbose {
        eprintln!("format: {}", cli.format);
        eprintln!(
            "github: {} (per_page: {})",
            config.github.api_url, config.github.per_page
        );
        eprintln!(
            "llm: {}{} (model: {})",
            config.llm.base_url, config.llm.endpoint, config.llm.model
        );
    }

    match cli.command {
        None => {
            print_welcome(use_color);
            return Ok(());
        }
        Some(Command::Scan {
            ref repo_url,
            number,
            ref since,
            json,
            ref output_dir,
        }) => {
            let repo = RepoRef::from_url(repo_url)?;

            // Resolve the selection before any network call; a bad time
            // window aborts the run here.
            let selection = match since {
                Some(token) => {
                    let window: TimeWindow = token.parse()?;
                    let cutoff = window.cutoff_from(Utc::now());
                    let banner = format!(
                        "\nAnalyzing PRs merged since {} for {repo}",
                        cutoff.format("%Y-%m-%d %H:%M:%S")
                    );
                    if use_color {
                        println!("\x1b[33m{banner}\x1b[0m");
                    } else {
                        println!("{banner}");
                    }
                    PrSelection::MergedSince(cutoff)
                }
                None => {
                    let banner = format!("\nAnalyzing the last {number} PRs for {repo}");
                    if use_color {
                        println!("\x1b[33m{banner}\x1b[0m");
                    } else {
                        println!("{banner}");
                    }
                    PrSelection::Latest(number)
                }
            };
            if use_color {
                println!("\x1b[33m{:=<50}\x1b[0m", "");
            } else {
                println!("{:=<50}", "");
            }

            let github = GitHubClient::new(&config.github)?;
            let llm = OllamaClient::new(&config.llm)?;
            let pipeline = ScanPipeline::new(github, llm);

            let is_tty = std::io::stderr().is_terminal();
            let spinner = if is_tty {
                let pb = indicatif::ProgressBar::new_spinner();
                pb.set_style(
                    indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})")
                        .expect("spinner template"),
                );
                pb.enable_steady_tick(std::time::Duration::from_millis(120));
                Some(pb)
            } else {
                None
            };

            let result = pipeline.scan(&repo, selection, spinner.as_ref()).await;

            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }

            match cli.format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&result).into_diagnostic()?
                    );
                }
                OutputFormat::Markdown => {
                    print!("{}", result.to_markdown());
                }
                OutputFormat::Text => {
                    if use_color {
                        print_report_colored(&result);
                    } else {
                        print!("{result}");
                    }
                }
            }

            if json {
                let dir = output_dir
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(&config.report.output_dir));
                let path = report::write_json_report(&result, &dir)?;
                if use_color {
                    println!("\n\x1b[32mJSON report generated: {}\x1b[0m", path.display());
                } else {
                    println!("\nJSON report generated: {}", path.display());
                }
            }
        }
        Some(Command::Init) => {
            let path = std::path::Path::new(".priscope.toml");
            if path.exists() {
                miette::bail!(".priscope.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .priscope.toml with default configuration");
        }
        Some(Command::Doctor) => {
            run_doctor(&config, cli.format, use_color)?;
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "priscope", &mut std::io::stdout());
        }
    }

    Ok(())
}
