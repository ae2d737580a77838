use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use scout_tester::ai::ProviderManager;
use scout_tester::parser::{load_test_cases, TestCaseSpec};
use scout_tester::runner::{self, ReportOptions};
use scout_tester::server::{Server, DEFAULT_PORT};
use scout_tester::utils::config::Config;
use scout_tester::utils::session::SessionStore;
use scout_tester::{report, AppAnalyzer, ExecutionReport};

#[derive(Parser)]
#[command(name = "scout-tester")]
#[command(version = "0.1.0")]
#[command(about = "Explore a web application, generate test cases and replay them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a web application and print its context document
    Analyze {
        /// Application URL
        url: String,
    },

    /// Generate test cases from a context document
    Generate {
        /// File holding the context document
        #[arg(short, long)]
        context_file: PathBuf,

        /// AI provider (claude, gemini)
        #[arg(short, long)]
        provider: Option<String>,

        /// Output file (.json or .csv); printed when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Execute the highest-priority test cases from a file
    Execute {
        /// Test cases file (JSON or YAML)
        cases: PathBuf,

        /// Base URL of the application under test
        #[arg(short, long)]
        url: String,

        /// Maximum number of test cases to execute
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output directory for reports
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Also write a JUnit XML report
        #[arg(long, default_value = "false")]
        junit: bool,

        /// Also write a CSV report
        #[arg(long, default_value = "false")]
        csv: bool,
    },

    /// Analyze, generate and execute in one go
    Run {
        /// Application URL
        url: String,

        /// AI provider (claude, gemini)
        #[arg(short, long)]
        provider: Option<String>,

        /// Maximum number of test cases to execute
        #[arg(short, long)]
        limit: Option<usize>,

        /// Also write a JUnit XML report
        #[arg(long, default_value = "false")]
        junit: bool,

        /// Also write CSV exports
        #[arg(long, default_value = "false")]
        csv: bool,
    },

    /// List AI providers and their availability
    Providers,

    /// Start the HTTP server
    Serve {
        /// Server port
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },

    /// Generate report from stored execution results
    Report {
        /// Path to execution_history.json
        results: PathBuf,

        /// Output format (json, junit, csv)
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Commands::Analyze { url } => {
            println!("{} Analyzing: {}", "🔍".to_string().blue(), url.cyan());
            let analyzer = AppAnalyzer::with_defaults(config.browser.clone())?;
            println!("\n{}", analyzer.analyze(&url).await?);
        }

        Commands::Generate {
            context_file,
            provider,
            output,
        } => {
            let context = std::fs::read_to_string(&context_file)
                .with_context(|| format!("Failed to read {}", context_file.display()))?;
            let manager = ProviderManager::from_config(&config);
            let (cases, used) = manager
                .generate_test_cases(&context, provider.as_deref(), None)
                .await?;
            println!(
                "{} Generated {} test cases with {}",
                "✓".green().bold(),
                cases.len(),
                used.cyan()
            );

            match output {
                Some(path) => {
                    save_test_cases(&cases, &path)?;
                    println!("  Output: {}", path.display().to_string().cyan());
                }
                None => println!("{}", serde_json::to_string_pretty(&cases)?),
            }
        }

        Commands::Execute {
            cases,
            url,
            limit,
            output,
            junit,
            csv,
        } => {
            let test_cases = load_test_cases(&cases)?;
            println!(
                "{} Running tests from: {}",
                "▶".green().bold(),
                cases.display()
            );
            println!("  Target: {}", url.cyan());
            println!("  Output: {}", output.display().to_string().cyan());

            let report = runner::run_tests(
                &test_cases,
                &url,
                limit.unwrap_or(config.execution_limit),
                &config.browser,
                &output,
                &ReportOptions { junit, csv },
            )
            .await?;
            exit_on_failures(&report);
        }

        Commands::Run {
            url,
            provider,
            limit,
            junit,
            csv,
        } => {
            let store = SessionStore::new(config.output_dir.clone());
            let session_id = SessionStore::new_session_id();
            println!("{} Session: {}", "▶".green().bold(), session_id.cyan());

            println!("{} Analyzing: {}", "🔍".to_string().blue(), url.cyan());
            let analyzer = AppAnalyzer::with_defaults(config.browser.clone())?;
            let context = analyzer.analyze(&url).await?;

            let manager = ProviderManager::from_config(&config);
            let (cases, used) = manager
                .generate_test_cases(&context, provider.as_deref(), None)
                .await?;
            let saved = store.save_test_cases(&session_id, &cases)?;
            println!(
                "{} Generated {} test cases with {} ({})",
                "✓".green().bold(),
                cases.len(),
                used.cyan(),
                saved.display()
            );
            if csv {
                report::csv::write_test_cases(&cases, &saved.with_extension("csv"))?;
            }

            let report = runner::run_tests(
                &cases,
                &url,
                limit.unwrap_or(config.execution_limit),
                &config.browser,
                &store.session_dir(&session_id)?,
                &ReportOptions { junit, csv },
            )
            .await?;
            exit_on_failures(&report);
        }

        Commands::Providers => {
            let manager = ProviderManager::from_config(&config);
            for info in manager.available_providers() {
                let marker = if info.available {
                    "✓".green()
                } else {
                    "✗".red()
                };
                println!(
                    "{} {} ({} {}) - {}",
                    marker,
                    info.key.bold(),
                    info.provider,
                    info.model,
                    info.description
                );
            }
            println!("  Default: {}", manager.default_provider().cyan());
        }

        Commands::Serve { port } => {
            Server::new(config, port).start().await?;
        }

        Commands::Report {
            results,
            format,
            output,
        } => {
            println!(
                "{} Generating {} report from: {}",
                "📊".to_string().blue(),
                format.cyan(),
                results.display()
            );
            let format = report::ReportFormat::parse(&format)?;
            report::generate_report(&results, format, output.as_deref())?;
        }
    }

    Ok(())
}

fn save_test_cases(cases: &[TestCaseSpec], path: &Path) -> anyhow::Result<()> {
    if path.extension().map_or(false, |ext| ext == "csv") {
        return report::csv::write_test_cases(cases, path);
    }
    std::fs::write(path, serde_json::to_string_pretty(cases)?)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn exit_on_failures(report: &ExecutionReport) {
    if report.has_failures() {
        std::process::exit(1);
    }
}
