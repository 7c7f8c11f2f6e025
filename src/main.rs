// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use cobmig::app_config::{self, Config, LlmProvider, DEFAULT_CONFIG_FILE};
use cobmig::app_controller::{Controller, RunOptions, RunOutcome};
use cobmig::packaging::ReportFormat;

/// CLI Wrapper for LlmProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliProvider {
    Gemini,
    Anthropic,
}

impl From<CliProvider> for LlmProvider {
    fn from(cli_provider: CliProvider) -> Self {
        match cli_provider {
            CliProvider::Gemini => LlmProvider::Gemini,
            CliProvider::Anthropic => LlmProvider::Anthropic,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for ReportFormat to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliReportFormat {
    Pdf,
    Text,
}

impl From<CliReportFormat> for ReportFormat {
    fn from(cli_format: CliReportFormat) -> Self {
        match cli_format {
            CliReportFormat::Pdf => ReportFormat::Pdf,
            CliReportFormat::Text => ReportFormat::Text,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyse and migrate the contents of a ZIP archive
    Archive {
        /// ZIP archive to process
        #[arg(value_name = "ZIP")]
        input_file: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Analyse and migrate the files under a local directory
    Dir {
        /// Directory to process
        #[arg(value_name = "DIR")]
        input_dir: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Clone a public GitHub repository and analyse it
    Repo {
        /// Repository URL, e.g. https://github.com/owner/name
        #[arg(value_name = "URL")]
        url: String,

        #[command(flatten)]
        run: RunArgs,
    },

    /// List the supported target languages
    Languages,

    /// Generate shell completions for cobmig
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Target language for COBOL migration (e.g. 'Java', 'C#', 'python')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Mark the outputs as reprocessed
    #[arg(short, long)]
    reprocess: bool,

    /// Directory for the result archive
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Hide the progress spinner
    #[arg(short, long)]
    quiet: bool,
}

impl RunArgs {
    fn options(&self) -> RunOptions {
        RunOptions {
            target_language: self.target_language.clone(),
            reprocess: self.reprocess,
            output_dir: self.output_dir.clone(),
            quiet: self.quiet,
        }
    }
}

/// cobmig - COBOL analysis and migration with AI
///
/// Analyses documents and COBOL sources with an LLM, migrates the COBOL to a
/// target language and packages reports, migrated code and integration guides
/// into a single ZIP archive.
#[derive(Parser, Debug)]
#[command(name = "cobmig")]
#[command(version)]
#[command(about = "AI-powered COBOL analysis and migration tool")]
#[command(long_about = "cobmig analyses documents and COBOL sources with an LLM and migrates the COBOL to a target language.

EXAMPLES:
    cobmig archive programs.zip                     # Analyse only
    cobmig archive programs.zip -t Java             # Analyse and migrate to Java
    cobmig archive programs.zip -t C# --reprocess   # Re-run, outputs marked as reprocessed
    cobmig dir ./legacy -t python -o out/           # Process a local directory
    cobmig repo https://github.com/acme/payroll     # Clone and analyse a repository
    cobmig -p anthropic archive programs.zip        # Use a different provider
    cobmig --report-format text dir ./legacy        # Plain-text reports
    cobmig languages                                # List supported target languages
    cobmig completions bash > cobmig.bash           # Generate bash completions

CONFIGURATION:
    Configuration is stored in cobmig.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically. API keys fall back to GEMINI_API_KEY and
    ANTHROPIC_API_KEY.

SUPPORTED PROVIDERS:
    gemini    - Google Gemini API (default: gemini-2.0-flash-lite)
    anthropic - Anthropic Claude API")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long = "config", global = true, default_value = DEFAULT_CONFIG_FILE)]
    config_path: String,

    /// LLM provider to use
    #[arg(short, long, global = true, value_enum)]
    provider: Option<CliProvider>,

    /// Model name to use
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Report and guide format
    #[arg(long, global = true, value_enum)]
    report_format: Option<CliReportFormat>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color prefix for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install the logger at the most verbose level; the effective level is
    // set with set_max_level once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.level_filter());
    }

    match &cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(*shell, &mut cmd, "cobmig", &mut std::io::stdout());
            Ok(())
        }
        Commands::Languages => {
            let config = load_config(&cli)?;
            for lang in &config.languages {
                let aliases = if lang.aliases.is_empty() {
                    String::new()
                } else {
                    format!(" (also: {})", lang.aliases.join(", "))
                };
                println!("{:<12} {}{}", lang.name, lang.output_extension(), aliases);
            }
            Ok(())
        }
        Commands::Archive { input_file, run } => {
            let controller = build_controller(&cli)?;
            let outcome = controller.run_archive(input_file.clone(), &run.options()).await?;
            print_outcome(&outcome);
            Ok(())
        }
        Commands::Dir { input_dir, run } => {
            let controller = build_controller(&cli)?;
            let outcome = controller.run_directory(input_dir.clone(), &run.options()).await?;
            print_outcome(&outcome);
            Ok(())
        }
        Commands::Repo { url, run } => {
            let controller = build_controller(&cli)?;
            let outcome = controller.run_repository(url, &run.options()).await?;
            print_outcome(&outcome);
            Ok(())
        }
    }
}

/// Load the config file and apply command-line overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let mut config = Config::load_or_create(&cli.config_path)?;

    if let Some(provider) = &cli.provider {
        config.provider = provider.clone().into();
    }

    if let Some(model) = &cli.model {
        config.active_provider_config_mut().model = model.clone();
    }

    if let Some(format) = &cli.report_format {
        config.report_format = format.clone().into();
    }

    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    } else {
        log::set_max_level(config.log_level.level_filter());
    }

    Ok(config)
}

fn build_controller(cli: &CommandLineOptions) -> Result<Controller> {
    let config = load_config(cli)?;
    config.validate().context("Configuration validation failed")?;
    Controller::with_config(config)
}

fn print_outcome(outcome: &RunOutcome) {
    info!("Success: {:?}", outcome.output_path);
    for entry in &outcome.entries {
        println!("{}", entry);
    }
}
