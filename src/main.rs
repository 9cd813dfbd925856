//! autodidact CLI - Terminal client for a remote boolean concept learner.

use anyhow::{Context, Result};
use autodidact::client::HealthStatus;
use autodidact::render::{ChartSeries, write_summary};
use autodidact::{Action, Config, LearnerClient, Session, Shell, TerminalChart};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "autodidact")]
#[command(version)]
#[command(about = "Terminal client for a remote boolean concept learner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "autodidact.toml")]
    config: PathBuf,

    /// Learner base URL (overrides the config file)
    #[arg(short, long, global = true, env = "AUTODIDACT_URL")]
    url: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit one labeled example and show the updated hypothesis
    Submit {
        /// Boolean assignment, e.g. 1,0,1,0,1
        #[arg(short, long)]
        example: String,

        /// Label, e.g. 1, 0 or ?
        #[arg(short, long)]
        label: String,
    },

    /// Reset the learner to its initial hypothesis
    Reset,

    /// Check that the learner service is reachable
    Ping,

    /// Interactive session
    Shell,

    /// Validate configuration file
    Validate,

    /// Show example configuration
    Example,
}

/// Log level for a command. The shell keeps stderr to warnings so log
/// lines do not interleave with its prompt output.
fn log_level(command: &Commands, verbose: bool) -> Level {
    match (command, verbose) {
        (_, true) => Level::DEBUG,
        (Commands::Shell, false) => Level::WARN,
        (_, false) => Level::INFO,
    }
}

fn setup_logging(level: Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
}

fn print_example_config() {
    let example = r#"# autodidact configuration file

[service]
# Learner API (can also use AUTODIDACT_URL env var or --url)
base_url = "https://autodidactic-tool.onrender.com"
# Give up on a request after this many seconds (default: wait indefinitely)
# timeout_secs = 30

[display]
# Green bars for literals in the hypothesis, light gray otherwise
color = true
bar_height = 4
"#;
    println!("{example}");
}

fn load_config(cli: &Cli) -> Result<Config> {
    let config = Config::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?
        .with_base_url(cli.url.clone());
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn build_session(config: &Config) -> Result<(Session<LearnerClient, TerminalChart>, String)> {
    let base_url = config.resolve_base_url()?;
    let client = LearnerClient::new(base_url.clone(), config.service.timeout())
        .context("Failed to create learner client")?;

    let display = config.display.clone();
    let session = Session::new(Arc::new(client), move |series: &ChartSeries| {
        TerminalChart::new(series, display.bar_height, display.color)
    });
    Ok((session, base_url))
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Run one action and print the result; failures exit non-zero.
async fn run_once(
    session: &mut Session<LearnerClient, TerminalChart>,
    action: Action,
) -> Result<()> {
    let pb = spinner("Waiting for learner");
    let result = session.dispatch(action).await;
    pb.finish_and_clear();

    if let Err(e) = result {
        if let Some(notice) = session.notice() {
            eprintln!("{notice}");
        }
        return Err(e).context("Learner request failed");
    }

    let mut out = std::io::stdout();
    if let (Some(projection), Some(chart)) = (session.projection(), session.surface()) {
        write_summary(&mut out, &projection.summary)?;
        println!();
        chart.draw(&mut out)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(log_level(&cli.command, cli.verbose));

    match &cli.command {
        Commands::Example => {
            print_example_config();
        }

        Commands::Validate => {
            let config = load_config(&cli)?;
            info!("Configuration is valid");
            info!("  Learner: {}", config.resolve_base_url()?);
            match config.service.timeout_secs {
                Some(secs) => info!("  Timeout: {secs}s"),
                None => info!("  Timeout: none"),
            }
            info!(
                "  Chart: {} rows, colour {}",
                config.display.bar_height,
                if config.display.color { "on" } else { "off" }
            );
        }

        Commands::Ping => {
            let config = load_config(&cli)?;
            let client = LearnerClient::new(config.resolve_base_url()?, config.service.timeout())?;
            let health = client.health_check().await;

            println!("Learner:  {}", health.url);
            println!("Status:   {}", health.status);
            if let Some(ms) = health.latency_ms {
                println!("Latency:  {ms}ms");
            }
            if let Some(message) = &health.message {
                println!("Message:  {message}");
            }
            if health.status != HealthStatus::Healthy {
                anyhow::bail!("learner is {}", health.status);
            }
        }

        Commands::Submit { example, label } => {
            let config = load_config(&cli)?;
            let (mut session, _) = build_session(&config)?;
            session.set_example(example.as_str());
            session.set_label(label.as_str());
            run_once(&mut session, Action::Submit).await?;
        }

        Commands::Reset => {
            let config = load_config(&cli)?;
            let (mut session, _) = build_session(&config)?;
            run_once(&mut session, Action::Reset).await?;
        }

        Commands::Shell => {
            let config = load_config(&cli)?;
            let (session, base_url) = build_session(&config)?;
            Shell::new(session, base_url).run().await?;
        }
    }

    Ok(())
}
