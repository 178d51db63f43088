use clap::{Parser, Subcommand, builder::styling};
use eyre::Result;
use owo_colors::OwoColorize;
use splunk_consumer::cli::{self, DEFAULT_CONFIG, RunOptions};
use splunk_consumer::schedule::Schedule;
use std::path::{Path, PathBuf};
use std::time::Duration;

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// Consume the contents of a Splunk index through the splunk CLI and emit it for downstream processing
#[derive(Parser)]
#[command(name = "consume-splunk", version, styles = STYLES)]
struct Cli {
    /// The dotenv file to source properties and credentials from
    #[arg(short, long, global = true, default_value = ".env")]
    env: String,

    /// YAML properties file; environment variables override its values
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More verbose logging
    #[arg(long, global = true)]
    debug: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run extraction cycles on a fixed interval
    Run {
        /// Run a single cycle and exit
        #[arg(long, conflicts_with_all = ["interval", "cycles"])]
        once: bool,

        /// Seconds between cycle starts
        #[arg(short, long, default_value_t = 60)]
        interval: u64,

        /// Stop after this many cycles
        #[arg(short = 'n', long)]
        cycles: Option<u64>,

        /// Directory to write flow files to
        #[arg(short, long, default_value = "out", conflicts_with = "stdout")]
        output_dir: PathBuf,

        /// Write flow file bodies to stdout instead of a directory
        #[arg(long)]
        stdout: bool,

        /// Directory holding the cycle counter state
        #[arg(short, long, default_value = ".state")]
        state_dir: PathBuf,

        /// Kill a search that runs longer than this many seconds
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Print the search command for the current configuration without running it
    Query,

    /// Show the stored cycle counter
    State {
        /// Directory holding the cycle counter state
        #[arg(short, long, default_value = ".state")]
        state_dir: PathBuf,

        /// Clear the stored counter
        #[arg(long)]
        reset: bool,
    },

    /// Write a properties template
    Init {
        /// The properties file to generate
        #[arg(default_value = DEFAULT_CONFIG)]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if Path::new(&cli.env).exists() {
        dotenvy::from_filename(&cli.env)?;
    }

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    let (config_path, config_required) = match &cli.config {
        Some(path) => (path.clone(), true),
        None => (PathBuf::from(DEFAULT_CONFIG), false),
    };

    match cli.command {
        Commands::Run {
            once,
            interval,
            cycles,
            output_dir,
            stdout,
            state_dir,
            timeout,
        } => {
            let config = cli::load_configuration(&config_path, config_required)?;

            let schedule = if once {
                Schedule::once()
            } else {
                let schedule = Schedule::every(Duration::from_secs(interval));
                match cycles {
                    Some(n) => schedule.with_max_cycles(n),
                    None => schedule,
                }
            };

            let options = RunOptions {
                schedule,
                output_dir: (!stdout).then_some(output_dir),
                state_dir,
                timeout: timeout.map(Duration::from_secs),
            };

            cli::run_consumer(config, options).await?;
        }
        Commands::Query => {
            let config = cli::load_configuration(&config_path, config_required)?;
            println!("{}", cli::preview_command(&config)?);
        }
        Commands::State { state_dir, reset } => {
            if reset {
                cli::reset_counter(&state_dir)?;
            } else {
                match cli::read_counter(&state_dir)? {
                    Some(n) => println!("FlowFileNumber: {}", n.cyan()),
                    None => println!("FlowFileNumber: {}", "unset".bright_black()),
                }
            }
        }
        Commands::Init { path } => {
            log::info!("Writing properties template to {}", path.display().bright_black());
            cli::init_properties(&path)?;
        }
    }

    Ok(())
}
