use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hbnb::config::StorageConfig;
use hbnb::console::{Console, PROMPT};
use hbnb::storage::ObjectStore;

#[derive(Parser)]
#[command(name = "hbnb")]
#[command(about = "Command console for the hbnb object store")]
struct Cli {
    /// Snapshot file (overrides HBNB_FILE, default: file.json)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Run a single command and exit instead of reading from stdin
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

/// Initialize tracing on stderr so stdout carries only console output.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "hbnb=warn".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = match cli.file {
        Some(path) => StorageConfig::new(path),
        None => StorageConfig::from_env(),
    };

    let mut store = ObjectStore::with_config(&config)
        .with_context(|| format!("Failed to load snapshot {}", config.path.display()))?;
    let mut console = Console::new(&mut store).interactive(io::stdout().is_terminal());
    let mut stdout = io::stdout().lock();

    if !cli.command.is_empty() {
        console.execute(&cli.command.join(" "), &mut stdout);
        return Ok(());
    }

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut input = stdin.lock();
    let mut buf = Vec::new();

    loop {
        if interactive {
            write!(stdout, "{}", PROMPT)?;
            stdout.flush()?;
        }

        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            if interactive {
                writeln!(stdout)?;
            }
            console.execute("EOF", &mut stdout);
            break;
        }

        let line = String::from_utf8_lossy(&buf);
        if console.execute(&line, &mut stdout) {
            break;
        }
        stdout.flush()?;
    }

    Ok(())
}
