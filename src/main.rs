use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use page_scanner::output::{self, ErrorReport, MISSING_URL};
use page_scanner::{ReadyCondition, Scanner};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReadyMode {
    /// Sleep for --settle-ms
    Fixed,
    /// Wait until the DOM has been unchanged for --settle-ms
    DomQuiet,
    /// Stop at the load event
    Load,
}

#[derive(Debug, Parser)]
#[command(
    name = "page-scanner",
    version,
    about = "Load a page in headless Chrome and print its title, description, heading and images as JSON"
)]
struct Cli {
    /// Page to scan
    url: Option<String>,

    /// Anything after the URL is ignored
    #[arg(hide = true)]
    _rest: Vec<String>,

    /// When the page counts as rendered
    #[arg(long, value_enum, env = "PAGE_SCANNER_READY", default_value_t = ReadyMode::Fixed)]
    ready: ReadyMode,

    /// Fixed delay, or quiet window for dom-quiet, in milliseconds
    #[arg(long, env = "PAGE_SCANNER_SETTLE_MS", default_value_t = 3000)]
    settle_ms: u64,

    /// Browser request timeout in seconds; also caps dom-quiet
    #[arg(long, env = "PAGE_SCANNER_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Chrome executable (auto-detected when unset)
    #[arg(long, env = "PAGE_SCANNER_CHROME")]
    chrome: Option<String>,

    /// Show the browser window
    #[arg(long)]
    headful: bool,
}

impl Cli {
    fn ready_condition(&self) -> ReadyCondition {
        let settle = Duration::from_millis(self.settle_ms);
        match self.ready {
            ReadyMode::Fixed => ReadyCondition::Fixed(settle),
            ReadyMode::DomQuiet => ReadyCondition::DomQuiet {
                quiet: settle,
                timeout: Duration::from_secs(self.timeout_secs),
            },
            ReadyMode::Load => ReadyCondition::Load,
        }
    }

    fn scanner(&self) -> Scanner {
        let mut builder = Scanner::builder()
            .headless(!self.headful)
            .timeout(Duration::from_secs(self.timeout_secs))
            .ready(self.ready_condition());
        if let Some(ref chrome) = self.chrome {
            builder = builder.chrome_path(chrome);
        }
        builder.build()
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // stdout carries the JSON result only.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let written = match cli.url.as_deref() {
        None => output::write_line(std::io::stdout().lock(), &ErrorReport { error: MISSING_URL }),
        Some(url) => {
            let result = cli.scanner().scan(url).await;
            output::write_line(std::io::stdout().lock(), &result)
        }
    };

    match written {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "failed to write result");
            ExitCode::FAILURE
        }
    }
}
