use anyhow::{Context, Result};
use clap::Parser;
use kiosk_viewer::{
    run_session, Labels, PdfiumSource, SessionError, SessionSummary, Surface, ViewerCommand,
    ViewerConfig, ViewerUi,
};
use log::{debug, warn};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[derive(Debug, Parser)]
#[command(name = "kiosk-viewer")]
#[command(about = "View a PDF one page at a time")]
struct Cli {
    /// Document path, file:// URL or http(s):// URL
    #[arg(value_name = "LOCATOR")]
    locator: Option<String>,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Locale tag for page labels
    #[arg(long)]
    locale: Option<String>,

    /// Device pixel ratio of the output image
    #[arg(long)]
    dpr: Option<f32>,

    /// Where each finished frame is written
    #[arg(short, long, default_value = "page.png")]
    output: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Prints labels to stdout and writes frames to a PNG file.
struct TerminalUi {
    labels: Labels,
    page: u32,
    page_count: u32,
    zoom_percent: u32,
    output: PathBuf,
}

impl TerminalUi {
    fn new(output: PathBuf) -> Self {
        Self {
            labels: Labels {
                page: String::new(),
                of: String::new(),
            },
            page: 0,
            page_count: 0,
            zoom_percent: 100,
            output,
        }
    }

    fn status_line(&self) -> String {
        format!(
            "{} {} {} {} · {}%",
            self.labels.page, self.page, self.labels.of, self.page_count, self.zoom_percent
        )
    }
}

impl ViewerUi for TerminalUi {
    fn set_labels(&mut self, labels: &Labels) {
        self.labels = labels.clone();
    }

    fn set_page_number(&mut self, page: u32) {
        self.page = page;
    }

    fn set_page_count(&mut self, count: u32) {
        self.page_count = count;
    }

    fn set_zoom_percent(&mut self, percent: u32) {
        self.zoom_percent = percent;
    }

    fn present(&mut self, surface: &Surface) {
        let (width, height) = surface.backing_size();
        match surface.save_png(&self.output) {
            Ok(()) => println!(
                "{}  [{}x{} -> {}]",
                self.status_line(),
                width,
                height,
                self.output.display()
            ),
            Err(e) => warn!("[Kiosk] Could not write {}: {}", self.output.display(), e),
        }
    }

    fn show_content(&mut self) {
        println!("{}", self.status_line());
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("{}", message);
    }

    fn show_page_error(&mut self, page: u32, message: &str) {
        eprintln!("{} {}: {}", self.labels.page, page, message);
    }
}

fn load_config(cli: &Cli) -> Result<ViewerConfig> {
    let mut config = match &cli.config {
        Some(path) => ViewerConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ViewerConfig::default(),
    };
    if let Some(locator) = &cli.locator {
        config.locator = locator.clone();
    }
    if let Some(locale) = &cli.locale {
        config.locale = locale.clone();
    }
    if let Some(dpr) = cli.dpr {
        config.pixel_density = dpr;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Forward whitespace-separated stdin commands until EOF or quit.
async fn read_commands(tx: mpsc::Sender<ViewerCommand>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        for token in line.split_whitespace() {
            match token.parse::<ViewerCommand>() {
                Ok(command) => {
                    debug!("[Kiosk] Command {:?}", command);
                    if tx.send(command).await.is_err() || command == ViewerCommand::Close {
                        return;
                    }
                }
                Err(e) => eprintln!("{} (use p, n, +, -, q)", e),
            }
        }
    }
    let _ = tx.send(ViewerCommand::Close).await;
}

fn main() {
    // Exit explicitly: a pending stdin read would otherwise hold the runtime open
    match run(Cli::parse()) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(error) => {
            eprintln!("{error:#}");
            std::process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the failure was already shown to the user.
#[tokio::main(flavor = "current_thread")]
async fn run(cli: Cli) -> Result<bool> {
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = load_config(&cli)?;
    let mut ui = TerminalUi::new(cli.output.clone());

    let (tx, rx) = mpsc::channel(32);
    tokio::spawn(read_commands(tx));

    finish(run_session(&PdfiumSource::new(), &mut ui, &config, rx).await)
}

/// Open failures were already reported through `show_error`.
fn finish(result: std::result::Result<SessionSummary, SessionError>) -> Result<bool> {
    match result {
        Ok(summary) => {
            debug!("[Kiosk] {:?}", summary);
            Ok(true)
        }
        Err(SessionError::Open(_)) => Ok(false),
        Err(e) => Err(e).context("viewer session failed"),
    }
}
