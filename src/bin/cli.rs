//! browser-marks command line
//!
//! Opens a page, numbers its interactive elements and prints them.

use anyhow::{Context, bail};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use browser_marks::browser::{BrowserSession, CaptureOptions, LaunchOptions};
use browser_marks::tools::utils::normalize_url;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// One line per element
    Table,
    /// Descriptor list as JSON
    Json,
}

#[derive(Parser)]
#[command(name = "browser-marks")]
#[command(version)]
#[command(about = "Mark and list the interactive elements of a web page", long_about = None)]
struct Cli {
    /// Page to open
    url: String,

    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    executable_path: Option<PathBuf>,

    /// Window size as WIDTHxHEIGHT
    #[arg(long, default_value = "1280x800", value_parser = parse_window_size)]
    window_size: (u32, u32),

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "table")]
    format: Format,

    /// Write a PNG screenshot of the marked page to this file
    #[arg(long, short = 's', value_name = "FILE")]
    screenshot: Option<PathBuf>,

    /// Leave the marks on the page (useful with --headed)
    #[arg(long)]
    keep_marks: bool,
}

fn parse_window_size(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", value))?;
    let width = width.trim().parse().map_err(|e| format!("invalid width: {}", e))?;
    let height = height.trim().parse().map_err(|e| format!("invalid height: {}", e))?;
    Ok((width, height))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if cli.screenshot.is_some() && cli.keep_marks {
        bail!("--screenshot removes the marks after capturing; drop --keep-marks");
    }

    let mut options = LaunchOptions::new()
        .headless(!cli.headed)
        .window_size(cli.window_size.0, cli.window_size.1);
    if let Some(path) = &cli.executable_path {
        options = options.chrome_path(path);
    }

    let session = BrowserSession::launch(options).context("Failed to launch browser")?;

    let url = normalize_url(&cli.url);
    session.navigate(&url)?;
    session.wait_for_navigation()?;
    log::info!("Loaded {}", url);

    let descriptors = match &cli.screenshot {
        Some(path) => {
            let page = session.capture_marked(&CaptureOptions::default())?;
            let png = STANDARD.decode(&page.screenshot).context("Screenshot is not valid base64")?;
            std::fs::write(path, png).with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote screenshot to {}", path.display());
            page.descriptors
        }
        None => {
            let descriptors = session.mark_page()?;
            if !cli.keep_marks {
                session.unmark_page()?;
            }
            descriptors
        }
    };

    match cli.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&descriptors)?),
        Format::Table => {
            // Rows are rectangles; a wrapped element spans several rows under one page label
            println!("{:>4}  element", "rect");
            for (rect, descriptor) in descriptors.iter().enumerate() {
                println!("{:>4}  {}", rect, descriptor.to_simple_string());
            }
            eprintln!("{} marked rectangles", descriptors.len());
        }
    }

    if cli.keep_marks && cli.headed {
        eprintln!("Marks left on the page; press Enter to close the browser");
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
    }

    session.close()?;
    Ok(())
}
