//! Command-line interface: serve the form, fetch artifacts, or predict once.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::artifacts::{ArtifactConfig, ArtifactStore, RemoteStore};
use crate::inference::{FormFields, PredictionEngine, PredictionOutcome};
use crate::server::{run_server, ServerConfig};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }
fn fail(s: &str) -> ColoredString   { s.truecolor(240, 110, 110) }

/// Boxed startup banner, built row by row and rendered once
#[derive(Debug, Default)]
struct Banner {
    rows: Vec<Row>,
}

#[derive(Debug)]
enum Row {
    Blank,
    Rule,
    Left(String),
    Center(String),
}

impl Banner {
    fn row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }

    fn render(&self) -> Vec<String> {
        let edge = |l: char, r: char| format!("  {}", dim(&format!("{}{}{}", l, "─".repeat(W + 3), r)));
        let mut lines = vec![edge('┌', '┐')];
        for row in &self.rows {
            let (content, centered) = match row {
                Row::Rule => {
                    lines.push(edge('├', '┤'));
                    continue;
                }
                Row::Blank => ("", false),
                Row::Left(text) => (text.as_str(), false),
                Row::Center(text) => (text.as_str(), true),
            };
            let pad = W.saturating_sub(strip_ansi(content).chars().count());
            let left = if centered { pad / 2 } else { 0 };
            lines.push(format!(
                "  {}  {}{}{} {}",
                dim("│"),
                " ".repeat(left),
                content,
                " ".repeat(pad - left),
                dim("│")
            ));
        }
        lines.push(edge('└', '┘'));
        lines
    }
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "vgsales")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Predict global video game sales from a web form")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server (default)
    Serve {
        /// Server port [env: API_PORT, default 5000]
        #[arg(short, long)]
        port: Option<u16>,

        /// Server host [env: API_HOST, default 127.0.0.1]
        #[arg(long)]
        host: Option<String>,

        /// Directory holding the artifact files [env: ARTIFACTS_DIR]
        #[arg(short, long)]
        artifacts_dir: Option<PathBuf>,
    },

    /// Download any missing artifact files and exit
    Fetch {
        /// Directory holding the artifact files [env: ARTIFACTS_DIR]
        #[arg(short, long)]
        artifacts_dir: Option<PathBuf>,
    },

    /// Predict once from the command line, using the same rules as the form
    Predict {
        #[arg(long)]
        platform: String,

        #[arg(long)]
        genre: String,

        #[arg(long)]
        publisher: String,

        #[arg(long)]
        year: String,

        #[arg(long)]
        na_sales: String,

        #[arg(long)]
        eu_sales: String,

        #[arg(long)]
        jp_sales: String,

        #[arg(long)]
        other_sales: String,

        /// Directory holding the artifact files [env: ARTIFACTS_DIR]
        #[arg(short, long)]
        artifacts_dir: Option<PathBuf>,
    },
}

/// Values for a single `predict` invocation
#[derive(Debug, Clone)]
pub struct PredictArgs {
    pub platform: String,
    pub genre: String,
    pub publisher: String,
    pub year: String,
    pub na_sales: String,
    pub eu_sales: String,
    pub jp_sales: String,
    pub other_sales: String,
}

impl PredictArgs {
    pub fn to_form(&self) -> FormFields {
        FormFields::from_iter([
            ("platform", self.platform.as_str()),
            ("genre", self.genre.as_str()),
            ("publisher", self.publisher.as_str()),
            ("year", self.year.as_str()),
            ("na_sales", self.na_sales.as_str()),
            ("eu_sales", self.eu_sales.as_str()),
            ("jp_sales", self.jp_sales.as_str()),
            ("other_sales", self.other_sales.as_str()),
        ])
    }
}

fn artifact_config(dir: Option<PathBuf>) -> ArtifactConfig {
    let config = ArtifactConfig::default();
    match dir {
        Some(dir) => config.with_dir(dir),
        None => config,
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub async fn cmd_fetch(artifacts_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let config = artifact_config(artifacts_dir);
    section("Fetch artifacts");
    println!("  {:<12} {}", muted("Directory"), config.dir.display());
    println!("  {:<12} {}", muted("Source"), config.download_base_url);
    println!();

    let remote = RemoteStore::new(&config.download_base_url)?;
    for (identifier, path) in config.sources() {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        step_run(&name);
        let start = Instant::now();
        let downloaded = remote.ensure_local(identifier, &path).await?;
        if downloaded {
            step_done(&format!("downloaded in {:?}", start.elapsed()));
        } else {
            step_done("already present");
        }
    }

    step_run("Validating");
    let store = ArtifactStore::load(&config.paths())?;
    step_done(&format!(
        "{} · {} features · {} encoders",
        store.predictor().describe(),
        store.feature_order().len(),
        store.encoders().len()
    ));

    println!();
    Ok(())
}

pub async fn cmd_predict(args: PredictArgs, artifacts_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let config = artifact_config(artifacts_dir);
    section("Predict");

    step_run("Loading artifacts");
    let start = Instant::now();
    let store = ArtifactStore::provision_and_load(&config).await?;
    step_done(&format!("in {:?}", start.elapsed()));

    let engine = PredictionEngine::new(Arc::new(store));
    let outcome = engine.respond(&args.to_form());

    println!();
    match &outcome {
        PredictionOutcome::Success(_) => println!("  {} {}", ok("✓"), outcome),
        PredictionOutcome::Failure(_) => println!("  {} {}", fail("✗"), outcome),
    }
    println!();
    Ok(())
}

// ─── Serve ─────────────────────────────────────────────────────────────────────

pub async fn cmd_serve(
    host: Option<String>,
    port: Option<u16>,
    artifacts_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let defaults = ServerConfig::from_env()?;
    let artifacts = match artifacts_dir {
        Some(dir) => defaults.artifacts.with_dir(dir),
        None => defaults.artifacts,
    };
    let config = ServerConfig::new(
        host.unwrap_or(defaults.host),
        port.unwrap_or(defaults.port),
        artifacts,
    );

    let banner = Banner::default()
        .row(Row::Blank)
        .row(Row::Center("Video Game Sales Predictor".white().bold().to_string()))
        .row(Row::Center(dim(&format!("v{}", env!("CARGO_PKG_VERSION"))).to_string()))
        .row(Row::Blank)
        .row(Row::Rule)
        .row(Row::Left(kv("Form     ", &format!("http://{}:{}", config.host, config.port))))
        .row(Row::Left(kv("Health   ", &format!("http://{}:{}/health", config.host, config.port))))
        .row(Row::Left(kv("Artifacts", &config.artifacts.dir.display().to_string())))
        .row(Row::Rule)
        .row(Row::Center(dim("ctrl+c to stop").to_string()))
        .row(Row::Blank);

    println!();
    for line in banner.render() {
        println!("{}", line);
    }
    println!();

    run_server(config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi() {
        let colored = format!("{}", "text".truecolor(1, 2, 3));
        assert_eq!(strip_ansi(&colored), "text");
        assert_eq!(strip_ansi("plain"), "plain");
    }

    #[test]
    fn test_banner_rows_share_one_width() {
        let banner = Banner::default()
            .row(Row::Center("title".to_string()))
            .row(Row::Rule)
            .row(Row::Left(kv("Form", "http://127.0.0.1:5000")))
            .row(Row::Blank);
        let lines = banner.render();

        assert_eq!(lines.len(), 6);
        let widths: Vec<usize> = lines.iter().map(|l| strip_ansi(l).chars().count()).collect();
        assert!(widths.iter().all(|w| *w == widths[0]), "{:?}", widths);

        let title = strip_ansi(&lines[1]);
        let inner = title.trim_matches(|c| c == ' ' || c == '│');
        assert_eq!(inner, "title");
        let cell = title.split('│').nth(1).unwrap();
        let leading = cell.len() - cell.trim_start().len();
        let trailing = cell.len() - cell.trim_end().len();
        assert!(leading.abs_diff(trailing) <= 1);
    }

    #[test]
    fn test_predict_args_cover_every_field() {
        let args = PredictArgs {
            platform: "PS4".into(),
            genre: "Action".into(),
            publisher: "EA".into(),
            year: "2015".into(),
            na_sales: "1.2".into(),
            eu_sales: "0.8".into(),
            jp_sales: "0.1".into(),
            other_sales: "0.3".into(),
        };
        let record = args.to_form().to_record().unwrap();
        assert_eq!(record.len(), 8);
    }

    #[test]
    fn test_parse_predict_command() {
        let cli = Cli::try_parse_from([
            "vgsales", "predict",
            "--platform", "PS4", "--genre", "Action", "--publisher", "EA",
            "--year", "2015", "--na-sales", "1.2", "--eu-sales", "0.8",
            "--jp-sales", "0.1", "--other-sales", "0.3",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Commands::Predict { ref year, .. }) if year == "2015"));
    }

    #[test]
    fn test_no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["vgsales"]).unwrap();
        assert!(cli.command.is_none());
    }
}
