use std::{env, path::PathBuf};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use vqa_ops::init_tracing;
use vqa_orchestrator::{BatchRunner, Orchestrator};
use vqa_types::config::{CompareConfig, OpsConfig, PathsConfig, QaConfig};
use vqa_vision::RasterCodec;

const DEFAULT_CONFIG: &str = "configs/vqa.toml";

#[derive(Debug, Parser)]
#[command(name = "vqa", about = "Compare game screenshots against design exports")]
struct Cli {
    /// Config file (defaults to $VQA_CONFIG, then configs/vqa.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compare captured screenshots with reference exports and write the report.
    Compare {
        /// Only compare these screens (repeatable).
        #[arg(long = "screen")]
        screens: Vec<String>,
        /// Exit with an error when any screen is failing or missing.
        #[arg(long)]
        strict: bool,
    },
    /// List configured screens and whether their inputs exist.
    Screens,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config);
    init_tracing(&config.ops)?;

    let orchestrator = Orchestrator::new(config, RasterCodec::new());
    match cli.command {
        Command::Compare { screens, strict } => {
            let outcome = orchestrator.run_batch(&screens).await?;
            let summary = outcome.report.summary;
            println!(
                "{} total | ✅ {} passing | 🟡 {} warning | 🔴 {} failing | ⚠️ {} missing",
                summary.total, summary.passing, summary.warning, summary.failing, summary.missing
            );
            println!("📊 Report saved: {}", outcome.artifacts.archive_json.display());
            println!(
                "📝 Markdown report: {}",
                outcome.artifacts.latest_markdown.display()
            );
            if strict && !summary.is_clean() {
                bail!(
                    "{} failing and {} missing screen(s)",
                    summary.failing,
                    summary.missing
                );
            }
        }
        Command::Screens => {
            for name in orchestrator.configured_screens() {
                let screen = orchestrator.resolve(name);
                println!(
                    "{name}\n  reference {} {}\n  captured  {} {}",
                    mark(screen.reference_path.is_file()),
                    screen.reference_path.display(),
                    mark(screen.captured_path.is_file()),
                    screen.captured_path.display()
                );
            }
            println!("reports -> {}", orchestrator.reports_dir().display());
            info!(
                "{} screen(s) configured",
                orchestrator.configured_screens().len()
            );
        }
    }
    Ok(())
}

fn mark(exists: bool) -> &'static str {
    if exists {
        "✅"
    } else {
        "⚠️"
    }
}

fn load_config(from_args: Option<PathBuf>) -> QaConfig {
    let from_env = env::var("VQA_CONFIG").ok().map(PathBuf::from);
    let path = from_args
        .or(from_env)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    match QaConfig::from_file(&path) {
        Ok(cfg) => {
            if let Err(err) = cfg.validate() {
                eprintln!(
                    "Invalid config in '{}': {err}. Falling back to internal defaults.",
                    path.display()
                );
                default_config()
            } else {
                cfg
            }
        }
        Err(err) => {
            eprintln!(
                "Failed to load config from '{}': {err}. Falling back to internal defaults.",
                path.display()
            );
            default_config()
        }
    }
}

fn default_config() -> QaConfig {
    let config = QaConfig {
        paths: PathsConfig {
            reference_dir: "QA/Screenshots/Figma".into(),
            captured_dir: "QA/Screenshots/Unity".into(),
            reports_dir: "QA/Reports".into(),
        },
        compare: CompareConfig::default(),
        ops: OpsConfig {
            log_level: "info".into(),
        },
        screens: vec![
            "LogoScreen".into(),
            "SplashScreen".into(),
            "LoadingScreen".into(),
        ],
    };
    debug_assert!(config.validate().is_ok());
    config
}
