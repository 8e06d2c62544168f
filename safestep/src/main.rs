#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use safestep::config::NavigationConfig;
use safestep::log_init;
use safestep::navigate::lane::lane_bounds;
use safestep::runner::{self, OutputFormat};
use safestep_inference::{DetectionSource, JsonLinesSource};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "safestep")]
#[command(about = "Indoor navigation instructions from per-frame object detections", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read detector output as JSON lines and print one instruction per frame
    Run {
        /// Detection file; reads stdin when omitted or "-"
        #[arg(long, short)]
        input: Option<PathBuf>,

        /// Confidence threshold for detections
        #[arg(long)]
        conf: Option<f64>,

        /// Frame width assumed when a frame omits it
        #[arg(long)]
        width: Option<u32>,

        /// Frame height assumed when a frame omits it
        #[arg(long)]
        height: Option<u32>,

        /// Share of a detection's width that must fall inside a lane to block it
        #[arg(long)]
        min_intersection: Option<f64>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the effective configuration and lane layout
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = NavigationConfig::resolve(cli.config.as_deref(), cli.log_level.as_deref())?;
    log_init(config.log_level()?)?;
    if let Some(path) = &cli.config {
        info!("Loaded navigation config from {}", path.display());
    }

    match cli.command {
        Commands::Run {
            input,
            conf,
            width,
            height,
            min_intersection,
            format,
        } => {
            if let Some(conf) = conf {
                config.detection.confidence_threshold = conf;
            }
            if let Some(width) = width {
                config.detection.frame_width = width;
            }
            if let Some(height) = height {
                config.detection.frame_height = height;
            }
            if let Some(min_intersection) = min_intersection {
                config.navigation.min_horizontal_intersection = min_intersection;
            }
            config.validate()?;

            run(&config, input, format).await
        }
        Commands::Config => {
            config.validate()?;
            print_config(&config)
        }
    }
}

async fn run(config: &NavigationConfig, input: Option<PathBuf>, format: OutputFormat) -> Result<()> {
    let reader: Box<dyn io::BufRead + Send> = match input {
        Some(path) if path.as_os_str() != "-" => {
            let file = File::open(&path)
                .with_context(|| format!("Failed to open detections {}", path.display()))?;
            info!("Reading detections from {}", path.display());
            Box::new(BufReader::new(file))
        }
        _ => {
            info!("Reading detections from stdin");
            Box::new(BufReader::new(io::stdin()))
        }
    };

    let source: Box<dyn DetectionSource + Send> = Box::new(
        JsonLinesSource::new(reader)
            .with_default_size(config.detection.frame_width, config.detection.frame_height)
            .with_confidence_threshold(config.detection.confidence_threshold),
    );

    let navigator = config.navigator();
    let analyzer = navigator.analyzer();
    info!(
        "Obstacle classes: {}; lane blocked at >= {} of box width",
        analyzer.obstacle_classes().sorted().join(", "),
        analyzer.min_horizontal_intersection()
    );

    let stdout = io::stdout();
    runner::run(source, &navigator, |report| {
        runner::write_report(&mut stdout.lock(), report, format)
    })
    .await?;
    Ok(())
}

fn print_config(config: &NavigationConfig) -> Result<()> {
    let rendered = toml::to_string_pretty(config).context("Failed to render config")?;
    println!("{rendered}");

    let [left, center, right] = lane_bounds(config.detection.frame_width);
    println!(
        "# lanes at {}px: left [{}, {}), center [{}, {}), right [{}, {}) ({}px remainder in right lane)",
        config.detection.frame_width,
        left.x1,
        left.x2,
        center.x1,
        center.x2,
        right.x1,
        right.x2,
        right.width() - center.width()
    );
    Ok(())
}
