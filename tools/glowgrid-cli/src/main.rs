//! GlowGrid CLI — create, automate, bake and preview LED-matrix patterns.
//!
//! Usage:
//!   glowgrid new <NAME>               Create a new pattern file
//!   glowgrid info <PATH>              Show pattern information
//!   glowgrid validate <PATH>          Validate a pattern file
//!   glowgrid add-action <PATH> <TYPE> Attach an automation action to a layer
//!   glowgrid bake <PATH>              Bake a layer's automation into frames
//!   glowgrid render <PATH>            Render composited frames to the terminal

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use glowgrid_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "glowgrid",
    about = "LED-matrix animation authoring: layers, automation and baking",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this configuration file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new pattern file
    New {
        /// Pattern name
        name: String,

        /// Output directory (defaults to the configured patterns directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Matrix width in LEDs
        #[arg(long)]
        width: Option<u32>,

        /// Matrix height in LEDs
        #[arg(long)]
        height: Option<u32>,

        /// Playback rate
        #[arg(long)]
        fps: Option<u32>,

        /// Do not create the initial blank frame
        #[arg(long)]
        empty: bool,
    },

    /// Show pattern information
    Info {
        /// Path to the pattern file
        path: PathBuf,
    },

    /// Validate a pattern file
    Validate {
        /// Path to the pattern file
        path: PathBuf,
    },

    /// Attach an automation action to a layer
    AddAction {
        /// Path to the pattern file
        path: PathBuf,

        /// Action type (scroll, rotate, mirror, flip, wipe, reveal, bounce,
        /// radial, colour_cycle, invert)
        kind: String,

        /// Layer id (defaults to the bottom layer)
        #[arg(short, long)]
        layer: Option<u32>,

        /// First frame the action is active
        #[arg(long, default_value = "0")]
        start: u32,

        /// Last frame the action is active (inclusive)
        #[arg(long)]
        end: Option<u32>,

        /// Parameter as key=value (value parsed as JSON, else a string)
        #[arg(short, long = "param")]
        params: Vec<String>,

        /// Display name
        #[arg(long)]
        name: Option<String>,
    },

    /// Bake a layer's automation into real frames
    Bake {
        /// Path to the pattern file
        path: PathBuf,

        /// Layer id (defaults to the bottom layer)
        #[arg(short, long)]
        layer: Option<u32>,

        /// Source frame index
        #[arg(long, default_value = "0")]
        frame: u32,

        /// Number of frames to generate
        #[arg(short, long)]
        count: Option<u32>,

        /// Allow baking from a frame that is already baked output
        #[arg(long)]
        force: bool,

        /// Leave the layer's actions active after baking
        #[arg(long)]
        keep_actions: bool,
    },

    /// Render composited frames to the terminal
    Render {
        /// Path to the pattern file
        path: PathBuf,

        /// First frame index
        #[arg(long, default_value = "0")]
        frame: u32,

        /// Number of frames
        #[arg(short, long, default_value = "1")]
        count: u32,

        /// Use keyed overwrite blending (black is transparent)
        #[arg(long)]
        keyed: bool,

        /// Fail when a visible layer has no frame at an index
        #[arg(long)]
        strict: bool,

        /// Print pixel data as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };

    // Initialize logging
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    glowgrid_common::logging::init_logging(&logging);
    tracing::debug!(patterns_dir = %config.patterns_dir.display(), "Loaded configuration");

    match cli.command {
        Commands::New {
            name,
            output,
            width,
            height,
            fps,
            empty,
        } => commands::new::run(
            commands::new::NewArgs {
                name,
                output,
                width,
                height,
                fps,
                empty,
            },
            &config,
        ),
        Commands::Info { path } => commands::info::run(path),
        Commands::Validate { path } => commands::validate::run(path),
        Commands::AddAction {
            path,
            kind,
            layer,
            start,
            end,
            params,
            name,
        } => commands::add_action::run(commands::add_action::AddActionArgs {
            path,
            kind,
            layer,
            start,
            end,
            params,
            name,
        }),
        Commands::Bake {
            path,
            layer,
            frame,
            count,
            force,
            keep_actions,
        } => {
            commands::bake::run(
                commands::bake::BakeArgs {
                    path,
                    layer,
                    frame,
                    count,
                    force,
                    keep_actions,
                },
                &config,
            )
            .await
        }
        Commands::Render {
            path,
            frame,
            count,
            keyed,
            strict,
            json,
        } => commands::render::run(
            commands::render::RenderArgs {
                path,
                frame,
                count,
                keyed,
                strict,
                json,
            },
            &config,
        ),
    }
}
