use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use imgbatch_core::{EditorConfig, OutputFormat, ParameterText};

mod args;
mod commands;

use args::{DragArg, ViewportArg};

#[derive(Parser)]
#[command(name = "imgbatch")]
#[command(about = "Preview and batch-apply resize, rotate and crop edits", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true, value_hint = clap::ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// The three edit fields, in the same text form an editor UI accepts.
#[derive(Args, Debug, Clone, Default)]
struct EditArgs {
    /// Target size, e.g. 800x600
    #[arg(long, default_value = "")]
    resize: String,

    /// Clockwise rotation in degrees, e.g. 90 or -15
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    rotate: String,

    /// Crop rectangle "x1,y1,x2,y2" in pixels of the resized and rotated image
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    crop: String,
}

impl EditArgs {
    fn text(&self) -> ParameterText {
        ParameterText::new(&self.resize, &self.rotate, &self.crop)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the images a batch would process
    List {
        #[arg(value_hint = clap::ValueHint::DirPath)]
        folder: PathBuf,
    },

    /// Render the edited preview of a single image
    Preview {
        #[arg(value_hint = clap::ValueHint::FilePath)]
        image: PathBuf,

        #[command(flatten)]
        edit: EditArgs,

        /// Preview viewport, e.g. 800x600
        #[arg(long, default_value = "600x600")]
        viewport: ViewportArg,

        /// Drag a crop over the preview, "x1,y1,x2,y2" in preview pixels
        #[arg(long, allow_hyphen_values = true)]
        drag: Option<DragArg>,

        /// Write the preview rendering to this file (.png or .jpg)
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Apply the edits to every image in a folder
    Apply {
        #[arg(value_hint = clap::ValueHint::DirPath)]
        folder: PathBuf,

        #[command(flatten)]
        edit: EditArgs,

        /// Output directory (created if absent)
        #[arg(long, value_hint = clap::ValueHint::DirPath)]
        output_dir: Option<PathBuf>,

        /// Suffix appended to each file stem
        #[arg(long)]
        suffix: Option<String>,

        /// Output format
        #[arg(short, long)]
        format: Option<FormatArg>,

        /// JPEG quality (1-100)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=100))]
        quality: Option<u8>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum FormatArg {
    Jpeg,
    Png,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Jpeg => OutputFormat::Jpeg,
            FormatArg::Png => OutputFormat::Png,
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<EditorConfig> {
    match path {
        Some(path) => Ok(EditorConfig::from_json_file(path)?),
        None => Ok(EditorConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger with default level (overridden by RUST_LOG)
    let env = if cli.verbose {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("warn")
    };
    env_logger::Builder::from_env(env).init();

    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::List { folder } => commands::list::execute(&folder),

        Commands::Preview {
            image,
            edit,
            viewport,
            drag,
            output,
        } => commands::preview::execute(
            &config,
            &image,
            edit.text(),
            viewport,
            drag,
            output.as_deref(),
        ),

        Commands::Apply {
            folder,
            edit,
            output_dir,
            suffix,
            format,
            quality,
        } => {
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if let Some(suffix) = suffix {
                config.output_suffix = suffix;
            }
            if let Some(format) = format {
                config.output_format = format.into();
            }
            if let Some(quality) = quality {
                config.jpeg_quality = quality;
            }
            commands::apply::execute(&config, &folder, edit.text())
        }
    }
}
