use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use ripeness::{
    AnalysisConfig, BatchProcessor, Pipeline, Preset,
    io::{load_image, remove_annotation, write_annotation},
    render::save_stages,
};
use ripeness_cli::{BatchJob, resolve_config};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about = "Estimate strawberry ripeness from photographs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone)]
struct ConfigArgs {
    /// Named preset
    #[arg(long, default_value = "interactive-default")]
    preset: Preset,
    /// TOML or JSON config file, overrides the preset
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a single image
    Analyze {
        image: PathBuf,
        #[command(flatten)]
        config: ConfigArgs,
        /// Write `<stem>.txt` into this directory when a fruit is found
        #[arg(long)]
        label_dir: Option<PathBuf>,
        /// Dump every intermediate stage as PNG into this directory
        #[arg(long)]
        debug_dir: Option<PathBuf>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Classify every image in a directory and write label files
    Batch {
        /// Job file (TOML or JSON); replaces the directory flags
        #[arg(short, long, conflicts_with_all = ["input_dir", "output_dir"])]
        job: Option<PathBuf>,
        #[arg(short, long, required_unless_present = "job")]
        input_dir: Option<PathBuf>,
        #[arg(short, long, required_unless_present = "job")]
        output_dir: Option<PathBuf>,
        #[arg(long, default_value = "batch-default")]
        preset: Preset,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Copy each image into `<output-dir>/<class>/`
        #[arg(long)]
        copy_classified: bool,
        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,
        /// Save the report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Suggest a gamma value from the image's mean lightness
    SuggestGamma {
        image: PathBuf,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Print a preset as TOML
    Config {
        #[arg(long, default_value = "interactive-default")]
        preset: Preset,
    },
    /// Print the JSON schema of the config file
    Schema,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            image,
            config,
            label_dir,
            debug_dir,
            json,
        } => {
            let config = resolve_config(config.preset, config.config.as_deref())?;
            analyze(&image, &config, label_dir.as_deref(), debug_dir.as_deref(), json)?;
        }
        Commands::Batch {
            job,
            input_dir,
            output_dir,
            preset,
            config,
            copy_classified,
            recursive,
            report,
        } => {
            let job = match job {
                Some(path) => BatchJob::from_file(path)?,
                None => {
                    let input_dir = input_dir.ok_or_else(|| eyre!("--input-dir is required"))?;
                    let output_dir = output_dir.ok_or_else(|| eyre!("--output-dir is required"))?;
                    BatchJob {
                        preset,
                        config,
                        copy_classified,
                        recursive,
                        ..BatchJob::new(input_dir, output_dir)
                    }
                }
            };
            run_batch(&job, report.as_deref())?;
        }
        Commands::SuggestGamma { image, config } => {
            let config = resolve_config(config.preset, config.config.as_deref())?;
            let pipeline = Pipeline::from_config(&config);
            let gamma = pipeline.suggest_gamma(&load_image(&image)?)?;
            println!("{gamma:.2}");
        }
        Commands::Config { preset } => {
            print!("{}", preset.config().to_toml()?);
        }
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&AnalysisConfig::schema())?);
        }
    }

    Ok(())
}

fn analyze(
    image: &Path,
    config: &AnalysisConfig,
    label_dir: Option<&Path>,
    debug_dir: Option<&Path>,
    json: bool,
) -> Result<()> {
    let pipeline = Pipeline::from_config(config);
    let analysis = pipeline.process_path(image)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis.summary())?);
    } else {
        println!("Redness: {:.2}%", analysis.ripeness.ratio);
        println!("Ripeness: {}", analysis.ripeness.class);
        match &analysis.annotation {
            Some(record) => println!("Label: {record}"),
            None => println!("Label: none (no fruit region found)"),
        }
    }

    if let Some(dir) = label_dir {
        match &analysis.annotation {
            Some(record) => {
                let path = write_annotation(dir, image, record)?;
                info!("Label written to {}", path.display());
            }
            None => {
                remove_annotation(dir, image)?;
                warn!("No region in {}, no label written", image.display());
            }
        }
    }

    if let Some(dir) = debug_dir {
        let stem = image
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let written = save_stages(&analysis, dir, &stem)?;
        info!("Saved {} stage images to {}", written.len(), dir.display());
    }

    Ok(())
}

fn run_batch(job: &BatchJob, report_path: Option<&Path>) -> Result<()> {
    let config = job.analysis_config()?;
    let images = job.discover()?;
    info!("Found {} images in {}", images.len(), job.input_dir.display());

    let processor = BatchProcessor::from_config(&config, job.output());
    let report = processor.run(&images);

    for (class, count) in report.class_counts() {
        println!("{class}: {count}");
    }
    if !report.skipped.is_empty() {
        println!("skipped: {}", report.skipped.len());
    }

    if let Some(path) = report_path {
        std::fs::write(path, report.to_json()?)?;
        info!("Report saved to {}", path.display());
    }

    Ok(())
}
