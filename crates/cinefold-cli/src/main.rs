//! cinefold CLI: build the enriched movie dataset from IMDb-style dumps.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use cinefold_core::config::{parse_delimiter, ConfigOverrides, OutputFormat, PipelineConfig};
use cinefold_core::error::{Error, Result};
use cinefold_core::policy::MissingDirector;
use cinefold_exec::{Pipeline, TracingObserver};
use cinefold_io::{DelimitedSource, SourceOptions};
use cinefold_planner::{load_config_file, PipelinePlan};

#[derive(Parser)]
#[command(name = "cinefold")]
#[command(about = "Denormalize movie, rating, crew, and cast dumps into one dataset", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline and write the output file
    Run {
        #[command(flatten)]
        config: ConfigArgs,

        /// Write the run report as JSON to this path (`-` for stdout)
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Resolve configuration and check every source header
    Validate {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Print the resolved plan as JSON without reading any rows
    Explain {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

/// Flags shared by every subcommand. Each one overrides the same key from
/// the YAML file and the environment.
#[derive(Args, Debug, Default)]
struct ConfigArgs {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the source files
    #[arg(long)]
    data_path: Option<PathBuf>,

    /// Field delimiter (`\t`, `tab`, or one character)
    #[arg(long, value_parser = delimiter_arg)]
    delimiter: Option<char>,

    /// Token standing for a missing value
    #[arg(long)]
    null_marker: Option<String>,

    /// Honour `"` quoting in sources
    #[arg(long)]
    quoting: Option<bool>,

    /// Rows per chunk for streamed sources
    #[arg(long)]
    chunk_rows: Option<usize>,

    /// Chunks the reader thread may run ahead (0 disables the thread)
    #[arg(long)]
    prefetch_chunks: Option<usize>,

    /// Stream any source larger than this many bytes
    #[arg(long)]
    stream_threshold_bytes: Option<u64>,

    /// Hard cap for the cast buffer, in bytes
    #[arg(long)]
    mem_cap_bytes: Option<usize>,

    /// Output file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: jsonl (default), csv, parquet (`parquet` feature)
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Cast members kept per movie
    #[arg(long)]
    cast_limit: Option<usize>,

    /// Which entry of the director list is the primary director
    #[arg(long)]
    director_position: Option<usize>,

    /// `drop` or `retain` crew rows without a director at that position
    #[arg(long, value_parser = missing_director_arg)]
    missing_director: Option<MissingDirector>,
}

impl ConfigArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            data_path: self.data_path.clone(),
            delimiter: self.delimiter,
            null_marker: self.null_marker.clone(),
            quoting: self.quoting,
            chunk_rows: self.chunk_rows,
            prefetch_chunks: self.prefetch_chunks,
            stream_threshold_bytes: self.stream_threshold_bytes,
            mem_cap_bytes: self.mem_cap_bytes,
            output: self.output.clone(),
            format: self.format,
            cast_limit: self.cast_limit,
            director_position: self.director_position,
            missing_director: self.missing_director,
            ..Default::default()
        }
    }

    /// defaults < environment < YAML file < flags
    fn resolve(&self, env: ConfigOverrides) -> Result<PipelineConfig> {
        let mut layers = env;
        if let Some(path) = &self.config {
            layers = layers.merge(load_config_file(path)?);
        }
        layers = layers.merge(self.overrides());
        PipelineConfig::from_overrides(&layers)
    }
}

fn delimiter_arg(raw: &str) -> std::result::Result<char, String> {
    parse_delimiter(raw).map_err(|e| e.to_string())
}

fn missing_director_arg(raw: &str) -> std::result::Result<MissingDirector, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "drop" => Ok(MissingDirector::Drop),
        "retain" => Ok(MissingDirector::Retain),
        other => Err(format!("expected 'drop' or 'retain', got '{other}'")),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cinefold=info,cinefold_exec=info,cinefold_mem=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Run { config, report } => run(&config, report.as_deref()),
        Commands::Validate { config } => validate(&config),
        Commands::Explain { config } => explain(&config),
    };

    if let Err(e) = outcome {
        error!(error = %e, "cinefold failed");
        std::process::exit(1);
    }
}

fn run(args: &ConfigArgs, report_path: Option<&Path>) -> Result<()> {
    let cfg = args.resolve(ConfigOverrides::from_env()?)?;
    info!(data_path = %cfg.data_path.display(), chunk_rows = cfg.chunk_rows, "starting run");

    let pipeline = Pipeline::new(cfg)?;
    let report = pipeline.run(&TracingObserver)?;

    println!("✓ Pipeline executed successfully");
    println!("  Records: {}", report.records);
    println!("  Duration: {}ms", report.duration_ms());
    if let Some(path) = &report.output_path {
        println!("  Output: {path}");
    }
    if let Some(digest) = &report.output_digest {
        println!("  Digest: {digest}");
    }

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&report).map_err(|e| Error::Sink(e.to_string()))?;
        if path == Path::new("-") {
            println!("{json}");
        } else {
            std::fs::write(path, json).map_err(|e| Error::Sink(format!("{}: {e}", path.display())))?;
        }
    }
    Ok(())
}

fn validate(args: &ConfigArgs) -> Result<()> {
    let cfg = args.resolve(ConfigOverrides::from_env()?)?;
    let plan = PipelinePlan::build(&cfg);
    let opts = SourceOptions::from_config(&cfg);
    for source in &plan.sources {
        let opts = opts
            .clone()
            .with_projection(&source.columns)
            .with_optional(&source.optional);
        let opened = DelimitedSource::open(&source.path, &opts)?;
        println!("✓ {}: {} ({} bytes)", source.table, source.path, opened.file_len());
    }
    println!("✓ Configuration is valid");
    Ok(())
}

fn explain(args: &ConfigArgs) -> Result<()> {
    let cfg = args.resolve(ConfigOverrides::from_env()?)?;
    let plan = PipelinePlan::build(&cfg);
    let json = serde_json::to_string_pretty(&plan).map_err(|e| Error::Invariant(e.to_string()))?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn flags_beat_yaml_beat_env() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("cinefold.yaml");
        std::fs::write(&yaml, "chunk_rows: 20\ncast_limit: 3\nformat: csv\n").unwrap();

        let env = ConfigOverrides {
            data_path: Some(PathBuf::from("/env/data")),
            chunk_rows: Some(10),
            mem_cap_bytes: Some(1024),
            ..Default::default()
        };
        let args = ConfigArgs {
            config: Some(yaml),
            cast_limit: Some(4),
            ..Default::default()
        };
        let cfg = args.resolve(env).unwrap();
        assert_eq!(cfg.data_path, PathBuf::from("/env/data"));
        assert_eq!(cfg.mem_cap_bytes, 1024);
        assert_eq!(cfg.chunk_rows, 20);
        assert_eq!(cfg.format, OutputFormat::Csv);
        assert_eq!(cfg.policy.cast_limit, 4);
    }

    #[test]
    fn missing_data_path_is_a_config_error() {
        let err = ConfigArgs::default().resolve(ConfigOverrides::default()).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from([
            "cinefold",
            "run",
            "--data-path",
            "/d",
            "--delimiter",
            "tab",
            "--missing-director",
            "retain",
            "--report",
            "-",
        ])
        .unwrap();
        match cli.command {
            Commands::Run { config, report } => {
                assert_eq!(config.delimiter, Some('\t'));
                assert_eq!(config.missing_director, Some(MissingDirector::Retain));
                assert_eq!(report, Some(PathBuf::from("-")));
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn output_defaults_to_jsonl_and_help_says_so() {
        let args = ConfigArgs {
            data_path: Some(PathBuf::from("/d")),
            ..Default::default()
        };
        let cfg = args.resolve(ConfigOverrides::default()).unwrap();
        assert_eq!(cfg.format, OutputFormat::Jsonl);
        assert_eq!(cfg.output_path(), PathBuf::from("/d/cleaned_imdb_movies_batch.jsonl"));

        let mut cmd = Cli::command();
        let run = cmd.find_subcommand_mut("run").unwrap();
        let help = run.render_long_help().to_string();
        assert!(help.contains("jsonl (default)"));
        assert!(help.contains("`parquet` feature"));
    }
}
