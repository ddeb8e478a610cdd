use clap::{Parser, Subcommand};
use fishmatch::{
    load_frame, load_templates, Benchmark, BenchmarkConfig, Detector, MatchConfig, RegionSpec,
    ResolutionProfile,
};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "FishMatch CLI (JSON config driven)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json", global = true)]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long, global = true)]
    trace: bool,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Benchmark cropped against full-frame detection over the labeled corpus.
    Bench,
    /// Detect the icon in a single screenshot (`image_path`).
    Detect,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RegionJson {
    x_start: f64,
    y_start: f64,
    width: f64,
    height: f64,
}

impl Default for RegionJson {
    fn default() -> Self {
        let spec = RegionSpec::default();
        Self {
            x_start: spec.x_start(),
            y_start: spec.y_start(),
            width: spec.width(),
            height: spec.height(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ProfileJson {
    name: String,
    region: RegionJson,
}

impl Default for ProfileJson {
    fn default() -> Self {
        Self {
            name: ResolutionProfile::DEFAULT_NAME.to_owned(),
            region: RegionJson::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct MatchConfigJson {
    min_var_i: f64,
    parallel: bool,
}

impl Default for MatchConfigJson {
    fn default() -> Self {
        let cfg = MatchConfig::default();
        Self {
            min_var_i: cfg.min_var_i,
            parallel: cfg.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    /// Root of the conventional asset layout.
    asset_root: String,
    /// Overrides `{asset_root}/images/{profile}/fish`.
    template_dir: Option<String>,
    /// Overrides `{asset_root}/tests/assets/{profile}`.
    corpus_dir: Option<String>,
    /// Screenshot for the `detect` command.
    image_path: Option<String>,
    output_path: Option<String>,
    use_region_reduction: bool,
    min_confidence: f32,
    parallel_passes: bool,
    profile: ProfileJson,
    #[serde(rename = "match")]
    match_cfg: MatchConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        let bench = BenchmarkConfig::default();
        Self {
            asset_root: ".".to_owned(),
            template_dir: None,
            corpus_dir: None,
            image_path: None,
            output_path: None,
            use_region_reduction: true,
            min_confidence: bench.min_confidence,
            parallel_passes: bench.parallel,
            profile: ProfileJson::default(),
            match_cfg: MatchConfigJson::default(),
        }
    }
}

impl Config {
    fn profile(&self) -> Result<ResolutionProfile, Box<dyn std::error::Error>> {
        let r = &self.profile.region;
        let region = RegionSpec::new(r.x_start, r.y_start, r.width, r.height)?;
        Ok(ResolutionProfile::new(self.profile.name.clone(), region))
    }

    fn match_config(&self) -> MatchConfig {
        MatchConfig {
            min_var_i: self.match_cfg.min_var_i,
            parallel: self.match_cfg.parallel,
        }
    }

    fn template_dir(&self, profile: &ResolutionProfile) -> PathBuf {
        self.template_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| profile.template_dir(Path::new(&self.asset_root)))
    }

    fn corpus_dir(&self, profile: &ResolutionProfile) -> PathBuf {
        self.corpus_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| profile.corpus_dir(Path::new(&self.asset_root)))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("fishmatch=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config: Config = if cli.config.exists() {
        serde_json::from_str(&fs::read_to_string(&cli.config)?)?
    } else {
        tracing::info!(path = %cli.config.display(), "config not found, using defaults");
        Config::default()
    };
    if !(0.0..=1.0).contains(&config.min_confidence) {
        return Err("min_confidence must lie in [0, 1]".into());
    }
    let profile = config.profile()?;

    match cli.command.unwrap_or(Command::Bench) {
        Command::Bench => bench(&config, profile),
        Command::Detect => detect(&config, profile),
    }
}

fn bench(config: &Config, profile: ResolutionProfile) -> Result<(), Box<dyn std::error::Error>> {
    let corpus_dir = config.corpus_dir(&profile);
    let template_dir = config.template_dir(&profile);
    let benchmark = Benchmark::new(BenchmarkConfig {
        profile,
        match_cfg: config.match_config(),
        min_confidence: config.min_confidence,
        parallel: config.parallel_passes,
    });

    let report = benchmark.run(&corpus_dir, &template_dir)?;
    println!("{report}");

    if let Some(path) = &config.output_path {
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
    }
    Ok(())
}

fn detect(config: &Config, profile: ResolutionProfile) -> Result<(), Box<dyn std::error::Error>> {
    let Some(image_path) = &config.image_path else {
        return Err("image_path must be set in the config for `detect`".into());
    };
    let template_dir = config.template_dir(&profile);
    let templates = load_templates(&template_dir);
    if templates.is_empty() {
        tracing::warn!(path = %template_dir.display(), "no templates loaded");
    }

    let buffer = load_frame(image_path)?;
    let detector = Detector::new(profile).with_config(config.match_config());
    let outcome = detector
        .detect(&buffer.frame()?, &templates, config.use_region_reduction)
        .thresholded(config.min_confidence);

    let json = serde_json::to_string_pretty(&outcome)?;
    match &config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}
