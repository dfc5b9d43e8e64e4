use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use linear_fractal_core::{
    AppConfig, GenerationSelection, Pipeline, PlotSettings, Recorder, RecordingSettings,
};
use tracing_subscriber::EnvFilter;

fn main() -> linear_fractal_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => run_render(args),
        Commands::Curves { config, seed } => run_curves(config.as_ref(), seed),
    }
}

fn run_render(args: RenderArgs) -> linear_fractal_core::Result<()> {
    let mut config = load_config(args.config.as_ref())?;
    args.apply(&mut config);
    config.validate()?;

    let seed = config.curves.effective_seed();
    let curves = config.curves.resolve(seed)?;
    tracing::info!(
        seed,
        initiator_points = curves.initiator.len(),
        generator_points = curves.generator.len(),
        generations = config.synthesis.generations,
        "rendering linear fractal"
    );

    let format = config.synthesis.format()?;
    let selection = config.synthesis.selection;
    let pipeline = Pipeline::new(config.synthesis)?;
    let outputs = pipeline.run(&curves.initiator, &curves.generator)?;

    for output in &outputs {
        let summary = &output.summary;
        tracing::info!(
            generation = output.generation,
            points = output.point_count,
            peak = summary.peak,
            rms = summary.rms,
            centroid_hz = summary.spectral_centroid_hz,
            "generation rendered"
        );
        if !summary.fits_pcm_range() {
            tracing::warn!(
                generation = output.generation,
                samples = summary.out_of_range,
                "samples exceed [-1, 1] and will wrap in the 16-bit encoding"
            );
        }
    }

    let recorder = Recorder::new(RecordingSettings {
        output_dir: args.output_dir,
        file_stem: args.name,
        write_manifest: !args.no_manifest,
        plot: args.plot.then(PlotSettings::default),
    });
    recorder.record(&curves, format, selection, &outputs)?;
    Ok(())
}

fn run_curves(config: Option<&PathBuf>, seed: Option<u64>) -> linear_fractal_core::Result<()> {
    let mut config = load_config(config)?;
    if seed.is_some() {
        config.curves.seed = seed;
    }

    let curves = config.curves.resolve(config.curves.effective_seed())?;
    println!("{}", serde_json::to_string_pretty(&curves)?);
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> linear_fractal_core::Result<AppConfig> {
    match path {
        Some(path) => {
            tracing::info!(?path, "loading config");
            AppConfig::from_path(path)
        }
        None => Ok(AppConfig::default()),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Render linear fractals as audio", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Grow a fractal and write it out as WAV files.
    Render(RenderArgs),
    /// Print the initiator and generator a config and seed resolve to.
    Curves {
        /// JSON config file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Seed for randomly drawn curves.
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// JSON config file; flags below override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Number of fractal iterations.
    #[arg(short, long)]
    generations: Option<usize>,
    /// Output sample rate in Hz.
    #[arg(long)]
    sample_rate: Option<u32>,
    /// Number of samples in each rendered waveform.
    #[arg(long)]
    sample_count: Option<usize>,
    /// Channels in the WAV file; every channel carries the same signal.
    #[arg(long)]
    channels: Option<u16>,
    /// Seed for randomly drawn curves.
    #[arg(short, long)]
    seed: Option<u64>,
    /// Write every generation instead of only the last one.
    #[arg(long)]
    all_generations: bool,
    /// Write an SVG waveform plot next to each WAV file.
    #[arg(long)]
    plot: bool,
    /// Skip writing manifest.json.
    #[arg(long)]
    no_manifest: bool,
    /// Directory that receives the output files.
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
    /// File name stem for the output files.
    #[arg(short, long, default_value = "fractal")]
    name: String,
}

impl RenderArgs {
    fn apply(&self, config: &mut AppConfig) {
        let synthesis = &mut config.synthesis;
        if let Some(generations) = self.generations {
            synthesis.generations = generations;
        }
        if let Some(sample_rate) = self.sample_rate {
            synthesis.sample_rate = sample_rate;
        }
        if let Some(sample_count) = self.sample_count {
            synthesis.sample_count = sample_count;
        }
        if let Some(channels) = self.channels {
            synthesis.channels = channels;
        }
        if self.all_generations {
            synthesis.selection = GenerationSelection::All;
        }
        if self.seed.is_some() {
            config.curves.seed = self.seed;
        }
    }
}
