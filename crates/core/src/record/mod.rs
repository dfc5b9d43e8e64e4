use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{
    config::{GenerationSelection, ResolvedCurves},
    pipeline::GenerationOutput,
    render::{to_svg, PlotSettings},
    wav::PcmFormat,
    Result, WaveformSummary,
};

pub const MANIFEST_FILE: &str = "manifest.json";

/// Configuration options for persisting rendered generations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingSettings {
    pub output_dir: PathBuf,
    pub file_stem: String,
    pub write_manifest: bool,
    /// Also write an SVG plot next to each WAV file.
    pub plot: Option<PlotSettings>,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            file_stem: "fractal".to_string(),
            write_manifest: true,
            plot: None,
        }
    }
}

/// Description of a finished run, written as `manifest.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderManifest {
    pub curves: ResolvedCurves,
    pub format: PcmFormat,
    pub generations: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub generation: usize,
    pub point_count: usize,
    pub wav_file: PathBuf,
    pub plot_file: Option<PathBuf>,
    pub summary: WaveformSummary,
}

/// Writes generation outputs to disk.
#[derive(Debug, Default)]
pub struct Recorder {
    settings: RecordingSettings,
}

impl Recorder {
    pub fn new(settings: RecordingSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RecordingSettings {
        &self.settings
    }

    /// Persists every output and, if enabled, the manifest.
    ///
    /// A `Final` run writes `<stem>.wav`; an `All` run writes
    /// `<stem>_genNN.wav` per generation.
    pub fn record(
        &self,
        curves: &ResolvedCurves,
        format: PcmFormat,
        selection: GenerationSelection,
        outputs: &[GenerationOutput],
    ) -> Result<RenderManifest> {
        std::fs::create_dir_all(&self.settings.output_dir)?;

        let mut generations = Vec::with_capacity(outputs.len());
        for output in outputs {
            let stem = self.stem_for(selection, output.generation);
            let wav_file = self.path_for(&stem, "wav");
            output.wav.write_to(&wav_file)?;

            let plot_file = match &self.settings.plot {
                Some(plot) => {
                    let path = self.path_for(&stem, "svg");
                    std::fs::write(&path, to_svg(&output.samples, plot))?;
                    Some(path)
                }
                None => None,
            };

            tracing::info!(
                generation = output.generation,
                path = %wav_file.display(),
                bytes = output.wav.len(),
                "wrote wav file"
            );

            generations.push(ManifestEntry {
                generation: output.generation,
                point_count: output.point_count,
                wav_file,
                plot_file,
                summary: output.summary.clone(),
            });
        }

        let manifest = RenderManifest {
            curves: curves.clone(),
            format,
            generations,
        };

        if self.settings.write_manifest {
            let path = self.settings.output_dir.join(MANIFEST_FILE);
            std::fs::write(&path, serde_json::to_string_pretty(&manifest)?)?;
        }

        Ok(manifest)
    }

    fn stem_for(&self, selection: GenerationSelection, generation: usize) -> String {
        match selection {
            GenerationSelection::Final => self.settings.file_stem.clone(),
            GenerationSelection::All => format!("{}_gen{generation:02}", self.settings.file_stem),
        }
    }

    fn path_for(&self, stem: &str, extension: &str) -> PathBuf {
        self.settings.output_dir.join(format!("{stem}.{extension}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::SynthesisConfig, pipeline::Pipeline, Curve};

    fn run(selection: GenerationSelection) -> (ResolvedCurves, PcmFormat, Vec<GenerationOutput>) {
        let curves = ResolvedCurves {
            seed: 9,
            initiator: Curve::from_coords(&[(0.0, 0.0), (0.5, 0.4), (1.0, 0.0)]).unwrap(),
            generator: Curve::from_coords(&[(0.0, -0.5), (0.4, 0.1), (1.0, 0.5)]).unwrap(),
        };
        let config = SynthesisConfig {
            generations: 2,
            sample_count: 400,
            sample_rate: 4_000,
            channels: 1,
            selection,
        };
        let format = config.format().unwrap();
        let outputs = Pipeline::new(config)
            .unwrap()
            .run(&curves.initiator, &curves.generator)
            .unwrap();
        (curves, format, outputs)
    }

    #[test]
    fn writes_final_generation_and_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Recorder::new(RecordingSettings {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        });
        let (curves, format, outputs) = run(GenerationSelection::Final);

        let manifest = recorder
            .record(&curves, format, GenerationSelection::Final, &outputs)
            .unwrap();

        let wav_path = dir.path().join("fractal.wav");
        assert_eq!(manifest.generations[0].wav_file, wav_path);
        assert_eq!(std::fs::read(&wav_path).unwrap(), outputs[0].wav.as_bytes());

        let text = std::fs::read_to_string(dir.path().join(MANIFEST_FILE)).unwrap();
        let parsed: RenderManifest = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, manifest);
    }

    #[test]
    fn numbers_every_generation_and_plots() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Recorder::new(RecordingSettings {
            output_dir: dir.path().join("out"),
            file_stem: "koch".to_string(),
            write_manifest: false,
            plot: Some(PlotSettings::default()),
        });
        let (curves, format, outputs) = run(GenerationSelection::All);

        recorder
            .record(&curves, format, GenerationSelection::All, &outputs)
            .unwrap();

        let out = dir.path().join("out");
        assert!(out.join("koch_gen01.wav").is_file());
        assert!(out.join("koch_gen02.wav").is_file());
        assert!(out.join("koch_gen02.svg").is_file());
        assert!(!out.join(MANIFEST_FILE).exists());
    }
}
