use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// Screen-space layout for drawing a waveform as a polyline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlotSettings {
    pub width: f32,
    pub height: f32,
    /// Draw every `stride`-th sample after the first.
    pub stride: usize,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            width: 1600.0,
            height: 600.0,
            stride: 10,
        }
    }
}

/// Maps samples to screen coordinates, `y` growing downwards.
///
/// A sample of `-1` sits on the bottom edge, `1` on the top edge. The first
/// sample is always included, then every `stride`-th sample.
pub fn plot_points(samples: &[f32], settings: &PlotSettings) -> Vec<(f32, f32)> {
    if samples.is_empty() {
        return Vec::new();
    }

    let stride = settings.stride.max(1);
    let x_step = settings.width / samples.len() as f32;
    let to_y = |sample: f32| settings.height - settings.height * ((1.0 + sample) / 2.0);

    std::iter::once(0)
        .chain((stride..samples.len()).step_by(stride))
        .map(|i| (x_step * i as f32, to_y(samples[i])))
        .collect()
}

/// Renders the waveform as a standalone SVG document.
pub fn to_svg(samples: &[f32], settings: &PlotSettings) -> String {
    let mut path = String::new();
    for (i, (x, y)) in plot_points(samples, settings).into_iter().enumerate() {
        let command = if i == 0 { 'M' } else { 'L' };
        let _ = write!(path, "{command}{x:.2},{y:.2} ");
    }

    format!(
        concat!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" ",
            "viewBox=\"0 0 {w} {h}\">\n",
            "  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n",
            "  <path d=\"{path}\" fill=\"none\" stroke=\"black\" stroke-width=\"1\"/>\n",
            "</svg>\n"
        ),
        w = settings.width,
        h = settings.height,
        path = path.trim_end(),
    )
}
