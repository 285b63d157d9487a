// THEORY:
// The `histogram` module renders a brightness distribution as a picture. Each
// chart is a fixed-size canvas so that charts from different photographs can be
// stacked into one column later on.
//
// Key architectural principles:
// 1.  **Per-channel bins**: 256 bins per channel, counted with
//     `imageproc::stats::histogram`. Color input is charted in blue, green, red
//     order; grayscale input has a single channel.
// 2.  **Independent normalization**: Each channel is min/max scaled to the
//     canvas height on its own, so a flat channel does not squash the others.
// 3.  **Polyline plotting**: Consecutive bins are joined by a line, left to
//     right, `round(width / 256)` pixels apart. Anything past the right edge is
//     clipped by the drawing primitive.
// 4.  **Determinism**: Rendering is a pure function of the input pixels and the
//     canvas size. The same pixels always produce byte-identical charts.

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use imageproc::stats::histogram;

pub const BIN_COUNT: usize = 256;
const LINE_THICKNESS: u32 = 2;
const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);
const GRAY_LINE: Rgb<u8> = Rgb([255, 255, 255]);
const BLUE_LINE: Rgb<u8> = Rgb([0, 0, 255]);
const GREEN_LINE: Rgb<u8> = Rgb([0, 255, 0]);
const RED_LINE: Rgb<u8> = Rgb([255, 0, 0]);

/// Whether the chart is drawn from one luminance channel or three color channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistogramMode {
    #[default]
    Grayscale,
    Color,
}

/// Bin counts for one channel together with the color it is drawn in.
struct ChannelBins {
    bins: [u32; BIN_COUNT],
    color: Rgb<u8>,
}

fn channel_bins(image: &DynamicImage, mode: HistogramMode) -> Vec<ChannelBins> {
    match mode {
        HistogramMode::Grayscale => {
            let counts = histogram(&image.to_luma8());
            vec![ChannelBins {
                bins: counts.channels[0],
                color: GRAY_LINE,
            }]
        }
        HistogramMode::Color => {
            let counts = histogram(&image.to_rgb8());
            // RGB storage, charted in B, G, R order
            [(2, BLUE_LINE), (1, GREEN_LINE), (0, RED_LINE)]
                .into_iter()
                .map(|(channel, color)| ChannelBins {
                    bins: counts.channels[channel],
                    color,
                })
                .collect()
        }
    }
}

/// Min/max scales `bins` into `[0, target_max]`. A flat channel maps to 0.
pub fn normalize_bins(bins: &[u32; BIN_COUNT], target_max: f64) -> [f64; BIN_COUNT] {
    let min = bins.iter().copied().min().unwrap_or(0) as f64;
    let max = bins.iter().copied().max().unwrap_or(0) as f64;
    let range = max - min;
    let scale = if range > f64::EPSILON { target_max / range } else { 0.0 };

    let mut normalized = [0.0; BIN_COUNT];
    for (out, &count) in normalized.iter_mut().zip(bins.iter()) {
        *out = (count as f64 - min) * scale;
    }
    normalized
}

/// Horizontal distance between two consecutive bins.
pub fn bin_width(canvas_width: u32) -> u32 {
    (canvas_width as f64 / BIN_COUNT as f64).round() as u32
}

fn draw_thick_line(canvas: &mut RgbImage, start: (f32, f32), end: (f32, f32), color: Rgb<u8>) {
    for offset in 0..LINE_THICKNESS {
        let dy = offset as f32;
        draw_line_segment_mut(canvas, (start.0, start.1 + dy), (end.0, end.1 + dy), color);
    }
}

/// Renders the histogram of `image` on a `width` x `height` black canvas.
pub fn render_histogram(image: &DynamicImage, width: u32, height: u32, mode: HistogramMode) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(width, height, BACKGROUND);
    let step = bin_width(width) as f32;
    let bottom = height as f64;

    for channel in channel_bins(image, mode) {
        let heights = normalize_bins(&channel.bins, bottom);
        for i in 1..BIN_COUNT {
            let start = ((i - 1) as f32 * step, (bottom - heights[i - 1].round()) as f32);
            let end = (i as f32 * step, (bottom - heights[i].round()) as f32);
            draw_thick_line(&mut canvas, start, end, channel.color);
        }
    }

    canvas
}
