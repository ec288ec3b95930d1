//! Captures the report region as an RGB raster plus the text laid over it.
//!
//! The region holds the "Transactions" heading, one row per transaction (a color swatch for its
//! type and its description line), the "Monthly Report" heading and a bar chart with a category
//! label under each bar. Shapes are drawn into the raster; text is returned as `TextLabel`s in
//! raster pixel coordinates so the PDF writer can set it as real text.

use crate::model::{Filter, Transaction};
use crate::report::{aggregate, ReportSeries, SeriesColor};
use image::{Rgb, RgbImage};
use serde::Serialize;

const WIDTH: u32 = 800;
const MARGIN: u32 = 20;
const HEADING_SIZE: u32 = 20;
const ROW_HEIGHT: u32 = 24;
const ROW_TEXT_SIZE: u32 = 14;
const SWATCH: u32 = 12;
const CHART_HEIGHT: u32 = 400;
const AXIS_TEXT_SIZE: u32 = 10;
const LABEL_HEIGHT: u32 = 20;
const PLOT_LEFT: u32 = MARGIN * 4;

/// Rough Helvetica advance width as a fraction of the font size.
const CHAR_WIDTH: f64 = 0.55;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const RULE: Rgb<u8> = Rgb([224, 224, 224]);
const AXIS: Rgb<u8> = Rgb([0, 0, 0]);

/// What is currently shown in the report region: the filtered list and the chart built from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportView {
    filter: Filter,
    transactions: Vec<Transaction>,
    series: ReportSeries,
}

impl ReportView {
    pub fn new(filter: Filter, transactions: Vec<Transaction>) -> Self {
        let series = aggregate(&transactions);
        Self {
            filter,
            transactions,
            series,
        }
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn series(&self) -> &ReportSeries {
        &self.series
    }
}

/// A run of text placed on the raster. `x` is the left edge and `baseline` the text baseline, both
/// in pixels; `size` is the font size in pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLabel {
    pub text: String,
    pub x: u32,
    pub baseline: u32,
    pub size: u32,
}

impl TextLabel {
    fn new(text: impl Into<String>, x: u32, baseline: u32, size: u32) -> Self {
        Self {
            text: text.into(),
            x,
            baseline,
            size,
        }
    }
}

/// The captured report region.
#[derive(Debug, Clone)]
pub struct Capture {
    pub image: RgbImage,
    pub labels: Vec<TextLabel>,
}

/// Turns a `ReportView` into a raster image at its natural pixel size, plus its text.
pub trait ReportCapture: Send + Sync {
    fn capture(&self, view: &ReportView) -> Capture;
}

/// The built-in capture: draws the list rows and the bar chart.
#[derive(Debug, Default, Clone, Copy)]
pub struct RasterCapture;

impl ReportCapture for RasterCapture {
    fn capture(&self, view: &ReportView) -> Capture {
        let rows = view.transactions().len() as u32;
        let list_heading = MARGIN + HEADING_SIZE;
        let list_top = list_heading + MARGIN / 2;
        let list_end = list_top + rows * ROW_HEIGHT;
        let chart_heading = list_end + MARGIN + HEADING_SIZE;
        let chart_top = chart_heading + MARGIN;
        let height = chart_top + CHART_HEIGHT + LABEL_HEIGHT + MARGIN;

        let mut image = RgbImage::from_pixel(WIDTH, height, BACKGROUND);
        let mut labels = vec![TextLabel::new("Transactions", MARGIN, list_heading, HEADING_SIZE)];
        draw_rows(&mut image, &mut labels, view, list_top);
        fill(&mut image, MARGIN, list_end + MARGIN / 2, WIDTH - 2 * MARGIN, 2, RULE);
        labels.push(TextLabel::new(
            "Monthly Report",
            MARGIN,
            chart_heading,
            HEADING_SIZE,
        ));
        draw_chart(&mut image, &mut labels, view.series(), chart_top);
        Capture { image, labels }
    }
}

fn color(c: SeriesColor) -> Rgb<u8> {
    Rgb(c.rgb())
}

/// Fills a rectangle, clipped to the image.
fn fill(image: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, c: Rgb<u8>) {
    let x_end = x.saturating_add(w).min(image.width());
    let y_end = y.saturating_add(h).min(image.height());
    for py in y..y_end {
        for px in x..x_end {
            image.put_pixel(px, py, c);
        }
    }
}

/// Shortens `text` to what fits in `width` pixels at `size`.
fn fit(text: &str, width: u32, size: u32) -> String {
    let max = (f64::from(width) / (f64::from(size) * CHAR_WIDTH)).floor() as usize;
    text.chars().take(max).collect()
}

fn draw_rows(image: &mut RgbImage, labels: &mut Vec<TextLabel>, view: &ReportView, top: u32) {
    let text_left = MARGIN + SWATCH + MARGIN / 2;
    let colors = view.series().colors();
    for (ix, (transaction, c)) in view.transactions().iter().zip(colors).enumerate() {
        let y = top + ix as u32 * ROW_HEIGHT;
        let middle = y + (ROW_HEIGHT - SWATCH) / 2;
        fill(image, MARGIN, middle, SWATCH, SWATCH, color(*c));
        labels.push(TextLabel::new(
            fit(
                &transaction.to_string(),
                WIDTH - text_left - MARGIN,
                ROW_TEXT_SIZE,
            ),
            text_left,
            y + (ROW_HEIGHT + ROW_TEXT_SIZE) / 2 - 2,
            ROW_TEXT_SIZE,
        ));
        fill(image, MARGIN, y + ROW_HEIGHT - 1, WIDTH - 2 * MARGIN, 1, RULE);
    }
}

/// One bar per series entry. Positive values rise from the zero line, negative values hang
/// below it; the zero line sits at the bottom unless there are negative values.
fn draw_chart(
    image: &mut RgbImage,
    labels: &mut Vec<TextLabel>,
    series: &ReportSeries,
    top: u32,
) {
    let plot_width = WIDTH - PLOT_LEFT - MARGIN;
    let above = series.values().iter().fold(0.0_f64, |m, v| m.max(*v));
    let below = series.values().iter().fold(0.0_f64, |m, v| m.max(-v));
    let range = above + below;
    let plot_height = f64::from(CHART_HEIGHT);
    let zero = if range > 0.0 {
        top + (plot_height * above / range).round() as u32
    } else {
        top + CHART_HEIGHT
    };
    let zero_line = zero.min(top + CHART_HEIGHT - 1);

    fill(image, PLOT_LEFT - 2, top, 2, CHART_HEIGHT, AXIS);
    fill(image, PLOT_LEFT, zero_line, plot_width, 1, AXIS);
    labels.push(TextLabel::new(
        "0",
        MARGIN,
        zero_line + AXIS_TEXT_SIZE / 2,
        AXIS_TEXT_SIZE,
    ));
    if above > 0.0 {
        labels.push(TextLabel::new(
            format!("{above:.2}"),
            MARGIN,
            top + AXIS_TEXT_SIZE,
            AXIS_TEXT_SIZE,
        ));
    }
    if below > 0.0 {
        labels.push(TextLabel::new(
            format!("-{below:.2}"),
            MARGIN,
            top + CHART_HEIGHT,
            AXIS_TEXT_SIZE,
        ));
    }

    if series.is_empty() || range <= 0.0 {
        return;
    }
    let slot = plot_width / series.len() as u32;
    let bar = (slot * 4 / 5).max(1);
    let label_baseline = top + CHART_HEIGHT + LABEL_HEIGHT - AXIS_TEXT_SIZE / 2;
    let entries = series.labels().iter().zip(series.values()).zip(series.colors());
    for (ix, ((label, value), c)) in entries.enumerate() {
        let x = PLOT_LEFT + ix as u32 * slot + slot.saturating_sub(bar) / 2;
        let h = (plot_height * value.abs() / range).round() as u32;
        let y = if *value >= 0.0 { zero.saturating_sub(h) } else { zero };
        fill(image, x, y, bar, h, color(*c));
        let text = fit(label, slot, AXIS_TEXT_SIZE);
        if !text.is_empty() {
            labels.push(TextLabel::new(text, x, label_baseline, AXIS_TEXT_SIZE));
        }
    }
}
