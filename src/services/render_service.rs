//! Draw a `ChartIntent` to PNG with plotters

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use plotters::coord::Shift;
use plotters::prelude::*;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{AxisRange, Bar, Candle, ChartIntent, ChartKind, SeriesData, SeriesTone};

const ACTUAL_COLOR: RGBColor = RGBColor(0x1f, 0x77, 0xb4);
const PREDICTED_COLOR: RGBColor = RGBColor(0xff, 0x7f, 0x0e);
const GAIN_COLOR: RGBColor = RGBColor(0x00, 0xb7, 0x46);
const LOSS_COLOR: RGBColor = RGBColor(0xef, 0x40, 0x3c);
const POSITIVE_BAR: RGBColor = RGBColor(0x82, 0xca, 0x9d);
const NEGATIVE_BAR: RGBColor = RGBColor(0xff, 0x79, 0x79);

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("No data available to chart")]
    NoData,
    #[error("Failed to draw chart: {0}")]
    Draw(String),
    #[error("Failed to read chart file: {0}")]
    Io(#[from] std::io::Error),
}

fn draw_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

fn tone_color(tone: SeriesTone) -> RGBColor {
    match tone {
        SeriesTone::Actual => ACTUAL_COLOR,
        SeriesTone::Predicted => PREDICTED_COLOR,
        SeriesTone::Neutral => RGBColor(0x88, 0x84, 0xd8),
    }
}

/// Widen degenerate ranges so the coordinate system stays valid
fn value_bounds(range: Option<AxisRange>) -> Result<(f64, f64), RenderError> {
    let range = range.ok_or(RenderError::NoData)?;
    let span = range.max - range.min;
    if span.abs() < 1e-8 {
        let pad = (range.max.abs() * 0.01).max(1e-8);
        Ok((range.min - pad, range.max + pad))
    } else {
        Ok((range.min, range.max))
    }
}

fn time_bounds(
    min: Option<DateTime<Utc>>,
    max: Option<DateTime<Utc>>,
    pad: Duration,
) -> Result<(DateTime<Utc>, DateTime<Utc>), RenderError> {
    let (min, max) = min.zip(max).ok_or(RenderError::NoData)?;
    Ok((min - pad, max + pad))
}

/// Render the intent and return PNG bytes
pub fn render_png(intent: &ChartIntent, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
    if !intent.has_data() {
        return Err(RenderError::NoData);
    }

    // BitMapBackend encodes on present(), so draw to a temp file and read it back
    let temp_file: PathBuf = std::env::temp_dir().join(format!("fxcast_chart_{}.png", Uuid::new_v4()));

    let drawn = {
        let root = BitMapBackend::new(&temp_file, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let result = match intent.kind {
            ChartKind::Line => draw_lines(&root, intent),
            ChartKind::Candlestick => draw_candles(&root, intent),
            ChartKind::Bar => draw_bars(&root, intent),
        };
        result.and_then(|_| root.present().map_err(draw_err))
    };

    let image = drawn.and_then(|_| fs::read(&temp_file).map_err(RenderError::from));
    if let Err(e) = fs::remove_file(&temp_file) {
        tracing::debug!("Could not remove temporary chart {}: {}", temp_file.display(), e);
    }

    let image = image?;
    tracing::debug!("Rendered {:?} chart '{}' ({} bytes)", intent.kind, intent.title, image.len());
    Ok(image)
}

fn draw_lines(root: &DrawingArea<BitMapBackend<'_>, Shift>, intent: &ChartIntent) -> Result<(), RenderError> {
    let (x_min, x_max) = time_bounds(intent.x_axis.min, intent.x_axis.max, Duration::minutes(1))?;
    let (y_min, y_max) = value_bounds(intent.y_axis.range)?;
    let pattern = intent.x_axis.label_format.pattern();
    let (decimals, prefix) = (intent.y_axis.decimals, intent.y_axis.prefix);

    let mut chart = ChartBuilder::on(root)
        .caption(&intent.title, ("sans-serif", 28).into_font())
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_labels(intent.x_axis.tick_count)
        .x_label_formatter(&|dt: &DateTime<Utc>| dt.format(pattern).to_string())
        .y_label_formatter(&|v: &f64| format!("{}{:.*}", prefix, decimals, v))
        .x_desc("Time")
        .draw()
        .map_err(draw_err)?;

    for series in &intent.series {
        let SeriesData::Line(points) = &series.data else {
            continue;
        };
        let color = tone_color(series.tone);

        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
            .map_err(draw_err)?
            .label(series.name.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

        chart
            .draw_series(points.iter().map(|&(t, v)| Circle::new((t, v), 3, color.filled())))
            .map_err(draw_err)?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(draw_err)?;

    Ok(())
}

fn candle_spacing(candles: &[Candle]) -> Duration {
    candles
        .windows(2)
        .map(|w| w[1].timestamp - w[0].timestamp)
        .filter(|d| *d > Duration::zero())
        .min()
        .unwrap_or_else(|| Duration::hours(1))
}

fn draw_candles(root: &DrawingArea<BitMapBackend<'_>, Shift>, intent: &ChartIntent) -> Result<(), RenderError> {
    let Some(SeriesData::Candles(candles)) = intent.series.first().map(|s| &s.data) else {
        return Err(RenderError::NoData);
    };

    let spacing = candle_spacing(candles);
    let (x_min, x_max) = time_bounds(intent.x_axis.min, intent.x_axis.max, spacing)?;
    let (y_min, y_max) = value_bounds(intent.y_axis.range)?;
    let pattern = intent.x_axis.label_format.pattern();
    let (decimals, prefix) = (intent.y_axis.decimals, intent.y_axis.prefix);

    let (plot_width, _) = root.dim_in_pixel();
    let body_width = ((plot_width as usize / (candles.len() + 2)) as u32 * 6 / 10).clamp(2, 30);

    let mut chart = ChartBuilder::on(root)
        .caption(&intent.title, ("sans-serif", 28).into_font())
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_labels(intent.x_axis.tick_count)
        .x_label_formatter(&|dt: &DateTime<Utc>| dt.format(pattern).to_string())
        .y_label_formatter(&|v: &f64| format!("{}{:.*}", prefix, decimals, v))
        .x_desc("Time")
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(candles.iter().map(|c| {
            CandleStick::new(
                c.timestamp,
                c.open,
                c.high,
                c.low,
                c.close,
                GAIN_COLOR.filled(),
                LOSS_COLOR.filled(),
                body_width,
            )
        }))
        .map_err(draw_err)?;

    Ok(())
}

fn draw_bars(root: &DrawingArea<BitMapBackend<'_>, Shift>, intent: &ChartIntent) -> Result<(), RenderError> {
    let Some(SeriesData::Bars(bars)) = intent.series.first().map(|s| &s.data) else {
        return Err(RenderError::NoData);
    };
    let (y_min, y_max) = value_bounds(intent.y_axis.range)?;
    let decimals = intent.y_axis.decimals;
    let labels: Vec<String> = bars.iter().map(|b: &Bar| b.label.clone()).collect();
    let count = bars.len();

    let mut chart = ChartBuilder::on(root)
        .caption(&intent.title, ("sans-serif", 28).into_font())
        .margin(15)
        .x_label_area_size(90)
        .y_label_area_size(90)
        .build_cartesian_2d(-0.5f64..(count as f64 - 0.5), y_min..y_max)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(count)
        .x_label_style(
            ("sans-serif", 11)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .x_label_formatter(&|x: &f64| {
            let idx = x.round();
            if (x - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .y_label_formatter(&|v: &f64| format!("{:.*}", decimals, v))
        .y_desc("Absolute Deviation")
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(bars.iter().enumerate().map(|(i, bar)| {
            let color = if bar.signed >= 0.0 { POSITIVE_BAR } else { NEGATIVE_BAR };
            let x = i as f64;
            Rectangle::new([(x - 0.35, 0.0), (x + 0.35, bar.value)], color.filled())
        }))
        .map_err(draw_err)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ComparisonData, Interval, Market, PriceField, PricePoint};
    use crate::services::chart_service;
    use chrono::TimeZone;

    #[test]
    fn test_empty_intent_is_rejected_without_drawing() {
        let intent = chart_service::comparison_chart(
            Market::Gold,
            Interval::OneHour,
            PriceField::Close,
            &ComparisonData::default(),
            30,
        );
        assert!(matches!(render_png(&intent, 400, 300), Err(RenderError::NoData)));
    }

    #[test]
    fn test_flat_range_is_widened() {
        let (lo, hi) = value_bounds(Some(AxisRange { min: 2.0, max: 2.0 })).unwrap();
        assert!(lo < 2.0 && hi > 2.0);
        assert!(matches!(value_bounds(None), Err(RenderError::NoData)));
    }

    #[test]
    #[ignore = "needs system fonts for plotters text rendering"]
    fn test_line_chart_renders_png() {
        let base = Utc.with_ymd_and_hms(2025, 4, 5, 0, 0, 0).unwrap();
        let actual: Vec<PricePoint> = (0..5)
            .map(|i| PricePoint {
                timestamp: base + Duration::hours(i),
                open: 1.0 + i as f64,
                high: 2.0 + i as f64,
                low: 0.5 + i as f64,
                close: 1.5 + i as f64,
            })
            .collect();
        let data = ComparisonData { predicted: actual.clone(), actual };
        let intent = chart_service::comparison_chart(Market::Gold, Interval::OneHour, PriceField::Close, &data, 30);
        let png = render_png(&intent, 640, 480).unwrap();
        assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
    }
}
