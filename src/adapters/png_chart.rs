//! Plotters-based PNG chart adapter.
//!
//! Draws the three-layer overlay chart (price, moving average, last-position
//! marker) into a per-call pixel buffer, encodes it as PNG, and wraps the
//! bytes as a base64 [`ChartArtifact`]. No drawing state survives a call.

use chrono::Duration;
use image::{ExtendedColorType, ImageEncoder, codecs::png::PngEncoder};
use plotters::prelude::*;

use crate::domain::error::RiskviewError;
use crate::domain::frame::TimeSeriesFrame;
use crate::domain::report::ChartArtifact;
use crate::ports::chart_port::ChartPort;
use crate::ports::config_port::ConfigPort;

const MAX_DIMENSION: i64 = 8192;

/// Chart surface dimensions and layer colors.
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub price_color: RGBColor,
    pub ma_color: RGBColor,
    pub marker_color: RGBColor,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            background: WHITE,
            price_color: RGBColor(31, 119, 180),
            ma_color: RGBColor(255, 165, 0),
            marker_color: RED,
        }
    }
}

impl ChartConfig {
    /// Read `[chart] width/height` from the config, keeping default colors.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, RiskviewError> {
        let defaults = Self::default();
        let width = config.get_int("chart", "width", defaults.width as i64);
        let height = config.get_int("chart", "height", defaults.height as i64);

        for (key, value) in [("width", width), ("height", height)] {
            if !(1..=MAX_DIMENSION).contains(&value) {
                return Err(RiskviewError::ConfigInvalid {
                    section: "chart".into(),
                    key: key.into(),
                    reason: format!("must be between 1 and {MAX_DIMENSION}, got {value}"),
                });
            }
        }

        Ok(Self {
            width: width as u32,
            height: height as u32,
            ..defaults
        })
    }
}

pub struct PngChartAdapter {
    config: ChartConfig,
}

impl PngChartAdapter {
    pub fn new() -> Self {
        Self {
            config: ChartConfig::default(),
        }
    }

    pub fn with_config(config: ChartConfig) -> Self {
        Self { config }
    }
}

impl Default for PngChartAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartPort for PngChartAdapter {
    fn render(&self, frame: &TimeSeriesFrame) -> Result<ChartArtifact, RiskviewError> {
        let marker = frame
            .last_position_date()
            .ok_or(RiskviewError::NoTradingPosition)?;
        let (start, mut end) = frame
            .date_range()
            .ok_or_else(|| RiskviewError::MalformedPayload {
                reason: "data is empty".into(),
            })?;
        // A one-date frame would collapse the x axis; pad it out a day.
        if end <= start {
            end = start + Duration::days(1);
        }
        let (y_lo, y_hi) = value_bounds(frame);

        let width = self.config.width;
        let height = self.config.height;
        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&self.config.background).map_err(draw_err)?;

            let mut chart = ChartBuilder::on(&root)
                .margin(12)
                .x_label_area_size(32)
                .y_label_area_size(48)
                .build_cartesian_2d(start..end, y_lo..y_hi)
                .map_err(draw_err)?;

            chart
                .configure_mesh()
                .x_labels(6)
                .y_labels(8)
                .x_label_formatter(&|date| date.format("%Y-%m-%d").to_string())
                .draw()
                .map_err(draw_err)?;

            let price_color = self.config.price_color;
            chart
                .draw_series(LineSeries::new(
                    frame.rows.iter().map(|row| (row.date, row.adj_close)),
                    &price_color,
                ))
                .map_err(draw_err)?
                .label("Adj Close")
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], price_color));

            let ma_color = self.config.ma_color;
            chart
                .draw_series(LineSeries::new(
                    frame
                        .rows
                        .iter()
                        .filter_map(|row| row.ma.map(|ma| (row.date, ma))),
                    &ma_color,
                ))
                .map_err(draw_err)?
                .label("Moving Average")
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], ma_color));

            let marker_color = self.config.marker_color;
            chart
                .draw_series(LineSeries::new(
                    vec![(marker, y_lo), (marker, y_hi)],
                    marker_color.stroke_width(2),
                ))
                .map_err(draw_err)?
                .label("Last trading position")
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], marker_color));

            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()
                .map_err(draw_err)?;

            root.present().map_err(draw_err)?;
        }

        let png = encode_png(&buffer, width, height)?;
        Ok(ChartArtifact::from_png_bytes(&png))
    }
}

/// Y bounds over price and moving average, with a small margin.
fn value_bounds(frame: &TimeSeriesFrame) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for row in &frame.rows {
        lo = lo.min(row.adj_close);
        hi = hi.max(row.adj_close);
        if let Some(ma) = row.ma {
            lo = lo.min(ma);
            hi = hi.max(ma);
        }
    }
    let pad = ((hi - lo) * 0.05).max(1.0);
    (lo - pad, hi + pad)
}

fn encode_png(rgb: &[u8], width: u32, height: u32) -> Result<Vec<u8>, RiskviewError> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(rgb, width, height, ExtendedColorType::Rgb8)
        .map_err(draw_err)?;
    Ok(out)
}

fn draw_err(error: impl std::fmt::Display) -> RiskviewError {
    RiskviewError::ChartRender {
        reason: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;
    use crate::domain::frame::TimeSeriesRow;
    use chrono::NaiveDate;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn row(day: u32, close: f64, ma: Option<f64>, sig: Option<i64>) -> TimeSeriesRow {
        TimeSeriesRow {
            date: NaiveDate::from_ymd_opt(2020, 1, day).unwrap(),
            adj_close: close,
            ma,
            sig,
            p_l: Some(0.0),
            var_95: None,
            var_99: None,
        }
    }

    fn sample_frame() -> TimeSeriesFrame {
        TimeSeriesFrame::from_rows(vec![
            row(1, 100.0, None, None),
            row(2, 105.0, Some(101.0), Some(1)),
            row(3, 103.0, Some(102.0), None),
            row(4, 108.0, Some(103.5), Some(-1)),
            row(5, 107.0, Some(104.0), Some(0)),
        ])
        .unwrap()
    }

    #[test]
    fn default_config_dimensions() {
        let config = ChartConfig::default();
        assert_eq!(config.width, 800);
        assert_eq!(config.height, 600);
    }

    #[test]
    fn config_reads_chart_section() {
        let ini = FileConfigAdapter::from_string("[chart]\nwidth = 400\nheight = 300\n").unwrap();
        let config = ChartConfig::from_config(&ini).unwrap();
        assert_eq!(config.width, 400);
        assert_eq!(config.height, 300);
    }

    #[test]
    fn config_rejects_degenerate_dimensions() {
        let ini = FileConfigAdapter::from_string("[chart]\nwidth = 0\n").unwrap();
        let err = ChartConfig::from_config(&ini).unwrap_err();
        assert!(matches!(err, RiskviewError::ConfigInvalid { key, .. } if key == "width"));
    }

    #[test]
    fn render_produces_decodable_png() {
        let adapter = PngChartAdapter::new();
        let artifact = adapter.render(&sample_frame()).unwrap();
        let bytes = artifact.decode().unwrap();
        assert!(bytes.len() > PNG_MAGIC.len());
        assert_eq!(&bytes[..8], &PNG_MAGIC);
    }

    #[test]
    fn render_is_byte_deterministic() {
        let adapter = PngChartAdapter::new();
        let first = adapter.render(&sample_frame()).unwrap();
        let second = adapter.render(&sample_frame()).unwrap();
        assert_eq!(first.as_base64(), second.as_base64());
    }

    #[test]
    fn render_without_position_fails() {
        let frame =
            TimeSeriesFrame::from_rows(vec![row(1, 100.0, None, None), row(2, 101.0, None, Some(0))])
                .unwrap();
        let err = PngChartAdapter::new().render(&frame).unwrap_err();
        assert!(matches!(err, RiskviewError::NoTradingPosition));
    }

    #[test]
    fn render_single_row_frame_pads_axis() {
        let frame = TimeSeriesFrame::from_rows(vec![row(1, 100.0, Some(99.0), Some(1))]).unwrap();
        let artifact = PngChartAdapter::new().render(&frame).unwrap();
        assert_eq!(&artifact.decode().unwrap()[..8], &PNG_MAGIC);
    }

    #[test]
    fn render_tolerates_all_null_moving_average() {
        let frame =
            TimeSeriesFrame::from_rows(vec![row(1, 100.0, None, Some(1)), row(2, 101.0, None, None)])
                .unwrap();
        let artifact = PngChartAdapter::new().render(&frame).unwrap();
        assert_eq!(&artifact.decode().unwrap()[..8], &PNG_MAGIC);
    }

    #[test]
    fn value_bounds_cover_price_and_ma() {
        let (lo, hi) = value_bounds(&sample_frame());
        assert!(lo < 100.0);
        assert!(hi > 108.0);
    }
}
