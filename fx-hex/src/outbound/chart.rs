//! SVG line chart of stored rates.

use std::fmt::Write;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use fx_types::{ProviderCode, RenderedReport, ReportError, ReportRenderer, StoredRate};

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 400.0;
const MARGIN: f64 = 50.0;

/// Renders the rate per unit over time as a standalone SVG document.
#[derive(Debug, Clone, Default)]
pub struct SvgChartRenderer;

impl SvgChartRenderer {
    pub fn new() -> Self {
        Self
    }
}

fn per_unit(row: &StoredRate) -> f64 {
    (row.rate / Decimal::from(row.unit_count))
        .to_f64()
        .unwrap_or_default()
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

impl ReportRenderer for SvgChartRenderer {
    fn render(&self, code: ProviderCode, rows: &[StoredRate]) -> Result<RenderedReport, ReportError> {
        let (first, last) = match (rows.first(), rows.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(ReportError::Empty(code)),
        };

        let values: Vec<f64> = rows.iter().map(per_unit).collect();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let span = if max > min { max - min } else { 1.0 };

        let first_day = first.date;
        let days = (last.date - first_day).num_days().max(1) as f64;
        let plot_w = WIDTH - 2.0 * MARGIN;
        let plot_h = HEIGHT - 2.0 * MARGIN;

        let points = rows
            .iter()
            .zip(&values)
            .map(|(row, v)| {
                let x = MARGIN + plot_w * (row.date - first_day).num_days() as f64 / days;
                let y = HEIGHT - MARGIN - plot_h * (v - min) / span;
                format!("{:.1},{:.1}", x, y)
            })
            .collect::<Vec<_>>()
            .join(" ");

        let title = escape(&format!(
            "Currency {}: {} to {}",
            code, first.date, last.date
        ));

        let mut svg = String::new();
        let draw = |svg: &mut String| -> std::fmt::Result {
            writeln!(
                svg,
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
                w = WIDTH,
                h = HEIGHT
            )?;
            writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
            writeln!(
                svg,
                r#"<text x="{}" y="{}" font-family="sans-serif" font-size="16">{}</text>"#,
                MARGIN,
                MARGIN / 2.0,
                title
            )?;
            writeln!(
                svg,
                r#"<line x1="{m}" y1="{b}" x2="{r}" y2="{b}" stroke="black"/>"#,
                m = MARGIN,
                b = HEIGHT - MARGIN,
                r = WIDTH - MARGIN
            )?;
            writeln!(
                svg,
                r#"<line x1="{m}" y1="{m}" x2="{m}" y2="{b}" stroke="black"/>"#,
                m = MARGIN,
                b = HEIGHT - MARGIN
            )?;
            writeln!(
                svg,
                r#"<text x="5" y="{}" font-size="11">{:.4}</text>"#,
                MARGIN,
                max
            )?;
            writeln!(
                svg,
                r#"<text x="5" y="{}" font-size="11">{:.4}</text>"#,
                HEIGHT - MARGIN,
                min
            )?;
            writeln!(
                svg,
                r#"<polyline fill="none" stroke="steelblue" stroke-width="2" points="{}"/>"#,
                points
            )?;
            writeln!(svg, "</svg>")
        };
        draw(&mut svg).map_err(|e| ReportError::Render(e.to_string()))?;

        Ok(RenderedReport {
            content_type: "image/svg+xml",
            bytes: svg.into_bytes(),
        })
    }
}
