//! Plotters-powered result series chart for Ratatui.
//!
//! Plotters gives us axis and mesh rendering for free; the output is drawn into
//! the Ratatui buffer through `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A render-only chart description.
///
/// Series and bounds are computed outside the render call; x positions are
/// period indices and `x_labels` names them.
pub struct SeriesPlottersChart<'a> {
    /// Selected series, drawn as a line with markers.
    pub line: &'a [(f64, f64)],
    /// The other series, drawn dimmed for context.
    pub context: &'a [Vec<(f64, f64)>],
    /// Period label per x index.
    pub x_labels: &'a [String],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub y_label: &'a str,
}

impl<'a> Widget for SeriesPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("period")
                .y_desc(self.y_label)
                .x_labels(self.x_labels.len().max(2))
                .y_labels(5)
                .x_label_formatter(&|v| period_label(self.x_labels, *v))
                .y_label_formatter(&|v| fmt_axis_value(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let context_color = RGBColor(110, 110, 110);
            let line_color = RGBColor(0, 255, 255); // cyan
            let marker_color = RGBColor(255, 255, 0); // yellow

            for series in self.context {
                chart.draw_series(LineSeries::new(series.iter().copied(), &context_color))?;
            }

            chart.draw_series(LineSeries::new(self.line.iter().copied(), &line_color))?;

            // Circle markers come out oversized through the ratatui backend;
            // a coloured pixel reads as a dot.
            chart.draw_series(
                self.line
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), marker_color)),
            )?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Label for the period at x position `v` (blank between periods).
pub fn period_label(labels: &[String], v: f64) -> String {
    let idx = v.round();
    if (v - idx).abs() > 0.05 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

/// Compact axis value: `1.2M`, `-35k`, `980`.
pub fn fmt_axis_value(v: f64) -> String {
    let a = v.abs();
    if a >= 1e9 {
        format!("{:.1}B", v / 1e9)
    } else if a >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if a >= 1e4 {
        format!("{:.0}k", v / 1e3)
    } else if a >= 1e3 {
        format!("{:.1}k", v / 1e3)
    } else {
        format!("{v:.0}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_labels_only_on_integer_positions() {
        let labels = vec!["Y1".to_string(), "Y2".to_string()];
        assert_eq!(period_label(&labels, 0.0), "Y1");
        assert_eq!(period_label(&labels, 0.98), "Y2");
        assert_eq!(period_label(&labels, 0.5), "");
        assert_eq!(period_label(&labels, 2.0), "");
        assert_eq!(period_label(&labels, -1.0), "");
    }

    #[test]
    fn axis_values_are_compact() {
        assert_eq!(fmt_axis_value(1_300_000.0), "1.3M");
        assert_eq!(fmt_axis_value(-35_000.0), "-35k");
        assert_eq!(fmt_axis_value(1_500.0), "1.5k");
        assert_eq!(fmt_axis_value(980.0), "980");
    }
}
