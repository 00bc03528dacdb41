//! Plotters-powered trend line for the result panel.
//!
//! Plotters output is drawn into the Ratatui buffer through
//! `plotters-ratatui-backend`. Areas too small for a chart fall back to the
//! text sparkline.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::report::sparkline;

/// Render-only description of the 5-point price trend.
pub struct TrendChart<'a> {
    /// Estimated price at each step, oldest first.
    pub series: &'a [f64],
}

impl TrendChart<'_> {
    /// Points indexed from 1 and y bounds padded by 5%.
    fn prepared(&self) -> Option<(Vec<(f64, f64)>, [f64; 2], [f64; 2])> {
        let points: Vec<(f64, f64)> = self
            .series
            .iter()
            .enumerate()
            .filter(|(_, y)| y.is_finite())
            .map(|(i, &y)| ((i + 1) as f64, y))
            .collect();
        if points.len() < 2 {
            return None;
        }

        let x_bounds = [1.0, points.len() as f64];
        let (mut y_min, mut y_max) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));
        if y_max <= y_min {
            y_min -= 0.5;
            y_max += 0.5;
        }
        let pad = ((y_max - y_min) * 0.05).max(1e-6);

        Some((points, x_bounds, [y_min - pad, y_max + pad]))
    }
}

impl Widget for TrendChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let prepared = self.prepared();
        let Some((points, [x0, x1], [y0, y1])) = prepared.filter(|_| area.width >= 20 && area.height >= 6)
        else {
            buf.set_string(
                area.x,
                area.y,
                sparkline(self.series),
                Style::default().fg(Color::Cyan),
            );
            return;
        };

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 2)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(points.len())
                .y_labels(3)
                .x_label_formatter(&|v| format!("{v:.0}"))
                .y_label_formatter(&|v| format!("{v:.2}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .draw()?;

            let line_color = RGBColor(0, 255, 255);
            chart.draw_series(LineSeries::new(points.iter().copied(), &line_color))?;
            // Pixels, not circles: the backend scales circle radii badly.
            chart.draw_series(points.iter().map(|&(x, y)| Pixel::new((x, y), WHITE)))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
