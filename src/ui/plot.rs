use chrono::{Datelike, NaiveDate};
use eframe::egui::{self, RichText, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoint, PlotPoints, Points};

use crate::color::Theme;
use crate::data::model::{DefectRecord, FilterSelection};
use crate::state::AppState;

use super::{NO_DATA_MESSAGE, info_box};

// ---------------------------------------------------------------------------
// Defect-rate trend (left half of the central panel)
// ---------------------------------------------------------------------------

/// Plot x coordinate of a date: days since 0001-01-01.
pub fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// Inverse of [`date_to_x`]; `None` between whole days.
pub fn x_to_date(x: f64) -> Option<NaiveDate> {
    if (x - x.round()).abs() > 1e-6 {
        return None;
    }
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

pub fn chart_title(selection: &FilterSelection) -> String {
    format!(
        "Defect Rate of {} in {}",
        selection.factory, selection.section
    )
}

/// `[x, y]` pairs in record order.
pub fn trend_points(rows: &[DefectRecord]) -> Vec<[f64; 2]> {
    rows.iter()
        .map(|r| [date_to_x(r.date), r.defect_rate])
        .collect()
}

/// Render the trend chart, or a placeholder when nothing matches.
pub fn defect_trend_plot(ui: &mut Ui, state: &AppState, theme: &Theme) {
    ui.heading("📊 Defect Rate Trend (%)");

    let rows = &state.result.defects;
    if rows.is_empty() {
        info_box(ui, NO_DATA_MESSAGE);
        return;
    }

    let title = chart_title(&state.selection);
    ui.label(RichText::new(&title).strong());

    let points = trend_points(rows);

    egui::Frame::default()
        .fill(theme.background)
        .show(ui, |ui: &mut Ui| {
            Plot::new("defect_trend")
                .legend(Legend::default())
                .show_background(false)
                .x_axis_label("วันที่")
                .y_axis_label("% Defect Rate")
                .x_axis_formatter(|mark, _range| {
                    x_to_date(mark.value)
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_default()
                })
                .label_formatter(|name, value: &PlotPoint| {
                    let date = x_to_date(value.x.round())
                        .map(|d| d.to_string())
                        .unwrap_or_default();
                    if name.is_empty() {
                        format!("{date}\n{:.2}%", value.y)
                    } else {
                        format!("{name}\n{date}\n{:.2}%", value.y)
                    }
                })
                .include_y(0.0)
                .allow_boxed_zoom(true)
                .allow_drag(true)
                .allow_scroll(true)
                .allow_zoom(true)
                .show(ui, |plot_ui| {
                    let line = Line::new(PlotPoints::from(points.clone()))
                        .name(&title)
                        .color(theme.primary)
                        .width(2.0);
                    plot_ui.line(line);

                    let markers = Points::new(PlotPoints::from(points))
                        .name(&title)
                        .color(theme.primary)
                        .radius(4.0);
                    plot_ui.points(markers);
                });
        });
}
