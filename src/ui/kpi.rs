use eframe::egui::{self, Color32, RichText, Ui};

use crate::color::Theme;
use crate::state::AppState;

/// Average rate at which the KPI value is drawn fully in the alert colour.
pub const ALERT_CEILING: f64 = 10.0;

/// Caption under the average: the goal is zero defects.
pub const TARGET_CAPTION: &str = "- Target 0%";

/// Green used for the target caption (a drop toward 0 % is good news).
const TARGET_COLOR: Color32 = Color32::from_rgb(0x09, 0xab, 0x3b);

/// Two decimals and a percent sign: `40.2` → `"40.20%"`.
pub fn format_percent(rate: f64) -> String {
    format!("{rate:.2}%")
}

/// The three KPI cards above the chart.
pub fn kpi_row(ui: &mut Ui, state: &AppState, theme: &Theme) {
    ui.heading("📈 Key Performance Indicators (KPI)");

    let avg = state.result.average_rate;
    ui.columns(3, |cols: &mut [Ui]| {
        metric_card(
            &mut cols[0],
            "Selected Section",
            RichText::new(state.selection.section.as_str()),
            None,
        );
        metric_card(
            &mut cols[1],
            "Selected Factory",
            RichText::new(state.selection.factory.as_str()),
            None,
        );
        metric_card(
            &mut cols[2],
            "Average Defect Rate (%)",
            RichText::new(format_percent(avg)).color(theme.rate_color(avg, ALERT_CEILING)),
            Some(RichText::new(format!("↓ {TARGET_CAPTION}")).color(TARGET_COLOR)),
        );
    });
}

fn metric_card(ui: &mut Ui, label: &str, value: RichText, delta: Option<RichText>) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_width(ui.available_width());
        ui.label(RichText::new(label).small().weak());
        ui.label(value.size(28.0).strong());
        if let Some(delta) = delta {
            ui.label(delta.small());
        }
    });
}
