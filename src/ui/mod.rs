pub mod kpi;
pub mod panels;
pub mod plot;
pub mod table;

use eframe::egui::{self, RichText, Ui};

/// Shown instead of the chart when no defect row matches.
pub const NO_DATA_MESSAGE: &str = "ไม่มีข้อมูลสำหรับตัวกรองที่เลือก";

/// Shown instead of the table when the section has no top-3 rows.
pub const NO_TOP3_MESSAGE: &str = "ไม่มีข้อมูล Top 3 สำหรับแผนกที่เลือก";

/// Informational placeholder box.
pub fn info_box(ui: &mut Ui, message: &str) {
    egui::Frame::group(ui.style())
        .fill(ui.visuals().faint_bg_color)
        .show(ui, |ui: &mut Ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(format!("ℹ {message}")).italics());
        });
}
