use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::model::TopDefectsRecord;
use crate::state::AppState;

use super::{NO_TOP3_MESSAGE, info_box};

const HEADERS: [&str; 4] = ["Date", "Top1", "Top2", "Top3"];

/// One table row as display strings; blank causes show as a dash.
pub fn row_cells(record: &TopDefectsRecord) -> [String; 4] {
    let cause = |c: &Option<String>| c.clone().unwrap_or_else(|| "—".to_string());
    [
        record.date.to_string(),
        cause(&record.top1),
        cause(&record.top2),
        cause(&record.top3),
    ]
}

/// Render the top-3 defects of the selected section.
pub fn top_defects_table(ui: &mut Ui, state: &AppState) {
    ui.heading("🏆 Top 3 Defects in Section");

    let rows = &state.result.top_defects;
    if rows.is_empty() {
        info_box(ui, NO_TOP3_MESSAGE);
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto().at_least(90.0))
        .columns(Column::remainder().at_least(80.0).clip(true), 3)
        .header(22.0, |mut header| {
            for title in HEADERS {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for record in rows {
                body.row(20.0, |mut row| {
                    for text in row_cells(record) {
                        row.col(|ui: &mut Ui| {
                            ui.label(text);
                        });
                    }
                });
            }
        });
}
