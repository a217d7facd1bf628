use eframe::egui::{self, RichText, Ui};

use crate::color::Theme;
use crate::data::loader;
use crate::data::provider::SampleProvider;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter dropdowns
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🔍 Filters");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    // Edit a copy so the change goes through the selection handler.
    let mut selection = state.selection.clone();
    let options = &state.options;

    label_combo(ui, "year", "ปี (Year)", &mut selection.year, &options.years);
    label_combo(ui, "month", "เดือน (Month)", &mut selection.month, &options.months);

    ui.strong("แผนก (Section)");
    egui::ComboBox::from_id_salt("section")
        .selected_text(selection.section.as_str())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for &section in &options.sections {
                ui.selectable_value(&mut selection.section, section, section.as_str());
            }
        });
    ui.add_space(6.0);

    label_combo(
        ui,
        "factory",
        "โรงงาน (Factory)",
        &mut selection.factory,
        &options.factories,
    );

    state.on_selection_changed(selection);
}

fn label_combo(ui: &mut Ui, id: &str, label: &str, current: &mut String, values: &[String]) {
    ui.strong(label);
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.as_str())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for value in values {
                ui.selectable_value(current, value.clone(), value.as_str());
            }
        });
    ui.add_space(6.0);
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState, theme: &Theme) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open defect rates…").clicked() {
                open_table_dialog(state, TableKind::DefectRates);
                ui.close_menu();
            }
            if ui.button("Open top-3 defects…").clicked() {
                open_table_dialog(state, TableKind::TopDefects);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Reload sample data").clicked() {
                state.load_from(&SampleProvider);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} defect rows loaded, {} matching",
                ds.defects.len(),
                state.result.defects.len()
            ));
        }

        if let Some(source) = state.source() {
            ui.separator();
            ui.label(RichText::new(source).weak());
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(theme.alert));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    DefectRates,
    TopDefects,
}

/// Ask for a file and replace one of the two tables with its contents.
/// Workbooks are read from their first sheet.
pub fn open_table_dialog(state: &mut AppState, kind: TableKind) {
    let title = match kind {
        TableKind::DefectRates => "Open defect-rate data",
        TableKind::TopDefects => "Open top-3 defect data",
    };
    let file = rfd::FileDialog::new()
        .set_title(title)
        .add_filter(
            "Supported files",
            &["csv", "json", "parquet", "pq", "xlsx", "xls", "xlsm", "ods"],
        )
        .add_filter("Spreadsheet", &["xlsx", "xls", "xlsm", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    let Some(path) = file else {
        return;
    };

    let origin = path.display().to_string();
    let loaded = match kind {
        TableKind::DefectRates => loader::load_defects(&path, None).map(|rows| {
            log::info!("Loaded {} defect-rate rows from {origin}", rows.len());
            state.replace_defects(rows, origin);
        }),
        TableKind::TopDefects => loader::load_top_defects(&path, None).map(|rows| {
            log::info!("Loaded {} top-3 rows from {origin}", rows.len());
            state.replace_top_defects(rows, origin);
        }),
    };

    if let Err(e) = loaded {
        log::error!("Failed to load file: {e:#}");
        state.status_message = Some(format!("Error: {e:#}"));
    }
}
