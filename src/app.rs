use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use eframe::egui::{self, Ui};
use egui_extras::{Size, StripBuilder};

use crate::color::Theme;
use crate::config::DashboardConfig;
use crate::state::AppState;
use crate::ui::{kpi, panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
    pub theme: Theme,
}

impl DashboardApp {
    /// Register the configured font and load the startup dataset.
    pub fn new(cc: &eframe::CreationContext<'_>, config: &DashboardConfig) -> Self {
        if let Some(font) = &config.ui_font {
            match install_font(&cc.egui_ctx, font) {
                Ok(()) => log::info!("Using UI font {}", font.display()),
                Err(e) => log::warn!("Ignoring UI font: {e:#}"),
            }
        }

        let mut state = AppState::default();
        state.load_from(config.provider().as_ref());

        Self {
            state,
            theme: Theme::default(),
        }
    }
}

/// Append a font file as fallback so glyphs missing from egui's defaults
/// (Thai, for instance) still render.
fn install_font(ctx: &egui::Context, path: &Path) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;

    let mut fonts = egui::FontDefinitions::default();
    fonts.font_data.insert(
        "ui_font".to_owned(),
        Arc::new(egui::FontData::from_owned(bytes)),
    );
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts
            .families
            .entry(family)
            .or_default()
            .push("ui_font".to_owned());
    }
    ctx.set_fonts(fonts);
    Ok(())
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state, &self.theme);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: KPIs, chart and table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("📊 Production Quality Control Dashboard");
            ui.add_space(4.0);

            if self.state.dataset.is_none() {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading("Open a file (File → Open…) or reload the sample data");
                });
                return;
            }

            kpi::kpi_row(ui, &self.state, &self.theme);
            ui.separator();

            let state = &self.state;
            let theme = &self.theme;
            StripBuilder::new(ui)
                .size(Size::relative(6.0 / 13.0))
                .size(Size::remainder())
                .horizontal(|mut strip| {
                    strip.cell(|ui: &mut Ui| plot::defect_trend_plot(ui, state, theme));
                    strip.cell(|ui: &mut Ui| table::top_defects_table(ui, state));
                });
        });
    }
}
