use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::analysis::slice::EffectSlice;
use crate::data::model::AromaDataset;
use crate::data::normalize;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – question picker and chart toggles
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Select Question");
    ui.separator();

    let ids: Vec<String> = state.registry.ids().map(str::to_string).collect();
    let current = state.selection.question_id().unwrap_or_default().to_string();

    egui::ComboBox::from_id_salt("question")
        .selected_text(&current)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for id in &ids {
                if ui.selectable_label(current == *id, id).clicked() && current != *id {
                    log::debug!("Question selected: {id:?}");
                    state.select_question(id);
                }
            }
        });
    ui.add_space(6.0);

    // ---- Chart kind toggles ----
    ui.strong("Charts");
    let available = state.selection.available().to_vec();
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for kind in available {
            let mut checked = state.selection.is_enabled(kind);
            if ui.checkbox(&mut checked, kind.label()).changed() {
                state.selection.set_enabled(kind, checked);
            }
        }
    });

    if ui.button("Draw").clicked() {
        state.selection.draw();
    }
    ui.separator();

    if let Some(s) = &state.current_slice {
        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui: &mut Ui| {
                slice_details(ui, s, &state.dataset);
            });
    }
}

/// Summary of a per-effect slice: agent count, flavours, natural replacements.
fn slice_details(ui: &mut Ui, slice: &EffectSlice, dataset: &AromaDataset) {
    ui.label(format!(
        "Synthetic aroma agents with {}: {}",
        slice.effect,
        slice.len()
    ));

    egui::CollapsingHeader::new(RichText::new("Flavours").strong())
        .id_salt("slice_flavours")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            for flavor in slice.flavors() {
                ui.label(flavor);
            }
        });

    egui::CollapsingHeader::new(RichText::new("Natural replacements").strong())
        .id_salt("slice_replacements")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            let rows = slice.replacements(dataset);
            TableBuilder::new(ui)
                .striped(true)
                .column(Column::auto().resizable(true))
                .column(Column::remainder())
                .header(20.0, |mut header| {
                    header.col(|ui| {
                        ui.strong("Synthetic Aroma Agent");
                    });
                    header.col(|ui| {
                        ui.strong("Natural Agent");
                    });
                })
                .body(|mut body| {
                    for (synthetic, natural) in rows {
                        body.row(18.0, |mut row| {
                            row.col(|ui| {
                                ui.label(synthetic);
                            });
                            row.col(|ui| {
                                ui.label(natural);
                            });
                        });
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} records, {} effects  ({})",
            state.dataset.len(),
            state.dataset.effects().len(),
            state.source_path.display()
        ));

        if !state.dataset.has_formula_column() {
            ui.separator();
            ui.label(RichText::new("no Chemical Formula column").weak())
                .on_hover_text("Flavours are grouped without a formula suffix");
        }

        let unmapped = state.dataset.unmapped_labels();
        if !unmapped.is_empty() {
            ui.separator();
            let names: Vec<&str> = unmapped.iter().map(String::as_str).collect();
            ui.label(
                RichText::new(format!("{} unmapped effect label(s)", unmapped.len()))
                    .color(Color32::from_rgb(230, 160, 40)),
            )
            .on_hover_text(format!(
                "Passed through unchanged: {}\nKnown effects: {}",
                names.join(", "),
                normalize::vocabulary().join(", ")
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open aroma catalogue")
        .add_filter("Supported files", &["xlsx", "xlsm", "xls", "ods", "csv", "json", "parquet", "pq"])
        .add_filter("Spreadsheet", &["xlsx", "xlsm", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        // Errors are logged and surfaced in the status line by `open`.
        let _ = state.open(&path);
    }
}
