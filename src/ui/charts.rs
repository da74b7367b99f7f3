use std::f64::consts::{FRAC_PI_2, TAU};

use eframe::egui::{self, Align2, Color32, FontId, RichText, ScrollArea, Sense, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Plot, PlotPoints, Points, Polygon,
};

use crate::analysis::counts::BoxStats;
use crate::analysis::questions::{ChartKind, ChartPayload};
use crate::color::{ColorMap, diverging_color, generate_palette, heat_color, text_on};
use crate::state::AppState;

const PLOT_HEIGHT: f32 = 320.0;
const LABEL_WIDTH: f32 = 200.0;
const HEADER_HEIGHT: f32 = 40.0;
const CELL_HEIGHT: f32 = 22.0;

// ---------------------------------------------------------------------------
// Chart area (central panel)
// ---------------------------------------------------------------------------

/// Render every drawn chart of the active question, stacked vertically.
pub fn chart_area(ui: &mut Ui, state: &AppState) {
    let specs = state.selection.specs();
    if specs.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Pick a question, tick one or more charts, then press Draw");
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (kind, payload) in specs {
                ui.heading(payload.title());
                match (kind, payload) {
                    (ChartKind::PieShare, ChartPayload::Counts { entries, .. }) => {
                        pie_chart(ui, kind, entries, &state.effect_colors);
                    }
                    (_, ChartPayload::Counts { x_label, y_label, entries, .. }) => {
                        bar_chart(ui, kind, x_label, y_label, entries, &state.effect_colors);
                    }
                    (_, ChartPayload::Heatmap { pivot, .. }) => {
                        ui.label(RichText::new(format!("Rows: {}", pivot.row_field.label())).weak());
                        let max = pivot.max_count().max(1) as f64;
                        cell_grid(ui, &pivot.rows, &pivot.columns, |i, j| {
                            let n = pivot.counts[i][j];
                            (heat_color(n as f64 / max), n.to_string())
                        });
                    }
                    (_, ChartPayload::Correlation { matrix, .. }) => {
                        cell_grid(ui, &matrix.labels, &matrix.labels, |i, j| {
                            let r = matrix.values[i][j];
                            let text = if r.is_nan() { "–".to_string() } else { format!("{r:.2}") };
                            (diverging_color(r), text)
                        });
                    }
                    (_, ChartPayload::Scatter { x_label, y_label, points, .. }) => {
                        scatter_plot(ui, kind, x_label, y_label, points);
                    }
                    (_, ChartPayload::Box { y_label, stats, .. }) => {
                        box_plot(ui, kind, y_label, stats.as_ref());
                    }
                }
                ui.add_space(8.0);
                ui.separator();
            }
        });
}

/// One colour per entry: the effect colour for canonical effects, otherwise a
/// generated hue.
fn category_colors(entries: &[(String, usize)], effects: &ColorMap) -> Vec<Color32> {
    let palette = generate_palette(entries.len());
    entries
        .iter()
        .zip(palette)
        .map(|((label, _), fallback)| {
            if effects.contains(label) {
                effects.color_for(label)
            } else {
                fallback
            }
        })
        .collect()
}

fn empty_note(ui: &mut Ui) {
    ui.label(RichText::new("No records.").italics());
}

// ---------------------------------------------------------------------------
// Bar chart
// ---------------------------------------------------------------------------

fn bar_chart(
    ui: &mut Ui,
    kind: ChartKind,
    x_label: &str,
    y_label: &str,
    entries: &[(String, usize)],
    effects: &ColorMap,
) {
    if entries.is_empty() {
        return empty_note(ui);
    }
    let colors = category_colors(entries, effects);
    let bars: Vec<Bar> = entries
        .iter()
        .zip(&colors)
        .enumerate()
        .map(|(i, ((label, n), color))| {
            Bar::new(i as f64, *n as f64).name(label).fill(*color)
        })
        .collect();

    Plot::new(kind.id())
        .height(PLOT_HEIGHT)
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).width(0.7));
        });

    swatch_legend(ui, entries, &colors);
}

/// Colour key below a category chart, one entry per bar.
fn swatch_legend(ui: &mut Ui, entries: &[(String, usize)], colors: &[Color32]) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for ((label, n), color) in entries.iter().zip(colors) {
            ui.label(RichText::new("■").color(*color));
            ui.label(format!("{label} ({n})"));
            ui.add_space(6.0);
        }
    });
}

// ---------------------------------------------------------------------------
// Pie chart
// ---------------------------------------------------------------------------

/// Wedges start at 12 o'clock and run counter-clockwise.
fn pie_chart(ui: &mut Ui, kind: ChartKind, entries: &[(String, usize)], effects: &ColorMap) {
    let total: usize = entries.iter().map(|(_, n)| n).sum();
    if total == 0 {
        return empty_note(ui);
    }
    let colors = category_colors(entries, effects);

    Plot::new(kind.id())
        .height(PLOT_HEIGHT)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            let mut start = FRAC_PI_2;
            for ((label, n), color) in entries.iter().zip(&colors) {
                let share = *n as f64 / total as f64;
                let sweep = share * TAU;
                plot_ui.polygon(
                    Polygon::new(wedge(start, sweep))
                        .fill_color(*color)
                        .stroke(Stroke::new(1.0, Color32::WHITE))
                        .name(format!("{label} ({:.1}%)", share * 100.0)),
                );
                start += sweep;
            }
        });
}

fn wedge(start: f64, sweep: f64) -> PlotPoints<'static> {
    let steps = ((sweep / TAU) * 120.0).ceil().max(2.0) as usize;
    let mut pts = Vec::with_capacity(steps + 2);
    pts.push([0.0, 0.0]);
    for s in 0..=steps {
        let a = start + sweep * s as f64 / steps as f64;
        pts.push([a.cos(), a.sin()]);
    }
    PlotPoints::from(pts)
}

// ---------------------------------------------------------------------------
// Scatter and box plots
// ---------------------------------------------------------------------------

fn scatter_plot(ui: &mut Ui, kind: ChartKind, x_label: &str, y_label: &str, points: &[[f64; 2]]) {
    if points.is_empty() {
        return empty_note(ui);
    }
    Plot::new(kind.id())
        .height(PLOT_HEIGHT)
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::from(points.to_vec()))
                    .radius(3.5)
                    .color(Color32::LIGHT_BLUE),
            );
        });
}

fn box_plot(ui: &mut Ui, kind: ChartKind, y_label: &str, stats: Option<&BoxStats>) {
    let Some(stats) = stats else {
        return empty_note(ui);
    };
    let spread = BoxSpread::new(
        stats.lower_whisker,
        stats.q1,
        stats.median,
        stats.q3,
        stats.upper_whisker,
    );
    let outliers: Vec<[f64; 2]> = stats.outliers.iter().map(|&v| [0.0, v]).collect();

    Plot::new(kind.id())
        .height(PLOT_HEIGHT)
        .y_axis_label(y_label)
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(vec![BoxElem::new(0.0, spread).box_width(0.4)]));
            if !outliers.is_empty() {
                plot_ui.points(Points::new(PlotPoints::from(outliers)).radius(3.0));
            }
        });
}

// ---------------------------------------------------------------------------
// Annotated cell grid (heat map, correlation)
// ---------------------------------------------------------------------------

/// Paint a labelled grid; `cell(i, j)` gives the fill and annotation.
fn cell_grid(
    ui: &mut Ui,
    rows: &[String],
    columns: &[String],
    cell: impl Fn(usize, usize) -> (Color32, String),
) {
    if rows.is_empty() || columns.is_empty() {
        return empty_note(ui);
    }
    let n_cols = columns.len() as f32;
    let cell_w = ((ui.available_width() - LABEL_WIDTH) / n_cols).clamp(36.0, 140.0);
    let size = egui::vec2(
        LABEL_WIDTH + cell_w * n_cols,
        HEADER_HEIGHT + CELL_HEIGHT * rows.len() as f32,
    );
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let origin = response.rect.min;
    let font = FontId::proportional(11.0);
    let text_color = ui.visuals().text_color();

    for (j, col) in columns.iter().enumerate() {
        let x = origin.x + LABEL_WIDTH + cell_w * (j as f32 + 0.5);
        painter.text(
            egui::pos2(x, origin.y + HEADER_HEIGHT - 4.0),
            Align2::CENTER_BOTTOM,
            fit(col, cell_w),
            font.clone(),
            text_color,
        );
    }

    for (i, row) in rows.iter().enumerate() {
        let y = origin.y + HEADER_HEIGHT + CELL_HEIGHT * i as f32;
        painter.text(
            egui::pos2(origin.x + LABEL_WIDTH - 6.0, y + CELL_HEIGHT / 2.0),
            Align2::RIGHT_CENTER,
            fit(row, LABEL_WIDTH - 8.0),
            font.clone(),
            text_color,
        );
        for j in 0..columns.len() {
            let (fill, text) = cell(i, j);
            let rect = egui::Rect::from_min_size(
                egui::pos2(origin.x + LABEL_WIDTH + cell_w * j as f32, y),
                egui::vec2(cell_w, CELL_HEIGHT),
            );
            painter.rect_filled(rect.shrink(0.5), 0.0, fill);
            painter.text(rect.center(), Align2::CENTER_CENTER, text, font.clone(), text_on(fill));
        }
    }

    response.on_hover_text(columns.join(" · "));
}

/// Truncate `label` with an ellipsis so it roughly fits `width` pixels.
fn fit(label: &str, width: f32) -> String {
    let max_chars = (width / 6.5).floor().max(3.0) as usize;
    if label.chars().count() <= max_chars {
        return label.to_string();
    }
    let mut short: String = label.chars().take(max_chars - 1).collect();
    short.push('…');
    short
}
