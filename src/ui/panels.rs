use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::data::model::CookingStyle;
use crate::report::auc_text;
use crate::state::{AppState, PlotView};

// ---------------------------------------------------------------------------
// Left side panel – toggles and model metrics
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            match state.view {
                PlotView::CookTimes => histogram_controls(ui, state),
                PlotView::Roc => curve_controls(ui, state),
            }
            ui.separator();
            metrics_table(ui, state);
        });
}

fn histogram_controls(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Styles");
    ui.separator();

    for style in CookingStyle::ALL {
        let count = state.report.cook_times.get(&style).map_or(0, Vec::len);
        let text = RichText::new(format!("{style}  ({count})"))
            .color(state.color_map.style_color(style));
        let mut checked = state.visible_styles.contains(&style);
        if ui.checkbox(&mut checked, text).changed() {
            state.toggle_style(style);
        }
    }

    ui.add_space(6.0);
    let mut changed = false;
    changed |= ui
        .add(egui::Slider::new(&mut state.bin_width_hours, 0.05..=2.0).text("bin width (h)"))
        .changed();
    changed |= ui
        .add(egui::Slider::new(&mut state.max_hours, 1.0..=48.0).text("range (h)"))
        .changed();
    if changed {
        state.rebin();
    }
}

fn curve_controls(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Curves");
    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.select_all_curves();
        }
        if ui.small_button("None").clicked() {
            state.select_no_curves();
        }
    });
    ui.separator();

    for i in 0..state.visible_curves.len() {
        let text = RichText::new(state.curve_name(i)).color(state.color_map.model_color(i));
        ui.checkbox(&mut state.visible_curves[i], text);
    }
}

fn metrics_table(ui: &mut Ui, state: &AppState) {
    let report = &state.report;
    ui.strong("Test metrics");

    egui::Grid::new("metrics_grid")
        .striped(true)
        .num_columns(3)
        .show(ui, |ui: &mut Ui| {
            ui.label("model");
            ui.label("accuracy");
            ui.label("AUC");
            ui.end_row();

            for lr in &report.logistic {
                ui.label(format!("logistic {} C={}", lr.penalty, lr.c));
                ui.label(format!("{:.3}", lr.test_accuracy));
                ui.label(auc_text(lr.auc, 3));
                ui.end_row();
            }

            ui.label("random forest");
            ui.label(format!("{:.3}", report.forest.test_accuracy));
            ui.label(auc_text(report.forest.auc, 3));
            ui.end_row();
        });

    ui.add_space(6.0);
    ui.label(format!("linear regression test R²: {:.3}", report.linear.test_r2));

    ui.add_space(6.0);
    let cm = &report.forest.confusion;
    ui.strong(format!("Confusion matrix (forest, n = {})", cm.total()));
    egui::Grid::new("confusion_grid")
        .num_columns(3)
        .show(ui, |ui: &mut Ui| {
            ui.label("actual \\ predicted");
            for style in CookingStyle::ALL {
                ui.label(style.as_str());
            }
            ui.end_row();
            for actual in CookingStyle::ALL {
                ui.label(actual.as_str());
                for predicted in CookingStyle::ALL {
                    ui.label(cm.get(actual, predicted).to_string());
                }
                ui.end_row();
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        if ui
            .selectable_label(state.view == PlotView::CookTimes, "Cook times")
            .clicked()
        {
            state.view = PlotView::CookTimes;
        }
        if ui
            .selectable_label(state.view == PlotView::Roc, "ROC curves")
            .clicked()
        {
            state.view = PlotView::Roc;
        }

        ui.separator();

        let report = &state.report;
        ui.label(format!(
            "{} recipes ({} dropped), {} train / {} test",
            report.clean.rows_after(),
            report.clean.rows_dropped,
            report.n_train,
            report.n_test
        ));

        ui.separator();
        for (label, color) in state.color_map.legend_entries() {
            ui.label(RichText::new(format!("■ {label}")).color(color));
        }
    });
}
