use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints};

use crate::state::{AppState, PlotView};

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render whichever plot the top bar selected.
pub fn central_plot(ui: &mut Ui, state: &AppState) {
    match state.view {
        PlotView::CookTimes => cook_time_histogram(ui, state),
        PlotView::Roc => roc_plot(ui, state),
    }
}

/// Side-by-side histogram of cook times (hours) per style.
fn cook_time_histogram(ui: &mut Ui, state: &AppState) {
    let width = state.bin_width_hours;
    let n_styles = state.visible_styles.len().max(1) as f64;

    Plot::new("cook_time_histogram")
        .legend(Legend::default())
        .x_axis_label("Total time (hours)")
        .y_axis_label("Recipes")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (slot, style) in state.visible_styles.iter().enumerate() {
                let Some((bins, overflow)) = state.bins.get(style) else {
                    continue;
                };
                let bar_width = width / n_styles;
                let shift = (slot as f64 - (n_styles - 1.0) / 2.0) * bar_width;

                let bars: Vec<Bar> = bins
                    .iter()
                    .map(|b| Bar::new(b.center + shift, b.count as f64).width(bar_width * 0.95))
                    .collect();

                let name = if *overflow > 0 {
                    format!("{style} ({overflow} beyond {} h)", state.max_hours)
                } else {
                    style.to_string()
                };
                let chart = BarChart::new(bars)
                    .name(name)
                    .color(state.color_map.style_color(*style));
                plot_ui.bar_chart(chart);
            }
        });
}

/// ROC curves of the test predictions, one per fitted model.
fn roc_plot(ui: &mut Ui, state: &AppState) {
    let report = &state.report;
    let curves = report
        .logistic
        .iter()
        .map(|lr| &lr.roc)
        .chain(std::iter::once(&report.forest.roc));

    Plot::new("roc_plot")
        .legend(Legend::default())
        .x_axis_label("False positive rate")
        .y_axis_label("True positive rate")
        .data_aspect(1.0)
        .include_x(0.0)
        .include_x(1.0)
        .include_y(0.0)
        .include_y(1.0)
        .show(ui, |plot_ui| {
            let chance: PlotPoints = vec![[0.0, 0.0], [1.0, 1.0]].into();
            plot_ui.line(Line::new(chance).name("chance").color(Color32::DARK_GRAY));

            for (i, roc) in curves.enumerate() {
                let Some(roc) = roc else { continue };
                if !state.visible_curves.get(i).copied().unwrap_or(false) {
                    continue;
                }
                let points: PlotPoints = roc.iter().map(|p| [p.fpr, p.tpr]).collect();
                let line = Line::new(points)
                    .name(state.curve_name(i))
                    .color(state.color_map.model_color(i))
                    .width(1.5);
                plot_ui.line(line);
            }
        });
}
