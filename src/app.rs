use eframe::egui;

use crate::pipeline::AnalysisReport;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct StyleViewerApp {
    pub state: AppState,
}

impl StyleViewerApp {
    pub fn new(report: AnalysisReport) -> Self {
        Self {
            state: AppState::new(report),
        }
    }
}

impl eframe::App for StyleViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: view selector ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: toggles and metrics ----
        egui::SidePanel::left("control_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::central_plot(ui, &self.state);
        });
    }
}

/// Open the plot window and block until it is closed.
pub fn show(report: AnalysisReport) -> eframe::Result {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 700.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Recipe Style – Roasted vs. Baked",
        options,
        Box::new(|_cc| Ok(Box::new(StyleViewerApp::new(report)))),
    )
}
