// src/ui.rs
use egui;

use crate::engine_lib::scene_types::Scene;

pub fn build_ui(ctx: &egui::Context, scene: &Scene) {
    egui::Window::new("Controls & Info")
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(10.0, 10.0))
        .resizable(false)
        .show(ctx, |ui| {
            ui.vertical(|ui| {
                ui.label("Portal Engine Demo");
                ui.separator();

                let portal_status = |open: bool| if open { "open" } else { "closed" };
                ui.label(format!(
                    "Blue portal: {}   Orange portal: {}",
                    portal_status(scene.portal1.open),
                    portal_status(scene.portal2.open)
                ));
                ui.label(format!("Cubes in scene: {}", scene.cubes.len()));
                ui.separator();

                ui.label("🎮 Keyboard Controls:");
                ui.label("   W/A/S/D: Move");
                ui.label("   Space: Jump");
                ui.label("   Mouse (when grabbed): Look");
                ui.label("   Left/Right Click: Place Blue/Orange Portal");
                ui.label("   E: Grab/Release Cube");
                ui.label("   Escape: Grab/Ungrab Mouse Cursor");
            });
        });
}
