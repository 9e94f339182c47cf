//! Live tuning panel, drawn with egui over the field.
//!
//! Sliders edit a copy of the constants; the copy is handed back to the
//! driver only when something changed, where it is validated again.

use crate::config::{PhysicsConfig, RenderConfig};
use crate::driver::FieldDriver;

/// Draw the panel and apply any edits to `driver`.
pub fn tuning_panel(ctx: &egui::Context, driver: &mut FieldDriver) {
    let mut physics = driver.config().physics.clone();
    let mut render = driver.config().render.clone();
    let mut reset = false;

    egui::Window::new("Field")
        .default_pos([12.0, 12.0])
        .default_open(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(format!(
                "{} particles, {:.0} fps, frame {}",
                driver.particles().len(),
                driver.time().fps(),
                driver.frame_count()
            ));
            ui.separator();

            egui::CollapsingHeader::new("Forces").default_open(true).show(ui, |ui| {
                ui.add(egui::Slider::new(&mut physics.pair_strength, -2.0..=2.0).text("pair strength"));
                ui.add(egui::Slider::new(&mut physics.attractor_gain, 0.0..=3.0).text("attractor gain"));
                ui.add(egui::Slider::new(&mut physics.attractor_radius, 0.0..=800.0).text("attractor radius"));
                ui.add(egui::Slider::new(&mut physics.pointer_strength, -2.0..=2.0).text("pointer strength"));
                ui.add(egui::Slider::new(&mut physics.drift_amplitude, 0.0..=0.1).text("drift"));
                ui.add(egui::Slider::new(&mut physics.boundary_stiffness, 0.0..=0.02).text("boundary stiffness"));
                ui.add(egui::Slider::new(&mut physics.damping, 0.8..=0.999).text("damping"));
            });

            egui::CollapsingHeader::new("Drawing").show(ui, |ui| {
                ui.add(egui::Slider::new(&mut render.connection_distance, 0.0..=300.0).text("connection distance"));
                ui.add(egui::Slider::new(&mut render.line_alpha, 0.0..=1.0).text("line alpha"));
                ui.add(egui::Slider::new(&mut render.disc_radius_per_mass, 0.5..=8.0).text("disc size"));
                ui.add(egui::Slider::new(&mut render.accent_speed, 0.0..=5.0).text("accent speed"));
            });

            reset = ui.button("Reset").clicked();
        });

    if reset {
        physics = PhysicsConfig::default();
        render = RenderConfig::default();
    }
    if physics != driver.config().physics {
        if let Err(e) = driver.set_physics(physics) {
            log::warn!("rejected physics change: {}", e);
        }
    }
    if render != driver.config().render {
        if let Err(e) = driver.set_render(render) {
            log::warn!("rejected render change: {}", e);
        }
    }
}
