/*
 * UI Module
 *
 * This module contains functions for creating and updating the user interface
 * using nannou_egui. It exposes the three live weights of the simplified
 * variant, a pause switch, run statistics and a plot of the mean Notch and
 * VEGFR levels over time.
 */

use nannou_egui::egui::plot::{Legend, Line, Plot, Value, Values};
use nannou_egui::{egui, Egui};

use crate::debug::DebugInfo;
use crate::driver::Frame;
use crate::params::{FlockWeights, SimulationParams, Variant};

// Control values edited by the UI between frames
pub struct ControlState {
    pub weights: FlockWeights,
    pub paused: bool,
}

// What the user asked for this frame
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct UiActions {
    pub weights_changed: bool,
    pub pause_changed: bool,
    pub reset_camera: bool,
}

pub fn update_ui(
    egui: &mut Egui,
    controls: &mut ControlState,
    variant: Variant,
    frame: &Frame,
    debug_info: &DebugInfo,
) -> UiActions {
    let mut actions = UiActions::default();
    let before = controls.weights;
    let was_paused = controls.paused;

    let ctx = egui.begin_frame();

    egui::Window::new("Simulation Controls")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            if variant == Variant::Simplified {
                ui.collapsing("Flocking Weights", |ui| {
                    ui.add(
                        egui::Slider::new(&mut controls.weights.centering, SimulationParams::get_centering_range())
                            .text("Centering"),
                    );
                    ui.add(
                        egui::Slider::new(&mut controls.weights.avoidance, SimulationParams::get_avoidance_range())
                            .text("Avoidance"),
                    );
                    ui.add(
                        egui::Slider::new(&mut controls.weights.straying, SimulationParams::get_straying_range())
                            .text("Straying"),
                    );
                });
            }

            ui.collapsing("Signaling", |ui| {
                match frame.series.latest() {
                    Some(sample) => {
                        ui.label(format!("Mean Notch: {:.4}", sample.mean_notch));
                        ui.label(format!("Mean VEGFR: {:.4}", sample.mean_vegfr));
                    }
                    None => {
                        ui.label("Waiting for the first sample");
                    }
                }
                let notch = Line::new(Values::from_values(points(frame.series.notch_points()))).name("Notch");
                let vegfr = Line::new(Values::from_values(points(frame.series.vegfr_points()))).name("VEGFR");
                ui.add(
                    Plot::new("signal_plot")
                        .line(notch)
                        .line(vegfr)
                        .height(160.0)
                        .legend(Legend::default()),
                );
            });

            ui.collapsing("Camera Controls", |ui| {
                ui.label("Zoom: Use mouse wheel or trackpad pinch gesture");
                ui.label("Pan: Click and drag");
                if ui.button("Reset Camera").clicked() {
                    actions.reset_camera = true;
                }
            });

            ui.collapsing("Statistics", |ui| {
                ui.label(format!("FPS: {:.1}", debug_info.fps));
                ui.label(format!("Frame time: {:.2} ms", debug_info.frame_time.as_secs_f64() * 1000.0));
                ui.label(format!("Tick: {}", debug_info.tick));
                ui.label(format!("Ticks/s: {:.1}", debug_info.ticks_per_second));
                ui.label(format!("Agents: {}", frame.positions.len()));
                if variant == Variant::Simplified {
                    ui.label(format!("Collisions: {}", debug_info.collisions));
                }
            });

            ui.checkbox(&mut controls.paused, "Pause Simulation");
        });

    actions.weights_changed = controls.weights != before;
    actions.pause_changed = controls.paused != was_paused;
    actions
}

fn points(raw: Vec<[f64; 2]>) -> Vec<Value> {
    raw.into_iter().map(|[x, y]| Value::new(x, y)).collect()
}
