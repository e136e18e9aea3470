/*
 * Application Module
 *
 * This module defines the nannou model for the interactive viewer. The
 * simulation itself runs on a SimulationThread; each UI frame the viewer:
 * 1. Picks up the latest published Frame
 * 2. Runs the egui controls and forwards weight edits and pause requests
 * 3. Refreshes agent colors when a new tick has arrived
 *
 * Rendering only ever reads the Frame, so a slow UI never stalls a tick.
 */

use std::sync::Arc;

use anyhow::Context;
use nannou::prelude::*;
use nannou_egui::Egui;
use parking_lot::{const_mutex, Mutex};
use tracing::info;

use crate::camera::Camera;
use crate::debug::DebugInfo;
use crate::driver::{self, SimulationThread};
use crate::flock::Flock;
use crate::input;
use crate::palette::Palette;
use crate::params::{FlockWeights, SharedWeights, SimulationParams};
use crate::renderer;
use crate::ui::{self, ControlState};
use crate::TICKS_PER_SECOND;

// Handed from `run` to the nannou model function, which takes no arguments
struct Staged {
    params: SimulationParams,
    sim: SimulationThread,
}

static STAGED: Mutex<Option<Staged>> = const_mutex(None);

pub struct Model {
    pub params: SimulationParams,
    pub sim: SimulationThread,
    pub frame: Arc<driver::Frame>,
    pub egui: Egui,
    pub debug_info: DebugInfo,
    pub camera: Camera,
    pub mouse_position: Vec2,
    pub palette: Palette,
    pub controls: ControlState,
    applied: FlockWeights,
    painted_tick: Option<u64>,
    halted: bool,
}

// Start the simulation thread and open the viewer window
pub fn run(flock: Flock) -> anyhow::Result<()> {
    let params = flock.params().clone();
    let sim = SimulationThread::spawn(flock, TICKS_PER_SECOND).context("failed to start simulation thread")?;
    *STAGED.lock() = Some(Staged { params, sim });

    nannou::app(model).update(update).exit(exit).run();
    Ok(())
}

fn model(app: &App) -> Model {
    let Staged { params, sim } = STAGED
        .lock()
        .take()
        .expect("simulation must be staged before the viewer starts");

    // 80% of the primary monitor, or a fixed size when none is reported
    let (window_width, window_height) = app
        .primary_monitor()
        .map(|monitor| {
            let size = monitor.size();
            (size.width as f32 * 0.8, size.height as f32 * 0.8)
        })
        .unwrap_or((1280.0, 800.0));

    let window_id = app
        .new_window()
        .title("Angiogenic Flocking Simulation")
        .size(window_width as u32, window_height as u32)
        .view(renderer::view)
        .mouse_moved(input::mouse_moved)
        .mouse_pressed(input::mouse_pressed)
        .mouse_released(input::mouse_released)
        .mouse_wheel(input::mouse_wheel)
        .raw_event(input::raw_window_event)
        .build()
        .expect("failed to open the viewer window");
    let window = app.window(window_id).expect("viewer window vanished after creation");
    let egui = Egui::from_window(&window);

    let camera = Camera::fitting(params.boundary, window.rect());
    let frame = sim.latest();
    let weights = *sim.weights().snapshot();

    Model {
        palette: Palette::new(params.variant, frame.positions.len()),
        params,
        sim,
        frame,
        egui,
        debug_info: DebugInfo::default(),
        camera,
        mouse_position: Vec2::ZERO,
        controls: ControlState {
            weights,
            paused: false,
        },
        applied: weights,
        painted_tick: None,
        halted: false,
    }
}

fn update(app: &App, model: &mut Model, update: Update) {
    // A failed tick is fatal: the simulation thread has already stopped
    if model.halted {
        return;
    }
    if let Some(err) = model.sim.failure() {
        tracing::error!(%err, tick = model.frame.tick, "simulation aborted, closing viewer");
        model.halted = true;
        app.quit();
        return;
    }

    model.debug_info.fps = app.fps();
    model.debug_info.frame_time = update.since_last;
    model.frame = model.sim.latest();

    let actions = ui::update_ui(
        &mut model.egui,
        &mut model.controls,
        model.params.variant,
        &model.frame,
        &model.debug_info,
    );

    if actions.weights_changed {
        forward_weights(model.sim.weights(), model.applied, model.controls.weights);
        model.applied = model.controls.weights;
    }
    if actions.pause_changed {
        model.sim.set_paused(model.controls.paused);
        info!(paused = model.controls.paused, "pause toggled");
    }
    if actions.reset_camera {
        model.camera.fit(model.params.boundary, app.window_rect());
    }

    // Collisions recolor once per tick, not once per UI frame
    if model.painted_tick != Some(model.frame.tick) {
        model.palette.refresh(&model.frame.notch, &model.frame.collisions);
        model.painted_tick = Some(model.frame.tick);
    }
    model.debug_info.collisions = model.frame.collisions.len();
    model.debug_info.record_tick(model.frame.tick);
}

// Only the weights the user actually moved are written
fn forward_weights(shared: &SharedWeights, old: FlockWeights, new: FlockWeights) {
    if new.centering != old.centering {
        shared.set_centering(new.centering);
    }
    if new.avoidance != old.avoidance {
        shared.set_avoidance(new.avoidance);
    }
    if new.straying != old.straying {
        shared.set_straying(new.straying);
    }
}

fn exit(_app: &App, mut model: Model) {
    model.sim.shutdown();
    if !model.halted {
        if let Some(err) = model.sim.failure() {
            tracing::error!(%err, "simulation ended with an error");
        }
    }
    info!(tick = model.frame.tick, "viewer closed");
}
