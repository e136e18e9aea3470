/*
 * Renderer Module
 *
 * This module draws the latest published frame: the boundary of the
 * simulation volume seen down the z axis and one disc per agent, colored
 * by the palette. Nothing here reads or writes simulation state directly.
 */

use nannou::prelude::*;

use crate::app::Model;

// Agents are drawn smaller than their collision radius so the flock stays legible
const DRAW_SCALE: f32 = 0.3;
const MIN_DRAW_RADIUS: f32 = 1.5;

pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    draw.background().color(BLACK);

    let window_rect = app.window_rect();
    let snapshot = &model.frame;
    let boundary = model.params.boundary;

    // Volume outline
    let corner_a = model.camera.world_to_screen(vec2(-boundary, -boundary), window_rect);
    let corner_b = model.camera.world_to_screen(vec2(boundary, boundary), window_rect);
    let outline = Rect::from_corners(corner_a, corner_b);
    draw.rect()
        .xy(outline.xy())
        .wh(outline.wh())
        .no_fill()
        .stroke_weight(1.0)
        .stroke(rgba(0.3, 0.3, 0.3, 1.0));

    let radius = (model.params.agent_radius * DRAW_SCALE * model.camera.zoom).max(MIN_DRAW_RADIUS);
    for (i, &position) in snapshot.positions.iter().enumerate() {
        let screen = model.camera.project(position, window_rect);
        if !window_rect.pad(-radius).contains(screen) {
            continue;
        }
        draw.ellipse()
            .xy(screen)
            .radius(radius)
            .color(model.palette.color(i));
    }

    if model.controls.paused {
        draw.text("PAUSED")
            .xy(pt2(window_rect.right() - 60.0, window_rect.top() - 20.0))
            .color(WHITE)
            .font_size(14);
    }

    if let Err(err) = draw.to_frame(app, &frame) {
        tracing::warn!(?err, "failed to draw frame");
    }
    if let Err(err) = model.egui.draw_to_frame(&frame) {
        tracing::warn!(?err, "failed to draw ui");
    }
}
