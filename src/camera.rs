/*
 * Camera Module
 *
 * This module defines the Camera struct that handles zooming and panning
 * in the viewer. The simulation volume is shown looking down the z axis, so
 * a 3D world position projects onto the screen through its x and y
 * components.
 */

use nannou::prelude::*;

const MIN_ZOOM: f32 = 0.05;
const MAX_ZOOM: f32 = 20.0;

pub struct Camera {
    pub position: Vec2,
    pub zoom: f32,
    pub is_dragging: bool,
    pub last_cursor_pos: Vec2,
}

impl Camera {
    // Camera centered on the origin, zoomed so the whole cube fits the window
    pub fn fitting(boundary: f32, window_rect: Rect) -> Self {
        let mut camera = Self {
            position: Vec2::ZERO,
            zoom: 1.0,
            is_dragging: false,
            last_cursor_pos: Vec2::ZERO,
        };
        camera.fit(boundary, window_rect);
        camera
    }

    pub fn fit(&mut self, boundary: f32, window_rect: Rect) {
        let span = 2.0 * boundary * 1.1;
        let shortest = window_rect.w().min(window_rect.h());
        self.position = Vec2::ZERO;
        self.zoom = (shortest / span).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    // Drop the depth axis and convert to screen space
    pub fn project(&self, point: Vec3, window_rect: Rect) -> Vec2 {
        self.world_to_screen(point.truncate(), window_rect)
    }

    // Convert a point from world space to screen space
    pub fn world_to_screen(&self, point: Vec2, window_rect: Rect) -> Vec2 {
        (point - self.position) * self.zoom + window_rect.xy()
    }

    // Convert a point from screen space to world space
    pub fn screen_to_world(&self, point: Vec2, window_rect: Rect) -> Vec2 {
        (point - window_rect.xy()) / self.zoom + self.position
    }

    // Zoom around the cursor so the point under it stays put
    pub fn zoom(&mut self, scroll_delta: Vec2, cursor_position: Vec2, window_rect: Rect) {
        let zoom_factor = 1.0 + scroll_delta.y * 0.1;
        let anchor_before = self.screen_to_world(cursor_position, window_rect);
        self.zoom = (self.zoom * zoom_factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let anchor_after = self.screen_to_world(cursor_position, window_rect);
        self.position += anchor_before - anchor_after;
    }

    pub fn start_drag(&mut self, position: Vec2) {
        self.last_cursor_pos = position;
        self.is_dragging = true;
    }

    pub fn drag(&mut self, position: Vec2) {
        if !self.is_dragging {
            return;
        }
        let delta = position - self.last_cursor_pos;
        if delta.length_squared() > 0.0 {
            self.position -= delta / self.zoom;
            self.last_cursor_pos = position;
        }
    }

    pub fn end_drag(&mut self) {
        self.is_dragging = false;
    }
}
