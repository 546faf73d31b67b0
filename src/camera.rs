use bigganbondhu_sim::{editor::Viewport, Point};
use egui::{PointerButton, Pos2, Rect, Vec2};

#[derive(Copy, Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct CircuitCamera {
    /// Screen points per world unit
    pub zoom: f32,
    /// World position shown at the centre of the canvas
    pub pos: Pos2,
}

impl Default for CircuitCamera {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pos: Pos2::ZERO,
        }
    }
}

/// Maps between world and screen for one frame.
#[derive(Copy, Clone, Debug)]
pub struct CameraTransform {
    /// Screen area of the canvas
    pub area: Rect,
    pub camera: CircuitCamera,
}

impl CircuitCamera {
    /// Zooms around `pivot` and pans on secondary/middle drags.
    pub fn drive(&mut self, resp: &egui::Response) -> CameraTransform {
        let area = resp.rect;

        if let Some(pivot) = resp.hover_pos() {
            let zoom_delta = resp.ctx.input(|r| r.zoom_delta());
            let scroll = resp.ctx.input(|r| r.smooth_scroll_delta.y);
            let zoom_delta = zoom_delta * (scroll / 400.0).exp();

            let old_zoom = self.zoom;
            self.zoom = (self.zoom * zoom_delta).clamp(0.25, 4.0);
            let zoom_delta = self.zoom / old_zoom;

            // Keep the world point under the pointer fixed
            let pivot_vect = (1. - zoom_delta) * (pivot - area.center());
            self.pos -= pivot_vect / self.zoom;
        }

        if resp.dragged_by(PointerButton::Secondary) || resp.dragged_by(PointerButton::Middle) {
            self.pos -= resp.drag_delta() / self.zoom;
        }

        CameraTransform {
            area,
            camera: *self,
        }
    }
}

impl CameraTransform {
    pub fn to_screen(&self, p: Point) -> Pos2 {
        let world = Vec2::new(p.x, p.y);
        let zoomed = self.camera.zoom * (world - self.camera.pos.to_vec2());
        self.area.center() + zoomed
    }

    pub fn to_world(&self, screen: Pos2) -> Point {
        let offset = (screen - self.area.center()) / self.camera.zoom;
        let world = self.camera.pos + offset;
        Point::new(world.x, world.y)
    }

    /// Screen length of `len` world units
    pub fn scale(&self, len: f32) -> f32 {
        len * self.camera.zoom
    }

    pub fn visible_world(&self) -> Viewport {
        Viewport {
            min: self.to_world(self.area.min),
            max: self.to_world(self.area.max),
        }
    }
}
