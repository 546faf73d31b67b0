use bigganbondhu_sim::{
    editor::DragGhost,
    geometry::{connection_points, resize_handles, wire_endpoints, RESIZE_HANDLE_SIZE},
    CircuitEditor, CircuitState, Component, ComponentId, ComponentKind, Interaction, Point,
};
use egui::{Color32, Painter, Pos2, Rect, Shape, Stroke, Vec2};

use crate::{
    camera::CameraTransform,
    components::{draw_component, ComponentFrame},
};

#[derive(Copy, Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct VisualizationOptions {
    /// Volts
    pub voltage_scale: f64,
    /// Amps
    pub current_scale: f64,
    pub show_connection_points: bool,
}

/// Electrical state used to colour and animate a wire or component.
#[derive(Clone, Copy, Debug, Default)]
pub struct WireState {
    pub voltage: f64,
    pub current: f64,
    pub voltage_scale: f64,
}

impl WireState {
    pub fn new(voltage: f64, current: f64, vis: &VisualizationOptions) -> Self {
        Self {
            voltage,
            current,
            voltage_scale: vis.voltage_scale,
        }
    }

    /// Zeroes current
    pub fn floating(self) -> Self {
        Self {
            current: 0.0,
            ..self
        }
    }

    pub fn color(&self, selected: bool) -> Color32 {
        if selected {
            Color32::from_rgb(0x00, 0xff, 0xff)
        } else {
            voltage_color(self.voltage / self.voltage_scale)
        }
    }

    pub fn line_segment(
        &self,
        painter: &Painter,
        frame: &ComponentFrame,
        a: Pos2,
        b: Pos2,
        selected: bool,
    ) {
        let width = frame.px(2.0).max(1.0);
        painter.line_segment([a, b], Stroke::new(width, self.color(selected)));
    }

    pub fn wire(&self, painter: &Painter, a: Pos2, b: Pos2, vis: &VisualizationOptions) {
        painter.line_segment([a, b], Stroke::new(3., self.color(false)));
        self.current(painter, a, b, vis);
    }

    /// Yellow dots travelling along `a -> b` at a speed proportional to the current.
    pub fn current(&self, painter: &Painter, a: Pos2, b: Pos2, vis: &VisualizationOptions) {
        if self.current == 0.0 || vis.current_scale <= 0.0 {
            return;
        }

        let spacing = 20.0;

        let n = ((b - a).length() / spacing) as usize;
        let n = n.max(1);

        let time = painter
            .ctx()
            .input(|r| r.time * self.current.abs() / vis.current_scale)
            .fract() as f32;

        let rect_size = 5.0;

        for i in 0..n {
            let mut t = (i as f32 + time) / n as f32;
            if self.current < 0.0 {
                t = 1.0 - t
            }
            let pos = a.lerp(b, t);
            let rect = Rect::from_center_size(pos, Vec2::splat(rect_size));
            painter.rect_filled(rect, 0.0, Color32::YELLOW);
        }
    }
}

fn voltage_color(voltage: f64) -> Color32 {
    let v = if voltage.is_finite() {
        voltage.clamp(-1.0, 1.0)
    } else {
        0.0
    };

    let neutral = Color32::GRAY;

    if v > 0.0 {
        neutral.lerp_to_gamma(Color32::GREEN, v as f32)
    } else {
        neutral.lerp_to_gamma(Color32::RED, -v as f32)
    }
}

pub fn draw_grid(painter: &Painter, view: &CameraTransform, pitch: f32, color: Color32) {
    if pitch <= 0.0 {
        return;
    }
    let visible = view.visible_world();
    let (min_x, min_y) = (
        (visible.min.x / pitch).floor() as i32,
        (visible.min.y / pitch).floor() as i32,
    );
    let (max_x, max_y) = (
        (visible.max.x / pitch).ceil() as i32,
        (visible.max.y / pitch).ceil() as i32,
    );

    let radius = view.scale(1.5).max(0.5);

    let mut n = 0;
    const MAX_N: i32 = 100_000;
    'outer: for y in min_y..=max_y {
        for x in min_x..=max_x {
            n += 1;
            if n > MAX_N {
                break 'outer;
            }

            let p = Point::new(x as f32 * pitch, y as f32 * pitch);
            painter.circle_filled(view.to_screen(p), radius, color);
        }
    }
    if n > MAX_N {
        log::warn!("Zoomed out too far to draw the grid");
    }
}

/// How strongly a bulb or LED glows, 0 to 1.
fn glow(state: &CircuitState, component: &Component, vis: &VisualizationOptions) -> f32 {
    let current = state.flowing_current();
    if current <= 0.0 {
        return 0.0;
    }
    let lit = state
        .connections
        .iter()
        .any(|conn| conn.to == component.id && conn.voltage > 0.0);
    if !lit {
        return 0.0;
    }
    (current / vis.current_scale.max(f64::EPSILON)).clamp(0.2, 1.0) as f32
}

/// Voltage shown on a component body: the drop annotated on its incoming connection.
fn component_wire_state(state: &CircuitState, component: &Component, vis: &VisualizationOptions) -> WireState {
    let incoming = state.connections.iter().find(|conn| conn.to == component.id);
    let voltage = match component.kind {
        ComponentKind::Battery { voltage } => voltage,
        _ => incoming.map_or(0.0, |conn| conn.voltage),
    };
    WireState::new(voltage, 0.0, vis)
}

/// Paints the whole editor. Reads the editor only.
pub fn draw_circuit(
    painter: &Painter,
    view: &CameraTransform,
    editor: &CircuitEditor,
    vis: &VisualizationOptions,
) {
    let state = editor.state();
    let flowing = state.flowing_current() != 0.0;

    draw_grid(painter, view, editor.config.grid_size, Color32::DARK_GRAY);

    // Wires below components
    for conn in &state.connections {
        let (Some(from), Some(to)) = (state.component(&conn.from), state.component(&conn.to))
        else {
            continue;
        };
        let (a, b) = wire_endpoints(from, to);
        let mut wire = WireState::new(conn.voltage, conn.current, vis);
        if !flowing {
            wire = wire.floating();
        }
        wire.wire(painter, view.to_screen(a), view.to_screen(b), vis);
    }

    for component in &state.components {
        let selected = editor.selection() == Some(&component.id);
        let hovered = editor.hovered() == Some(&component.id);
        let frame = ComponentFrame::new(view, component);

        if hovered && !selected {
            draw_outline(painter, view, component, Color32::from_white_alpha(60));
        }

        draw_component(
            painter,
            &frame,
            component,
            component_wire_state(state, component, vis),
            selected,
            glow(state, component, vis),
        );

        if vis.show_connection_points {
            draw_connection_points(painter, view, component);
        }
    }

    if let Some(selected) = editor.selected_component() {
        draw_outline(painter, view, selected, Color32::from_rgb(0x00, 0xff, 0xff));
        draw_resize_handles(painter, view, selected);
    }

    if let Some(preview) = editor.connection_preview() {
        draw_connection_preview(painter, view, state, &preview.from, preview.to);
    }

    if let Some(ghost) = editor.drag_ghost() {
        draw_ghost(painter, view, &ghost, vis);
    }

    if let Interaction::Resizing { id, .. } = editor.interaction() {
        if let Some(comp) = state.component(id) {
            painter.text(
                view.to_screen(comp.position),
                egui::Align2::CENTER_BOTTOM,
                format!("×{:.2}", comp.scale),
                egui::FontId::monospace(12.0),
                Color32::WHITE,
            );
        }
    }
}

fn draw_outline(painter: &Painter, view: &CameraTransform, component: &Component, color: Color32) {
    let corners: Vec<Pos2> = resize_handles(component)
        .iter()
        .map(|&p| view.to_screen(p))
        .collect();
    painter.add(Shape::closed_line(corners, Stroke::new(1.0, color)));
}

fn draw_resize_handles(painter: &Painter, view: &CameraTransform, component: &Component) {
    let size = view.scale(RESIZE_HANDLE_SIZE);
    for handle in resize_handles(component) {
        let rect = Rect::from_center_size(view.to_screen(handle), Vec2::splat(size));
        painter.rect_filled(rect, 1.0, Color32::WHITE);
    }
}

fn draw_connection_points(painter: &Painter, view: &CameraTransform, component: &Component) {
    let points = connection_points(component);
    let radius = view.scale(3.0).max(2.0);
    for p in &points.input {
        painter.circle_filled(view.to_screen(*p), radius, Color32::RED);
    }
    for p in &points.output {
        painter.circle_stroke(view.to_screen(*p), radius, Stroke::new(1.5, Color32::GREEN));
    }
}

fn draw_connection_preview(
    painter: &Painter,
    view: &CameraTransform,
    state: &CircuitState,
    from: &ComponentId,
    to: Point,
) {
    let Some(from) = state.component(from) else {
        return;
    };
    // Start from the output terminal nearest the pointer
    let start = connection_points(from)
        .output
        .into_iter()
        .min_by(|a, b| a.distance(to).total_cmp(&b.distance(to)))
        .unwrap_or(from.position);

    painter.add(Shape::dashed_line(
        &[view.to_screen(start), view.to_screen(to)],
        Stroke::new(2.0, Color32::LIGHT_BLUE),
        8.0,
        5.0,
    ));
}

fn draw_ghost(painter: &Painter, view: &CameraTransform, ghost: &DragGhost, vis: &VisualizationOptions) {
    let preview = Component::new(
        ComponentId::from("ghost"),
        ComponentKind::default_for(ghost.ty),
        ghost.position,
    );
    let frame = ComponentFrame::new(view, &preview);
    let tint = if ghost.placeable {
        Color32::from_white_alpha(40)
    } else {
        Color32::from_rgba_unmultiplied(255, 0, 0, 60)
    };
    let corners: Vec<Pos2> = resize_handles(&preview)
        .iter()
        .map(|&p| view.to_screen(p))
        .collect();
    painter.add(Shape::convex_polygon(corners, tint, Stroke::NONE));

    draw_component(painter, &frame, &preview, WireState::new(0.0, 0.0, vis), false, 0.0);
}

impl Default for VisualizationOptions {
    fn default() -> Self {
        Self {
            voltage_scale: 6.0,
            current_scale: 1.0,
            show_connection_points: true,
        }
    }
}
