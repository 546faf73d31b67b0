use std::f32::consts::TAU;

use bigganbondhu_sim::{geometry::base_size, Component, ComponentKind, LedColor};
use egui::{Align2, Color32, FontId, Painter, Pos2, Shape, Stroke, Vec2};

use crate::{camera::CameraTransform, circuit_widget::WireState, to_metric_prefix};

/// Screen-space frame of one component: `x` and `y` are the screen vectors of
/// one local world unit, already scaled and rotated.
#[derive(Clone, Copy, Debug)]
pub struct ComponentFrame {
    pub center: Pos2,
    pub x: Vec2,
    pub y: Vec2,
    pub half_w: f32,
    pub half_h: f32,
}

impl ComponentFrame {
    pub fn new(view: &CameraTransform, component: &Component) -> Self {
        let (w, h) = base_size(component.ty());
        let (sin, cos) = component.rotation.to_radians().sin_cos();
        let unit = view.scale(component.scale);
        Self {
            center: view.to_screen(component.position),
            x: Vec2::new(cos, sin) * unit,
            y: Vec2::new(-sin, cos) * unit,
            half_w: w / 2.0,
            half_h: h / 2.0,
        }
    }

    pub fn at(&self, lx: f32, ly: f32) -> Pos2 {
        self.center + self.x * lx + self.y * ly
    }

    /// Screen length of `len` local units
    pub fn px(&self, len: f32) -> f32 {
        self.x.length() * len
    }

    fn left(&self) -> Pos2 {
        self.at(-self.half_w, 0.0)
    }

    fn right(&self) -> Pos2 {
        self.at(self.half_w, 0.0)
    }
}

/// Splits the horizontal axis into two leads and a centred body of `body_len`.
/// Returns the body's begin and end x.
fn leads(
    painter: &Painter,
    frame: &ComponentFrame,
    body_len: f32,
    wire: WireState,
    selected: bool,
) -> (f32, f32) {
    let begin = -body_len / 2.0;
    let end = body_len / 2.0;
    wire.line_segment(painter, frame, frame.left(), frame.at(begin, 0.0), selected);
    wire.line_segment(painter, frame, frame.at(end, 0.0), frame.right(), selected);
    (begin, end)
}

pub fn draw_wire(painter: &Painter, frame: &ComponentFrame, wire: WireState, selected: bool) {
    wire.line_segment(painter, frame, frame.left(), frame.right(), selected);
    painter.circle_filled(frame.center, frame.px(3.0), wire.color(selected));
}

pub fn draw_resistor(painter: &Painter, frame: &ComponentFrame, wire: WireState, selected: bool) {
    let (begin, end) = leads(painter, frame, frame.half_w, wire, selected);

    let wiggles = 6;
    let mut amplitude = frame.half_h * 0.8;

    let mut last = frame.at(begin, 0.0);
    for i in 0..=wiggles * 2 {
        amplitude *= -1.0;

        let f = (i as f32) / (wiggles * 2) as f32;

        let new_pos = if i == 0 {
            frame.at(begin, 0.0)
        } else if i == wiggles * 2 {
            frame.at(end, 0.0)
        } else {
            frame.at(begin + (end - begin) * f, amplitude)
        };
        wire.line_segment(painter, frame, last, new_pos, selected);

        last = new_pos;
    }
}

pub fn draw_inductor(painter: &Painter, frame: &ComponentFrame, wire: WireState, selected: bool) {
    let (begin, end) = leads(painter, frame, frame.half_w, wire, selected);

    let steps = 100;
    let n_loops = 5;
    let k: f32 = 7.44;
    let a = 0.12;
    let radius = frame.half_h * 1.2;

    let mut last = frame.at(begin, 0.0);
    for i in 0..=steps {
        let f = i as f32 / steps as f32;
        let t = f * TAU * n_loops as f32;

        let yf = t.sin() / 2.0;
        let xf = (((t.cos() - 1.0) * k.cos()) + t * a) / (TAU * n_loops as f32 * a);

        let new_pos = frame.at(begin + (end - begin) * xf, -radius * yf);
        wire.line_segment(painter, frame, last, new_pos, selected);

        last = new_pos;
    }
}

fn draw_capacitorlike(
    painter: &Painter,
    frame: &ComponentFrame,
    wire: WireState,
    selected: bool,
    plate_a: f32,
    plate_b: f32,
) -> (f32, f32) {
    let sep = frame.half_w * 0.25;
    let (begin, end) = leads(painter, frame, sep, wire, selected);

    wire.line_segment(
        painter,
        frame,
        frame.at(begin, -plate_a),
        frame.at(begin, plate_a),
        selected,
    );
    wire.line_segment(
        painter,
        frame,
        frame.at(end, -plate_b),
        frame.at(end, plate_b),
        selected,
    );
    (begin, end)
}

pub fn draw_capacitor(painter: &Painter, frame: &ComponentFrame, wire: WireState, selected: bool) {
    let radius = frame.half_h * 0.8;
    draw_capacitorlike(painter, frame, wire, selected, radius, radius);
}

pub fn draw_battery(painter: &Painter, frame: &ComponentFrame, wire: WireState, selected: bool) {
    let (_, end) = draw_capacitorlike(
        painter,
        frame,
        wire,
        selected,
        frame.half_h * 0.5,
        frame.half_h * 0.9,
    );
    painter.text(
        frame.at(end + frame.half_w * 0.3, -frame.half_h * 0.6),
        Align2::CENTER_CENTER,
        "+",
        FontId::proportional(frame.px(10.0)),
        wire.color(selected),
    );
}

pub fn draw_switch(
    painter: &Painter,
    frame: &ComponentFrame,
    wire: WireState,
    selected: bool,
    on: bool,
) {
    let (begin, end) = leads(painter, frame, frame.half_w, wire, selected);
    let pivot = frame.at(begin, 0.0);
    let tip = if on {
        frame.at(end, 0.0)
    } else {
        frame.at(end * 0.8, -frame.half_h * 1.2)
    };
    wire.line_segment(painter, frame, pivot, tip, selected);
    painter.circle_filled(pivot, frame.px(2.5), wire.color(selected));
    painter.circle_stroke(
        frame.at(end, 0.0),
        frame.px(2.5),
        Stroke::new(frame.px(1.5), wire.color(selected)),
    );
}

pub fn draw_bulb(painter: &Painter, frame: &ComponentFrame, wire: WireState, selected: bool, glow: f32) {
    let radius = frame.half_w * 0.6;
    let top = frame.at(0.0, -frame.half_h);
    let bottom = frame.at(0.0, frame.half_h);

    wire.line_segment(painter, frame, bottom, frame.at(0.0, radius), selected);
    wire.line_segment(painter, frame, frame.at(0.0, -radius), top, selected);

    if glow > 0.0 {
        let fill = Color32::from_rgba_unmultiplied(255, 230, 120, (glow * 200.0) as u8);
        painter.circle_filled(frame.center, frame.px(radius * 1.3), fill);
    }
    painter.circle_stroke(
        frame.center,
        frame.px(radius),
        Stroke::new(frame.px(2.0), wire.color(selected)),
    );

    // Filament
    let d = radius * 0.7;
    wire.line_segment(painter, frame, frame.at(-d, -d), frame.at(d, d), selected);
    wire.line_segment(painter, frame, frame.at(-d, d), frame.at(d, -d), selected);
}

fn led_color32(color: LedColor) -> Color32 {
    match color {
        LedColor::Red => Color32::from_rgb(0xff, 0x40, 0x40),
        LedColor::Green => Color32::from_rgb(0x40, 0xff, 0x60),
        LedColor::Blue => Color32::from_rgb(0x50, 0x80, 0xff),
        LedColor::Yellow => Color32::from_rgb(0xff, 0xe0, 0x40),
    }
}

pub fn draw_led(
    painter: &Painter,
    frame: &ComponentFrame,
    wire: WireState,
    selected: bool,
    color: LedColor,
    glow: f32,
) {
    let size = frame.half_h * 0.6;
    let (begin, end) = leads(painter, frame, size * 2.0, wire, selected);

    let tint = led_color32(color);
    if glow > 0.0 {
        let fill = tint.gamma_multiply(glow * 0.6);
        painter.circle_filled(frame.center, frame.px(size * 2.0), fill);
    }

    wire.line_segment(
        painter,
        frame,
        frame.at(end, -size),
        frame.at(end, size),
        selected,
    );

    let body = if selected { wire.color(selected) } else { tint };
    painter.add(Shape::convex_polygon(
        vec![frame.at(end, 0.0), frame.at(begin, size), frame.at(begin, -size)],
        body,
        Stroke::NONE,
    ));

    // Emission arrows
    for offset in [0.0, size * 0.7] {
        let a = frame.at(offset, -size * 1.2);
        let b = frame.at(offset + size * 0.6, -size * 1.9);
        painter.line_segment([a, b], Stroke::new(frame.px(1.0), tint));
    }
}

pub fn draw_component(
    painter: &Painter,
    frame: &ComponentFrame,
    component: &Component,
    wire: WireState,
    selected: bool,
    glow: f32,
) {
    match component.kind {
        ComponentKind::Battery { .. } => draw_battery(painter, frame, wire, selected),
        ComponentKind::Resistor { .. } => draw_resistor(painter, frame, wire, selected),
        ComponentKind::Wire => draw_wire(painter, frame, wire, selected),
        ComponentKind::Switch { on } => draw_switch(painter, frame, wire, selected, on),
        ComponentKind::Bulb => draw_bulb(painter, frame, wire, selected, glow),
        ComponentKind::Led { color } => draw_led(painter, frame, wire, selected, color, glow),
        ComponentKind::Capacitor { .. } => draw_capacitor(painter, frame, wire, selected),
        ComponentKind::Inductor { .. } => draw_inductor(painter, frame, wire, selected),
    }
    draw_component_value(painter, frame, component.kind);
}

pub fn draw_component_value(painter: &Painter, frame: &ComponentFrame, kind: ComponentKind) {
    let (Some(value), Some(unit)) = (kind.value(), kind.unit()) else {
        return;
    };

    // Screen-space offset below the body, independent of rotation
    let below = Vec2::new(0.0, frame.px(frame.half_h.max(frame.half_w * 0.4)) + 10.0);
    painter.text(
        frame.center + below,
        Align2::CENTER_TOP,
        to_metric_prefix(value, unit),
        FontId::proportional(12.0),
        Color32::LIGHT_GRAY,
    );
}
