use std::ops::{Add, Mul, Sub};

use crate::model::{Component, ComponentType};

/// World units per grid cell. Component sizes are multiples of this.
pub const GRID_SIZE: f32 = 40.0;

/// Side length of the square hit box around each resize handle
pub const RESIZE_HANDLE_SIZE: f32 = 12.0;

#[derive(serde::Deserialize, serde::Serialize)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        (self - other).length()
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Counter-clockwise in a y-up frame, clockwise on screen.
    pub fn rotated(self, degrees: f32) -> Point {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Point::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Rounds both coordinates to the nearest multiple of `pitch`.
    pub fn snapped(self, pitch: f32) -> Point {
        if pitch <= 0.0 {
            return self;
        }
        Point::new(
            (self.x / pitch).round() * pitch,
            (self.y / pitch).round() * pitch,
        )
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;
    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// World-space terminals of a component.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConnectionPoints {
    pub input: Vec<Point>,
    pub output: Vec<Point>,
}

/// Unscaled footprint (width, height) in world units.
pub fn base_size(ty: ComponentType) -> (f32, f32) {
    let (w, h) = match ty {
        ComponentType::Battery => (1.5, 0.8),
        ComponentType::Resistor => (2.0, 0.6),
        ComponentType::Wire => (1.0, 0.2),
        ComponentType::Switch => (1.5, 0.6),
        ComponentType::Bulb => (1.2, 1.2),
        ComponentType::Led => (1.0, 1.0),
        ComponentType::Capacitor => (1.0, 1.0),
        ComponentType::Inductor => (2.0, 0.6),
    };
    (w * GRID_SIZE, h * GRID_SIZE)
}

fn local_connection_points(ty: ComponentType, half_w: f32, half_h: f32) -> (Vec<Point>, Vec<Point>) {
    let left = Point::new(-half_w, 0.0);
    let right = Point::new(half_w, 0.0);
    match ty {
        ComponentType::Battery
        | ComponentType::Switch
        | ComponentType::Led
        | ComponentType::Capacitor
        | ComponentType::Inductor => (vec![left], vec![right]),
        ComponentType::Resistor => (vec![left, right], vec![left, right]),
        ComponentType::Bulb => (vec![Point::new(0.0, half_h)], vec![Point::new(0.0, -half_h)]),
        ComponentType::Wire => (vec![Point::ZERO], vec![Point::ZERO]),
    }
}

/// Maps a point in the component's unscaled local frame to world space.
pub fn to_world(component: &Component, local: Point) -> Point {
    component.position + (local * component.scale).rotated(component.rotation)
}

/// Inverse of [`to_world`], without undoing the scale.
fn to_local_scaled(component: &Component, world: Point) -> Point {
    (world - component.position).rotated(-component.rotation)
}

fn half_extent(component: &Component) -> (f32, f32) {
    let (w, h) = base_size(component.ty());
    (w / 2.0, h / 2.0)
}

pub fn connection_points(component: &Component) -> ConnectionPoints {
    let (half_w, half_h) = half_extent(component);
    let (input, output) = local_connection_points(component.ty(), half_w, half_h);
    ConnectionPoints {
        input: input.into_iter().map(|p| to_world(component, p)).collect(),
        output: output.into_iter().map(|p| to_world(component, p)).collect(),
    }
}

/// Corners of the scaled, rotated bounding box, clockwise from top-left.
pub fn resize_handles(component: &Component) -> [Point; 4] {
    let (half_w, half_h) = half_extent(component);
    [
        Point::new(-half_w, -half_h),
        Point::new(half_w, -half_h),
        Point::new(half_w, half_h),
        Point::new(-half_w, half_h),
    ]
    .map(|corner| to_world(component, corner))
}

/// Index of the resize handle under `point`, if any.
pub fn hit_resize_handle(component: &Component, point: Point) -> Option<usize> {
    let half = RESIZE_HANDLE_SIZE / 2.0;
    resize_handles(component).iter().position(|handle| {
        (point.x - handle.x).abs() <= half && (point.y - handle.y).abs() <= half
    })
}

/// Body hit test against the scaled, rotated bounding box.
pub fn contains_point(component: &Component, point: Point) -> bool {
    let (half_w, half_h) = half_extent(component);
    let local = to_local_scaled(component, point);
    let s = component.scale;
    local.x.abs() <= half_w * s && local.y.abs() <= half_h * s
}

/// Closest (output of `from`, input of `to`) pair, used as wire endpoints.
pub fn wire_endpoints(from: &Component, to: &Component) -> (Point, Point) {
    let a = connection_points(from).output;
    let b = connection_points(to).input;

    let mut best = (from.position, to.position);
    let mut best_dist = f32::INFINITY;
    for &p in &a {
        for &q in &b {
            let dist = p.distance(q);
            if dist < best_dist {
                best_dist = dist;
                best = (p, q);
            }
        }
    }
    best
}
