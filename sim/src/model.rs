use std::fmt;

use crate::geometry::Point;

pub const DEFAULT_BATTERY_VOLTAGE: f64 = 6.0;
pub const DEFAULT_RESISTANCE: f64 = 10.0;
/// Farads
pub const DEFAULT_CAPACITANCE: f64 = 10e-6;
/// Henries
pub const DEFAULT_INDUCTANCE: f64 = 5e-3;

pub const MIN_SCALE: f32 = 0.5;
pub const MAX_SCALE: f32 = 3.0;

/// Stable identifier of a placed component.
#[derive(serde::Deserialize, serde::Serialize)]
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub String);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Fieldless discriminant of [`ComponentKind`], used by palettes and id generation.
#[derive(serde::Deserialize, serde::Serialize)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Battery,
    Resistor,
    Wire,
    Switch,
    Bulb,
    Led,
    Capacitor,
    Inductor,
}

impl ComponentType {
    pub const ALL: [ComponentType; 8] = [
        ComponentType::Battery,
        ComponentType::Resistor,
        ComponentType::Wire,
        ComponentType::Switch,
        ComponentType::Bulb,
        ComponentType::Led,
        ComponentType::Capacitor,
        ComponentType::Inductor,
    ];

    /// Lowercase name, used as the id prefix.
    pub fn slug(self) -> &'static str {
        match self {
            ComponentType::Battery => "battery",
            ComponentType::Resistor => "resistor",
            ComponentType::Wire => "wire",
            ComponentType::Switch => "switch",
            ComponentType::Bulb => "bulb",
            ComponentType::Led => "led",
            ComponentType::Capacitor => "capacitor",
            ComponentType::Inductor => "inductor",
        }
    }
}

#[derive(serde::Deserialize, serde::Serialize)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LedColor {
    #[default]
    Red,
    Green,
    Blue,
    Yellow,
}

impl LedColor {
    pub const ALL: [LedColor; 4] = [LedColor::Red, LedColor::Green, LedColor::Blue, LedColor::Yellow];

    pub fn name(self) -> &'static str {
        match self {
            LedColor::Red => "Red",
            LedColor::Green => "Green",
            LedColor::Blue => "Blue",
            LedColor::Yellow => "Yellow",
        }
    }
}

/// Represents a single circuit element together with its electrical value.
#[derive(serde::Deserialize, serde::Serialize)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ComponentKind {
    /// Volts
    Battery { voltage: f64 },
    /// Ohms
    Resistor { resistance: f64 },
    Wire,
    Switch { on: bool },
    Bulb,
    Led { color: LedColor },
    /// Farads
    Capacitor { capacitance: f64 },
    /// Henries
    Inductor { inductance: f64 },
}

impl ComponentKind {
    pub fn default_for(ty: ComponentType) -> Self {
        match ty {
            ComponentType::Battery => ComponentKind::Battery {
                voltage: DEFAULT_BATTERY_VOLTAGE,
            },
            ComponentType::Resistor => ComponentKind::Resistor {
                resistance: DEFAULT_RESISTANCE,
            },
            ComponentType::Wire => ComponentKind::Wire,
            ComponentType::Switch => ComponentKind::Switch { on: false },
            ComponentType::Bulb => ComponentKind::Bulb,
            ComponentType::Led => ComponentKind::Led {
                color: LedColor::default(),
            },
            ComponentType::Capacitor => ComponentKind::Capacitor {
                capacitance: DEFAULT_CAPACITANCE,
            },
            ComponentType::Inductor => ComponentKind::Inductor {
                inductance: DEFAULT_INDUCTANCE,
            },
        }
    }

    pub fn ty(&self) -> ComponentType {
        match self {
            ComponentKind::Battery { .. } => ComponentType::Battery,
            ComponentKind::Resistor { .. } => ComponentType::Resistor,
            ComponentKind::Wire => ComponentType::Wire,
            ComponentKind::Switch { .. } => ComponentType::Switch,
            ComponentKind::Bulb => ComponentType::Bulb,
            ComponentKind::Led { .. } => ComponentType::Led,
            ComponentKind::Capacitor { .. } => ComponentType::Capacitor,
            ComponentKind::Inductor { .. } => ComponentType::Inductor,
        }
    }

    /// The editable scalar of this component, if it has one.
    pub fn value(&self) -> Option<f64> {
        match *self {
            ComponentKind::Battery { voltage } => Some(voltage),
            ComponentKind::Resistor { resistance } => Some(resistance),
            ComponentKind::Capacitor { capacitance } => Some(capacitance),
            ComponentKind::Inductor { inductance } => Some(inductance),
            ComponentKind::Wire
            | ComponentKind::Switch { .. }
            | ComponentKind::Bulb
            | ComponentKind::Led { .. } => None,
        }
    }

    /// Unit symbol of [`Self::value`]
    pub fn unit(&self) -> Option<char> {
        match self {
            ComponentKind::Battery { .. } => Some('V'),
            ComponentKind::Resistor { .. } => Some('Ω'),
            ComponentKind::Capacitor { .. } => Some('F'),
            ComponentKind::Inductor { .. } => Some('H'),
            _ => None,
        }
    }

    /// Returns false if this kind carries no scalar value.
    pub fn set_value(&mut self, value: f64) -> bool {
        match self {
            ComponentKind::Battery { voltage } => *voltage = value,
            ComponentKind::Resistor { resistance } => *resistance = value,
            ComponentKind::Capacitor { capacitance } => *capacitance = value,
            ComponentKind::Inductor { inductance } => *inductance = value,
            _ => return false,
        }
        true
    }
}

#[derive(serde::Deserialize, serde::Serialize)]
#[derive(Clone, Debug, PartialEq)]
pub struct Component {
    pub id: ComponentId,
    pub kind: ComponentKind,
    pub position: Point,
    /// Degrees
    pub rotation: f32,
    pub scale: f32,
}

impl Component {
    pub fn new(id: ComponentId, kind: ComponentKind, position: Point) -> Self {
        Self {
            id,
            kind,
            position,
            rotation: 0.0,
            scale: 1.0,
        }
    }

    pub fn ty(&self) -> ComponentType {
        self.kind.ty()
    }

    /// Adds a quarter turn, wrapping at 360 degrees.
    pub fn rotate(&mut self) {
        self.rotation = (self.rotation + 90.0).rem_euclid(360.0);
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = clamp_scale(scale);
    }
}

pub fn clamp_scale(scale: f32) -> f32 {
    if scale.is_nan() {
        return MIN_SCALE;
    }
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

/// A directed edge between two components. `current` and `voltage` are
/// rewritten on every topology pass.
#[derive(serde::Deserialize, serde::Serialize)]
#[derive(Clone, Debug, PartialEq)]
pub struct Connection {
    pub from: ComponentId,
    pub to: ComponentId,
    #[serde(default)]
    pub current: f64,
    #[serde(default)]
    pub voltage: f64,
}

impl Connection {
    pub fn new(from: ComponentId, to: ComponentId) -> Self {
        Self {
            from,
            to,
            current: 0.0,
            voltage: 0.0,
        }
    }

    pub fn touches(&self, id: &ComponentId) -> bool {
        &self.from == id || &self.to == id
    }

    /// True if this connection joins `a` and `b` in either direction.
    pub fn joins(&self, a: &ComponentId, b: &ComponentId) -> bool {
        (&self.from == a && &self.to == b) || (&self.from == b && &self.to == a)
    }
}

#[derive(serde::Deserialize, serde::Serialize)]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CircuitState {
    pub components: Vec<Component>,
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub total_voltage: f64,
    #[serde(default)]
    pub total_resistance: f64,
    #[serde(default)]
    pub total_current: f64,
}

impl CircuitState {
    pub fn component(&self, id: &ComponentId) -> Option<&Component> {
        self.components.iter().find(|comp| &comp.id == id)
    }

    pub fn component_mut(&mut self, id: &ComponentId) -> Option<&mut Component> {
        self.components.iter_mut().find(|comp| &comp.id == id)
    }

    pub fn contains(&self, id: &ComponentId) -> bool {
        self.component(id).is_some()
    }

    pub fn is_connected(&self, a: &ComponentId, b: &ComponentId) -> bool {
        self.connections.iter().any(|conn| conn.joins(a, b))
    }

    /// Removes the component and every connection referencing it.
    /// Returns the removed component.
    pub fn remove_component(&mut self, id: &ComponentId) -> Option<Component> {
        let idx = self.components.iter().position(|comp| &comp.id == id)?;
        self.connections.retain(|conn| !conn.touches(id));
        Some(self.components.remove(idx))
    }

    /// Current that actually flows: zero unless the circuit is closed.
    pub fn flowing_current(&self) -> f64 {
        if crate::topology::is_circuit_complete(&self.components) {
            self.total_current
        } else {
            0.0
        }
    }
}

#[derive(serde::Deserialize, serde::Serialize)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Series,
    Parallel,
    Free,
    Challenge,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Series, Mode::Parallel, Mode::Free, Mode::Challenge];

    pub fn name(self) -> &'static str {
        match self {
            Mode::Series => "Series",
            Mode::Parallel => "Parallel",
            Mode::Free => "Free",
            Mode::Challenge => "Challenge",
        }
    }

    pub fn name_bn(self) -> &'static str {
        match self {
            Mode::Series => "শ্রেণি",
            Mode::Parallel => "সমান্তরাল",
            Mode::Free => "মুক্ত",
            Mode::Challenge => "চ্যালেঞ্জ",
        }
    }
}
