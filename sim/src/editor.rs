use crate::{
    geometry::{contains_point, hit_resize_handle, Point, GRID_SIZE},
    model::{
        clamp_scale, CircuitState, Component, ComponentId, ComponentKind, ComponentType,
        Connection, LedColor, Mode,
    },
    topology::calculate_circuit,
};

/// Pointer travel (world units) below which a press-release counts as a click
pub const CLICK_SLOP: f32 = 3.0;

/// Pointer travel per unit of scale while resizing
pub const RESIZE_SENSITIVITY: f32 = 100.0;

/// Axis-aligned area in which components may be placed.
#[derive(serde::Deserialize, serde::Serialize)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub min: Point,
    pub max: Point,
}

impl Viewport {
    pub fn clamp(&self, p: Point) -> Point {
        Point::new(
            p.x.clamp(self.min.x, self.max.x.max(self.min.x)),
            p.y.clamp(self.min.y, self.max.y.max(self.min.y)),
        )
    }
}

#[derive(serde::Deserialize, serde::Serialize)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EditorConfig {
    /// World units between grid lines
    pub grid_size: f32,
    pub snap_to_grid: bool,
    /// Minimum distance between component centres, in grid cells
    pub min_separation: f32,
    /// Set by the host every frame; not persisted.
    #[serde(skip)]
    pub viewport: Option<Viewport>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            snap_to_grid: true,
            min_separation: 1.0,
            viewport: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Held while clicking a component to start a connection
    pub connect: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorKey {
    Delete,
    Rotate,
    Escape,
}

/// What the pointer is currently doing. Selection is tracked separately.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Interaction {
    #[default]
    Idle,
    Dragging {
        id: ComponentId,
        grab_offset: Point,
        press: Point,
        moved: bool,
    },
    Resizing {
        id: ComponentId,
        start: Point,
        start_scale: f32,
    },
    Connecting {
        from: ComponentId,
    },
    Placing {
        ty: ComponentType,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConnectionPreview {
    pub from: ComponentId,
    pub to: Point,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragGhost {
    pub ty: ComponentType,
    pub position: Point,
    /// False if dropping here would be rejected
    pub placeable: bool,
}

/// Owns the circuit and is the only thing allowed to change it.
#[derive(serde::Deserialize, serde::Serialize)]
pub struct CircuitEditor {
    state: CircuitState,
    mode: Mode,
    pub config: EditorConfig,
    selected: Option<ComponentId>,
    next_id: u64,

    #[serde(skip)]
    hovered: Option<ComponentId>,
    #[serde(skip)]
    interaction: Interaction,
    #[serde(skip)]
    pointer: Option<Point>,
    #[serde(skip)]
    connection_preview: Option<ConnectionPreview>,
}

impl Default for CircuitEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl CircuitEditor {
    pub fn new() -> Self {
        Self {
            state: CircuitState::default(),
            mode: Mode::default(),
            config: EditorConfig::default(),
            selected: None,
            next_id: 0,
            hovered: None,
            interaction: Interaction::Idle,
            pointer: None,
            connection_preview: None,
        }
    }

    pub fn state(&self) -> &CircuitState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn selection(&self) -> Option<&ComponentId> {
        self.selected.as_ref()
    }

    pub fn selected_component(&self) -> Option<&Component> {
        self.selected.as_ref().and_then(|id| self.state.component(id))
    }

    pub fn hovered(&self) -> Option<&ComponentId> {
        self.hovered.as_ref()
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn connection_preview(&self) -> Option<&ConnectionPreview> {
        self.connection_preview.as_ref()
    }

    pub fn drag_ghost(&self) -> Option<DragGhost> {
        let Interaction::Placing { ty } = self.interaction else {
            return None;
        };
        let position = self.snap(self.pointer?);
        Some(DragGhost {
            ty,
            position,
            placeable: !self.is_occupied(position),
        })
    }

    /// Topmost component under `pos`.
    pub fn component_at(&self, pos: Point) -> Option<&Component> {
        self.state
            .components
            .iter()
            .rev()
            .find(|comp| contains_point(comp, pos))
    }

    fn recalculate(&mut self) {
        self.state = calculate_circuit(&self.state, self.mode);
    }

    /// Explicit "simulate" action. Recomputes without changing the circuit.
    pub fn simulate(&mut self) {
        self.recalculate();
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            self.mode = mode;
            self.recalculate();
        }
    }

    /// Replaces the whole circuit, e.g. after loading a file.
    /// Components with a repeated id and connections that [`Self::connect`]
    /// would refuse are dropped. Scales are clamped.
    pub fn load_state(&mut self, state: CircuitState, mode: Mode) {
        self.state = sanitize(state);
        self.mode = mode;
        self.selected = None;
        self.hovered = None;
        self.interaction = Interaction::Idle;
        self.connection_preview = None;
        self.next_id = self.state.components.len() as u64;
        self.recalculate();
    }

    pub fn clear(&mut self) {
        self.load_state(CircuitState::default(), self.mode);
        self.next_id = 0;
    }

    fn fresh_id(&mut self, ty: ComponentType) -> ComponentId {
        loop {
            self.next_id += 1;
            let id = ComponentId(format!("{}-{}", ty.slug(), self.next_id));
            if !self.state.contains(&id) {
                return id;
            }
        }
    }

    /// Applies grid snapping and viewport clamping.
    fn snap(&self, pos: Point) -> Point {
        let pos = if self.config.snap_to_grid {
            pos.snapped(self.config.grid_size)
        } else {
            pos
        };
        match &self.config.viewport {
            Some(viewport) => viewport.clamp(pos),
            None => pos,
        }
    }

    fn is_occupied(&self, pos: Point) -> bool {
        let min_dist = self.config.min_separation * self.config.grid_size;
        self.state
            .components
            .iter()
            .any(|comp| comp.position.distance(pos) < min_dist)
    }

    /// Places a new component with default values. Returns `None` if the spot
    /// is taken by another component.
    pub fn add_component(&mut self, ty: ComponentType, pos: Point) -> Option<ComponentId> {
        let pos = self.snap(pos);
        if self.is_occupied(pos) {
            log::debug!("Cannot place {} at ({}, {}): occupied", ty.slug(), pos.x, pos.y);
            return None;
        }

        let id = self.fresh_id(ty);
        self.state.components.push(Component::new(
            id.clone(),
            ComponentKind::default_for(ty),
            pos,
        ));
        self.selected = Some(id.clone());
        self.recalculate();

        Some(id)
    }

    /// Removes a component together with its connections.
    pub fn remove_component(&mut self, id: &ComponentId) -> bool {
        if self.state.remove_component(id).is_none() {
            log::debug!("Cannot remove {id}: no such component");
            return false;
        }

        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        if self.hovered.as_ref() == Some(id) {
            self.hovered = None;
        }
        let interaction_uses_id = match &self.interaction {
            Interaction::Dragging { id: other, .. }
            | Interaction::Resizing { id: other, .. }
            | Interaction::Connecting { from: other } => other == id,
            Interaction::Idle | Interaction::Placing { .. } => false,
        };
        if interaction_uses_id {
            self.interaction = Interaction::Idle;
        }
        if self.connection_preview.as_ref().is_some_and(|p| &p.from == id) {
            self.connection_preview = None;
        }

        self.recalculate();
        true
    }

    /// Quarter turn. Topology does not depend on orientation, so no recompute.
    pub fn rotate_component(&mut self, id: &ComponentId) -> bool {
        match self.state.component_mut(id) {
            Some(comp) => {
                comp.rotate();
                true
            }
            None => false,
        }
    }

    pub fn toggle_switch(&mut self, id: &ComponentId) -> bool {
        let Some(comp) = self.state.component_mut(id) else {
            return false;
        };
        let ComponentKind::Switch { on } = &mut comp.kind else {
            log::debug!("Cannot toggle {id}: not a switch");
            return false;
        };
        *on ^= true;
        self.recalculate();
        true
    }

    /// Clamps to the allowed scale range.
    pub fn set_component_scale(&mut self, id: &ComponentId, scale: f32) -> bool {
        match self.state.component_mut(id) {
            Some(comp) => {
                comp.set_scale(scale);
                true
            }
            None => false,
        }
    }

    /// Sets voltage, resistance, capacitance or inductance.
    pub fn set_component_value(&mut self, id: &ComponentId, value: f64) -> bool {
        let changed = self
            .state
            .component_mut(id)
            .is_some_and(|comp| comp.kind.set_value(value));
        if changed {
            self.recalculate();
        }
        changed
    }

    pub fn set_led_color(&mut self, id: &ComponentId, color: LedColor) -> bool {
        match self.state.component_mut(id).map(|comp| &mut comp.kind) {
            Some(ComponentKind::Led { color: c }) => {
                *c = color;
                true
            }
            _ => false,
        }
    }

    /// Connects two distinct, existing, not yet connected components.
    /// Anything else is ignored.
    pub fn connect(&mut self, from: &ComponentId, to: &ComponentId) -> bool {
        if from == to {
            log::debug!("Ignoring self connection on {from}");
            return false;
        }
        if !self.state.contains(from) || !self.state.contains(to) {
            log::debug!("Ignoring connection {from} -> {to}: missing endpoint");
            return false;
        }
        if self.state.is_connected(from, to) {
            log::debug!("Ignoring duplicate connection {from} -> {to}");
            return false;
        }

        self.state
            .connections
            .push(Connection::new(from.clone(), to.clone()));
        self.recalculate();
        true
    }

    pub fn set_connection_preview(&mut self, from: ComponentId, to: Point) {
        self.connection_preview = Some(ConnectionPreview { from, to });
    }

    pub fn clear_connection_preview(&mut self) {
        self.connection_preview = None;
    }

    pub fn select(&mut self, id: &ComponentId) {
        if self.state.contains(id) {
            self.selected = Some(id.clone());
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn set_hovered(&mut self, id: Option<ComponentId>) {
        self.hovered = id.filter(|id| self.state.contains(id));
    }

    pub fn begin_placement(&mut self, ty: ComponentType) {
        self.connection_preview = None;
        self.interaction = Interaction::Placing { ty };
    }

    /// Drops the pending palette entry at `pos`. The placement stays pending
    /// if the spot is taken.
    pub fn confirm_placement(&mut self, pos: Point) -> Option<ComponentId> {
        let Interaction::Placing { ty } = self.interaction else {
            return None;
        };
        let id = self.add_component(ty, pos)?;
        self.interaction = Interaction::Idle;
        Some(id)
    }

    pub fn cancel_placement(&mut self) {
        if matches!(self.interaction, Interaction::Placing { .. }) {
            self.interaction = Interaction::Idle;
        }
    }

    pub fn pointer_down(&mut self, pos: Point, modifiers: Modifiers) {
        self.pointer = Some(pos);

        match std::mem::take(&mut self.interaction) {
            Interaction::Placing { ty } => {
                self.interaction = Interaction::Placing { ty };
                self.confirm_placement(pos);
                return;
            }
            Interaction::Connecting { from } => {
                self.connection_preview = None;
                match self.component_at(pos).map(|comp| comp.id.clone()) {
                    Some(to) => {
                        self.connect(&from, &to);
                    }
                    None => log::debug!("Connection from {from} cancelled"),
                }
                return;
            }
            // A missed pointer-up leaves these behind; drop them.
            Interaction::Idle | Interaction::Dragging { .. } | Interaction::Resizing { .. } => {}
        }

        let resize = self
            .selected_component()
            .filter(|comp| hit_resize_handle(comp, pos).is_some())
            .map(|comp| (comp.id.clone(), comp.scale));
        if let Some((id, start_scale)) = resize {
            self.interaction = Interaction::Resizing {
                id,
                start: pos,
                start_scale,
            };
            return;
        }

        let Some((id, grab_offset)) = self
            .component_at(pos)
            .map(|comp| (comp.id.clone(), comp.position - pos))
        else {
            self.selected = None;
            return;
        };

        self.selected = Some(id.clone());

        if modifiers.connect {
            self.connection_preview = Some(ConnectionPreview {
                from: id.clone(),
                to: pos,
            });
            self.interaction = Interaction::Connecting { from: id };
        } else {
            self.interaction = Interaction::Dragging {
                id,
                grab_offset,
                press: pos,
                moved: false,
            };
        }
    }

    pub fn pointer_move(&mut self, pos: Point) {
        self.pointer = Some(pos);
        self.hovered = self.component_at(pos).map(|comp| comp.id.clone());

        match self.interaction.clone() {
            Interaction::Dragging {
                id,
                grab_offset,
                press,
                moved,
            } => {
                if !moved && pos.distance(press) < CLICK_SLOP {
                    return;
                }
                let target = self.snap(pos + grab_offset);
                if let Some(comp) = self.state.component_mut(&id) {
                    comp.position = target;
                }
                self.interaction = Interaction::Dragging {
                    id,
                    grab_offset,
                    press,
                    moved: true,
                };
            }
            Interaction::Resizing {
                id,
                start,
                start_scale,
            } => {
                if let Some(comp) = self.state.component_mut(&id) {
                    let center = comp.position;
                    let outward = pos.distance(center) >= start.distance(center);
                    let dist = pos.distance(start);
                    let signed = if outward { dist } else { -dist };
                    comp.scale = clamp_scale(start_scale + signed / RESIZE_SENSITIVITY);
                }
            }
            Interaction::Connecting { from } => {
                self.set_connection_preview(from, pos);
            }
            Interaction::Idle | Interaction::Placing { .. } => {}
        }
    }

    pub fn pointer_up(&mut self, pos: Point) {
        self.pointer = Some(pos);

        match std::mem::take(&mut self.interaction) {
            Interaction::Dragging { id, moved, .. } => {
                let is_switch = self
                    .state
                    .component(&id)
                    .is_some_and(|comp| comp.ty() == ComponentType::Switch);
                if !moved && is_switch {
                    self.toggle_switch(&id);
                } else {
                    self.recalculate();
                }
            }
            Interaction::Resizing { .. } => self.recalculate(),
            other => self.interaction = other,
        }
    }

    pub fn key(&mut self, key: EditorKey) {
        match key {
            EditorKey::Delete => {
                if let Some(id) = self.selected.clone() {
                    self.remove_component(&id);
                }
            }
            EditorKey::Rotate => {
                if let Some(id) = self.selected.clone() {
                    self.rotate_component(&id);
                }
            }
            EditorKey::Escape => {
                self.selected = None;
                self.connection_preview = None;
                if matches!(
                    self.interaction,
                    Interaction::Connecting { .. } | Interaction::Placing { .. }
                ) {
                    self.interaction = Interaction::Idle;
                }
            }
        }
    }
}

fn sanitize(state: CircuitState) -> CircuitState {
    let CircuitState {
        components,
        connections,
        ..
    } = state;

    let mut clean = CircuitState::default();
    for mut comp in components {
        if clean.contains(&comp.id) {
            log::debug!("Dropping component with repeated id {}", comp.id);
            continue;
        }
        comp.scale = clamp_scale(comp.scale);
        clean.components.push(comp);
    }

    for conn in connections {
        if conn.from == conn.to {
            log::debug!("Dropping self connection on {}", conn.from);
        } else if !clean.contains(&conn.from) || !clean.contains(&conn.to) {
            log::debug!("Dropping connection {} -> {}: missing endpoint", conn.from, conn.to);
        } else if clean.is_connected(&conn.from, &conn.to) {
            log::debug!("Dropping duplicate connection {} -> {}", conn.from, conn.to);
        } else {
            clean.connections.push(conn);
        }
    }

    clean
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::resize_handles;

    const SHIFT: Modifiers = Modifiers { connect: true };

    fn editor() -> CircuitEditor {
        CircuitEditor::new()
    }

    fn add(editor: &mut CircuitEditor, ty: ComponentType, x: f32, y: f32) -> ComponentId {
        editor
            .add_component(ty, Point::new(x, y))
            .expect("free spot")
    }

    #[test]
    fn ids_are_unique_and_typed() {
        let mut ed = editor();
        let a = add(&mut ed, ComponentType::Battery, 0.0, 0.0);
        let b = add(&mut ed, ComponentType::Resistor, 200.0, 0.0);
        assert_ne!(a, b);
        assert!(a.0.starts_with("battery-"));
        assert!(b.0.starts_with("resistor-"));
        assert_eq!(ed.selection(), Some(&b));
    }

    #[test]
    fn adding_recomputes_totals() {
        let mut ed = editor();
        add(&mut ed, ComponentType::Battery, 0.0, 0.0);
        add(&mut ed, ComponentType::Resistor, 200.0, 0.0);
        assert_relative_eq!(ed.state().total_voltage, 6.0);
        assert_relative_eq!(ed.state().total_resistance, 10.0);
        assert_relative_eq!(ed.state().total_current, 0.6);
    }

    #[test]
    fn placement_snaps_and_rejects_occupied_spots() {
        let mut ed = editor();
        let id = add(&mut ed, ComponentType::Resistor, 61.0, 19.0);
        assert_eq!(ed.state().component(&id).unwrap().position, Point::new(80.0, 0.0));

        assert!(ed.add_component(ComponentType::Bulb, Point::new(85.0, 5.0)).is_none());
        assert_eq!(ed.state().components.len(), 1);

        ed.config.snap_to_grid = false;
        let id = add(&mut ed, ComponentType::Bulb, 200.5, 3.0);
        assert_eq!(ed.state().component(&id).unwrap().position, Point::new(200.5, 3.0));
    }

    #[test]
    fn placement_is_clamped_to_viewport() {
        let mut ed = editor();
        ed.config.viewport = Some(Viewport {
            min: Point::new(0.0, 0.0),
            max: Point::new(400.0, 300.0),
        });
        let id = add(&mut ed, ComponentType::Battery, 900.0, -50.0);
        assert_eq!(ed.state().component(&id).unwrap().position, Point::new(400.0, 0.0));
    }

    #[test]
    fn connections_reject_self_duplicates_and_missing() {
        let mut ed = editor();
        let a = add(&mut ed, ComponentType::Battery, 0.0, 0.0);
        let b = add(&mut ed, ComponentType::Resistor, 200.0, 0.0);

        assert!(ed.connect(&a, &b));
        assert!(!ed.connect(&a, &b));
        assert!(!ed.connect(&b, &a));
        assert!(!ed.connect(&a, &a));
        assert!(!ed.connect(&a, &"ghost-1".into()));
        assert_eq!(ed.state().connections.len(), 1);
        assert_relative_eq!(ed.state().connections[0].current, 0.6);
    }

    #[test]
    fn removing_drops_connections_and_selection() {
        let mut ed = editor();
        let a = add(&mut ed, ComponentType::Battery, 0.0, 0.0);
        let b = add(&mut ed, ComponentType::Resistor, 200.0, 0.0);
        let c = add(&mut ed, ComponentType::Bulb, 400.0, 0.0);
        ed.connect(&a, &b);
        ed.connect(&b, &c);
        ed.connect(&c, &a);

        ed.select(&b);
        ed.key(EditorKey::Delete);

        assert!(ed.selection().is_none());
        assert!(!ed.state().contains(&b));
        assert!(ed.state().connections.iter().all(|conn| !conn.touches(&b)));
        assert_eq!(ed.state().connections.len(), 1);
        assert_eq!(ed.state().total_resistance, 0.0);
        assert_eq!(ed.state().total_current, 0.0);

        assert!(!ed.remove_component(&b));
    }

    #[test]
    fn rotate_key_wraps_after_four_turns() {
        let mut ed = editor();
        let id = add(&mut ed, ComponentType::Battery, 0.0, 0.0);
        ed.key(EditorKey::Rotate);
        assert_eq!(ed.state().component(&id).unwrap().rotation, 90.0);
        for _ in 0..3 {
            ed.key(EditorKey::Rotate);
        }
        assert_eq!(ed.state().component(&id).unwrap().rotation, 0.0);
    }

    #[test]
    fn scale_requests_are_clamped() {
        let mut ed = editor();
        let id = add(&mut ed, ComponentType::Resistor, 0.0, 0.0);
        ed.set_component_scale(&id, 10.0);
        assert_eq!(ed.state().component(&id).unwrap().scale, 3.0);
        ed.set_component_scale(&id, -5.0);
        assert_eq!(ed.state().component(&id).unwrap().scale, 0.5);
    }

    #[test]
    fn drag_follows_pointer_with_snapping() {
        let mut ed = editor();
        let id = add(&mut ed, ComponentType::Resistor, 0.0, 0.0);
        ed.clear_selection();

        ed.pointer_down(Point::new(5.0, 0.0), Modifiers::default());
        assert!(matches!(ed.interaction(), Interaction::Dragging { .. }));
        assert_eq!(ed.selection(), Some(&id));

        ed.pointer_move(Point::new(85.0, 3.0));
        assert_eq!(ed.state().component(&id).unwrap().position, Point::new(80.0, 0.0));

        ed.pointer_up(Point::new(85.0, 3.0));
        assert_eq!(ed.interaction(), &Interaction::Idle);
        assert_eq!(ed.state().component(&id).unwrap().position, Point::new(80.0, 0.0));
    }

    #[test]
    fn resize_handle_maps_distance_to_scale() {
        let mut ed = editor();
        ed.config.snap_to_grid = false;
        let id = add(&mut ed, ComponentType::Resistor, 0.0, 0.0);

        let corner = resize_handles(ed.state().component(&id).unwrap())[2];
        ed.pointer_down(corner, Modifiers::default());
        assert!(matches!(ed.interaction(), Interaction::Resizing { .. }));

        // 50 units further out than the corner
        ed.pointer_move(Point::new(corner.x + 50.0, corner.y));
        assert_relative_eq!(ed.state().component(&id).unwrap().scale, 1.5, epsilon = 1e-4);

        ed.pointer_move(Point::new(corner.x + 1000.0, corner.y));
        assert_eq!(ed.state().component(&id).unwrap().scale, 3.0);

        ed.pointer_move(Point::new(0.0, 0.0));
        assert!(ed.state().component(&id).unwrap().scale < 1.0);

        ed.pointer_up(Point::new(0.0, 0.0));
        assert_eq!(ed.interaction(), &Interaction::Idle);
    }

    #[test]
    fn connect_gesture_creates_one_connection() {
        let mut ed = editor();
        let a = add(&mut ed, ComponentType::Battery, 0.0, 0.0);
        let b = add(&mut ed, ComponentType::Resistor, 200.0, 0.0);

        for _ in 0..2 {
            ed.pointer_down(Point::new(0.0, 0.0), SHIFT);
            assert_eq!(ed.interaction(), &Interaction::Connecting { from: a.clone() });

            ed.pointer_move(Point::new(120.0, 10.0));
            assert_eq!(
                ed.connection_preview(),
                Some(&ConnectionPreview {
                    from: a.clone(),
                    to: Point::new(120.0, 10.0)
                })
            );

            ed.pointer_down(Point::new(200.0, 0.0), Modifiers::default());
            ed.pointer_up(Point::new(200.0, 0.0));
            assert_eq!(ed.interaction(), &Interaction::Idle);
            assert!(ed.connection_preview().is_none());
        }

        assert_eq!(ed.state().connections.len(), 1);
        assert!(ed.state().is_connected(&a, &b));
    }

    #[test]
    fn connect_gesture_aborts_on_empty_space_and_self() {
        let mut ed = editor();
        add(&mut ed, ComponentType::Battery, 0.0, 0.0);
        add(&mut ed, ComponentType::Resistor, 200.0, 0.0);

        ed.pointer_down(Point::new(0.0, 0.0), SHIFT);
        ed.pointer_down(Point::new(100.0, 300.0), Modifiers::default());
        assert_eq!(ed.interaction(), &Interaction::Idle);

        ed.pointer_down(Point::new(0.0, 0.0), SHIFT);
        ed.pointer_down(Point::new(0.0, 0.0), Modifiers::default());
        assert!(ed.state().connections.is_empty());

        ed.pointer_down(Point::new(0.0, 0.0), SHIFT);
        ed.key(EditorKey::Escape);
        assert_eq!(ed.interaction(), &Interaction::Idle);
        assert!(ed.connection_preview().is_none());
        assert!(ed.state().connections.is_empty());
    }

    #[test]
    fn placing_shows_ghost_and_escape_cancels() {
        let mut ed = editor();
        add(&mut ed, ComponentType::Battery, 0.0, 0.0);
        let before = ed.state().clone();

        ed.begin_placement(ComponentType::Led);
        ed.pointer_move(Point::new(10.0, 10.0));
        let ghost = ed.drag_ghost().expect("ghost");
        assert_eq!(ghost.ty, ComponentType::Led);
        assert_eq!(ghost.position, Point::new(0.0, 0.0));
        assert!(!ghost.placeable);

        // Occupied: placement stays pending
        ed.pointer_down(Point::new(10.0, 10.0), Modifiers::default());
        assert!(matches!(ed.interaction(), Interaction::Placing { .. }));
        assert_eq!(ed.state(), &before);

        ed.key(EditorKey::Escape);
        assert!(ed.drag_ghost().is_none());
        assert_eq!(ed.state(), &before);

        ed.begin_placement(ComponentType::Led);
        ed.pointer_down(Point::new(160.0, 0.0), Modifiers::default());
        assert_eq!(ed.state().components.len(), 2);
        assert_eq!(ed.interaction(), &Interaction::Idle);
    }

    #[test]
    fn clicking_a_switch_toggles_it() {
        let mut ed = editor();
        add(&mut ed, ComponentType::Battery, 0.0, 0.0);
        add(&mut ed, ComponentType::Resistor, 200.0, 0.0);
        let switch = add(&mut ed, ComponentType::Switch, 400.0, 0.0);
        ed.clear_selection();
        assert!(!crate::topology::is_circuit_complete(&ed.state().components));

        // One click on an unselected switch selects and flips it
        ed.pointer_down(Point::new(400.0, 0.0), Modifiers::default());
        ed.pointer_up(Point::new(400.0, 0.0));
        assert_eq!(ed.selection(), Some(&switch));
        assert_eq!(
            ed.state().component(&switch).unwrap().kind,
            ComponentKind::Switch { on: true }
        );
        assert!(crate::topology::is_circuit_complete(&ed.state().components));
        assert_relative_eq!(ed.state().flowing_current(), 0.6);

        ed.pointer_down(Point::new(400.0, 0.0), Modifiers::default());
        ed.pointer_up(Point::new(400.0, 0.0));
        assert_eq!(
            ed.state().component(&switch).unwrap().kind,
            ComponentKind::Switch { on: false }
        );
        assert_eq!(ed.state().flowing_current(), 0.0);
    }

    #[test]
    fn mode_change_recomputes() {
        let mut ed = editor();
        add(&mut ed, ComponentType::Battery, 0.0, 0.0);
        let r1 = add(&mut ed, ComponentType::Resistor, 200.0, 0.0);
        let r2 = add(&mut ed, ComponentType::Resistor, 400.0, 0.0);
        ed.set_component_value(&r2, 20.0);
        assert_relative_eq!(ed.state().total_resistance, 30.0);

        ed.set_mode(Mode::Parallel);
        assert_relative_eq!(ed.state().total_resistance, 20.0 / 3.0, epsilon = 1e-9);
        assert_relative_eq!(ed.state().total_current, 0.9, epsilon = 1e-9);

        assert!(!ed.set_component_value(&"nope".into(), 1.0));
        assert!(ed.set_component_value(&r1, 20.0));
        assert_relative_eq!(ed.state().total_resistance, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn simulate_is_idempotent() {
        let mut ed = editor();
        let a = add(&mut ed, ComponentType::Battery, 0.0, 0.0);
        let b = add(&mut ed, ComponentType::Resistor, 200.0, 0.0);
        ed.connect(&a, &b);
        let once = ed.state().clone();
        ed.simulate();
        assert_eq!(ed.state(), &once);
    }

    #[test]
    fn loaded_state_keeps_ids_unique() {
        let mut ed = editor();
        add(&mut ed, ComponentType::Battery, 0.0, 0.0);
        add(&mut ed, ComponentType::Battery, 200.0, 0.0);
        let saved = ed.state().clone();

        let mut other = editor();
        other.load_state(saved, Mode::Series);
        let id = add(&mut other, ComponentType::Battery, 400.0, 0.0);
        let count = other
            .state()
            .components
            .iter()
            .filter(|comp| comp.id == id)
            .count();
        assert_eq!(count, 1);
        assert_relative_eq!(other.state().total_voltage, 18.0);
    }

    #[test]
    fn hover_tracks_pointer() {
        let mut ed = editor();
        let id = add(&mut ed, ComponentType::Bulb, 0.0, 0.0);
        ed.pointer_move(Point::new(3.0, 3.0));
        assert_eq!(ed.hovered(), Some(&id));
        ed.pointer_move(Point::new(300.0, 3.0));
        assert!(ed.hovered().is_none());
        ed.set_hovered(Some("ghost".into()));
        assert!(ed.hovered().is_none());
    }

    #[test]
    fn loading_drops_invalid_items() {
        let a = ComponentId::from("a");
        let b = ComponentId::from("b");
        let mut resistor = Component::new(
            a.clone(),
            ComponentKind::default_for(ComponentType::Resistor),
            Point::new(0.0, 0.0),
        );
        resistor.scale = 10.0;
        let battery = Component::new(
            b.clone(),
            ComponentKind::default_for(ComponentType::Battery),
            Point::new(200.0, 0.0),
        );
        let shadow = Component::new(
            b.clone(),
            ComponentKind::default_for(ComponentType::Wire),
            Point::new(400.0, 0.0),
        );

        let state = CircuitState {
            components: vec![resistor, battery, shadow],
            connections: vec![
                Connection::new(a.clone(), a.clone()),
                Connection::new(a.clone(), b.clone()),
                Connection::new(b.clone(), a.clone()),
                Connection::new(a.clone(), "ghost".into()),
            ],
            ..Default::default()
        };

        let mut ed = editor();
        ed.load_state(state, Mode::Series);

        let state = ed.state();
        assert_eq!(state.components.len(), 2);
        assert_eq!(state.component(&a).unwrap().scale, 3.0);
        assert_eq!(
            state.component(&b).unwrap().ty(),
            ComponentType::Battery
        );
        assert_eq!(state.connections.len(), 1);
        assert!(state.connections[0].joins(&a, &b));
        assert_eq!(state.connections[0].from, a);
    }
}
