//! Circuit engine for the BigganBondhu circuit lab.
//!
//! - [`model`]: components, connections and the aggregate [`CircuitState`]
//! - [`topology`]: series/parallel reduction and per-connection annotation
//! - [`geometry`]: terminal positions, resize handles and hit testing
//! - [`editor`]: the interactive state machine that owns the circuit
//!
//! The engine never fails: degenerate circuits reduce to zero and invalid
//! edits are ignored.

pub mod challenge;
pub mod editor;
pub mod geometry;
pub mod model;
pub mod palette;
pub mod topology;

pub use editor::{CircuitEditor, EditorConfig, EditorKey, Interaction, Modifiers};
pub use geometry::{connection_points, ConnectionPoints, Point};
pub use model::{
    CircuitState, Component, ComponentId, ComponentKind, ComponentType, Connection, LedColor,
    Mode,
};
pub use topology::{
    calculate_circuit, calculate_current, calculate_total_capacitance,
    calculate_total_inductance, calculate_total_resistance, calculate_total_voltage,
    is_circuit_complete,
};
