//! Series/parallel reduction of a component list.
//!
//! Every function here is total: degenerate input (no components, zero or
//! negative resistance) yields `0.0`, never NaN or infinity.

use crate::model::{CircuitState, Component, ComponentKind, Mode};

/// Forward voltage clamp of an LED, volts
pub const LED_FORWARD_VOLTAGE: f64 = 2.0;
/// Operating voltage clamp of a bulb, volts
pub const BULB_VOLTAGE: f64 = 3.0;

/// Aggregate values shown next to the circuit.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CircuitSummary {
    pub voltage: f64,
    pub resistance: f64,
    pub current: f64,
    pub capacitance: f64,
    pub inductance: f64,
    pub complete: bool,
}

fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

fn sum(values: impl Iterator<Item = f64>) -> f64 {
    finite_or_zero(values.sum())
}

/// 1 / sum(1 / x). Empty input gives zero.
fn reciprocal_sum(values: impl Iterator<Item = f64>) -> f64 {
    let mut any = false;
    let inv: f64 = values
        .inspect(|_| any = true)
        .map(|x| 1.0 / x)
        .sum();
    if !any {
        return 0.0;
    }
    finite_or_zero(1.0 / inv)
}

fn resistances(components: &[Component]) -> impl Iterator<Item = f64> + '_ {
    components.iter().filter_map(|comp| match comp.kind {
        ComponentKind::Resistor { resistance } => Some(resistance),
        _ => None,
    })
}

fn capacitances(components: &[Component]) -> impl Iterator<Item = f64> + '_ {
    components.iter().filter_map(|comp| match comp.kind {
        ComponentKind::Capacitor { capacitance } => Some(capacitance),
        _ => None,
    })
}

fn inductances(components: &[Component]) -> impl Iterator<Item = f64> + '_ {
    components.iter().filter_map(|comp| match comp.kind {
        ComponentKind::Inductor { inductance } => Some(inductance),
        _ => None,
    })
}

/// Free and challenge layouts are reduced as if they were series.
pub fn calculate_total_resistance(components: &[Component], mode: Mode) -> f64 {
    match mode {
        Mode::Parallel => reciprocal_sum(resistances(components)),
        Mode::Series | Mode::Free | Mode::Challenge => sum(resistances(components)),
    }
}

pub fn calculate_total_voltage(components: &[Component]) -> f64 {
    sum(components.iter().filter_map(|comp| match comp.kind {
        ComponentKind::Battery { voltage } => Some(voltage),
        _ => None,
    }))
}

pub fn calculate_total_capacitance(components: &[Component], mode: Mode) -> f64 {
    match mode {
        Mode::Series => reciprocal_sum(capacitances(components)),
        Mode::Parallel | Mode::Free | Mode::Challenge => sum(capacitances(components)),
    }
}

pub fn calculate_total_inductance(components: &[Component], mode: Mode) -> f64 {
    match mode {
        Mode::Parallel => reciprocal_sum(inductances(components)),
        Mode::Series | Mode::Free | Mode::Challenge => sum(inductances(components)),
    }
}

/// Ohm's law. A non-positive resistance gives zero current.
pub fn calculate_current(voltage: f64, resistance: f64) -> f64 {
    if resistance > 0.0 {
        finite_or_zero(voltage / resistance)
    } else {
        0.0
    }
}

/// Needs a battery, a resistor, and every switch closed.
pub fn is_circuit_complete(components: &[Component]) -> bool {
    let has_battery = components
        .iter()
        .any(|comp| matches!(comp.kind, ComponentKind::Battery { .. }));
    let has_resistor = components
        .iter()
        .any(|comp| matches!(comp.kind, ComponentKind::Resistor { .. }));
    let switches_on = components.iter().all(|comp| match comp.kind {
        ComponentKind::Switch { on } => on,
        _ => true,
    });

    has_battery && has_resistor && switches_on
}

pub fn summarize(components: &[Component], mode: Mode) -> CircuitSummary {
    let voltage = calculate_total_voltage(components);
    let resistance = calculate_total_resistance(components, mode);
    CircuitSummary {
        voltage,
        resistance,
        current: calculate_current(voltage, resistance),
        capacitance: calculate_total_capacitance(components, mode),
        inductance: calculate_total_inductance(components, mode),
        complete: is_circuit_complete(components),
    }
}

/// Recomputes the aggregate values and annotates every connection with the
/// voltage drop and current seen at its destination.
pub fn calculate_circuit(state: &CircuitState, mode: Mode) -> CircuitState {
    let total_voltage = calculate_total_voltage(&state.components);
    let total_resistance = calculate_total_resistance(&state.components, mode);
    let total_current = calculate_current(total_voltage, total_resistance);

    let connections = state
        .connections
        .iter()
        .map(|conn| {
            let dest = state.component(&conn.to).map(|comp| comp.kind);

            let voltage = match dest {
                Some(ComponentKind::Resistor { resistance }) => match mode {
                    Mode::Parallel => total_voltage,
                    Mode::Series | Mode::Free | Mode::Challenge => {
                        if total_resistance > 0.0 {
                            finite_or_zero(resistance / total_resistance * total_voltage)
                        } else {
                            0.0
                        }
                    }
                },
                Some(ComponentKind::Led { .. }) => total_voltage.min(LED_FORWARD_VOLTAGE),
                Some(ComponentKind::Bulb) => total_voltage.min(BULB_VOLTAGE),
                _ => 0.0,
            };

            let current = match (mode, dest) {
                (Mode::Parallel, Some(ComponentKind::Resistor { resistance })) => {
                    calculate_current(total_voltage, resistance)
                }
                _ => total_current,
            };

            let mut conn = conn.clone();
            conn.voltage = voltage;
            conn.current = current;
            conn
        })
        .collect();

    CircuitState {
        components: state.components.clone(),
        connections,
        total_voltage,
        total_resistance,
        total_current,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::{
        geometry::Point,
        model::{Component, ComponentKind, ComponentType, Connection},
    };

    fn comp(id: &str, kind: ComponentKind) -> Component {
        Component::new(id.into(), kind, Point::new(0.0, 0.0))
    }

    fn resistor(id: &str, resistance: f64) -> Component {
        comp(id, ComponentKind::Resistor { resistance })
    }

    fn battery(id: &str) -> Component {
        comp(id, ComponentKind::default_for(ComponentType::Battery))
    }

    fn switch(id: &str, on: bool) -> Component {
        comp(id, ComponentKind::Switch { on })
    }

    #[test]
    fn series_resistance_is_sum() {
        let sets: [&[f64]; 4] = [&[10.0], &[10.0, 20.0], &[1.0, 2.0, 3.0, 4.5], &[0.5, 1e3]];
        for set in sets {
            let components: Vec<_> = set
                .iter()
                .enumerate()
                .map(|(i, &r)| resistor(&format!("r{i}"), r))
                .collect();
            assert_relative_eq!(
                calculate_total_resistance(&components, Mode::Series),
                set.iter().sum::<f64>()
            );
        }
    }

    #[test]
    fn parallel_resistance_is_harmonic_and_below_minimum() {
        let sets: [&[f64]; 3] = [&[10.0, 20.0], &[3.0, 3.0, 3.0], &[1.0, 100.0, 47.0]];
        for set in sets {
            let components: Vec<_> = set
                .iter()
                .enumerate()
                .map(|(i, &r)| resistor(&format!("r{i}"), r))
                .collect();
            let total = calculate_total_resistance(&components, Mode::Parallel);
            let expected = 1.0 / set.iter().map(|r| 1.0 / r).sum::<f64>();
            assert_relative_eq!(total, expected);
            let min = set.iter().copied().fold(f64::INFINITY, f64::min);
            assert!(total <= min);
        }
    }

    #[test]
    fn ten_and_twenty_ohm_example() {
        let components = [resistor("a", 10.0), resistor("b", 20.0)];
        assert_relative_eq!(calculate_total_resistance(&components, Mode::Series), 30.0);
        assert_relative_eq!(
            calculate_total_resistance(&components, Mode::Parallel),
            20.0 / 3.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn free_and_challenge_reduce_like_series() {
        let components = [resistor("a", 10.0), resistor("b", 20.0)];
        assert_eq!(calculate_total_resistance(&components, Mode::Free), 30.0);
        assert_eq!(calculate_total_resistance(&components, Mode::Challenge), 30.0);
    }

    #[test]
    fn empty_sets_give_zero() {
        for mode in Mode::ALL {
            assert_eq!(calculate_total_resistance(&[], mode), 0.0);
            assert_eq!(calculate_total_capacitance(&[], mode), 0.0);
            assert_eq!(calculate_total_inductance(&[], mode), 0.0);
        }
        assert_eq!(calculate_total_voltage(&[]), 0.0);

        let state = calculate_circuit(&CircuitState::default(), Mode::Parallel);
        assert_eq!(state.total_current, 0.0);
        assert_eq!(state.total_resistance, 0.0);
    }

    #[test]
    fn zero_resistance_never_produces_nan() {
        assert_eq!(calculate_current(6.0, 0.0), 0.0);
        assert_eq!(calculate_current(-3.0, 0.0), 0.0);
        assert_eq!(calculate_current(6.0, -2.0), 0.0);

        let components = [resistor("a", 0.0), resistor("b", 10.0)];
        let total = calculate_total_resistance(&components, Mode::Parallel);
        assert_eq!(total, 0.0);

        let components = [resistor("a", 10.0), resistor("b", -10.0)];
        assert_eq!(calculate_total_resistance(&components, Mode::Parallel), 0.0);
    }

    #[test]
    fn capacitance_and_inductance_combine_by_mode() {
        let caps = [
            comp("c1", ComponentKind::Capacitor { capacitance: 10e-6 }),
            comp("c2", ComponentKind::Capacitor { capacitance: 10e-6 }),
        ];
        assert_relative_eq!(calculate_total_capacitance(&caps, Mode::Series), 5e-6);
        assert_relative_eq!(calculate_total_capacitance(&caps, Mode::Parallel), 20e-6);
        assert_relative_eq!(calculate_total_capacitance(&caps, Mode::Free), 20e-6);

        let coils = [
            comp("l1", ComponentKind::Inductor { inductance: 4e-3 }),
            comp("l2", ComponentKind::Inductor { inductance: 4e-3 }),
        ];
        assert_relative_eq!(calculate_total_inductance(&coils, Mode::Series), 8e-3);
        assert_relative_eq!(calculate_total_inductance(&coils, Mode::Parallel), 2e-3);
        assert_relative_eq!(calculate_total_inductance(&coils, Mode::Free), 8e-3);
    }

    #[test]
    fn completeness_truth_table() {
        assert!(!is_circuit_complete(&[]));
        assert!(is_circuit_complete(&[battery("b"), resistor("r", 10.0)]));
        assert!(!is_circuit_complete(&[
            battery("b"),
            resistor("r", 10.0),
            switch("s", false)
        ]));
        assert!(is_circuit_complete(&[
            battery("b"),
            resistor("r", 10.0),
            switch("s", true)
        ]));
        assert!(!is_circuit_complete(&[battery("b")]));
    }

    #[test]
    fn battery_and_resistor_example() {
        let state = CircuitState {
            components: vec![battery("b"), resistor("r", 10.0)],
            connections: vec![Connection::new("b".into(), "r".into())],
            ..Default::default()
        };

        let series = calculate_circuit(&state, Mode::Series);
        assert_relative_eq!(series.total_voltage, 6.0);
        assert_relative_eq!(series.total_resistance, 10.0);
        assert_relative_eq!(series.total_current, 0.6);
        assert_relative_eq!(series.connections[0].voltage, 6.0);
        assert_relative_eq!(series.connections[0].current, 0.6);

        let parallel = calculate_circuit(&state, Mode::Parallel);
        assert_relative_eq!(parallel.total_resistance, 10.0);
        assert_relative_eq!(parallel.total_current, 0.6);
    }

    #[test]
    fn connection_annotation_follows_destination() {
        let state = CircuitState {
            components: vec![
                battery("b"),
                resistor("r1", 10.0),
                resistor("r2", 20.0),
                comp("led", ComponentKind::default_for(ComponentType::Led)),
                comp("bulb", ComponentKind::Bulb),
                comp("w", ComponentKind::Wire),
            ],
            connections: vec![
                Connection::new("b".into(), "r1".into()),
                Connection::new("r1".into(), "r2".into()),
                Connection::new("r2".into(), "led".into()),
                Connection::new("led".into(), "bulb".into()),
                Connection::new("bulb".into(), "w".into()),
            ],
            ..Default::default()
        };

        let series = calculate_circuit(&state, Mode::Series);
        assert_relative_eq!(series.connections[0].voltage, 2.0, epsilon = 1e-9);
        assert_relative_eq!(series.connections[1].voltage, 4.0, epsilon = 1e-9);
        assert_relative_eq!(series.connections[2].voltage, 2.0, epsilon = 1e-9);
        assert_relative_eq!(series.connections[3].voltage, 3.0, epsilon = 1e-9);
        assert_eq!(series.connections[4].voltage, 0.0);
        for conn in &series.connections {
            assert_relative_eq!(conn.current, 0.2, epsilon = 1e-9);
        }

        let parallel = calculate_circuit(&state, Mode::Parallel);
        assert_relative_eq!(parallel.connections[0].voltage, 6.0, epsilon = 1e-9);
        assert_relative_eq!(parallel.connections[0].current, 0.6, epsilon = 1e-9);
        assert_relative_eq!(parallel.connections[1].current, 0.3, epsilon = 1e-9);
        assert_relative_eq!(parallel.connections[2].current, parallel.total_current, epsilon = 1e-9);
    }

    #[test]
    fn calculate_circuit_is_idempotent() {
        let state = CircuitState {
            components: vec![battery("b"), resistor("r1", 10.0), resistor("r2", 33.0)],
            connections: vec![
                Connection::new("b".into(), "r1".into()),
                Connection::new("r1".into(), "r2".into()),
            ],
            ..Default::default()
        };
        for mode in Mode::ALL {
            let once = calculate_circuit(&state, mode);
            let twice = calculate_circuit(&once, mode);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn switch_toggle_closes_the_circuit() {
        let mut state = CircuitState {
            components: vec![battery("b"), resistor("r", 10.0), switch("s", false)],
            ..Default::default()
        };
        let open = calculate_circuit(&state, Mode::Series);
        assert!(!is_circuit_complete(&open.components));
        assert_eq!(open.flowing_current(), 0.0);

        state.components[2].kind = ComponentKind::Switch { on: true };
        let closed = calculate_circuit(&state, Mode::Series);
        assert!(is_circuit_complete(&closed.components));
        assert_relative_eq!(closed.total_current, 0.6);
        assert_relative_eq!(closed.flowing_current(), 0.6);
    }

    #[test]
    fn summary_matches_individual_calculations() {
        let components = [battery("b"), resistor("r", 10.0), resistor("r2", 10.0)];
        let summary = summarize(&components, Mode::Parallel);
        assert_relative_eq!(summary.voltage, 6.0);
        assert_relative_eq!(summary.resistance, 5.0);
        assert_relative_eq!(summary.current, 1.2);
        assert!(summary.complete);
    }
}
