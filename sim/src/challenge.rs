//! Target-matching puzzles built on top of the live circuit totals.

use crate::{
    model::{CircuitState, Mode},
    topology::is_circuit_complete,
};

/// Relative error accepted when comparing against a target
pub const TOLERANCE: f64 = 0.05;

#[derive(serde::Deserialize, serde::Serialize)]
#[derive(Clone, Debug, PartialEq)]
pub struct Challenge {
    pub title_en: String,
    pub title_bn: String,
    pub mode: Mode,
    /// Ohms
    pub total_resistance: Option<f64>,
    /// Volts
    pub total_voltage: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
    /// Not judged yet: the circuit is open or built in the wrong mode
    Warning,
}

impl Verdict {
    pub fn message_en(self) -> &'static str {
        match self {
            Verdict::Pass => "Correct! Target reached.",
            Verdict::Fail => "Not yet. Adjust your components.",
            Verdict::Warning => "Complete the circuit in the right mode first.",
        }
    }

    pub fn message_bn(self) -> &'static str {
        match self {
            Verdict::Pass => "সঠিক! লক্ষ্য পূরণ হয়েছে।",
            Verdict::Fail => "এখনও হয়নি। উপাদানগুলো পরিবর্তন করো।",
            Verdict::Warning => "আগে সঠিক মোডে বর্তনীটি সম্পূর্ণ করো।",
        }
    }
}

fn within_tolerance(actual: f64, target: f64) -> bool {
    if target == 0.0 {
        return actual.abs() <= TOLERANCE;
    }
    ((actual - target) / target).abs() <= TOLERANCE
}

impl Challenge {
    fn new(title_en: &str, title_bn: &str, mode: Mode, r: Option<f64>, v: Option<f64>) -> Self {
        Self {
            title_en: title_en.to_string(),
            title_bn: title_bn.to_string(),
            mode,
            total_resistance: r,
            total_voltage: v,
        }
    }

    pub fn presets() -> Vec<Challenge> {
        vec![
            Challenge::new(
                "Make 30 Ω in series",
                "শ্রেণি সংযোগে ৩০ Ω তৈরি করো",
                Mode::Series,
                Some(30.0),
                None,
            ),
            Challenge::new(
                "Make 5 Ω in parallel",
                "সমান্তরাল সংযোগে ৫ Ω তৈরি করো",
                Mode::Parallel,
                Some(5.0),
                None,
            ),
            Challenge::new(
                "12 V across 40 Ω",
                "৪০ Ω রোধে ১২ V",
                Mode::Series,
                Some(40.0),
                Some(12.0),
            ),
        ]
    }

    /// Compares the live totals with this challenge's targets.
    pub fn evaluate(&self, state: &CircuitState, mode: Mode) -> Verdict {
        let mode_ok = mode == self.mode || mode == Mode::Challenge;
        if !mode_ok || !is_circuit_complete(&state.components) {
            return Verdict::Warning;
        }

        let resistance_ok = self
            .total_resistance
            .map_or(true, |target| within_tolerance(state.total_resistance, target));
        let voltage_ok = self
            .total_voltage
            .map_or(true, |target| within_tolerance(state.total_voltage, target));

        if resistance_ok && voltage_ok {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }
}
