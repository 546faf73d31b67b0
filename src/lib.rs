#![warn(clippy::all, rust_2018_idioms)]

mod app;
pub use app::CircuitApp;
mod camera;
mod circuit_widget;
mod components;
mod error;

fn to_metric_prefix(value: f64, unit: char) -> String {
    let prefixes = [
        (-12, "p"),
        (-9, "n"),
        (-6, "μ"),
        (-3, "m"),
        (0, ""),
        (3, "k"),
        (6, "M"),
        (9, "G"),
    ];

    if value == 0.0 || !value.is_finite() {
        return format!("0 {unit}");
    }

    let exponent = (value.abs().log10() / 3.0).floor() as i32 * 3;
    let prefix = prefixes.iter().find(|&&(e, _)| e == exponent);

    if let Some((e, symbol)) = prefix {
        let scaled = value / 10_f64.powi(*e);
        format!("{} {}{unit}", trim_float(scaled), symbol)
    } else {
        format!("{value:.3e} {unit}") // Fallback in case exponent is out of range
    }
}

/// At most three decimals, without trailing zeros.
fn trim_float(value: f64) -> String {
    let text = format!("{value:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_prefixes() {
        assert_eq!(to_metric_prefix(10e-6, 'F'), "10 μF");
        assert_eq!(to_metric_prefix(5e-3, 'H'), "5 mH");
        assert_eq!(to_metric_prefix(0.6, 'A'), "600 mA");
        assert_eq!(to_metric_prefix(4700.0, 'Ω'), "4.7 kΩ");
        assert_eq!(to_metric_prefix(0.0, 'V'), "0 V");
    }
}
