use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use serde_json::{Number, Value};

/// Builds an exact decimal from an integer count of hundredths, e.g. `hundredths(995)` is 9.95.
pub(crate) fn hundredths(value: i64) -> BigDecimal {
    BigDecimal::new(BigInt::from(value), 2)
}

pub(crate) fn whole(value: i64) -> BigDecimal {
    BigDecimal::new(BigInt::from(value), 0)
}

/// Quantizes to two decimal places, ties rounding away from zero.
pub fn round2(value: &BigDecimal) -> BigDecimal {
    let half = BigDecimal::new(BigInt::from(5), 3);
    let magnitude = (value.abs() + half).with_scale(2);
    if *value < whole(0) {
        -magnitude
    } else {
        magnitude
    }
}

/// Renders a percentage with exactly two decimals (`4.00`).
pub(crate) fn percent_text(value: &BigDecimal) -> String {
    round2(value).to_string()
}

/// JSON float for a rounded percentage. Integral values keep a fractional part (`4.0`).
pub(crate) fn json_percent(value: &BigDecimal) -> Value {
    percent_text(value)
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Float-style text for tabular cells (`80.0`, `66.0`).
pub(crate) fn float_text(value: &BigDecimal) -> String {
    match value.to_string().parse::<f64>() {
        Ok(parsed) => format!("{parsed:?}"),
        Err(_) => value.to_string(),
    }
}
