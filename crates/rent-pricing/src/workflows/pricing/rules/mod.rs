pub(crate) mod baseline;
pub(crate) mod clamp;
pub(crate) mod conversion;
pub(crate) mod terms;
pub(crate) mod trend;

pub(crate) fn finite_positive(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}

pub(crate) fn dollars(value: f64) -> String {
    format!("${value:.2}")
}

pub(crate) fn percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}
