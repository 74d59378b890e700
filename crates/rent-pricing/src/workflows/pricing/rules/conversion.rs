use super::super::domain::LeadsApps;
use super::super::policy::{CONVERSION_HIGH_RATIO, CONVERSION_LOW_RATIO, CONVERSION_NUDGE};
use super::super::result::{PricingReason, ReasonKind};
use super::percent;
use super::trend::TrendSignal;

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionNudge {
    pub nudge: f64,
    pub reasons: Vec<PricingReason>,
}

impl ConversionNudge {
    fn none() -> Self {
        Self {
            nudge: 0.0,
            reasons: Vec::new(),
        }
    }

    pub fn applied(&self) -> bool {
        self.nudge != 0.0
    }
}

/// Lead-to-application steering, only active while occupancy sits inside the band.
///
/// A missing lead source is a no-op rather than an error.
pub fn conversion_nudge(trend: &TrendSignal, leads_apps: Option<LeadsApps>) -> ConversionNudge {
    if !trend.inside_band {
        return ConversionNudge::none();
    }

    let Some(counts) = leads_apps else {
        return ConversionNudge {
            nudge: 0.0,
            reasons: vec![PricingReason::skipped(
                ReasonKind::Conversion,
                "lead/application data unavailable; no conversion nudge".to_string(),
            )],
        };
    };

    let Some(ratio) = counts.conversion_ratio() else {
        return ConversionNudge {
            nudge: 0.0,
            reasons: vec![PricingReason::skipped(
                ReasonKind::Conversion,
                "no leads in lookback window; no conversion nudge".to_string(),
            )],
        };
    };

    let nudge = if ratio > CONVERSION_HIGH_RATIO {
        CONVERSION_NUDGE
    } else if ratio < CONVERSION_LOW_RATIO {
        -CONVERSION_NUDGE
    } else {
        0.0
    };

    let description = format!(
        "{} apps / {} leads (ratio {ratio:.2}): nudge {}",
        counts.apps,
        counts.leads,
        percent(nudge)
    );
    let reason = if nudge == 0.0 {
        PricingReason::skipped(ReasonKind::Conversion, description)
    } else {
        PricingReason::applied(ReasonKind::Conversion, description, Some(nudge))
    };

    ConversionNudge {
        nudge,
        reasons: vec![reason],
    }
}
