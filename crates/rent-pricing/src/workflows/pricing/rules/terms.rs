use chrono::{Months, NaiveDate};

use super::super::domain::month_index;
use super::super::policy::{
    PricingConfig, SHORT_TERM_BASE_PREMIUM, SHORT_TERM_CUTOFF, SHORT_TERM_PREMIUM_STEP,
};
use super::super::result::{PricingReason, ReasonKind, TermPrice};
use super::{dollars, percent};

#[derive(Debug, Clone, Copy)]
pub struct TermInputs {
    pub clamped_baseline: f64,
    /// No term may be discounted below this rent.
    pub hard_minimum: f64,
    pub vacant_days: i64,
    pub available_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TermSchedule {
    pub terms: Vec<TermPrice>,
    pub reasons: Vec<PricingReason>,
    pub seasonality_applied: bool,
    pub vacancy_discount_applied: bool,
    pub vacancy_discount_limited: bool,
}

pub fn short_term_premium(term: u32) -> f64 {
    if term >= SHORT_TERM_CUTOFF {
        return 0.0;
    }

    (SHORT_TERM_BASE_PREMIUM - (f64::from(term) - 2.0) * SHORT_TERM_PREMIUM_STEP).max(0.0)
}

/// Zero-based month in which a lease of `term` months starting on `start` ends.
pub fn term_end_month(start: NaiveDate, term: u32) -> usize {
    let end = start.checked_add_months(Months::new(term)).unwrap_or(start);
    month_index(end)
}

/// Expand a clamped baseline into one rounded price per configured term.
pub fn price_terms(inputs: &TermInputs, config: &PricingConfig) -> TermSchedule {
    let vacancy_discount = config.vacancy_age.discount(inputs.vacant_days.max(0));
    let floor_price = inputs.hard_minimum.round();

    let mut terms = Vec::with_capacity(config.available_terms.len());
    let mut seasonal_terms = Vec::new();
    let mut premium_terms = 0usize;
    let mut limited = false;

    for &term in &config.available_terms {
        let premium = short_term_premium(term);
        let over_cap = term > config.reference_term;
        let seasonality = if over_cap {
            config
                .seasonality
                .uplift(term_end_month(inputs.available_on, term))
        } else {
            0.0
        };

        let multiplier = 1.0 + premium + seasonality - vacancy_discount;
        let mut price = (inputs.clamped_baseline * multiplier).max(0.0).round();
        if vacancy_discount > 0.0 && price < floor_price {
            price = floor_price;
            limited = true;
        }

        if premium > 0.0 {
            premium_terms += 1;
        }
        if seasonality > 0.0 {
            seasonal_terms.push(term);
        }

        terms.push(TermPrice {
            term,
            price,
            short_term_premium: premium,
            seasonality_uplift: seasonality,
            vacancy_discount,
            over_cap,
        });
    }

    let mut reasons = Vec::new();
    if premium_terms > 0 {
        let largest = terms
            .iter()
            .map(|entry| entry.short_term_premium)
            .fold(0.0, f64::max);
        reasons.push(PricingReason::applied(
            ReasonKind::ShortTermPremium,
            format!(
                "short-term premium on {premium_terms} term(s), up to {}",
                percent(largest)
            ),
            Some(largest),
        ));
    }

    if !seasonal_terms.is_empty() {
        let listed = seasonal_terms
            .iter()
            .map(|term| term.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        reasons.push(PricingReason::applied(
            ReasonKind::Seasonality,
            format!("seasonal uplift on over-cap term(s) {listed}"),
            None,
        ));
    }

    if vacancy_discount > 0.0 {
        reasons.push(PricingReason::applied(
            ReasonKind::VacancyDiscount,
            format!(
                "vacant {} days (threshold {}): discount {}",
                inputs.vacant_days,
                config.vacancy_age.threshold_days,
                percent(vacancy_discount)
            ),
            Some(vacancy_discount),
        ));
    }

    if limited {
        reasons.push(PricingReason::applied(
            ReasonKind::VacancyDiscount,
            format!("vacancy discount limited by price minimum {}", dollars(floor_price)),
            Some(floor_price),
        ));
    }

    TermSchedule {
        terms,
        reasons,
        seasonality_applied: !seasonal_terms.is_empty(),
        vacancy_discount_applied: vacancy_discount > 0.0,
        vacancy_discount_limited: limited,
    }
}
