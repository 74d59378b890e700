use std::collections::BTreeMap;

use super::context::MarketContext;
use super::domain::infer_bedrooms;
use super::result::LowerTierReference;

/// A floorplan's position in the bedroom ladder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloorplanTier {
    pub code: String,
    pub bedrooms: Option<u32>,
}

/// Bedroom count from the trend snapshot, falling back to the code.
pub fn bedrooms_for(code: &str, context: &MarketContext) -> Option<u32> {
    context
        .trend_for(code)
        .and_then(|trend| trend.bedrooms)
        .or_else(|| infer_bedrooms(code))
}

/// Distinct floorplans ordered bedroom-ascending, ties broken by code.
///
/// Floorplans with an unknown bedroom count go last.
pub fn bedroom_order<'a, I>(codes: I, context: &MarketContext) -> Vec<FloorplanTier>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut tiers: Vec<FloorplanTier> = codes
        .into_iter()
        .map(|code| FloorplanTier {
            code: code.to_string(),
            bedrooms: bedrooms_for(code, context),
        })
        .collect();

    tiers.sort_by(|a, b| {
        (a.bedrooms.is_none(), a.bedrooms, &a.code).cmp(&(b.bedrooms.is_none(), b.bedrooms, &b.code))
    });
    tiers.dedup_by(|a, b| a.code == b.code);
    tiers
}

/// Highest resolved reference rent per bedroom count seen so far in a run.
#[derive(Debug, Default)]
pub(crate) struct TierLadder {
    tiers: BTreeMap<u32, LowerTierReference>,
}

impl TierLadder {
    /// Reference from the nearest bedroom count strictly below `bedrooms`.
    pub(crate) fn lower_tier_for(&self, bedrooms: Option<u32>) -> Option<LowerTierReference> {
        let bedrooms = bedrooms?;
        self.tiers
            .range(..bedrooms)
            .next_back()
            .map(|(_, reference)| reference.clone())
    }

    pub(crate) fn record(&mut self, reference: LowerTierReference) {
        let Some(bedrooms) = reference.bedrooms else {
            return;
        };

        match self.tiers.get(&bedrooms) {
            Some(existing) if existing.reference_rent >= reference.reference_rent => {}
            _ => {
                self.tiers.insert(bedrooms, reference);
            }
        }
    }
}
