use soroban_sdk::{Env, Vec};

use crate::errors::MarketError;
use crate::types::PriceTier;

/// Parse the flat wire encoding of instant-rent pricing rules:
/// `[threshold_1, price_1, threshold_2, price_2, ...]`.
///
/// An empty sequence is valid and means auction-only. Rejected inputs:
/// odd length, non-positive or non-increasing thresholds, a threshold
/// beyond the request duration, or a negative price.
pub fn parse_pricing_rules(
    env: &Env,
    flat: &Vec<i128>,
    request_duration: u64,
) -> Result<Vec<PriceTier>, MarketError> {
    if flat.len() % 2 != 0 {
        return Err(MarketError::InvalidInput);
    }

    let mut rules = Vec::new(env);
    let mut previous_threshold: u64 = 0;

    let mut i = 0;
    while i < flat.len() {
        let threshold = flat.get(i).ok_or(MarketError::InvalidInput)?;
        let price = flat.get(i + 1).ok_or(MarketError::InvalidInput)?;

        if threshold <= 0 || threshold > request_duration as i128 {
            return Err(MarketError::InvalidInput);
        }
        let threshold = threshold as u64;
        if threshold <= previous_threshold && i > 0 {
            return Err(MarketError::InvalidInput);
        }
        if price < 0 {
            return Err(MarketError::InvalidInput);
        }

        rules.push_back(PriceTier {
            min_duration: threshold,
            price_per_unit: price,
        });
        previous_threshold = threshold;
        i += 2;
    }

    Ok(rules)
}

/// Select the rule governing an offer of the given duration: the entry
/// with the greatest `min_duration <= duration`. The lower edge of a
/// tier is inclusive; a duration below every threshold matches nothing.
pub fn matching_tier(rules: &Vec<PriceTier>, duration: u64) -> Option<PriceTier> {
    let mut selected = None;
    for tier in rules.iter() {
        if tier.min_duration <= duration {
            selected = Some(tier);
        }
    }
    selected
}

/// Total price floor for a per-unit rate over a duration. `None` on
/// arithmetic overflow, which callers treat as an unmeetable floor.
pub fn per_unit_total(price_per_unit: i128, duration: u64) -> Option<i128> {
    price_per_unit.checked_mul(duration as i128)
}

/// Whether `[start, start + duration]` lies within the request's
/// rental window. Overflowing end times never fit.
pub fn schedule_in_window(
    request_start: u64,
    request_duration: u64,
    offer_start: u64,
    offer_duration: u64,
) -> bool {
    let request_end = match request_start.checked_add(request_duration) {
        Some(end) => end,
        None => return false,
    };
    let offer_end = match offer_start.checked_add(offer_duration) {
        Some(end) => end,
        None => return false,
    };
    offer_start >= request_start && offer_end <= request_end
}
