//! Value model: subject value coefficients and reward scaling.

use survey_core::{GlobalMultipliers, Location, PrestigeTier, RewardEnvelope, Situation};

/// Scientific value multiplier of a situation at a location.
///
/// Falls back on the location's coefficient table; callers that already hold
/// a recorded subject use the subject's stored value instead.
#[must_use]
pub fn subject_value(situation: Situation, location: &Location) -> f32 {
    location.values().coefficient(situation)
}

/// Computes the full reward/expiry/penalty envelope for a selection.
///
/// `v` is the subject value multiplier. The science payout divides by two
/// when scaling the base value by `v`; the resulting reward never drops below
/// the experiment's base value.
#[must_use]
pub fn reward_envelope(
    base_value: f32,
    v: f32,
    tier: PrestigeTier,
    multipliers: &GlobalMultipliers,
) -> RewardEnvelope {
    let tier_scale = (tier.rank() + 1) as f32;
    RewardEnvelope {
        expiry_min_days: 10.0 * v,
        expiry_max_days: (15.0_f32).max(15.0 * v) * tier_scale,
        deadline_days: 20.0 * v * tier_scale,
        science: base_value.max(base_value * v / 2.0) * multipliers.science,
        reputation_gain: 5.0 * tier_scale,
        reputation_loss: 10.0 * tier_scale,
        funds_forward: 100.0 * v * multipliers.fund_forward,
        funds_reward: 1000.0 * v * multipliers.fund_reward,
        funds_penalty: 500.0 * v * multipliers.fund_penalty,
    }
}
