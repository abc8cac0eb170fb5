//! Tier classification
//!
//! Derives the single classification tier for an event from its validated
//! answers. Tiers are ordered ascending by weight; the lowest-weight tier
//! flagged by a true answer wins, and with nothing flagged the event falls
//! back to the highest-weight tier (the bottom of the hierarchy).

use super::validator::ValidatedAnswer;
use evq_common::db::models::Tier;

/// Resolve the classification tier for a set of validated answers.
///
/// Returns `None` only when the tier catalog is empty, in which case no
/// default exists. Answers owned by a tier id that is not in the catalog
/// set no flag, so the result is always a configured tier id.
pub fn classify(answers: &[ValidatedAnswer], tiers: &[Tier]) -> Option<String> {
    // Ascending weight; stable sort keeps catalog order for equal weights
    let mut ordered: Vec<&Tier> = tiers.iter().collect();
    ordered.sort_by_key(|tier| tier.weight);

    let mut flags: Vec<(&str, bool)> = ordered.iter().map(|tier| (tier.id.as_str(), false)).collect();

    for answer in answers.iter().filter(|a| a.response) {
        if let Some(flag) = flags.iter_mut().find(|(id, _)| *id == answer.question.tier) {
            // Multiple true answers on one tier are idempotent
            flag.1 = true;
        }
    }

    // Default: the last tier in ascending-weight order
    let mut resolved = flags.last().map(|(id, _)| *id)?;

    // Override: first flagged tier in ascending-weight order
    for &(id, flagged) in &flags {
        if flagged {
            resolved = id;
            break;
        }
    }

    Some(resolved.to_string())
}
