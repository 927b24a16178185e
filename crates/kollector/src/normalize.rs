//! Pure derivations over [`Attributes`]: display value and subject selection.
//!
//! Nothing here touches a store or the network, so each function can be
//! called (and tested) on a bare `Attributes` value.
//!
//! ## Estimated value precedence
//!
//! 1. Range slots 0 and 1 both present → `"$lo - $hi"`.
//! 2. Exactly one of them present → `"$v"`.
//! 3. Legacy `estimated_value` string, trimmed, `$`-prefixed if it isn't already.
//! 4. Nothing.

use crate::model::{Attributes, SubjectKind};

pub fn estimated_value_display(attributes: &Attributes) -> Option<String> {
    let slot = |i: usize| attributes.estimated_value_range.get(i).copied().flatten();

    match (slot(0), slot(1)) {
        (Some(low), Some(high)) => Some(format!("{} - {}", format_amount(low), format_amount(high))),
        (Some(value), None) | (None, Some(value)) => Some(format_amount(value)),
        (None, None) => legacy_value(attributes.estimated_value.as_deref()),
    }
}

fn legacy_value(raw: Option<&str>) -> Option<String> {
    let value = raw?.trim();
    if value.is_empty() {
        None
    } else if value.starts_with('$') {
        Some(value.to_string())
    } else {
        Some(format!("${}", value))
    }
}

/// Formats a dollar amount: whole numbers without decimals, anything else
/// with two.
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("${:.0}", value)
    } else {
        format!("${:.2}", value)
    }
}

/// Name of the first AI-classified subject, or an empty string.
pub fn primary_subject(attributes: &Attributes) -> String {
    attributes
        .related_subjects
        .iter()
        .find(|s| s.kind == SubjectKind::AiClassified)
        .map(|s| s.name.clone())
        .unwrap_or_default()
}

/// Subject used when re-querying the lookup service for this item.
pub fn query_subject(attributes: &Attributes) -> Option<String> {
    let primary = primary_subject(attributes);
    if !primary.is_empty() {
        return Some(primary);
    }
    attributes
        .related_subjects
        .iter()
        .find(|s| s.kind == SubjectKind::UserSelectedPrimary)
        .map(|s| s.name.clone())
}
