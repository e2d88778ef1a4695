//! Pure aggregations behind the overview charts.

use std::collections::HashMap;

use crate::domain::email::{Email, Priority};

/// Count per priority tier, always all four tiers in P1..P4 order.
pub fn priority_counts(emails: &[Email]) -> Vec<(&'static str, u64)> {
    Priority::ALL
        .iter()
        .map(|p| {
            let count = emails.iter().filter(|e| e.priority == *p).count() as u64;
            (p.label(), count)
        })
        .collect()
}

/// Intent labels by frequency, most common first; ties break
/// alphabetically so the chart is stable across re-renders.
pub fn intent_counts(emails: &[Email], top: usize) -> Vec<(String, u64)> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for email in emails {
        *counts.entry(email.intent.as_str()).or_default() += 1;
    }
    let mut out: Vec<(String, u64)> = counts
        .into_iter()
        .map(|(intent, n)| (intent.to_string(), n))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out.truncate(top);
    out
}

pub fn urgent_count(emails: &[Email]) -> usize {
    emails.iter().filter(|e| e.priority == Priority::P1).count()
}

pub fn action_count(emails: &[Email]) -> usize {
    emails.iter().filter(|e| e.requires_action).count()
}
