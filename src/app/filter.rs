//! Inbox category filters.
//!
//! A declarative table mapping each filter chip to a predicate over an
//! email's priority, requires_action flag, and intent label. The mapping
//! is total: a category with no table entry falls back to a
//! case-insensitive substring match of the category name against the
//! intent, so new chips degrade predictably instead of panicking.

use crate::domain::email::{Email, Priority};

/// Filter chips offered in the inbox, in display order.
pub const CATEGORIES: &[&str] = &[
    "All", "Urgent", "Action", "Updates", "Finance", "Work", "Personal",
];

enum Rule {
    All,
    PriorityIn(&'static [Priority]),
    RequiresAction,
    IntentAny(&'static [&'static str]),
}

struct CategoryRule {
    name: &'static str,
    rule: Rule,
}

const RULES: &[CategoryRule] = &[
    CategoryRule {
        name: "All",
        rule: Rule::All,
    },
    CategoryRule {
        name: "Urgent",
        rule: Rule::PriorityIn(&[Priority::P1]),
    },
    CategoryRule {
        name: "Action",
        rule: Rule::RequiresAction,
    },
    CategoryRule {
        name: "Updates",
        rule: Rule::PriorityIn(&[Priority::P3, Priority::P4]),
    },
    CategoryRule {
        name: "Finance",
        rule: Rule::IntentAny(&["finance", "invoice", "payment", "billing", "bank"]),
    },
    CategoryRule {
        name: "Work",
        rule: Rule::IntentAny(&["work", "project", "meeting", "deadline", "report"]),
    },
    CategoryRule {
        name: "Personal",
        rule: Rule::IntentAny(&["personal", "family", "friend", "social"]),
    },
];

/// True if `email` belongs to `category`. Total over every category name.
pub fn matches(category: &str, email: &Email) -> bool {
    for entry in RULES {
        if entry.name.eq_ignore_ascii_case(category) {
            return match entry.rule {
                Rule::All => true,
                Rule::PriorityIn(tiers) => tiers.contains(&email.priority),
                Rule::RequiresAction => email.requires_action,
                Rule::IntentAny(needles) => {
                    needles.iter().any(|n| contains_ci(&email.intent, n))
                }
            };
        }
    }
    // deterministic default: the category name itself against intent
    contains_ci(&email.intent, category)
}

/// Apply the category over a list, preserving order.
pub fn filter_emails<'a>(category: &str, emails: &'a [Email]) -> Vec<&'a Email> {
    emails.iter().filter(|e| matches(category, e)).collect()
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn email(id: i64, priority: Priority, requires_action: bool, intent: &str) -> Email {
        Email {
            id,
            sender: "someone@example.com".to_string(),
            subject: format!("subject {id}"),
            snippet: "...".to_string(),
            body: None,
            received_time: Utc.with_ymd_and_hms(2026, 8, 1, 8, 0, 0).unwrap(),
            priority,
            intent: intent.to_string(),
            requires_action,
            sentiment: None,
            summary: None,
            suggested_reply: None,
        }
    }

    #[test]
    fn all_is_identity_in_order() {
        let emails = vec![
            email(1, Priority::P2, false, "Updates"),
            email(2, Priority::P1, true, "Finance"),
            email(3, Priority::P4, false, "Social"),
        ];
        let filtered = filter_emails("All", &emails);
        assert_eq!(filtered.len(), 3);
        assert_eq!(
            filtered.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn urgent_selects_p1_only() {
        // P1 wins on priority even when another email carries the label
        let emails = vec![
            email(1, Priority::P1, false, "Urgent"),
            email(2, Priority::P3, true, "Work"),
        ];
        let filtered = filter_emails("Urgent", &emails);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 1);
    }

    #[test]
    fn action_selects_requires_action() {
        let emails = vec![
            email(1, Priority::P1, false, "Urgent"),
            email(2, Priority::P3, true, "Work"),
        ];
        let filtered = filter_emails("Action", &emails);
        assert_eq!(filtered.iter().map(|e| e.id).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn updates_selects_p3_and_p4() {
        let emails = vec![
            email(1, Priority::P1, false, "News"),
            email(2, Priority::P3, false, "News"),
            email(3, Priority::P4, false, "News"),
        ];
        let filtered = filter_emails("Updates", &emails);
        assert_eq!(
            filtered.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![2, 3]
        );
    }

    #[test]
    fn coarse_categories_match_intent_substrings() {
        let emails = vec![
            email(1, Priority::P2, false, "Invoice Due"),
            email(2, Priority::P2, false, "Project Update"),
            email(3, Priority::P2, false, "Family Plans"),
        ];
        assert_eq!(filter_emails("Finance", &emails)[0].id, 1);
        assert_eq!(filter_emails("Work", &emails)[0].id, 2);
        assert_eq!(filter_emails("Personal", &emails)[0].id, 3);
    }

    #[test]
    fn unknown_category_falls_back_to_intent_substring() {
        let emails = vec![
            email(1, Priority::P2, false, "Travel Itinerary"),
            email(2, Priority::P2, false, "Work"),
        ];
        let filtered = filter_emails("travel", &emails);
        assert_eq!(filtered.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let emails = vec![
            email(1, Priority::P1, false, "Urgent"),
            email(2, Priority::P3, true, "Work"),
            email(3, Priority::P4, false, "Updates"),
        ];
        for category in ["All", "Urgent", "Action", "Updates", "nothing-matches"] {
            let once: Vec<Email> = filter_emails(category, &emails)
                .into_iter()
                .cloned()
                .collect();
            let twice: Vec<Email> = filter_emails(category, &once)
                .into_iter()
                .cloned()
                .collect();
            assert_eq!(once, twice, "category {category}");
        }
    }
}
