// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Category bucketing and keyword matching.

use strum::Display;

/// Business category families that share a reply set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Bucket {
    /// Restaurants, food trucks, cafes.
    Food,
    /// Gyms and fitness studios.
    Fitness,
    /// Everything else, including businesses without a category.
    Retail,
}

/// Which template a message maps to inside its bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ReplyKind {
    Order,
    Hours,
    Membership,
    Pricing,
    Greeting,
}

/// Category substrings per bucket, checked in order.
const FOOD_CATEGORIES: &[&str] = &["restaurant", "food", "cafe"];
const FITNESS_CATEGORIES: &[&str] = &["gym", "fitness"];

const ORDER_KEYWORDS: &[&str] = &["order", "menu"];
const HOURS_KEYWORDS: &[&str] = &["hour", "open"];
const MEMBERSHIP_KEYWORDS: &[&str] = &["join", "price"];
const PRICING_KEYWORDS: &[&str] = &["price", "cost"];

impl Bucket {
    /// Bucket for a free-text category. Matching is case-insensitive on substrings.
    pub fn for_category(category: Option<&str>) -> Self {
        let Some(category) = category else {
            return Bucket::Retail;
        };
        let lower = category.to_lowercase();
        if contains_any(&lower, FOOD_CATEGORIES) {
            Bucket::Food
        } else if contains_any(&lower, FITNESS_CATEGORIES) {
            Bucket::Fitness
        } else {
            Bucket::Retail
        }
    }

    /// Keyword sets in priority order; the first hit wins.
    fn rules(self) -> &'static [(&'static [&'static str], ReplyKind)] {
        match self {
            Bucket::Food => &[
                (ORDER_KEYWORDS, ReplyKind::Order),
                (HOURS_KEYWORDS, ReplyKind::Hours),
            ],
            Bucket::Fitness => &[(MEMBERSHIP_KEYWORDS, ReplyKind::Membership)],
            Bucket::Retail => &[(PRICING_KEYWORDS, ReplyKind::Pricing)],
        }
    }

    fn render(self, kind: ReplyKind, business_name: &str) -> String {
        match (self, kind) {
            (Bucket::Food, ReplyKind::Order) => format!(
                "Yum! We'd love to feed you at {business_name}. What are you craving today? \
                 You can see our menu at the link in bio!"
            ),
            (Bucket::Food, ReplyKind::Hours) => format!(
                "{business_name} is open from 9 AM to 9 PM! Come by for a bite!"
            ),
            (Bucket::Food, _) => format!(
                "Hi there! Welcome to {business_name}. How can we make your day delicious?"
            ),
            (Bucket::Fitness, ReplyKind::Membership) => format!(
                "Ready to crush your goals? Memberships at {business_name} start at $29/mo. \
                 Want a free pass?"
            ),
            (Bucket::Fitness, _) => format!(
                "Hey! Let's get moving! How can we help you with your fitness journey at \
                 {business_name}?"
            ),
            (Bucket::Retail, ReplyKind::Pricing) => format!(
                "Our prices at {business_name} are very competitive! Check our website for \
                 the latest deals."
            ),
            (Bucket::Retail, _) => format!(
                "Hello! Thanks for messaging {business_name}. We're here to help you find \
                 exactly what you need."
            ),
        }
    }
}

/// Classify a message into its bucket and reply kind.
pub fn classify(category: Option<&str>, text: &str) -> (Bucket, ReplyKind) {
    let bucket = Bucket::for_category(category);
    let lower = text.to_lowercase();
    let kind = bucket
        .rules()
        .iter()
        .find(|(keywords, _)| contains_any(&lower, keywords))
        .map(|(_, kind)| *kind)
        .unwrap_or(ReplyKind::Greeting);
    (bucket, kind)
}

/// Produce the canned reply for `text`, or `None` when the text is blank.
///
/// Total for non-blank text: every bucket ends in a greeting.
pub fn generate_reply(business_name: &str, category: Option<&str>, text: &str) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }
    let (bucket, kind) = classify(category, text);
    Some(bucket.render(kind, business_name))
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // --- Bucketing ---

    #[test]
    fn food_categories() {
        for c in ["Cafe", "Italian Restaurant", "street FOOD", "cafeteria"] {
            assert_eq!(Bucket::for_category(Some(c)), Bucket::Food, "{c}");
        }
    }

    #[test]
    fn fitness_categories() {
        assert_eq!(Bucket::for_category(Some("Gym")), Bucket::Fitness);
        assert_eq!(Bucket::for_category(Some("Fitness Studio")), Bucket::Fitness);
    }

    #[test]
    fn missing_or_unknown_category_is_retail() {
        assert_eq!(Bucket::for_category(None), Bucket::Retail);
        assert_eq!(Bucket::for_category(Some("")), Bucket::Retail);
        assert_eq!(Bucket::for_category(Some("Bookshop")), Bucket::Retail);
    }

    #[test]
    fn food_wins_over_fitness() {
        assert_eq!(Bucket::for_category(Some("gym cafe")), Bucket::Food);
    }

    // --- Keyword priority ---

    #[test]
    fn cafe_hours_question() {
        assert_eq!(
            classify(Some("Cafe"), "Do you have hours?"),
            (Bucket::Food, ReplyKind::Hours)
        );
        let reply = generate_reply("Cafe Luna", Some("Cafe"), "Do you have hours?").unwrap();
        assert_eq!(reply, "Cafe Luna is open from 9 AM to 9 PM! Come by for a bite!");
    }

    #[test]
    fn order_beats_hours() {
        assert_eq!(
            classify(Some("restaurant"), "are you open to take my ORDER"),
            (Bucket::Food, ReplyKind::Order)
        );
    }

    #[test]
    fn fitness_price_is_membership() {
        assert_eq!(
            classify(Some("gym"), "what's the price?"),
            (Bucket::Fitness, ReplyKind::Membership)
        );
        assert_eq!(
            classify(Some("gym"), "what does it cost?"),
            (Bucket::Fitness, ReplyKind::Greeting)
        );
    }

    #[test]
    fn retail_cost_is_pricing() {
        assert_eq!(classify(None, "How much does it cost"), (Bucket::Retail, ReplyKind::Pricing));
        assert_eq!(classify(None, "hello"), (Bucket::Retail, ReplyKind::Greeting));
    }

    #[test]
    fn blank_text_has_no_reply() {
        assert_eq!(generate_reply("Shop", None, ""), None);
        assert_eq!(generate_reply("Shop", None, "  \n\t"), None);
    }

    // --- Properties ---

    proptest! {
        #[test]
        fn total_for_non_blank_text(
            name in "[A-Za-z][A-Za-z ]{0,20}",
            category in proptest::option::of(".{0,20}"),
            text in ".*[^\\s].*",
        ) {
            let reply = generate_reply(&name, category.as_deref(), &text);
            let reply = reply.expect("non-blank text must get a reply");
            prop_assert!(!reply.is_empty());
            prop_assert!(reply.contains(&name));
        }

        #[test]
        fn deterministic(
            category in proptest::option::of(".{0,20}"),
            text in ".{0,40}",
        ) {
            let a = generate_reply("Shop", category.as_deref(), &text);
            let b = generate_reply("Shop", category.as_deref(), &text);
            prop_assert_eq!(a, b);
        }
    }
}
