//! Deterministic employee names and alert categories for synthetic orgs.

use crate::rng::SeedRng;

const FIRST_NAMES: &[&str] = &[
    "Jane", "John", "Sarah", "Amara", "Bilal", "Chen", "Dana", "Elif", "Farah", "Gwen",
    "Hiro", "Ines", "Jonas", "Kofi", "Lena", "Mateo", "Nadia", "Omar", "Priya", "Quinn",
    "Rosa", "Sami", "Tariq", "Uma", "Viktor", "Wen", "Ximena", "Yusuf", "Zoe", "Ayla",
    "Bruno", "Carmen", "Dmitri", "Esther", "Felix", "Grace", "Hassan", "Iris", "Jamal",
    "Keiko", "Liam", "Maya", "Nikolai", "Olga", "Pablo", "Ruth", "Sven", "Talia",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Okafor", "Nguyen", "Garcia", "Kowalski", "Haddad", "Tanaka", "Silva",
    "Müller", "Patel", "Johansson", "Rossi", "Kim", "Mensah", "Dubois", "Novak",
    "Hernandez", "Ivanova", "Chowdhury", "Byrne", "Lindqvist", "Moreau", "Sato",
    "Abara", "Costa", "Fischer", "Yilmaz", "O'Brien", "Petrov", "Reyes",
];

const ALERT_CATEGORIES: &[&str] = &[
    "Missed check-in",
    "Performance alert",
    "Overdue training",
    "Expense policy breach",
    "Unusual login location",
    "Timesheet discrepancy",
    "Certification expiring",
    "Access review pending",
];

pub struct NameGenerator;

impl NameGenerator {
    pub fn full_name(rng: &mut SeedRng) -> String {
        let first = FIRST_NAMES[rng.index(FIRST_NAMES.len())];
        let last = LAST_NAMES[rng.index(LAST_NAMES.len())];
        format!("{first} {last}")
    }

    pub fn alert_category(rng: &mut SeedRng) -> &'static str {
        ALERT_CATEGORIES[rng.index(ALERT_CATEGORIES.len())]
    }
}
