//! Macro-category classification of facility names.
use serde::Serialize;
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
pub enum MacroCategory {
    #[strum(to_string = "Hospital")]
    Hospital,
    #[strum(to_string = "Primary care center")]
    PrimaryCare,
    #[strum(to_string = "Post / emergency unit")]
    PostEmergency,
    #[strum(to_string = "Laboratory")]
    Laboratory,
    #[strum(to_string = "Clinic / polyclinic")]
    Clinic,
    #[strum(to_string = "Other")]
    Other,
}

/// Keywords per category. The first group with a keyword contained in the
/// lowercased name decides the category.
const CATEGORY_KEYWORDS: &[(MacroCategory, &[&str])] = &[
    (MacroCategory::Hospital, &["hospital"]),
    (
        MacroCategory::PrimaryCare,
        &["cesfam", "centro de salud familiar"],
    ),
    (MacroCategory::PostEmergency, &["posta", "sapu"]),
    (MacroCategory::Laboratory, &["laboratorio"]),
    (MacroCategory::Clinic, &["clinica", "policlinico"]),
];

/// Classify a facility by its name. Never fails: unmatched names are `Other`.
pub fn classify(facility: &str) -> MacroCategory {
    let lower = facility.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| lower.contains(kw)))
        .map_or(MacroCategory::Other, |(category, _)| *category)
}
