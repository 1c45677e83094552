use std::collections::BTreeSet;

use crate::allergen::lexicon::Lexicon;
use crate::models::Allergen;

/// Map free text onto the nine common allergen classes.
///
/// - Case-insensitive: input is lowercased before matching.
/// - Boundary-safe: a phrase only matches as a whole word/phrase, never as a
///   fragment of a longer token ("nut" does not match inside "nutmeg").
/// - Classes are independent and non-exclusive; one text can trigger several.
/// - Total: any string input yields a result, empty set when nothing matched.
pub fn classify(lexicon: &Lexicon, text: &str) -> BTreeSet<Allergen> {
    if text.trim().is_empty() {
        return BTreeSet::new();
    }

    let lower = text.to_lowercase();

    lexicon
        .entries()
        .filter(|entry| entry.matches(&lower))
        .map(|entry| entry.allergen)
        .collect()
}

/// Render a label set for persistence: ascending lexicographic order,
/// comma-space joined. The empty set renders as the empty string.
pub fn serialize(labels: &BTreeSet<Allergen>) -> String {
    labels
        .iter()
        .map(Allergen::label)
        .collect::<Vec<_>>()
        .join(", ")
}
