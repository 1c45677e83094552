use anyhow::{ensure, Result};
use regex::Regex;

use crate::models::Allergen;

/// Trigger phrases per allergen class. All phrases are lowercase; multi-word
/// phrases match as literal units.
///
/// The generic "nut"/"nuts" triggers and "coconut" sit under tree nut exactly
/// as declared in the source data (coconut is sometimes classified
/// separately). They are kept broad deliberately; boundary matching prevents
/// the obvious false positives ("doughnut", "nutmeg").
const TRIGGER_PHRASES: [(Allergen, &[&str]); 9] = [
    (
        Allergen::Milk,
        &[
            "milk", "dairy", "lactose", "casein", "whey", "butter", "cream", "cheese",
            "yogurt", "yoghurt", "ghee", "paneer", "curd", "lactalbumin", "lactoglobulin",
            "milk protein", "milk powder", "skimmed milk", "whole milk", "condensed milk",
            "evaporated milk", "buttermilk", "milk fat", "milk solids", "lait", "milch",
        ],
    ),
    (
        Allergen::Egg,
        &[
            "egg", "eggs", "albumin", "albumen", "globulin", "lysozyme", "mayonnaise",
            "meringue", "ovalbumin", "ovomucin", "ovomucoid", "ovovitellin", "egg white",
            "egg yolk", "egg protein", "dried egg", "egg powder", "whole egg",
            "pasteurized egg", "liquid egg",
        ],
    ),
    (
        Allergen::Peanut,
        &[
            "peanut", "peanuts", "groundnut", "groundnuts", "arachis", "monkey nut",
            "earth nut", "beer nut", "peanut oil", "peanut butter", "peanut flour",
            "arachis hypogaea", "goober",
        ],
    ),
    (
        Allergen::TreeNut,
        &[
            "almond", "almonds", "cashew", "cashews", "walnut", "walnuts", "pecan", "pecans",
            "pistachio", "pistachios", "hazelnut", "hazelnuts", "filbert", "filberts",
            "macadamia", "brazil nut", "brazil nuts", "chestnut", "chestnuts", "pine nut",
            "pine nuts", "praline", "marzipan", "nougat", "gianduja", "tree nut", "tree nuts",
            "nut", "nuts", "mixed nuts", "coconut",
        ],
    ),
    (
        Allergen::Wheat,
        &[
            "wheat", "gluten", "flour", "bread", "breadcrumbs", "bulgur", "couscous",
            "durum", "einkorn", "emmer", "farina", "kamut", "semolina", "spelt", "triticale",
            "wheat germ", "wheat bran", "wheat starch", "wheat protein", "wheat flour",
            "whole wheat", "enriched flour", "all purpose flour", "bread flour", "cake flour",
            "seitan", "vital wheat gluten", "modified wheat starch",
        ],
    ),
    (
        Allergen::Soy,
        &[
            "soy", "soya", "soybean", "soybeans", "edamame", "miso", "tempeh", "tofu",
            "soy sauce", "soy protein", "soy lecithin", "soy flour", "soy milk", "soy oil",
            "textured vegetable protein", "tvp", "hydrolyzed soy", "soy isolate",
            "soy concentrate", "soya bean", "soja",
        ],
    ),
    (
        Allergen::Fish,
        &[
            "fish", "salmon", "tuna", "cod", "haddock", "anchovy", "anchovies", "sardine",
            "sardines", "mackerel", "herring", "trout", "bass", "tilapia", "pollock",
            "catfish", "perch", "pike", "carp", "halibut", "flounder", "sole", "snapper",
            "grouper", "swordfish", "mahi", "fish sauce", "fish oil", "fish protein",
            "fish gelatin", "omega 3", "dha", "epa",
        ],
    ),
    (
        Allergen::Shellfish,
        &[
            "shellfish", "shrimp", "prawn", "prawns", "crab", "lobster", "crayfish",
            "crawfish", "langoustine", "scallop", "scallops", "clam", "clams", "mussel",
            "mussels", "oyster", "oysters", "squid", "calamari", "octopus", "snail",
            "escargot", "abalone", "cockle", "crustacean", "crustaceans", "mollusc",
            "mollusk", "molluscs", "mollusks",
        ],
    ),
    (
        Allergen::Sesame,
        &[
            "sesame", "sesame seed", "sesame seeds", "tahini", "tahina", "halvah", "halva",
            "hummus", "houmous", "sesame oil", "sesame paste", "sesame flour", "goma",
            "til", "benne seed", "sesamum",
        ],
    ),
];

/// One allergen class with its phrase list and precompiled matcher.
pub struct LexiconEntry {
    pub allergen: Allergen,
    pub phrases: &'static [&'static str],
    matcher: Regex,
}

impl LexiconEntry {
    /// Whether the (already lowercased) text contains any trigger phrase as a
    /// whole word/phrase.
    pub fn matches(&self, lower_text: &str) -> bool {
        self.matcher.is_match(lower_text)
    }
}

/// The immutable allergen lexicon: all nine classes with boundary-safe
/// matchers, built once at startup and shared read-only across all
/// classifications.
pub struct Lexicon {
    entries: Vec<LexiconEntry>,
}

impl Lexicon {
    /// Compile the static trigger-phrase table into one alternation matcher
    /// per allergen class (`\b(?:phrase|phrase|...)\b`, phrases escaped).
    pub fn build() -> Result<Lexicon> {
        let mut entries = Vec::with_capacity(TRIGGER_PHRASES.len());

        for (allergen, phrases) in TRIGGER_PHRASES {
            ensure!(
                !phrases.is_empty(),
                "allergen class '{}' has no trigger phrases",
                allergen
            );
            ensure!(
                phrases.iter().all(|p| !p.trim().is_empty()),
                "allergen class '{}' contains an empty trigger phrase",
                allergen
            );

            let alternation: Vec<String> = phrases.iter().map(|p| regex::escape(p)).collect();
            let pattern = format!(r"\b(?:{})\b", alternation.join("|"));
            let matcher = Regex::new(&pattern)?;

            entries.push(LexiconEntry {
                allergen,
                phrases,
                matcher,
            });
        }

        // Count-only validation would let a duplicated label mask a missing
        // one; require each class exactly once
        for allergen in Allergen::ALL {
            ensure!(
                entries.iter().filter(|e| e.allergen == allergen).count() == 1,
                "lexicon must define allergen class '{}' exactly once",
                allergen
            );
        }

        Ok(Lexicon { entries })
    }

    pub fn entries(&self) -> impl Iterator<Item = &LexiconEntry> {
        self.entries.iter()
    }

    /// Trigger phrases for one allergen class (used by the verbose report).
    pub fn phrases(&self, allergen: Allergen) -> &'static [&'static str] {
        self.entries
            .iter()
            .find(|e| e.allergen == allergen)
            .map(|e| e.phrases)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_covers_all_classes() {
        let lexicon = Lexicon::build().unwrap();
        let covered: Vec<Allergen> = lexicon.entries().map(|e| e.allergen).collect();
        for allergen in Allergen::ALL {
            assert!(covered.contains(&allergen), "missing {}", allergen);
        }
    }

    #[test]
    fn test_each_class_defined_exactly_once() {
        let lexicon = Lexicon::build().unwrap();
        for allergen in Allergen::ALL {
            let count = lexicon.entries().filter(|e| e.allergen == allergen).count();
            assert_eq!(count, 1, "{} defined {} times", allergen, count);
        }
    }

    #[test]
    fn test_no_empty_phrases() {
        let lexicon = Lexicon::build().unwrap();
        for entry in lexicon.entries() {
            assert!(!entry.phrases.is_empty());
            assert!(entry.phrases.iter().all(|p| !p.is_empty()));
        }
    }

    #[test]
    fn test_phrases_are_lowercase() {
        let lexicon = Lexicon::build().unwrap();
        for entry in lexicon.entries() {
            for phrase in entry.phrases {
                assert_eq!(*phrase, phrase.to_lowercase(), "phrase not lowercase");
            }
        }
    }

    #[test]
    fn test_boundary_matching() {
        let lexicon = Lexicon::build().unwrap();
        let tree_nut = lexicon
            .entries()
            .find(|e| e.allergen == Allergen::TreeNut)
            .unwrap();

        assert!(tree_nut.matches("contains nut pieces"));
        assert!(!tree_nut.matches("doughnut shop"));
        assert!(!tree_nut.matches("a pinch of nutmeg"));
    }

    #[test]
    fn test_multi_word_phrase_is_literal() {
        let lexicon = Lexicon::build().unwrap();
        let peanut = lexicon
            .entries()
            .find(|e| e.allergen == Allergen::Peanut)
            .unwrap();

        assert!(peanut.matches("made with peanut butter"));
        assert!(peanut.matches("arachis hypogaea extract"));
    }
}
