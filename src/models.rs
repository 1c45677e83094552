use serde::{Deserialize, Serialize};

/// One of the nine common allergen classes this tool recognises.
///
/// Variants are declared in lexicographic order of their serialized labels so
/// the derived `Ord` matches the sorted order required for serialization
/// ("egg, milk, wheat" and so on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Allergen {
    #[serde(rename = "egg")]
    Egg,
    #[serde(rename = "fish")]
    Fish,
    #[serde(rename = "milk")]
    Milk,
    #[serde(rename = "peanut")]
    Peanut,
    #[serde(rename = "sesame")]
    Sesame,
    #[serde(rename = "shellfish")]
    Shellfish,
    #[serde(rename = "soy")]
    Soy,
    #[serde(rename = "tree nut")]
    TreeNut,
    #[serde(rename = "wheat")]
    Wheat,
}

impl Allergen {
    /// All nine labels, in serialization order.
    pub const ALL: [Allergen; 9] = [
        Allergen::Egg,
        Allergen::Fish,
        Allergen::Milk,
        Allergen::Peanut,
        Allergen::Sesame,
        Allergen::Shellfish,
        Allergen::Soy,
        Allergen::TreeNut,
        Allergen::Wheat,
    ];

    /// The canonical lowercase label used in the output dataset.
    pub fn label(&self) -> &'static str {
        match self {
            Allergen::Egg => "egg",
            Allergen::Fish => "fish",
            Allergen::Milk => "milk",
            Allergen::Peanut => "peanut",
            Allergen::Sesame => "sesame",
            Allergen::Shellfish => "shellfish",
            Allergen::Soy => "soy",
            Allergen::TreeNut => "tree nut",
            Allergen::Wheat => "wheat",
        }
    }
}

impl std::fmt::Display for Allergen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One row of the labeled dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub link: String,
    /// Ingredient list exactly as retrieved.
    pub ingredients_raw: String,
    /// Allergen declaration exactly as retrieved.
    pub allergens_raw: String,
    /// Cleansed ingredient list (lowercase, letters/spaces/commas only).
    pub ingredients: String,
    /// Cleansed allergen declaration.
    pub allergensraw: String,
    /// Sorted, comma-joined canonical labels; empty when nothing matched.
    pub allergensmapped: String,
    pub source: RecordSource,
}

impl Product {
    /// Text handed to the classifier: the raw declaration and raw ingredient
    /// list joined with a space. The raw fields keep digits, so phrases like
    /// "omega 3" stay matchable; the cleansed columns are export-only.
    pub fn classification_input(&self) -> String {
        format!("{} {}", self.allergens_raw, self.ingredients_raw)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecordSource {
    Api,
    FlatFile,
}

impl std::fmt::Display for RecordSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordSource::Api => write!(f, "api"),
            RecordSource::FlatFile => write!(f, "file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_order_matches_label_order() {
        let labels: Vec<&str> = Allergen::ALL.iter().map(Allergen::label).collect();
        let mut sorted = labels.clone();
        sorted.sort();
        assert_eq!(labels, sorted);
    }

    #[test]
    fn test_classification_input_joins_raw_fields() {
        let p = Product {
            id: "1".to_string(),
            name: "Oil".to_string(),
            link: String::new(),
            ingredients_raw: "rich in omega 3".to_string(),
            allergens_raw: "Fish".to_string(),
            ingredients: "rich in omega".to_string(),
            allergensraw: "fish".to_string(),
            allergensmapped: String::new(),
            source: RecordSource::Api,
        };
        assert_eq!(p.classification_input(), "Fish rich in omega 3");
    }

    #[test]
    fn test_serde_rename() {
        assert_eq!(
            serde_json::to_string(&Allergen::TreeNut).unwrap(),
            "\"tree nut\""
        );
        assert_eq!(serde_json::to_string(&Allergen::Egg).unwrap(), "\"egg\"");
    }
}
