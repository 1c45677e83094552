use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::{Product, RecordSource};

/// Parse a semicolon-delimited raw-records file.
///
/// Each line is `id;name;ingredients;allergensraw;link`; the four-field form
/// omits the allergen declaration. Blank lines and lines with fewer than four
/// fields are skipped.
pub fn parse_flat_file(path: &Path) -> Result<Vec<Product>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let mut products = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split(';').collect();

        let product = match parts.len() {
            n if n >= 5 => make_product(parts[0], parts[1], parts[2], parts[3], parts[4]),
            4 => make_product(parts[0], parts[1], parts[2], "", parts[3]),
            _ => continue,
        };

        products.push(product);
    }

    Ok(products)
}

fn make_product(id: &str, name: &str, ingredients: &str, allergens: &str, link: &str) -> Product {
    Product {
        id: id.trim().to_string(),
        name: name.trim().to_string(),
        link: link.trim().to_string(),
        ingredients_raw: ingredients.trim().to_string(),
        allergens_raw: allergens.trim().to_string(),
        ingredients: String::new(),
        allergensraw: String::new(),
        allergensmapped: String::new(),
        source: RecordSource::FlatFile,
    }
}

/// Persist records in the same semicolon-delimited form `parse_flat_file`
/// reads, so a fetch run can seed later offline runs. Fields are expected to
/// be cleansed already (no embedded semicolons or line breaks).
pub fn write_flat_file(path: &Path, products: &[Product]) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    for p in products {
        writeln!(
            file,
            "{};{};{};{};{}",
            p.id, p.name, p.ingredients_raw, p.allergens_raw, p.link
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_five_field_line() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(
            f,
            "123;Choco Bar;sugar, milk, hazelnuts;Milk, Nuts;https://example.org/123"
        )
        .unwrap();

        let products = parse_flat_file(f.path()).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, "123");
        assert_eq!(products[0].name, "Choco Bar");
        assert_eq!(products[0].allergens_raw, "Milk, Nuts");
        assert_eq!(products[0].link, "https://example.org/123");
        assert_eq!(products[0].source, RecordSource::FlatFile);
    }

    #[test]
    fn test_parse_four_field_line_has_no_allergens() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "77;Spring Water;water;https://example.org/77").unwrap();

        let products = parse_flat_file(f.path()).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].allergens_raw, "");
        assert_eq!(products[0].link, "https://example.org/77");
    }

    #[test]
    fn test_parse_skips_blank_and_short_lines() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "").unwrap();
        writeln!(f, "garbage line").unwrap();
        writeln!(f, "1;Name;ingredients;;link").unwrap();

        let products = parse_flat_file(f.path()).unwrap();
        assert_eq!(products.len(), 1);
    }

    #[test]
    fn test_write_then_parse_round_trip() {
        let f = NamedTempFile::new().unwrap();
        let original = vec![make_product(
            "9",
            "Trail Mix",
            "peanuts, raisins",
            "Peanut",
            "https://example.org/9",
        )];

        write_flat_file(f.path(), &original).unwrap();
        let parsed = parse_flat_file(f.path()).unwrap();

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name, "Trail Mix");
        assert_eq!(parsed[0].allergens_raw, "Peanut");
    }
}
