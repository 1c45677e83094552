use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::Product;

const HEADERS: [&str; 6] = [
    "id",
    "name",
    "link",
    "ingredients",
    "allergensraw",
    "allergensmapped",
];

/// Write the labeled dataset as CSV. The cleansed columns are exported, plus
/// the mapped label column; raw columns stay in the flat file.
pub fn write(path: &Path, products: &[Product]) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    writeln!(file, "{}", HEADERS.join(","))?;

    for p in products {
        let row = [
            quote(&p.id),
            quote(&p.name),
            quote(&p.link),
            quote(&p.ingredients),
            quote(&p.allergensraw),
            quote(&p.allergensmapped),
        ];
        writeln!(file, "{}", row.join(","))?;
    }

    Ok(())
}

/// RFC 4180 quoting: wrap fields containing commas, quotes, or line breaks,
/// doubling any embedded quotes.
fn quote(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
