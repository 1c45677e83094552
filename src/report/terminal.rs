use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::allergen::Lexicon;
use crate::models::{Allergen, Product};

/// Render a colored terminal report over the labeled dataset.
pub fn render(products: &[Product], lexicon: &Lexicon, verbose: bool, quiet: bool) -> Result<()> {
    let total = products.len();
    let mapped_count = products
        .iter()
        .filter(|p| !p.allergensmapped.is_empty())
        .count();
    let unmapped_count = total - mapped_count;

    if quiet {
        println!(
            "Total: {}  Mapped: {}  Unmapped: {}",
            total,
            mapped_count.to_string().green(),
            unmapped_count.to_string().yellow(),
        );
        return Ok(());
    }

    println!(
        "\n {} v{}",
        "allergen-mappr".bold(),
        env!("CARGO_PKG_VERSION")
    );

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(" │  {:<48} │", format!("Total products      : {}", total));
    println!(
        " │  {:<48} │",
        format!("{}  With allergens   : {:>4}", "✓".green(), mapped_count)
    );
    println!(
        " │  {:<48} │",
        format!("{}  Without allergens: {:>4}", "○".yellow(), unmapped_count)
    );
    println!(" └────────────────────────────────────────────────────┘\n");

    render_distribution(products, lexicon);

    if verbose {
        println!("\n {} All records:\n", "[RECORDS]".cyan().bold());
        render_records(products);
    }

    Ok(())
}

/// Per-allergen record counts, with a preview of each class's trigger phrases.
fn render_distribution(products: &[Product], lexicon: &Lexicon) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Allergen").add_attribute(Attribute::Bold),
            Cell::new("Records").add_attribute(Attribute::Bold),
            Cell::new("Trigger phrases").add_attribute(Attribute::Bold),
        ]);

    for allergen in Allergen::ALL {
        let count = products
            .iter()
            .filter(|p| has_label(p, allergen))
            .count();

        let count_color = if count > 0 { Color::Green } else { Color::DarkGrey };

        let phrases = lexicon.phrases(allergen);
        let preview = if phrases.len() > 5 {
            format!("{}, ...", phrases[..5].join(", "))
        } else {
            phrases.join(", ")
        };

        table.add_row(vec![
            Cell::new(allergen.label()),
            Cell::new(count)
                .fg(count_color)
                .set_alignment(CellAlignment::Right),
            Cell::new(preview),
        ]);
    }

    println!("{}", table);
}

fn render_records(products: &[Product]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Id").add_attribute(Attribute::Bold),
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Source").add_attribute(Attribute::Bold),
            Cell::new("Declared").add_attribute(Attribute::Bold),
            Cell::new("Mapped").add_attribute(Attribute::Bold),
        ]);

    for p in products {
        let mapped_cell = if p.allergensmapped.is_empty() {
            Cell::new("—").fg(Color::DarkGrey)
        } else {
            Cell::new(&p.allergensmapped).fg(Color::Green)
        };

        table.add_row(vec![
            Cell::new(&p.id),
            Cell::new(&p.name),
            Cell::new(p.source.to_string()),
            Cell::new(&p.allergens_raw),
            mapped_cell,
        ]);
    }

    println!("{}", table);
}

fn has_label(product: &Product, allergen: Allergen) -> bool {
    product
        .allergensmapped
        .split(", ")
        .any(|label| label == allergen.label())
}
