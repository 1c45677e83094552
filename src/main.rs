//! `allergen-mappr` — collect food-product records, cleanse their text
//! fields, and map allergen declarations onto the nine common allergens.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load collection config ([`config::load_config`]).
//! 3. Acquire records: fetch from Open Food Facts (`--fetch`,
//!    [`source::openfoodfacts`]) or parse a raw flat file ([`ingest`]).
//! 4. Cleanse free-text fields ([`cleanse`]).
//! 5. Build the allergen lexicon and classify every record ([`allergen`]).
//! 6. Render the requested report ([`report`]).
//! 7. Exit `0` (records labeled) or `1` (nothing acquired).

mod allergen;
mod cleanse;
mod cli;
mod config;
mod ingest;
mod models;
mod report;
mod source;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use allergen::{classify, serialize, Lexicon};
use cleanse::Cleanser;
use cli::{Cli, ReportFormat};
use config::load_config;
use models::Product;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let working_dir = std::env::current_dir()?;
    let config = load_config(&working_dir, cli.config.as_deref())?;

    // Acquire raw records
    let mut products: Vec<Product> = if cli.fetch {
        source::openfoodfacts::collect(&config.collection, cli.quiet).await?
    } else {
        ingest::parse_flat_file(&cli.input)?
    };

    if products.is_empty() {
        if cli.fetch {
            eprintln!("No records returned by Open Food Facts");
        } else {
            eprintln!("No records found in {}", cli.input.display());
        }
        std::process::exit(1);
    }

    if !cli.quiet {
        eprintln!("  {} {} records acquired", "→".cyan(), products.len());
    }

    // Cleanse: flat-file-safe raw fields, then the normalized dataset columns
    let cleanser = Cleanser::new()?;
    for p in &mut products {
        p.ingredients_raw = cleanser.clean(&p.ingredients_raw);
        p.allergens_raw = cleanser.clean(&p.allergens_raw);
        p.ingredients = cleanser.letters_only(&p.ingredients_raw);
        p.allergensraw = cleanser.letters_only(&p.allergens_raw);
    }

    if let Some(path) = &cli.save_raw {
        ingest::write_flat_file(path, &products)?;
        if !cli.quiet {
            eprintln!("  {} raw records saved to {}", "→".cyan(), path.display());
        }
    }

    // Map every record onto the nine allergen classes. The raw declaration
    // and raw ingredient list are classified together: declarations are
    // sparse, and the cleansed columns drop digits that some trigger phrases
    // need ("omega 3").
    let lexicon = Lexicon::build()?;
    for p in &mut products {
        let labels = classify(&lexicon, &p.classification_input());
        p.allergensmapped = serialize(&labels);
    }

    // Resolve effective report format: --csv implies CSV
    let report_format = match &cli.csv {
        Some(_) => ReportFormat::Csv,
        None => cli.report.clone(),
    };
    let csv_path = cli
        .csv
        .unwrap_or_else(|| PathBuf::from("food-dataset.csv"));

    match report_format {
        ReportFormat::Terminal => {
            report::terminal::render(&products, &lexicon, cli.verbose, cli.quiet)?;
        }
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&products)?);
        }
        ReportFormat::Csv => {
            report::csv::write(&csv_path, &products)?;
            if !cli.quiet {
                eprintln!(
                    "  {} labeled dataset written to {}",
                    "→".cyan(),
                    csv_path.display()
                );
            }
        }
    }

    Ok(())
}
