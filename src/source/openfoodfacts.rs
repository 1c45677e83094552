use std::collections::HashSet;
use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use serde::Deserialize;

use crate::config::CollectionConfig;
use crate::models::{Product, RecordSource};

const SEARCH_URL: &str = "https://world.openfoodfacts.org/cgi/search.pl";
const USER_AGENT: &str = "allergen-mappr/0.1.0 (data preparation tool)";
const MAX_RETRIES: u32 = 3;
/// Pagination cap per tag; the search endpoint degrades badly past this.
const MAX_PAGES: usize = 20;

/// Broad keyword sweep used only for the allergen-free set. Plain substring
/// containment on purpose: any hint of an allergen disqualifies the record,
/// false positives here just mean fetching one more candidate. Covers the full
/// EU-14 list, wider than the nine classes the classifier maps to.
const ALLERGEN_FREE_BLOCKLIST: &[&str] = &[
    "wheat", "barley", "rye", "oat", "spelt", "kamut", "gluten",
    "milk", "cream", "butter", "cheese", "lactose", "whey", "casein", "dairy",
    "egg", "albumin", "mayonnaise",
    "almond", "cashew", "walnut", "pecan", "pistachio", "hazelnut", "macadamia",
    "brazil nut", "chestnut", "nut",
    "peanut", "groundnut", "arachis",
    "soy", "soya", "edamame", "tofu", "tempeh",
    "fish", "salmon", "tuna", "cod", "anchovy", "sardine", "mackerel",
    "shrimp", "prawn", "crab", "lobster", "crayfish", "shellfish", "crustacean",
    "oyster", "mussel", "clam", "scallop", "squid", "octopus", "mollusc",
    "sesame", "tahini",
    "mustard",
    "celery", "celeriac",
    "lupin", "lupine",
    "sulphite", "sulfite", "sulphur dioxide", "sulfur dioxide",
];

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    products: Vec<RawProduct>,
}

/// A product as returned by the search endpoint, before validation.
#[derive(Debug, Default, Deserialize)]
pub struct RawProduct {
    #[serde(default)]
    code: String,
    #[serde(default)]
    product_name: String,
    #[serde(default)]
    ingredients_text_en: String,
    #[serde(default)]
    allergens_tags: Vec<String>,
    #[serde(default)]
    traces_tags: Vec<String>,
    #[serde(default)]
    url: String,
}

enum PageFilter<'a> {
    /// Products declaring the given allergen tag (e.g. `en:milk`).
    WithAllergen(&'a str),
    /// Products tagged as containing no allergens at all.
    AllergenFree,
}

/// Collect a labeled-dataset-sized batch of records: a diverse with-allergens
/// set driven by the per-tag targets, then a strictly validated allergen-free
/// set.
pub async fn collect(cfg: &CollectionConfig, quiet: bool) -> Result<Vec<Product>> {
    let client = Client::builder()
        .timeout(Duration::from_secs(60))
        .build()?;

    let total = cfg.with_allergens + cfg.without_allergens;
    let pb = if !quiet {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut products: Vec<Product> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    // With-allergens set, spread across the configured tags
    for (tag, target) in &cfg.targets {
        if let Some(pb) = &pb {
            pb.set_message(tag.clone());
        }
        collect_for_tag(&client, cfg, tag, *target, &mut products, &mut seen, &pb).await?;
    }

    // Top up from the most common declaration if some tags came up short
    if products.len() < cfg.with_allergens {
        let remaining = cfg.with_allergens - products.len();
        if let Some(pb) = &pb {
            pb.set_message("en:gluten (top-up)");
        }
        collect_for_tag(
            &client,
            cfg,
            "en:gluten",
            remaining,
            &mut products,
            &mut seen,
            &pb,
        )
        .await?;
    }

    // Allergen-free set, strictly validated
    if let Some(pb) = &pb {
        pb.set_message("allergen-free");
    }
    let mut free_count = 0;
    let mut page = 1;
    while free_count < cfg.without_allergens && page <= MAX_PAGES {
        let raw = fetch_page(&client, &PageFilter::AllergenFree, page, cfg.page_size).await?;
        if raw.is_empty() {
            break;
        }

        for rp in raw {
            if free_count >= cfg.without_allergens {
                break;
            }
            if !is_valid(&rp, cfg.min_ingredient_chars) || !is_truly_allergen_free(&rp) {
                continue;
            }
            if seen.insert(rp.code.clone()) {
                products.push(rp.into_product());
                free_count += 1;
                if let Some(pb) = &pb {
                    pb.inc(1);
                }
            }
        }

        page += 1;
        tokio::time::sleep(Duration::from_secs(cfg.request_delay_secs)).await;
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }

    Ok(products)
}

async fn collect_for_tag(
    client: &Client,
    cfg: &CollectionConfig,
    tag: &str,
    target: usize,
    products: &mut Vec<Product>,
    seen: &mut HashSet<String>,
    pb: &Option<ProgressBar>,
) -> Result<()> {
    let mut count = 0;
    let mut page = 1;

    while count < target && page <= MAX_PAGES {
        let raw = fetch_page(client, &PageFilter::WithAllergen(tag), page, cfg.page_size).await?;
        if raw.is_empty() {
            break;
        }

        for rp in raw {
            if count >= target {
                break;
            }
            if !is_valid(&rp, cfg.min_ingredient_chars) || rp.allergens_tags.is_empty() {
                continue;
            }
            if seen.insert(rp.code.clone()) {
                products.push(rp.into_product());
                count += 1;
                if let Some(pb) = pb {
                    pb.inc(1);
                }
            }
        }

        page += 1;
        tokio::time::sleep(Duration::from_secs(cfg.request_delay_secs)).await;
    }

    Ok(())
}

/// Fetch one search page, retrying timeouts with linear backoff. Non-timeout
/// failures and non-success statuses yield an empty page so collection can
/// move on to the next tag.
async fn fetch_page(
    client: &Client,
    filter: &PageFilter<'_>,
    page: usize,
    page_size: usize,
) -> Result<Vec<RawProduct>> {
    let page_str = page.to_string();
    let size_str = page_size.to_string();

    let mut params: Vec<(&str, &str)> = vec![
        ("action", "process"),
        ("tagtype_0", "languages"),
        ("tag_contains_0", "contains"),
        ("tag_0", "en"),
        ("tagtype_1", "states"),
        ("tag_contains_1", "contains"),
        ("tag_1", "ingredients-completed"),
        (
            "fields",
            "code,product_name,ingredients_text_en,allergens_tags,traces_tags,url",
        ),
        ("page_size", &size_str),
        ("page", &page_str),
        ("json", "1"),
        ("sort_by", "unique_scans_n"),
    ];

    match filter {
        PageFilter::WithAllergen(tag) => {
            params.push(("tagtype_2", "allergens"));
            params.push(("tag_contains_2", "contains"));
            params.push(("tag_2", *tag));
        }
        PageFilter::AllergenFree => {
            params.push(("tagtype_2", "allergens"));
            params.push(("tag_contains_2", "does_not_contain"));
            params.push(("tag_2", "en:none"));
        }
    }

    for attempt in 0..MAX_RETRIES {
        let response = client
            .get(SEARCH_URL)
            .header("User-Agent", USER_AGENT)
            .query(&params)
            .send()
            .await;

        match response {
            Ok(response) => {
                if !response.status().is_success() {
                    return Ok(Vec::new());
                }
                match response.text().await {
                    Ok(body) => return Ok(decode_search_body(&body, page)),
                    Err(e) => {
                        eprintln!("  failed reading response, skipping page {}: {}", page, e);
                        return Ok(Vec::new());
                    }
                }
            }
            Err(e) if e.is_timeout() => {
                let wait = Duration::from_secs(u64::from(attempt + 1) * 5);
                eprintln!(
                    "  timeout on attempt {}/{}, waiting {}s...",
                    attempt + 1,
                    MAX_RETRIES,
                    wait.as_secs()
                );
                tokio::time::sleep(wait).await;
            }
            Err(e) => {
                eprintln!("  request failed, skipping page {}: {}", page, e);
                return Ok(Vec::new());
            }
        }
    }

    eprintln!("  failed after {} attempts, skipping page {}", MAX_RETRIES, page);
    Ok(Vec::new())
}

/// Decode one search response body. The endpoint occasionally serves HTML
/// error pages with a 200 status; an undecodable body counts as an empty page
/// so collection moves on instead of aborting the run.
fn decode_search_body(body: &str, page: usize) -> Vec<RawProduct> {
    match serde_json::from_str::<SearchResponse>(body) {
        Ok(data) => data.products,
        Err(e) => {
            eprintln!("  undecodable response, skipping page {}: {}", page, e);
            Vec::new()
        }
    }
}

/// A record is usable once it has an id, a name, and an ingredient text long
/// enough to mean something.
fn is_valid(rp: &RawProduct, min_ingredient_chars: usize) -> bool {
    !rp.code.is_empty()
        && !rp.product_name.trim().is_empty()
        && rp.ingredients_text_en.trim().len() >= min_ingredient_chars
}

/// Strict check for the allergen-free set: no allergen tags, no traces tags,
/// and none of the blocklist keywords anywhere in the ingredient text.
fn is_truly_allergen_free(rp: &RawProduct) -> bool {
    if !rp.allergens_tags.is_empty() || !rp.traces_tags.is_empty() {
        return false;
    }

    let ingredients = rp.ingredients_text_en.to_lowercase();
    !ALLERGEN_FREE_BLOCKLIST
        .iter()
        .any(|kw| ingredients.contains(kw))
}

/// Turn tag identifiers into a readable declaration:
/// `["en:gluten", "en:sesame-seeds"]` becomes `"Gluten, Sesame Seeds"`.
fn format_allergen_tags(tags: &[String]) -> String {
    let formatted: Vec<String> = tags
        .iter()
        .map(|tag| {
            let name = tag.rsplit(':').next().unwrap_or(tag);
            name.split('-')
                .map(title_case)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();

    formatted.join(", ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

impl RawProduct {
    fn into_product(self) -> Product {
        let allergens_raw = format_allergen_tags(&self.allergens_tags);
        Product {
            id: self.code,
            name: self.product_name,
            link: self.url,
            ingredients_raw: self.ingredients_text_en,
            allergens_raw,
            ingredients: String::new(),
            allergensraw: String::new(),
            allergensmapped: String::new(),
            source: RecordSource::Api,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(code: &str, name: &str, ingredients: &str) -> RawProduct {
        RawProduct {
            code: code.to_string(),
            product_name: name.to_string(),
            ingredients_text_en: ingredients.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_format_allergen_tags() {
        let tags = vec!["en:gluten".to_string(), "en:sesame-seeds".to_string()];
        assert_eq!(format_allergen_tags(&tags), "Gluten, Sesame Seeds");
    }

    #[test]
    fn test_format_allergen_tags_without_prefix() {
        let tags = vec!["mustard".to_string()];
        assert_eq!(format_allergen_tags(&tags), "Mustard");
    }

    #[test]
    fn test_decode_search_body() {
        let body = r#"{"products":[{"code":"1","product_name":"Bar","ingredients_text_en":"wheat flour","allergens_tags":["en:gluten"],"url":"https://example.org/1"}]}"#;
        let products = decode_search_body(body, 1);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].code, "1");
    }

    #[test]
    fn test_decode_search_body_tolerates_garbage() {
        assert!(decode_search_body("<html>502 Bad Gateway</html>", 3).is_empty());
        assert!(decode_search_body("", 3).is_empty());
    }

    #[test]
    fn test_is_valid_requires_substantial_ingredients() {
        assert!(is_valid(&raw("1", "Bar", "wheat flour, sugar, salt"), 10));
        assert!(!is_valid(&raw("1", "Bar", "salt"), 10));
        assert!(!is_valid(&raw("", "Bar", "wheat flour, sugar, salt"), 10));
        assert!(!is_valid(&raw("1", "", "wheat flour, sugar, salt"), 10));
    }

    #[test]
    fn test_allergen_free_blocks_tags_and_keywords() {
        let clean = raw("1", "Water", "spring water, minerals");
        assert!(is_truly_allergen_free(&clean));

        let mut tagged = raw("2", "Bar", "rice, sugar");
        tagged.allergens_tags = vec!["en:milk".to_string()];
        assert!(!is_truly_allergen_free(&tagged));

        let mut traced = raw("3", "Bar", "rice, sugar");
        traced.traces_tags = vec!["en:nuts".to_string()];
        assert!(!is_truly_allergen_free(&traced));

        let keyworded = raw("4", "Bar", "rice, peanut oil");
        assert!(!is_truly_allergen_free(&keyworded));
    }

    #[test]
    fn test_into_product_formats_declaration() {
        let mut rp = raw("5", "Choco", "milk chocolate");
        rp.allergens_tags = vec!["en:milk".to_string(), "en:nuts".to_string()];
        rp.url = "https://example.org/5".to_string();

        let product = rp.into_product();
        assert_eq!(product.allergens_raw, "Milk, Nuts");
        assert_eq!(product.link, "https://example.org/5");
        assert_eq!(product.source, RecordSource::Api);
    }
}
