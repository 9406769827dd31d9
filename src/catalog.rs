//! Navigation catalog — the static registry of named destinations.
//!
//! Organized category → destination, each destination carrying a canonical
//! path plus keyword and synonym lists. Loaded once from YAML at first use
//! and never mutated at runtime. The catalog is small (< 20 entries), so
//! lookup is a linear scan in declaration order — which is also the
//! deterministic tie-break order for scoring.

use serde::Deserialize;
use std::sync::OnceLock;

use crate::normalize::{self, TextProfile};

// ---------------------------------------------------------------------------
// Embedded fallback
// ---------------------------------------------------------------------------

const EMBEDDED_CATALOG: &str = include_str!("../data/catalog.yaml");

// ---------------------------------------------------------------------------
// YAML schema types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CatalogYaml {
    categories: Vec<CategoryYaml>,
}

#[derive(Debug, Deserialize)]
struct CategoryYaml {
    name: String,
    destinations: Vec<DestinationYaml>,
}

#[derive(Debug, Deserialize)]
struct DestinationYaml {
    name: String,
    path: String,
    keywords: Vec<String>,
    #[serde(default)]
    synonyms: Vec<String>,
}

// ---------------------------------------------------------------------------
// NavigationEntry — one destination, match-ready
// ---------------------------------------------------------------------------

/// One catalog destination. Immutable after load.
#[derive(Debug)]
pub struct NavigationEntry {
    pub category: String,
    pub name: String,
    pub path: String,
    pub keywords: Vec<String>,
    pub synonyms: Vec<String>,
    /// Match profile computed at load from name + keywords + synonyms.
    pub profile: TextProfile,
}

// ---------------------------------------------------------------------------
// Singleton
// ---------------------------------------------------------------------------

static CATALOG: OnceLock<Vec<NavigationEntry>> = OnceLock::new();

/// Get the loaded catalog in declaration order (singleton).
pub fn catalog() -> &'static [NavigationEntry] {
    CATALOG.get_or_init(load_catalog)
}

/// Human-readable listing of the whole catalog, grouped by category.
pub fn listing() -> String {
    let mut out = String::from("이동할 수 있는 메뉴예요:\n");
    let mut current_category = "";
    for entry in catalog() {
        if entry.category != current_category {
            current_category = &entry.category;
            out.push_str(&format!("[{}]\n", current_category));
        }
        out.push_str(&format!("  • {} ({})\n", entry.name, entry.path));
    }
    out.push_str("원하는 메뉴 이름을 말하면 바로 이동할게요.");
    out
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

fn load_catalog() -> Vec<NavigationEntry> {
    let yaml_str = std::fs::read_to_string("data/catalog.yaml")
        .ok()
        .unwrap_or_else(|| EMBEDDED_CATALOG.to_string());

    parse_catalog(&yaml_str).unwrap_or_else(|e| {
        tracing::warn!("failed to parse catalog.yaml from disk ({}), using embedded", e);
        parse_catalog(EMBEDDED_CATALOG).expect("embedded catalog.yaml must parse")
    })
}

fn parse_catalog(yaml_str: &str) -> Result<Vec<NavigationEntry>, String> {
    let raw: CatalogYaml = serde_yaml::from_str(yaml_str)
        .map_err(|e| format!("YAML parse error: {}", e))?;

    let mut entries = Vec::new();
    for category in raw.categories {
        for dest in category.destinations {
            // Profile over everything the entry can be referred to by.
            let joined = format!(
                "{} {} {}",
                dest.name,
                dest.keywords.join(" "),
                dest.synonyms.join(" "),
            );
            entries.push(NavigationEntry {
                category: category.name.clone(),
                name: dest.name,
                path: dest.path,
                keywords: dest.keywords,
                synonyms: dest.synonyms,
                profile: normalize::analyze(&joined),
            });
        }
    }
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
