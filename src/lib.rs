//! Import recipes from web pages into a Mealie server.
//!
//! A page is analyzed for embedded recipe data, an import method is chosen
//! for it (server-side URL scrape, extracted JSON-LD, or raw HTML), the
//! payload is submitted, and the method that worked is remembered for the
//! page's domain.

pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod extractors;
pub mod fetcher;
pub mod importer;
pub mod messages;
pub mod model;
pub mod page;
pub mod preferences;
pub mod strategy;

// Re-export main types
pub use builder::{PageSource, RecipeImporter, RecipeImporterBuilder};
pub use client::{normalize_slug, CurrentUser, MealieClient, RecipeApi};
pub use config::ImportSettings;
pub use error::ImportError;
pub use extractors::{extract, extract_recipe_data, extract_structured, find_sections, ImportPayload};
pub use importer::Importer;
pub use messages::{Dispatcher, Request, Response};
pub use model::{
    AuxiliarySection, ExtractedRecipe, ImportMethod, ImportOutcome, MethodChoice, PageAnalysis,
};
pub use page::{analyze, Page};
pub use preferences::{JsonFileStore, MemoryStore, PreferenceStore};
pub use strategy::{choose_method, domain_of};

/// Analyze markup loaded from `url`
pub fn analyze_html(url: &str, html: &str) -> PageAnalysis {
    analyze(&Page::parse(url, html))
}

/// Recommended method for markup loaded from `url` under `settings`
pub fn recommend_method(url: &str, html: &str, settings: &ImportSettings) -> ImportMethod {
    let page = Page::parse(url, html);
    let analysis = analyze(&page);
    choose_method(&analysis.domain, &page.url, &analysis, settings)
}
