//! Builds the payload sent to the server for each import method.

pub mod inspect;
pub mod sections;

pub use inspect::{inspect_sections, ClassPatternMatch, HeadingInfo, SectionInspection};
pub use sections::{
    find_sections, ClassFinder, DetailBodyFinder, HeadingFinder, SectionFinder, SectionKind,
};

use crate::model::{ExtractedRecipe, ImportMethod};
use crate::page::{json_ld, microdata, Page};
use log::debug;
use serde::Serialize;
use serde_json::Value;
use url::Url;

/// What gets submitted for a chosen method
#[derive(Debug, Clone, PartialEq)]
pub enum ImportPayload {
    /// The page address; the server does the fetching
    Url(String),
    /// The full serialized markup
    Html(String),
    /// The JSON-LD recipe plus any narrative sections
    Structured(ExtractedRecipe),
}

/// Produce the payload for `method` without touching the page
pub fn extract(page: &Page, method: ImportMethod) -> ImportPayload {
    match method {
        ImportMethod::UrlImport => ImportPayload::Url(page.url.clone()),
        ImportMethod::HtmlParse => ImportPayload::Html(page.markup().to_string()),
        ImportMethod::StructuredExtraction => ImportPayload::Structured(extract_structured(page)),
    }
}

/// Pull the JSON-LD recipe and the auxiliary sections.
///
/// A page without a JSON-LD recipe yields `found: false` and no sections.
pub fn extract_structured(page: &Page) -> ExtractedRecipe {
    let Some(recipe) = json_ld::find_recipe_in_document(&page.document) else {
        return ExtractedRecipe::not_found();
    };

    let auxiliary_sections = find_sections(&page.document);
    debug!(
        "Extracted JSON-LD recipe with {} additional sections",
        auxiliary_sections.len()
    );

    ExtractedRecipe {
        found: true,
        primary_data: recipe,
        auxiliary_sections,
    }
}

/// Where the recipe data returned by [`extract_recipe_data`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecipeDataKind {
    #[serde(rename = "json-ld")]
    JsonLd,
    #[serde(rename = "microdata")]
    Microdata,
}

/// Recipe data found on a page, as returned to the `getRecipeData` action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeData {
    pub found: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<RecipeDataKind>,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

/// JSON-LD recipe if there is one, otherwise the microdata properties of the
/// first schema.org Recipe container.
pub fn extract_recipe_data(page: &Page) -> RecipeData {
    if let Some(recipe) = json_ld::find_recipe_in_document(&page.document) {
        return RecipeData {
            found: true,
            kind: Some(RecipeDataKind::JsonLd),
            data: recipe,
        };
    }

    if let Some(container) = microdata::recipe_containers(&page.document).first() {
        let base_url = Url::parse(&page.url).ok();
        return RecipeData {
            found: true,
            kind: Some(RecipeDataKind::Microdata),
            data: Value::Object(microdata::extract_properties(*container, base_url.as_ref())),
        };
    }

    RecipeData {
        found: false,
        kind: None,
        data: Value::Null,
    }
}
