use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// One of the three ways a recipe can be handed to Mealie.
///
/// Serialized with the short names that are stored in the preference map
/// (`"url"`, `"jsonld"`, `"html"`); the long names are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImportMethod {
    /// Let the server fetch and scrape the page itself
    #[serde(rename = "url", alias = "urlImport")]
    UrlImport,
    /// Pull the embedded JSON-LD recipe out of the page and send that
    #[serde(rename = "jsonld", alias = "structuredExtraction")]
    StructuredExtraction,
    /// Send the full page markup for server-side parsing
    #[serde(rename = "html", alias = "htmlParse")]
    HtmlParse,
}

impl ImportMethod {
    pub const ALL: [ImportMethod; 3] = [
        ImportMethod::UrlImport,
        ImportMethod::StructuredExtraction,
        ImportMethod::HtmlParse,
    ];

    /// Key used in the persisted preference map
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportMethod::UrlImport => "url",
            ImportMethod::StructuredExtraction => "jsonld",
            ImportMethod::HtmlParse => "html",
        }
    }

    /// Short human label, e.g. for "Will use Schema extraction for this site"
    pub fn label(&self) -> &'static str {
        match self {
            ImportMethod::UrlImport => "URL import",
            ImportMethod::StructuredExtraction => "Schema extraction",
            ImportMethod::HtmlParse => "HTML parsing",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ImportMethod::UrlImport => "Send URL to Mealie server to fetch and parse.",
            ImportMethod::StructuredExtraction => "Extract recipe data embedded in the page.",
            ImportMethod::HtmlParse => "Send full page HTML for parsing.",
        }
    }
}

impl fmt::Display for ImportMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "url" | "urlimport" => Ok(ImportMethod::UrlImport),
            "jsonld" | "json-ld" | "structuredextraction" => {
                Ok(ImportMethod::StructuredExtraction)
            }
            "html" | "htmlparse" => Ok(ImportMethod::HtmlParse),
            other => Err(format!("unknown import method: {other}")),
        }
    }
}

/// Either let the chooser decide, or force a specific method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MethodChoice {
    #[default]
    Auto,
    Fixed(ImportMethod),
}

impl MethodChoice {
    /// Resolve against the recommended method
    pub fn resolve(&self, recommended: ImportMethod) -> ImportMethod {
        match self {
            MethodChoice::Auto => recommended,
            MethodChoice::Fixed(method) => *method,
        }
    }

    /// Hint line shown before importing
    pub fn hint(&self, recommended: ImportMethod) -> String {
        match self {
            MethodChoice::Auto => format!("Will use {} for this site", recommended.label()),
            MethodChoice::Fixed(method) => format!("Using {}", method.label()),
        }
    }
}

impl FromStr for MethodChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            Ok(MethodChoice::Auto)
        } else {
            s.parse().map(MethodChoice::Fixed)
        }
    }
}

/// Snapshot of the recipe metadata present on one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageAnalysis {
    pub has_structured_recipe: bool,
    pub has_embedded_attributes: bool,
    pub recipe_name: Option<String>,
    /// Length in bytes of the serialized markup
    pub document_size: usize,
    pub domain: String,
}

impl PageAnalysis {
    pub fn recipe_detected(&self) -> bool {
        self.has_structured_recipe || self.has_embedded_attributes
    }

    /// Status line such as `"Chocolate Cake" detected`
    pub fn detection_summary(&self) -> String {
        if !self.recipe_detected() {
            return "No recipe schema found".to_string();
        }
        match &self.recipe_name {
            Some(name) if name.chars().count() > 30 => {
                let short: String = name.chars().take(30).collect();
                format!("\"{short}...\" detected")
            }
            Some(name) => format!("\"{name}\" detected"),
            None => "Recipe detected".to_string(),
        }
    }
}

/// Narrative text the JSON-LD schema does not carry, attached as a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxiliarySection {
    pub title: String,
    pub content: String,
}

/// A structured recipe ready to be sent to the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedRecipe {
    pub found: bool,
    /// The schema.org Recipe object as it appeared on the page
    pub primary_data: Value,
    pub auxiliary_sections: Vec<AuxiliarySection>,
}

impl ExtractedRecipe {
    pub fn not_found() -> Self {
        ExtractedRecipe {
            found: false,
            primary_data: Value::Null,
            auxiliary_sections: Vec::new(),
        }
    }
}

/// Result of a successful import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub slug: String,
    pub recipe_url: String,
    pub method: ImportMethod,
}
