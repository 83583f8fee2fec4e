use super::{json_ld, microdata, Page};
use crate::model::PageAnalysis;
use crate::strategy::LARGE_PAGE_THRESHOLD;
use log::debug;
use serde::Serialize;

/// Pages smaller than this rarely contain the full recipe
pub const SMALL_PAGE_THRESHOLD: usize = 5_000;

/// Summarize which recipe markup conventions the page carries.
///
/// Malformed JSON-LD blocks are skipped, and a page without any recipe
/// markup is a normal result rather than an error.
pub fn analyze(page: &Page) -> PageAnalysis {
    let mut analysis = PageAnalysis {
        document_size: page.size(),
        domain: page.domain(),
        ..Default::default()
    };

    if let Some(recipe) = json_ld::find_recipe_in_document(&page.document) {
        analysis.has_structured_recipe = true;
        analysis.recipe_name = json_ld::recipe_name(&recipe);
    }

    if let Some(container) = microdata::recipe_containers(&page.document).first() {
        analysis.has_embedded_attributes = true;
        if analysis.recipe_name.is_none() {
            analysis.recipe_name = microdata::recipe_name(*container);
        }
    }

    debug!(
        "Analyzed {}: json-ld={} microdata={} size={}",
        analysis.domain,
        analysis.has_structured_recipe,
        analysis.has_embedded_attributes,
        analysis.document_size
    );

    analysis
}

/// Per-block outcome of the JSON-LD scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonLdReport {
    pub index: usize,
    pub kind: Option<String>,
    pub has_recipe: bool,
    pub recipe_name: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MicrodataReport {
    pub index: usize,
    pub props_count: usize,
}

/// Detailed diagnostics for pages where the import did not go as expected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInspection {
    pub url: String,
    pub title: Option<String>,
    pub html_size: usize,
    pub has_recipe_schema: bool,
    pub json_ld: Vec<JsonLdReport>,
    pub microdata: Vec<MicrodataReport>,
    pub errors: Vec<String>,
    pub possible_issues: Vec<String>,
}

pub fn inspect(page: &Page) -> PageInspection {
    let mut inspection = PageInspection {
        url: page.url.clone(),
        title: page.title(),
        html_size: page.size(),
        has_recipe_schema: false,
        json_ld: Vec::new(),
        microdata: Vec::new(),
        errors: Vec::new(),
        possible_issues: Vec::new(),
    };

    for block in json_ld::blocks(&page.document) {
        let report = match &block.parsed {
            Ok(value) => {
                let recipe = json_ld::find_recipe(value);
                JsonLdReport {
                    index: block.index,
                    kind: Some(json_ld::type_label(value)),
                    has_recipe: recipe.is_some(),
                    recipe_name: recipe.and_then(json_ld::recipe_name),
                    error: None,
                }
            }
            Err(e) => {
                inspection
                    .errors
                    .push(format!("JSON-LD {}: {}", block.index, e));
                JsonLdReport {
                    index: block.index,
                    kind: None,
                    has_recipe: false,
                    recipe_name: None,
                    error: Some(e.to_string()),
                }
            }
        };
        inspection.has_recipe_schema |= report.has_recipe;
        inspection.json_ld.push(report);
    }

    for (index, container) in microdata::recipe_containers(&page.document)
        .into_iter()
        .enumerate()
    {
        inspection.microdata.push(MicrodataReport {
            index,
            props_count: microdata::property_count(container),
        });
        inspection.has_recipe_schema = true;
    }

    let body_text = page.body_text().to_lowercase();
    if body_text.contains("sign in") || body_text.contains("log in") {
        inspection
            .possible_issues
            .push("Page may require authentication".to_string());
    }
    if inspection.html_size < SMALL_PAGE_THRESHOLD {
        inspection
            .possible_issues
            .push("Page HTML is very small".to_string());
    }
    if inspection.html_size > LARGE_PAGE_THRESHOLD {
        inspection
            .possible_issues
            .push("Large page - Schema extraction recommended".to_string());
    }

    inspection
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspect_reports_each_block() {
        let html = r#"
            <html><head>
            <script type="application/ld+json">{"@type": "WebSite", "name": "Site"}</script>
            <script type="application/ld+json">{ broken json</script>
            <script type="application/ld+json">{"@graph": [{"@type": "Recipe", "name": "Stew"}]}</script>
            </head><body><a href="/login">Log in</a></body></html>
        "#;
        let page = Page::parse("https://example.com/stew", html);
        let inspection = inspect(&page);

        assert!(inspection.has_recipe_schema);
        assert_eq!(inspection.json_ld.len(), 3);
        assert_eq!(inspection.json_ld[0].kind.as_deref(), Some("WebSite"));
        assert!(!inspection.json_ld[0].has_recipe);
        assert!(inspection.json_ld[1].error.is_some());
        assert_eq!(inspection.errors.len(), 1);
        assert!(inspection.errors[0].starts_with("JSON-LD 1:"));
        assert_eq!(inspection.json_ld[2].kind.as_deref(), Some("@graph"));
        assert_eq!(inspection.json_ld[2].recipe_name.as_deref(), Some("Stew"));
        assert!(inspection
            .possible_issues
            .contains(&"Page may require authentication".to_string()));
        assert!(inspection
            .possible_issues
            .contains(&"Page HTML is very small".to_string()));
    }

    #[test]
    fn test_inspect_empty_page() {
        let page = Page::parse("https://example.com", "<html><body></body></html>");
        let inspection = inspect(&page);
        assert!(!inspection.has_recipe_schema);
        assert!(inspection.json_ld.is_empty());
        assert!(inspection.microdata.is_empty());
    }
}
