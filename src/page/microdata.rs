use super::element_text;
use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};
use std::sync::LazyLock;
use url::Url;

static RECIPE_CONTAINER_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("[itemtype*='schema.org/Recipe']").expect("Invalid microdata selector")
});

static NAME_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[itemprop='name']").expect("Invalid itemprop selector"));

static ITEMPROP_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[itemprop]").expect("Invalid itemprop selector"));

/// Elements marked up as a schema.org Recipe, in document order
pub fn recipe_containers(document: &Html) -> Vec<ElementRef<'_>> {
    document.select(&RECIPE_CONTAINER_SELECTOR).collect()
}

/// Trimmed text of the first `itemprop="name"` inside the container
pub fn recipe_name(container: ElementRef) -> Option<String> {
    container
        .select(&NAME_SELECTOR)
        .next()
        .map(|el| element_text(el).trim().to_string())
}

/// Number of `itemprop` annotations inside the container
pub fn property_count(container: ElementRef) -> usize {
    container.select(&ITEMPROP_SELECTOR).count()
}

/// Collect all `itemprop` values under the container into a JSON object.
///
/// Properties that appear more than once (ingredients, steps) become arrays.
pub fn extract_properties(container: ElementRef, base_url: Option<&Url>) -> Map<String, Value> {
    let mut data = Map::new();

    for prop in container.select(&ITEMPROP_SELECTOR) {
        let Some(name) = prop.value().attr("itemprop") else {
            continue;
        };
        let value = Value::String(property_value(prop, base_url));

        match data.get_mut(name) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                data.insert(name.to_string(), value);
            }
        }
    }

    data
}

fn property_value(prop: ElementRef, base_url: Option<&Url>) -> String {
    let element = prop.value();
    if let Some(content) = element.attr("content") {
        return content.to_string();
    }
    if let Some(datetime) = element.attr("datetime") {
        return datetime.to_string();
    }

    let link = match element.name() {
        "img" => element.attr("src"),
        "a" => element.attr("href"),
        _ => None,
    };
    if let Some(link) = link {
        return resolve(link, base_url);
    }

    element_text(prop).trim().to_string()
}

fn resolve(link: &str, base_url: Option<&Url>) -> String {
    base_url
        .and_then(|base| base.join(link).ok())
        .map(String::from)
        .unwrap_or_else(|| link.to_string())
}
