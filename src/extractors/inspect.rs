use crate::page::{char_len, element_text, Page};
use scraper::{ElementRef, Selector};
use serde::Serialize;
use std::sync::LazyLock;

static ALL_HEADINGS_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h1, h2, h3, h4, h5, [role='heading']").expect("Invalid heading selector")
});

static CONTAINER_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("[class*='Detail'], [class*='detail'], [class*='Section'], [class*='section']")
        .expect("Invalid container selector")
});

const RELEVANT_WORDS: [&str; 6] = ["why", "before", "works", "begin", "tips", "notes"];

const CLASS_PATTERNS: [&str; 14] = [
    "[class*='why']",
    "[class*='Why']",
    "[class*='before']",
    "[class*='Before']",
    "[class*='works']",
    "[class*='Works']",
    "[class*='begin']",
    "[class*='Begin']",
    "[class*='recipe-body']",
    "[class*='RecipeBody']",
    "[class*='recipe-intro']",
    "[class*='RecipeIntro']",
    "[data-testid*='why']",
    "[data-testid*='before']",
];

/// Always report this many leading headings, relevant or not
const LEADING_HEADINGS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadingInfo {
    pub index: usize,
    pub tag: String,
    pub text: String,
    pub class_name: String,
    pub parent_tag: String,
    pub parent_class: String,
    pub is_relevant: bool,
    pub next_sibling_tag: Option<String>,
    pub next_sibling_preview: Option<String>,
    pub parent_content_preview: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassPatternMatch {
    pub pattern: String,
    pub tag: String,
    pub class_name: String,
    pub text_preview: String,
}

/// Page structure around the narrative sections, for tuning the finders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionInspection {
    pub domain: String,
    pub headings: Vec<HeadingInfo>,
    pub class_patterns: Vec<ClassPatternMatch>,
    pub potential_sections: Vec<ClassPatternMatch>,
}

pub fn inspect_sections(page: &Page) -> SectionInspection {
    let headings = page
        .document
        .select(&ALL_HEADINGS_SELECTOR)
        .enumerate()
        .filter_map(|(index, heading)| heading_info(index, heading))
        .collect();

    let class_patterns = CLASS_PATTERNS
        .iter()
        .filter_map(|pattern| Selector::parse(pattern).ok().map(|s| (*pattern, s)))
        .flat_map(|(pattern, selector)| {
            page.document
                .select(&selector)
                .map(|el| pattern_match(pattern, el, 300))
                .collect::<Vec<_>>()
        })
        .collect();

    let potential_sections = page
        .document
        .select(&CONTAINER_SELECTOR)
        .filter(|el| {
            let text = element_text(*el).to_lowercase();
            text.contains("why this recipe works") || text.contains("before you begin")
        })
        .map(|el| pattern_match("section", el, 500))
        .collect();

    SectionInspection {
        domain: page.domain(),
        headings,
        class_patterns,
        potential_sections,
    }
}

fn heading_info(index: usize, heading: ElementRef) -> Option<HeadingInfo> {
    let text = element_text(heading).trim().to_string();
    let lower = text.to_lowercase();
    let is_relevant = RELEVANT_WORDS.iter().any(|word| lower.contains(word));
    if !is_relevant && index >= LEADING_HEADINGS {
        return None;
    }

    let parent = heading.parent().and_then(ElementRef::wrap);
    let next = heading.next_siblings().find_map(ElementRef::wrap);

    let parent_content_preview = parent.and_then(|parent| {
        let parent_text = element_text(parent).trim().to_string();
        let heading_len = char_len(&text);
        (char_len(&parent_text) > heading_len + 50)
            .then(|| parent_text.chars().skip(heading_len).take(300).collect::<String>())
    });

    Some(HeadingInfo {
        index,
        tag: heading.value().name().to_string(),
        text: preview(&text, 100),
        class_name: class_of(Some(heading)),
        parent_tag: parent
            .map(|p| p.value().name().to_string())
            .unwrap_or_default(),
        parent_class: class_of(parent),
        is_relevant,
        next_sibling_tag: next.map(|n| n.value().name().to_string()),
        next_sibling_preview: next.map(|n| preview(&element_text(n), 200)),
        parent_content_preview,
    })
}

fn pattern_match(pattern: &str, element: ElementRef, limit: usize) -> ClassPatternMatch {
    ClassPatternMatch {
        pattern: pattern.to_string(),
        tag: element.value().name().to_string(),
        class_name: class_of(Some(element)),
        text_preview: preview(&element_text(element), limit),
    }
}

fn class_of(element: Option<ElementRef>) -> String {
    element
        .and_then(|el| el.value().attr("class"))
        .unwrap_or_default()
        .to_string()
}

fn preview(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
