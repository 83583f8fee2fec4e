use crate::model::AuxiliarySection;
use crate::page::{char_len, element_text};
use log::debug;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// Content must be longer than this to count as a section
pub const MIN_SECTION_CHARS: usize = 20;
/// A heading's parent must carry this many more characters than the heading itself
pub const PARENT_MARGIN_CHARS: usize = 50;
/// Class matches longer than this are most likely the whole page
pub const MAX_SECTION_CHARS: usize = 10_000;
/// How many siblings after a heading are collected
pub const MAX_SIBLING_WALK: usize = 10;
/// Minimum paragraph length inside a recipe body container
pub const MIN_PARAGRAPH_CHARS: usize = 50;

static HEADING_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h2, h3, h4, [role='heading']").expect("Invalid heading selector")
});

static CLASSED_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("[class], [data-testid]").expect("Invalid class selector")
});

static PARAGRAPH_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("Invalid paragraph selector"));

const STOP_TAGS: [&str; 4] = ["h1", "h2", "h3", "h4"];

const RATIONALE_LABEL: &str = "why this recipe works";

const DETAIL_BODY_CLASSES: [&str; 4] = ["recipedetail", "recipe-detail", "recipebody", "recipe-body"];

/// The narrative sections worth carrying over as recipe notes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// "Why this recipe works"
    Rationale,
    /// "Before you begin"
    PreparationNotes,
}

impl SectionKind {
    pub const ALL: [SectionKind; 2] = [SectionKind::Rationale, SectionKind::PreparationNotes];

    pub fn title(&self) -> &'static str {
        match self {
            SectionKind::Rationale => "Why This Recipe Works",
            SectionKind::PreparationNotes => "Before You Begin",
        }
    }

    /// Lower-case phrases that mark a heading of this section
    fn heading_phrases(&self) -> &'static [&'static str] {
        match self {
            SectionKind::Rationale => &["why this recipe works", "why it works"],
            SectionKind::PreparationNotes => &["before you begin", "getting started"],
        }
    }

    /// Lower-case class-name fragments covering camelCase, kebab and snake spellings
    fn class_variants(&self) -> &'static [&'static str] {
        match self {
            SectionKind::Rationale => &["whythis", "why-this", "why_this"],
            SectionKind::PreparationNotes => &["beforeyoubegin", "before-you-begin", "before_you_begin"],
        }
    }
}

/// One way of locating a section's content in a document
pub trait SectionFinder {
    fn name(&self) -> &'static str;
    fn find(&self, document: &Html, kind: SectionKind) -> Option<String>;
}

/// Finds a heading with the section's title and reads what follows it
pub struct HeadingFinder;

impl SectionFinder for HeadingFinder {
    fn name(&self) -> &'static str {
        "heading"
    }

    fn find(&self, document: &Html, kind: SectionKind) -> Option<String> {
        document
            .select(&HEADING_SELECTOR)
            .filter(|heading| {
                let text = element_text(*heading).trim().to_lowercase();
                kind.heading_phrases()
                    .iter()
                    .any(|phrase| text.contains(phrase))
            })
            .map(following_content)
            .find(|content| char_len(content) > MIN_SECTION_CHARS)
    }
}

/// Finds an element whose class names the section
pub struct ClassFinder;

impl SectionFinder for ClassFinder {
    fn name(&self) -> &'static str {
        "class"
    }

    fn find(&self, document: &Html, kind: SectionKind) -> Option<String> {
        document
            .select(&CLASSED_SELECTOR)
            .filter(|element| class_matches(*element, kind))
            .map(|element| {
                let text = element_text(element).trim().to_string();
                match kind {
                    SectionKind::Rationale => strip_label(&text, RATIONALE_LABEL),
                    SectionKind::PreparationNotes => text,
                }
            })
            .find(|text| {
                let len = char_len(text);
                len > MIN_SECTION_CHARS && len < MAX_SECTION_CHARS
            })
    }
}

/// Looks for the rationale paragraph inside a recipe detail/body container
pub struct DetailBodyFinder;

impl SectionFinder for DetailBodyFinder {
    fn name(&self) -> &'static str {
        "detail-body"
    }

    fn find(&self, document: &Html, kind: SectionKind) -> Option<String> {
        if kind != SectionKind::Rationale {
            return None;
        }

        document
            .select(&CLASSED_SELECTOR)
            .filter(|element| {
                let class = element.value().attr("class").unwrap_or_default().to_lowercase();
                DETAIL_BODY_CLASSES.iter().any(|variant| class.contains(variant))
            })
            .filter(|container| {
                element_text(*container)
                    .to_lowercase()
                    .contains(RATIONALE_LABEL)
            })
            .flat_map(|container| container.select(&PARAGRAPH_SELECTOR))
            .map(|paragraph| element_text(paragraph).trim().to_string())
            .find(|text| {
                char_len(text) > MIN_PARAGRAPH_CHARS && !text.to_lowercase().starts_with("before")
            })
    }
}

/// Finders in the order they are attempted
pub fn default_finders() -> Vec<Box<dyn SectionFinder>> {
    vec![
        Box::new(HeadingFinder),
        Box::new(ClassFinder),
        Box::new(DetailBodyFinder),
    ]
}

/// Run the finders for every section kind; sections with no match are left out.
pub fn find_sections(document: &Html) -> Vec<AuxiliarySection> {
    find_sections_with(document, &default_finders())
}

pub fn find_sections_with(
    document: &Html,
    finders: &[Box<dyn SectionFinder>],
) -> Vec<AuxiliarySection> {
    SectionKind::ALL
        .iter()
        .filter_map(|kind| {
            finders.iter().find_map(|finder| {
                let content = finder.find(document, *kind)?;
                debug!("{} section found by {} finder", kind.title(), finder.name());
                Some(AuxiliarySection {
                    title: kind.title().to_string(),
                    content,
                })
            })
        })
        .collect()
}

/// Text after a heading: the rest of its container when that is substantial,
/// otherwise the following siblings up to the next heading.
pub(crate) fn following_content(heading: ElementRef) -> String {
    let heading_text = element_text(heading).trim().to_string();

    if let Some(parent) = heading.parent().and_then(ElementRef::wrap) {
        let parent_text = element_text(parent).trim().to_string();
        if char_len(&parent_text) > char_len(&heading_text) + PARENT_MARGIN_CHARS {
            let remaining = parent_text.replacen(&heading_text, "", 1).trim().to_string();
            if char_len(&remaining) > PARENT_MARGIN_CHARS {
                return remaining;
            }
        }
    }

    heading
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .take_while(|sibling| !STOP_TAGS.contains(&sibling.value().name()))
        .take(MAX_SIBLING_WALK)
        .map(|sibling| element_text(sibling).trim().to_string())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn class_matches(element: ElementRef, kind: SectionKind) -> bool {
    let value = element.value();
    let class = value.attr("class").unwrap_or_default().to_lowercase();
    if kind
        .class_variants()
        .iter()
        .any(|variant| class.contains(variant))
    {
        return true;
    }

    kind == SectionKind::Rationale
        && value
            .attr("data-testid")
            .is_some_and(|id| id.to_lowercase().contains("why"))
}

/// Remove the first case-insensitive occurrence of an ASCII label
fn strip_label(text: &str, label: &str) -> String {
    match text.to_ascii_lowercase().find(label) {
        Some(start) => {
            let mut stripped = String::with_capacity(text.len());
            stripped.push_str(&text[..start]);
            stripped.push_str(&text[start + label.len()..]);
            stripped.trim().to_string()
        }
        None => text.to_string(),
    }
}
