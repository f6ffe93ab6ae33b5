use scraper::{Html, Selector};

/// Fields recovered from one rendered profile page. All best-effort.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFields {
    pub headline: Option<String>,
    pub pronouns: Option<String>,
    pub about: Option<String>,
    pub connections: Option<u32>,
}

/// Page-structure knowledge lives behind this seam so a markup change only
/// requires swapping the strategy, not touching the pipeline.
pub trait ExtractStrategy: Send + Sync {
    fn extract(&self, html: &str) -> ExtractedFields;
}

// Text markers for the known page structure.
const HEADLINE_LEFT: &str = r#"class="text-body-medium" >"#;
const PRONOUNS_LEFT: &str = "pronouns-text";
const ABOUT_LEFT: &str = r#"section class="artdeco-card p4""#;
const CONNECTIONS_LEFT: &str = "connections-and-followers-count";
const RIGHT: &str = "<";

/// Default strategy: fixed text-marker extraction against the known markup.
pub struct MarkerExtractor;

impl ExtractStrategy for MarkerExtractor {
    fn extract(&self, html: &str) -> ExtractedFields {
        ExtractedFields {
            headline: text_between(html, HEADLINE_LEFT, RIGHT),
            pronouns: text_between(html, PRONOUNS_LEFT, RIGHT),
            about: text_between(html, ABOUT_LEFT, RIGHT),
            connections: int_between(html, CONNECTIONS_LEFT, RIGHT),
        }
    }
}

/// CSS-selector strategy for the same fields.
pub struct SelectorExtractor {
    headline: Selector,
    pronouns: Selector,
    about: Selector,
    connections: Selector,
}

impl SelectorExtractor {
    pub fn new() -> Self {
        Self {
            headline: Selector::parse(".text-body-medium").unwrap(),
            pronouns: Selector::parse(".pronouns-text").unwrap(),
            about: Selector::parse("section.artdeco-card p").unwrap(),
            connections: Selector::parse(".connections-and-followers-count").unwrap(),
        }
    }
}

impl Default for SelectorExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractStrategy for SelectorExtractor {
    fn extract(&self, html: &str) -> ExtractedFields {
        let document = Html::parse_document(html);
        ExtractedFields {
            headline: first_text(&document, &self.headline),
            pronouns: first_text(&document, &self.pronouns),
            about: first_text(&document, &self.about),
            connections: first_text(&document, &self.connections)
                .and_then(|text| parse_count(&text)),
        }
    }
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

fn text_between(haystack: &str, left: &str, right: &str) -> Option<String> {
    let (_, tail) = haystack.split_once(left)?;
    let (value, _) = tail.split_once(right)?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// A purely numeric capture parses as the count; anything else is absent.
fn int_between(haystack: &str, left: &str, right: &str) -> Option<u32> {
    text_between(haystack, left, right).and_then(|text| parse_count(&text))
}

fn parse_count(text: &str) -> Option<u32> {
    if text.chars().all(|c| c.is_ascii_digit()) {
        text.parse().ok()
    } else {
        None
    }
}
