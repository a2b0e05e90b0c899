//! Finding "next page" and "previous page" links.
//!
//! Pages rarely mark pagination links in a machine-readable way, so the
//! matcher scores clickable elements by their text against a list of
//! phrases. Shorter link texts win; among equally short ones, the element
//! further down the page wins.

use regex::{Regex, RegexBuilder};

use keynav_dom::memory::resolve_url;
use keynav_dom::{Frame, NodeId, Page, TagName};

/// A clickable element whose text contains one of the phrases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub node: NodeId,
    pub text: String,
    pub value: String,
    pub title: String,
    pub aria_label: String,
    /// Whitespace-separated tokens in the trimmed text, at least 1.
    pub word_count: usize,
    /// Position in reverse document order.
    pub original_index: usize,
}

impl Candidate {
    fn fields(&self) -> [&str; 4] {
        [&self.text, &self.value, &self.title, &self.aria_label]
    }

    /// Case-insensitive substring test against every text field.
    fn contains_any(&self, phrases: &[String]) -> bool {
        phrases.iter().any(|phrase| {
            let phrase = phrase.to_lowercase();
            self.fields().iter().any(|f| f.contains(&phrase))
        })
    }

    fn matches(&self, re: &Regex) -> bool {
        self.fields().iter().any(|f| re.is_match(f))
    }
}

/// Word count as a browser would compute `text.trim().split(/\s+/).length`.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count().max(1)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// The regex used to rank candidates for one phrase.
///
/// Phrases that start or end with a word character must match on word
/// boundaries (`next` does not match `nextcompany`); phrases made of
/// punctuation such as `>>` match anywhere.
pub fn phrase_regex(phrase: &str) -> Result<Regex, regex::Error> {
    let escaped = regex::escape(phrase);
    let bounded = phrase.chars().next().is_some_and(is_word_char)
        || phrase.chars().next_back().is_some_and(is_word_char);
    let pattern = if bounded {
        format!(r"\b{escaped}\b")
    } else {
        escaped
    };
    RegexBuilder::new(&pattern).case_insensitive(true).build()
}

/// Visible clickable elements matching any phrase, in reverse document
/// order.
pub fn collect_candidates<P: Page + ?Sized>(page: &P, phrases: &[String]) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for node in page.clickable_elements().into_iter().rev() {
        if page.computed_style(node).is_hidden() {
            continue;
        }
        let lower_attr = |name: &str| {
            page.attribute(node, name)
                .map(|v| v.to_lowercase())
                .unwrap_or_default()
        };
        let mut candidate = Candidate {
            node,
            text: page.inner_text(node).unwrap_or_default().to_lowercase(),
            value: page.form_value(node).unwrap_or_default().to_lowercase(),
            title: lower_attr("title"),
            aria_label: lower_attr("aria-label"),
            word_count: 0,
            original_index: 0,
        };
        if !candidate.contains_any(phrases) {
            continue;
        }
        candidate.word_count = word_count(&candidate.text);
        candidate.original_index = candidates.len();
        candidates.push(candidate);
    }
    candidates
}

/// Order candidates by word count (ties by `original_index`) and drop those
/// more than one word longer than the shortest.
pub fn shortlist(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by_key(|c| (c.word_count, c.original_index));
    if let Some(shortest) = candidates.first().map(|c| c.word_count) {
        candidates.retain(|c| c.word_count <= shortest + 1);
    }
    candidates
}

/// The best element for `phrases`, most preferred phrase first.
pub fn find_link<P: Page + ?Sized>(page: &P, phrases: &[String]) -> Option<NodeId> {
    let candidates = shortlist(collect_candidates(page, phrases));
    if candidates.is_empty() {
        return None;
    }
    for phrase in phrases {
        let re = match phrase_regex(phrase) {
            Ok(re) => re,
            Err(e) => {
                log::warn!("Skipping link phrase {phrase:?}: {e}");
                continue;
            },
        };
        if let Some(found) = candidates.iter().find(|c| c.matches(&re)) {
            log::debug!(
                "Phrase {phrase:?} matched node {} ({:?})",
                found.node,
                found.text
            );
            return Some(found.node);
        }
    }
    None
}

/// First `link`, `a`, or `area` element whose `rel` equals `value`, checked
/// tag by tag in that order.
pub fn find_element_with_rel<P: Page + ?Sized>(page: &P, value: &str) -> Option<NodeId> {
    [TagName::Link, TagName::A, TagName::Area]
        .iter()
        .flat_map(|tag| page.elements_by_tag(tag))
        .find(|&node| {
            page.attribute(node, "rel")
                .is_some_and(|rel| rel.eq_ignore_ascii_case(value))
        })
}

/// Activate a pagination link.
///
/// `<link>` elements are not rendered, so the frame navigates to their
/// `href`. Anything else is scrolled into view and clicked, which keeps
/// script-driven "load more" buttons working.
pub fn follow_link<F: Frame + ?Sized>(frame: &mut F, node: NodeId) {
    if frame.tag_name(node) == Some(TagName::Link) {
        if let Some(href) = frame.attribute(node, "href") {
            let url = resolve_url(&frame.location(), &href);
            log::info!("Following <link> to {url}");
            frame.set_location(&url);
        }
        return;
    }
    frame.scroll_into_view(node);
    frame.simulate_click(node);
}

/// `rel` lookup first, then the phrase matcher. Returns the element
/// followed, if any.
pub fn find_and_follow<F: Frame + ?Sized>(
    frame: &mut F,
    rel: &str,
    phrases: &[String],
) -> Option<NodeId> {
    let target = find_element_with_rel(&*frame, rel).or_else(|| find_link(&*frame, phrases))?;
    follow_link(frame, target);
    Some(target)
}
