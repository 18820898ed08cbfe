//! Markdown rendering for blog posts.
//!
//! Tables, footnotes, strikethrough, task lists and fenced code are enabled.
//! Soft line breaks render as `<br />` and headings get slug ids so the
//! site can build a table of contents.

use std::collections::HashMap;

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

/// Words per minute used for the read-time estimate.
const WORDS_PER_MINUTE: usize = 200;

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options
}

/// Render markdown to HTML.
pub fn render(markdown: &str) -> String {
    let events: Vec<Event<'_>> = Parser::new_ext(markdown, options())
        .map(|event| match event {
            Event::SoftBreak => Event::HardBreak,
            other => other,
        })
        .collect();

    let events = anchor_headings(events);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

/// Give every heading without an explicit `{#id}` a unique slug id.
fn anchor_headings(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(events.len());
    let mut iter = events.into_iter();

    while let Some(event) = iter.next() {
        let (level, id, classes, attrs) = match event {
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            }) => (level, id, classes, attrs),
            other => {
                out.push(other);
                continue;
            }
        };

        let mut inner = Vec::new();
        let mut text = String::new();
        for next in iter.by_ref() {
            if matches!(next, Event::End(TagEnd::Heading(_))) {
                inner.push(next);
                break;
            }
            if let Event::Text(t) | Event::Code(t) = &next {
                text.push_str(t);
            }
            inner.push(next);
        }

        let id = id.or_else(|| {
            let base = crate::format::slugify(&text);
            if base.is_empty() {
                return None;
            }
            let count = seen.entry(base.clone()).or_insert(0);
            let unique = if *count == 0 {
                base
            } else {
                format!("{base}-{count}")
            };
            *count += 1;
            Some(CowStr::from(unique))
        });

        out.push(Event::Start(Tag::Heading {
            level,
            id,
            classes,
            attrs,
        }));
        out.extend(inner);
    }

    out
}

/// Estimated minutes to read, at least one.
pub fn estimate_read_time(markdown: &str) -> i32 {
    let words = markdown.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_basic_markdown() {
        let html = render("# Title\n\nSome *emphasis* here.");
        assert!(html.contains("<h1 id=\"title\">Title</h1>"));
        assert!(html.contains("<em>emphasis</em>"));
    }

    #[test]
    fn soft_breaks_become_br() {
        let html = render("line one\nline two");
        assert!(html.contains("line one<br />"), "{html}");
    }

    #[test]
    fn duplicate_headings_get_distinct_ids() {
        let html = render("## Setup\n\n## Setup\n");
        assert!(html.contains("id=\"setup\""));
        assert!(html.contains("id=\"setup-1\""));
    }

    #[test]
    fn explicit_heading_ids_are_kept() {
        let html = render("## Install {#install-guide}\n");
        assert!(html.contains("id=\"install-guide\""));
    }

    #[test]
    fn tables_and_fenced_code() {
        let html = render("| a | b |\n|---|---|\n| 1 | 2 |\n\n```rust\nfn main() {}\n```\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<code class=\"language-rust\">"));
    }

    #[test]
    fn read_time_rounds_up() {
        assert_eq!(estimate_read_time(""), 1);
        assert_eq!(estimate_read_time(&"word ".repeat(200)), 1);
        assert_eq!(estimate_read_time(&"word ".repeat(201)), 2);
        assert_eq!(estimate_read_time(&"word ".repeat(1000)), 5);
    }
}
