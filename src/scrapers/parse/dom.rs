//! Small DOM helpers over `scraper`.

use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use crate::normalize::clean_text;

static IMG: LazyLock<Selector> = LazyLock::new(|| selector("img"));

/// Parse a selector known at compile time.
pub fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {:?}: {:?}", css, e))
}

/// All text under an element, whitespace-collapsed.
pub fn text_of(el: ElementRef<'_>) -> String {
    clean_text(&el.text().collect::<Vec<_>>().join(" "))
}

/// Trimmed non-empty text nodes under an element, in document order.
pub fn text_nodes(el: ElementRef<'_>) -> Vec<String> {
    el.text()
        .map(clean_text)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Direct element children.
pub fn child_elements(el: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    el.children().filter_map(ElementRef::wrap)
}

/// Element ancestors, nearest first.
pub fn ancestor_elements(el: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    el.ancestors().filter_map(ElementRef::wrap)
}

pub fn parent_element(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.parent().and_then(ElementRef::wrap)
}

/// Whether an element has no element children.
pub fn is_leaf(el: ElementRef<'_>) -> bool {
    child_elements(el).next().is_none()
}

/// Whether any class token satisfies the predicate.
pub fn has_class_where(el: ElementRef<'_>, pred: impl Fn(&str) -> bool) -> bool {
    el.value().classes().any(pred)
}

/// `src` (or lazy-load `data-src`) of the first image under `el`.
pub fn first_img_src(el: ElementRef<'_>) -> Option<String> {
    el.select(&IMG).find_map(|i| {
        i.value()
            .attr("src")
            .or_else(|| i.value().attr("data-src"))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_helpers() {
        let doc = Html::parse_fragment(
            r#"<div class="outer"><a class="x cb-live" href="/a"><img data-src="//i/1.png"> Hello <b>World</b></a></div>"#,
        );
        let a = doc.select(&selector("a")).next().unwrap();
        assert_eq!(text_of(a), "Hello World");
        assert_eq!(text_nodes(a), vec!["Hello", "World"]);
        assert_eq!(first_img_src(a).as_deref(), Some("//i/1.png"));
        assert!(has_class_where(a, |c| c.ends_with("live")));
        assert_eq!(parent_element(a).unwrap().value().name(), "div");
        assert!(ancestor_elements(a).any(|e| e.value().name() == "div"));
        let b = doc.select(&selector("b")).next().unwrap();
        assert!(is_leaf(b));
        assert!(!is_leaf(a));
    }
}
