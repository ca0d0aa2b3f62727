//! HTML extraction helpers shared by the scraped sources

use scraper::{ElementRef, Html, Selector};

use super::ConnectorError;

/// Compile a CSS selector
pub fn selector(css: &str) -> Result<Selector, ConnectorError> {
    Selector::parse(css).map_err(|e| ConnectorError::Parse(format!("Bad selector {}: {}", css, e)))
}

/// Collapse whitespace runs to single spaces and trim
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// All text under `el`, whitespace-collapsed
pub fn clean_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

/// Text of the first element matching `sel` under `el`, empty if none
pub fn first_text(el: ElementRef<'_>, sel: &Selector) -> String {
    el.select(sel).next().map(clean_text).unwrap_or_default()
}

/// Whether any element in the document matches `sel`
pub fn exists(doc: &Html, sel: &Selector) -> bool {
    doc.select(sel).next().is_some()
}

/// Nearest `div` enclosing the first text node that contains `needle`
pub fn enclosing_div_of_text<'a>(doc: &'a Html, needle: &str) -> Option<ElementRef<'a>> {
    doc.tree
        .root()
        .descendants()
        .find(|node| node.value().as_text().is_some_and(|t| t.contains(needle)))?
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "div")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  c "), "a b c");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn test_clean_text_joins_nested_nodes() {
        let doc = Html::parse_fragment("<div><b>big</b>   <i>deal</i>\n</div>");
        let sel = selector("div").unwrap();
        let div = doc.select(&sel).next().unwrap();
        assert_eq!(clean_text(div), "big deal");
    }

    #[test]
    fn test_enclosing_div_of_text() {
        let doc = Html::parse_document(
            "<div id='outer'><div id='inner'><span>词根: magn</span> large</div></div>",
        );

        let div = enclosing_div_of_text(&doc, "词根").unwrap();

        assert_eq!(div.value().id(), Some("inner"));
        assert_eq!(clean_text(div), "词根: magn large");
        assert!(enclosing_div_of_text(&doc, "同近义词").is_none());
    }
}
