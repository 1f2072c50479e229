//! Page node extraction.
//!
//! Each export wraps its page in one absolutely positioned container. A tiny
//! attribute selector picks that container out of the parsed document.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("unsupported selector `{0}`")]
pub struct SelectorError(String);

/// Attribute test of a [`Selector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrMatch {
    /// `[attr]`
    Exists,
    /// `[attr="v"]`
    Equals(String),
    /// `[attr*="v"]`
    Contains(String),
    /// `[attr^="v"]`
    Prefix(String),
}

/// `tag`, `[attr]`, `tag[attr]`, `tag[attr="v"]`, `tag[attr*="v"]`, `tag[attr^="v"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    attr: Option<(String, AttrMatch)>,
}

static SELECTOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^([A-Za-z][A-Za-z0-9-]*)?(?:\[\s*([A-Za-z_:][-A-Za-z0-9_:.]*)\s*(?:(\*=|\^=|=)\s*(?:"([^"]*)"|'([^']*)'))?\s*\])?$"#,
    )
    .unwrap()
});

impl Selector {
    pub fn parse(text: &str) -> Result<Self, SelectorError> {
        let text = text.trim();
        let caps = SELECTOR_RE
            .captures(text)
            .ok_or_else(|| SelectorError(text.to_owned()))?;

        let tag = caps.get(1).map(|m| m.as_str().to_ascii_lowercase());
        let attr = caps.get(2).map(|name| {
            let value = caps
                .get(4)
                .or_else(|| caps.get(5))
                .map(|m| m.as_str().to_owned())
                .unwrap_or_default();
            let test = match caps.get(3).map(|m| m.as_str()) {
                Some("*=") => AttrMatch::Contains(value),
                Some("^=") => AttrMatch::Prefix(value),
                Some(_) => AttrMatch::Equals(value),
                None => AttrMatch::Exists,
            };
            (name.as_str().to_ascii_lowercase(), test)
        });

        if tag.is_none() && attr.is_none() {
            return Err(SelectorError(text.to_owned()));
        }
        Ok(Self { tag, attr })
    }

    fn matches(&self, tag: &tl::HTMLTag) -> bool {
        if let Some(name) = &self.tag
            && !tag.name().as_utf8_str().eq_ignore_ascii_case(name)
        {
            return false;
        }

        let Some((name, test)) = &self.attr else {
            return true;
        };
        let Some((_, value)) = tag
            .attributes()
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        else {
            return false;
        };
        let value = value.unwrap_or_default();

        match test {
            AttrMatch::Exists => true,
            AttrMatch::Equals(v) => value == v.as_str(),
            AttrMatch::Contains(v) => value.contains(v.as_str()),
            AttrMatch::Prefix(v) => value.starts_with(v.as_str()),
        }
    }
}

/// Verbatim source of the first element matching `selector`, in document order.
pub fn extract_page(html: &str, selector: &Selector) -> Option<String> {
    let dom = tl::parse(html, tl::ParserOptions::default()).ok()?;
    let parser = dom.parser();
    dom.children()
        .iter()
        .find_map(|handle| find_first(*handle, parser, selector))
}

/// Pre-order search below `handle`.
fn find_first(handle: tl::NodeHandle, parser: &tl::Parser, selector: &Selector) -> Option<String> {
    let tl::Node::Tag(tag) = handle.get(parser)? else {
        return None;
    };

    if selector.matches(tag) {
        return Some(tag.raw().as_utf8_str().into_owned());
    }

    tag.children()
        .top()
        .iter()
        .find_map(|child| find_first(*child, parser, selector))
}
