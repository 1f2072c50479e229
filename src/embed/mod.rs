//! Scripts and stylesheets embedded into generated HTML.
//!
//! # Module Structure
//!
//! - `merge` - navigation script + page layout for merged publications
//! - `decoder` - client-side decoder for deferred media (loader overlay included)
//!
//! Sources live next to this file and are minified by `build.rs`; the
//! constants here include the minified output from `OUT_DIR`.
//!
//! # Usage
//!
//! ```ignore
//! use embed::decoder::{DECODER_JS, DecoderVars};
//!
//! let js = DECODER_JS.render(&DecoderVars { loader_text: "Loading ..." });
//! ```

use std::marker::PhantomData;

/// Trait for template variable sets
pub trait TemplateVars {
    fn apply(&self, content: &str) -> String;
}

/// Template with typed variable injection
#[derive(Debug, Clone, Copy)]
pub struct Template<V> {
    content: &'static str,
    _marker: PhantomData<V>,
}

impl<V> Template<V> {
    pub const fn new(content: &'static str) -> Self {
        Self {
            content,
            _marker: PhantomData,
        }
    }
}

impl<V: TemplateVars> Template<V> {
    pub fn render(&self, vars: &V) -> String {
        vars.apply(self.content)
    }
}

/// Encode a string as a JavaScript string literal.
fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".into())
}

pub mod merge {
    /// Navigation, go-to-page and zoom reset handlers.
    pub const NAV_JS: &str = include_str!(concat!(env!("OUT_DIR"), "/nav.min.js"));

    /// Layout for pages, separators and the zoom button.
    pub const PAGE_CSS: &str = include_str!(concat!(env!("OUT_DIR"), "/page.min.css"));

    /// Page box size, exposed to `PAGE_CSS` as custom properties.
    pub struct PageVars {
        pub width: u32,
        pub height: u32,
    }

    impl PageVars {
        /// Render the `:root` rule that `PAGE_CSS` reads its sizes from.
        pub fn render(&self) -> String {
            format!(
                ":root{{--page-width:{}px;--page-height:{}px}}",
                self.width, self.height
            )
        }
    }
}

pub mod decoder {
    use super::{Template, TemplateVars, js_string};

    /// Variables for decoder.js.
    pub struct DecoderVars<'a> {
        pub loader_text: &'a str,
    }

    impl TemplateVars for DecoderVars<'_> {
        fn apply(&self, content: &str) -> String {
            content.replace("__PUBKIT_LOADER_TEXT__", &js_string(self.loader_text))
        }
    }

    /// Loader overlay + deferred media decoder.
    pub const DECODER_JS: Template<DecoderVars<'static>> =
        Template::new(include_str!(concat!(env!("OUT_DIR"), "/decoder.min.js")));

    /// Render the decoder as a complete `<script>` element.
    pub fn script_tag(loader_text: &str) -> String {
        let js = DECODER_JS.render(&DecoderVars { loader_text });
        // "</script" inside a string literal would end the element early
        format!("<script>{}</script>", js.replace("</script", "<\\/script"))
    }
}
