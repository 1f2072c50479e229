//! Merged document rendering.

use crate::{
    embed::merge::{NAV_JS, PAGE_CSS, PageVars},
    utils::html::escape,
};
use std::fmt::Write;

/// Shell settings for the merged document.
#[derive(Debug, Clone)]
pub struct MergeSettings {
    pub prefix: String,
    pub lang: String,
    pub title: String,
    pub stylesheet: String,
    pub script: String,
    pub page_width: u32,
    pub page_height: u32,
    pub zoom_button: bool,
}

/// Page node extracted from one export.
#[derive(Debug, Clone)]
pub struct MergedPage {
    pub number: u32,
    pub content: String,
}

const ZOOM_BUTTON: &str = r#"<button id="zoom-out-btn" class="zoom-out-button" title="Reset Zoom" aria-label="Reset browser zoom to 100%">
<svg viewBox="0 0 24 24" xmlns="http://www.w3.org/2000/svg">
<circle cx="11" cy="11" r="8" fill="none" stroke="currentColor" stroke-width="2"/>
<path d="m21 21-4.35-4.35" stroke="currentColor" stroke-width="2" stroke-linecap="round"/>
<line x1="8" y1="11" x2="14" y2="11" stroke="currentColor" stroke-width="2" stroke-linecap="round"/>
</svg>
</button>
"#;

/// Render the full merged document.
///
/// `total` is the number of pages found on disk; the go-to input accepts
/// `1..=total`.
pub fn render_document(pages: &[MergedPage], total: usize, settings: &MergeSettings) -> String {
    let body_len: usize = pages.iter().map(|p| p.content.len()).sum();
    let mut html = String::with_capacity(body_len + 16 * 1024);

    write_head(&mut html, settings);

    html.push_str("<body>\n");
    if settings.zoom_button {
        html.push_str(ZOOM_BUTTON);
    }
    html.push_str("<div class=\"container\">\n");

    for (index, page) in pages.iter().enumerate() {
        let _ = writeln!(
            html,
            "<div class=\"publication\" id=\"{}\">\n{}\n</div>",
            page_id(&settings.prefix, page.number),
            page.content
        );

        if let Some(next) = pages.get(index + 1) {
            let prev = index.checked_sub(1).map(|i| &pages[i]);
            write_separator(&mut html, settings, prev, page, next, total);
        }
    }

    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn write_head(html: &mut String, settings: &MergeSettings) {
    let page_vars = PageVars {
        width: settings.page_width,
        height: settings.page_height,
    };
    let _ = write!(
        html,
        concat!(
            "<!DOCTYPE html>\n",
            "<html lang=\"{lang}\">\n",
            "<head>\n",
            "<meta charset=\"utf-8\" />\n",
            "<title>{title}</title>\n",
            "<link href=\"{stylesheet}\" rel=\"stylesheet\" type=\"text/css\" />\n",
            "<script src=\"{script}\" type=\"text/javascript\"></script>\n",
            "<style>{vars}{css}</style>\n",
            "<script>{js}</script>\n",
            "</head>\n",
        ),
        lang = escape(&settings.lang),
        title = escape(&settings.title),
        stylesheet = escape(&settings.stylesheet),
        script = escape(&settings.script),
        vars = page_vars.render(),
        css = PAGE_CSS,
        js = NAV_JS,
    );
}

/// Navigation bar between `current` and `next`.
///
/// Targets are the neighbouring pages in the merged list, so gaps in the
/// file numbering still navigate.
fn write_separator(
    html: &mut String,
    settings: &MergeSettings,
    prev: Option<&MergedPage>,
    current: &MergedPage,
    next: &MergedPage,
    total: usize,
) {
    let prefix = escape(&settings.prefix);
    let input_id = format!("goto-input-{}", current.number);

    let prev_button = match prev {
        Some(prev) => format!(
            "<button class=\"nav-button\" data-nav=\"{}\">Previous Page</button>",
            page_id(&settings.prefix, prev.number)
        ),
        None => "<button class=\"nav-button\" disabled>Previous Page</button>".to_owned(),
    };

    let _ = write!(
        html,
        concat!(
            "<div class=\"separator\">\n",
            "{prev_button}\n",
            "<div class=\"goto-container\">\n",
            "<span>Go to page:</span>\n",
            "<input type=\"number\" class=\"goto-input\" id=\"{input_id}\" data-prefix=\"{prefix}\" min=\"1\" max=\"{total}\" placeholder=\"1-{total}\">\n",
            "<button class=\"nav-button\" data-nav=\"goto\" data-input=\"{input_id}\">Go</button>\n",
            "</div>\n",
            "<button class=\"nav-button\" data-nav=\"{next_id}\">Next Page</button>\n",
            "</div>\n",
        ),
        prev_button = prev_button,
        input_id = input_id,
        prefix = prefix,
        total = total,
        next_id = page_id(&settings.prefix, next.number),
    );
}

fn page_id(prefix: &str, number: u32) -> String {
    format!("{}-{}", escape(prefix), number)
}
