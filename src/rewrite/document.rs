//! Segment rewriting with body wrapping and decoder injection.

use super::sites::{collect_sites, rewrite_sites};
use crate::{
    embed::decoder,
    logger::ProgressLine,
    media::{MediaOptions, MediaStats},
};
use regex::Regex;
use std::sync::LazyLock;

/// Hidden until the decoder has restored every deferred asset.
pub const PAGE_CONTENT_OPEN: &str = r#"<div id="page-content" style="opacity:0; pointer-events:none; transition: opacity 0.3s ease-in-out;">"#;

static BODY_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<body\b[^>]*>").unwrap());
static BODY_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</body\s*>").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    BeforeBody,
    InBody,
}

/// Rewrites a document one segment at a time.
///
/// Segments must not split tags. Feeding the whole document as a single
/// segment gives the same result as feeding it in pieces.
///
/// The wrapper closes at the last `</body>`, so text from the latest one seen
/// is held back until a later one turns up or the input ends.
pub struct Rewriter<'a> {
    opts: &'a MediaOptions,
    decoder: String,
    phase: Phase,
    /// Text from the latest `</body>` on, not yet written.
    tail: Option<String>,
    stats: MediaStats,
}

impl<'a> Rewriter<'a> {
    pub fn new(opts: &'a MediaOptions, loader_text: &str) -> Self {
        Self {
            opts,
            decoder: decoder::script_tag(loader_text),
            phase: Phase::BeforeBody,
            tail: None,
            stats: MediaStats::default(),
        }
    }

    /// Rewrite one segment.
    pub fn rewrite(&mut self, segment: &str, progress: Option<&ProgressLine>) -> String {
        let sites = collect_sites(segment);
        let (text, stats) = rewrite_sites(segment, &sites, self.opts, progress);
        self.stats.merge(stats);
        self.wrap(&text)
    }

    fn wrap(&mut self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + PAGE_CONTENT_OPEN.len() + self.decoder.len());
        let mut rest = text;

        if self.phase == Phase::BeforeBody
            && let Some(open) = BODY_OPEN_RE.find(rest)
        {
            out.push_str(&rest[..open.end()]);
            out.push_str(PAGE_CONTENT_OPEN);
            rest = &rest[open.end()..];
            self.phase = Phase::InBody;
        }

        if self.phase == Phase::InBody {
            if let Some(close) = BODY_CLOSE_RE.find_iter(rest).last() {
                // an earlier `</body>` was inside the content
                if let Some(tail) = self.tail.take() {
                    out.push_str(&tail);
                }
                out.push_str(&rest[..close.start()]);
                self.tail = Some(rest[close.start()..].to_owned());
                rest = "";
            } else if let Some(tail) = self.tail.as_mut() {
                tail.push_str(rest);
                rest = "";
            }
        }

        out.push_str(rest);
        out
    }

    /// Text to append after the last segment, and the collected stats.
    ///
    /// Without `<body>` the decoder goes at the end of the document; an
    /// unclosed body gets its wrapper closed at the end.
    pub fn finish(self) -> (String, MediaStats) {
        let trailer = match self.phase {
            Phase::BeforeBody => self.decoder,
            Phase::InBody => {
                let tail = self.tail.unwrap_or_default();
                format!("</div>{}{tail}", self.decoder)
            }
        };
        (trailer, self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OptimiseConfig;

    fn options() -> MediaOptions {
        MediaOptions::png_to_jpeg(&OptimiseConfig::default())
    }

    fn run(segments: &[&str]) -> String {
        let opts = options();
        let mut rewriter = Rewriter::new(&opts, "Loading ...");
        let mut out: String = segments.iter().map(|s| rewriter.rewrite(s, None)).collect();
        out.push_str(&rewriter.finish().0);
        out
    }

    #[test]
    fn test_wraps_body() {
        let out = run(&["<html><body class=\"x\"><p>hi</p></body></html>"]);
        let open = format!("<body class=\"x\">{PAGE_CONTENT_OPEN}<p>hi</p></div><script>");
        assert!(out.starts_with(&format!("<html>{open}")));
        assert!(out.ends_with("</script></body></html>"));
    }

    #[test]
    fn test_split_segments_match_whole() {
        let whole = run(&["<html><body><p>a</p><p>b</p></body></html>"]);
        let split = run(&["<html><body>", "<p>a</p>", "<p>b</p></body>", "</html>"]);
        assert_eq!(whole, split);
    }

    #[test]
    fn test_closes_at_last_body_end() {
        let html = concat!(
            "<html><body><script>var s = \"</body>\";</script>",
            "<p>after</p></body></html>"
        );
        let out = run(&[html]);
        assert!(out.contains("var s = \"</body>\";</script><p>after</p></div><script>"));
        assert!(out.ends_with("</script></body></html>"));

        let split = run(&[
            "<html><body><script>var s = \"</body>",
            "\";</script>",
            "<p>after</p></body>",
            "</html>",
        ]);
        assert_eq!(out, split);
    }

    #[test]
    fn test_no_body_appends_decoder() {
        let out = run(&["<div>fragment</div>"]);
        assert!(out.starts_with("<div>fragment</div><script>"));
        assert!(!out.contains(PAGE_CONTENT_OPEN));
    }

    #[test]
    fn test_unclosed_body() {
        let out = run(&["<body><p>x</p>"]);
        assert!(out.contains(PAGE_CONTENT_OPEN));
        assert!(out.contains("<p>x</p></div><script>"));
    }
}
