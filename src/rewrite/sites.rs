//! Data URI sites in HTML text.

use crate::{
    logger::ProgressLine,
    media::{DataUri, Encoded, MediaOptions, MediaStats, SiteKind, SiteOutcome, process_data_uri},
    utils::{html::escape, mime::MediaKind},
};
use rayon::prelude::*;
use regex::Regex;
use std::{borrow::Cow, ops::Range, sync::LazyLock};

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(img|source|audio)\b[^>]*>").unwrap());

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s(src|srcset)\s*=\s*(?:"(data:[^"]*)"|'(data:[^']*)')"#).unwrap()
});

static CSS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)background-image\s*:\s*url\(\s*["']?(data:[^"')\s]+)["']?\s*\)"#).unwrap()
});

/// One data URI occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    /// Text replaced on success.
    pub range: Range<usize>,
    /// The `data:` URI inside `range`.
    pub uri: Range<usize>,
    pub kind: SiteKind,
    pub media: Option<MediaKind>,
}

/// All sites in `text`, in document order, never overlapping.
pub fn collect_sites(text: &str) -> Vec<Site> {
    let mut sites = Vec::new();

    for tag in TAG_RE.captures_iter(text) {
        let (Some(whole), Some(name)) = (tag.get(0), tag.get(1)) else {
            continue;
        };
        let name = name.as_str().to_ascii_lowercase();

        for attr in ATTR_RE.captures_iter(whole.as_str()) {
            let (Some(attr_name), Some(all)) = (attr.get(1), attr.get(0)) else {
                continue;
            };
            let Some(uri) = attr.get(2).or_else(|| attr.get(3)) else {
                continue;
            };
            let is_audio = uri.as_str().get(..11).is_some_and(|p| p.eq_ignore_ascii_case("data:audio/"));

            let kind = match (name.as_str(), attr_name.as_str().to_ascii_lowercase().as_str()) {
                ("img", "src") => SiteKind::Img,
                ("source", "srcset") => SiteKind::Srcset,
                ("source" | "audio", "src") if is_audio => SiteKind::Audio,
                _ => continue,
            };

            let offset = whole.start();
            sites.push(Site {
                range: offset + attr_name.start()..offset + all.end(),
                uri: offset + uri.start()..offset + uri.end(),
                kind,
                media: media_kind(uri.as_str()),
            });
        }
    }

    for css in CSS_RE.captures_iter(text) {
        let (Some(all), Some(uri)) = (css.get(0), css.get(1)) else {
            continue;
        };
        sites.push(Site {
            range: all.range(),
            uri: uri.range(),
            kind: SiteKind::Css,
            media: media_kind(uri.as_str()),
        });
    }

    sites.sort_by_key(|site| site.range.start);
    let mut end = 0;
    sites.retain(|site| {
        let keep = site.range.start >= end;
        if keep {
            end = site.range.end;
        }
        keep
    });
    sites
}

fn media_kind(uri: &str) -> Option<MediaKind> {
    DataUri::parse(uri).and_then(|uri| MediaKind::of(uri.mime))
}

/// Site count per media kind, for the progress line.
pub fn totals(sites: &[Site]) -> Vec<(&'static str, usize)> {
    [MediaKind::Image, MediaKind::Svg, MediaKind::Audio]
        .into_iter()
        .map(|kind| {
            let count = sites.iter().filter(|site| site.media == Some(kind)).count();
            (kind.name(), count)
        })
        .collect()
}

/// Process `sites` in parallel and splice the accepted replacements back.
pub fn rewrite_sites(
    text: &str,
    sites: &[Site],
    opts: &MediaOptions,
    progress: Option<&ProgressLine>,
) -> (String, MediaStats) {
    let mut stats = MediaStats::default();
    if sites.is_empty() {
        return (text.to_owned(), stats);
    }

    let outcomes: Vec<SiteOutcome> = sites
        .par_iter()
        .map(|site| {
            let outcome = process_data_uri(&text[site.uri.clone()], site.kind, opts);
            if let (Some(progress), Some(media)) = (progress, site.media) {
                progress.inc(media.name());
            }
            outcome
        })
        .collect();

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (site, outcome) in sites.iter().zip(outcomes) {
        if let Some((kind, detail)) = outcome.record {
            stats.record(kind, detail);
        }
        if let Some(encoded) = outcome.encoded {
            out.push_str(&text[last..site.range.start]);
            out.push_str(&replacement(site.kind, &encoded));
            last = site.range.end;
        }
    }
    out.push_str(&text[last..]);

    (out, stats)
}

/// New text for a site.
pub fn replacement(kind: SiteKind, encoded: &Encoded) -> String {
    match kind {
        SiteKind::Img => format!("src=\"\" {}", deferred_attrs(encoded)),
        SiteKind::Srcset => deferred_attrs(encoded),
        SiteKind::Audio => format!(
            "src=\"data:{};base64,{}\"",
            escape(&encoded.mime),
            encoded.payload
        ),
        SiteKind::Css => format!(
            "background-image: url(data:{};base64,{})",
            encoded.mime, encoded.payload
        ),
    }
}

fn deferred_attrs(encoded: &Encoded) -> String {
    format!(
        "data-optimized-src=\"{}\" data-mime-type=\"{}\" data-encoding=\"{}\" data-compression=\"{}\"",
        escape_amp(&encoded.payload),
        escape(&encoded.mime),
        encoded.encoding.as_str(),
        encoded.compression.as_str(),
    )
}

/// Base85 payloads may contain `&`, which would start a character reference.
fn escape_amp(payload: &str) -> Cow<'_, str> {
    if payload.contains('&') {
        Cow::Owned(payload.replace('&', "&amp;"))
    } else {
        Cow::Borrowed(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{Compression, Encoding};

    #[test]
    fn test_collect_img_and_source() {
        let html = r#"<p><img alt="a" src="data:image/png;base64,AAAA"><picture><source srcset='data:image/webp;base64,BBBB'></picture></p>"#;
        let sites = collect_sites(html);
        assert_eq!(sites.len(), 2);

        assert_eq!(sites[0].kind, SiteKind::Img);
        assert_eq!(&html[sites[0].range.clone()], r#"src="data:image/png;base64,AAAA""#);
        assert_eq!(&html[sites[0].uri.clone()], "data:image/png;base64,AAAA");
        assert_eq!(sites[0].media, Some(MediaKind::Image));

        assert_eq!(sites[1].kind, SiteKind::Srcset);
        assert_eq!(&html[sites[1].uri.clone()], "data:image/webp;base64,BBBB");
    }

    #[test]
    fn test_collect_audio_only_for_audio_uris() {
        let html = concat!(
            r#"<AUDIO controls SRC="data:audio/mpeg;base64,AAAA"></AUDIO>"#,
            r#"<audio><source src="data:audio/wav;base64,BBBB"></audio>"#,
            r#"<source src="data:image/png;base64,CCCC">"#,
        );
        let sites = collect_sites(html);
        assert_eq!(sites.len(), 2);
        assert!(sites.iter().all(|s| s.kind == SiteKind::Audio));
        assert_eq!(sites[0].media, Some(MediaKind::Audio));
    }

    #[test]
    fn test_collect_css() {
        let html = r#"<div style="background-image: url('data:image/svg+xml;base64,PHN2Zy8+')"></div>
<style>.a { background-image:url(data:image/png;base64,AAAA); }</style>"#;
        let sites = collect_sites(html);
        assert_eq!(sites.len(), 2);
        assert!(sites.iter().all(|s| s.kind == SiteKind::Css));
        assert_eq!(sites[0].media, Some(MediaKind::Svg));
        assert_eq!(
            &html[sites[1].range.clone()],
            "background-image:url(data:image/png;base64,AAAA)"
        );
    }

    #[test]
    fn test_ignores_plain_urls() {
        let html = r#"<img src="cover.png"><audio src="a.mp3"></audio>"#;
        assert!(collect_sites(html).is_empty());
    }

    #[test]
    fn test_non_ascii_mime_is_not_media() {
        let html = "<p><img src=\"data:imageé/png;base64,AAAA\"></p>";
        let sites = collect_sites(html);
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].media, None);
    }

    #[test]
    fn test_totals() {
        let html = r#"<img src="data:image/png;base64,AA"><img src="data:image/svg+xml;base64,AA">"#;
        let totals = totals(&collect_sites(html));
        assert_eq!(totals, vec![("image", 1), ("svg", 1), ("audio", 0)]);
    }

    #[test]
    fn test_replacements() {
        let encoded = Encoded {
            payload: "a&b".into(),
            mime: "image/png".into(),
            encoding: Encoding::Base85,
            compression: Compression::None,
        };
        assert_eq!(
            replacement(SiteKind::Img, &encoded),
            r#"src="" data-optimized-src="a&amp;b" data-mime-type="image/png" data-encoding="base85" data-compression="none""#
        );
        assert!(replacement(SiteKind::Srcset, &encoded).starts_with("data-optimized-src="));

        let inline = Encoded {
            payload: "QUJD".into(),
            mime: "audio/mpeg".into(),
            encoding: Encoding::Base64,
            compression: Compression::None,
        };
        assert_eq!(
            replacement(SiteKind::Audio, &inline),
            r#"src="data:audio/mpeg;base64,QUJD""#
        );
        assert_eq!(
            replacement(SiteKind::Css, &inline),
            "background-image: url(data:audio/mpeg;base64,QUJD)"
        );
    }
}
