//! HTML rewriting of embedded data URIs.
//!
//! # Module Structure
//!
//! - `sites` - locate `<img>`, `<source>`, `<audio>` and CSS data URIs, splice replacements
//! - `document` - segment state machine: wrap `<body>`, inject the decoder
//!
//! # Flow
//!
//! ```text
//! input.html ─► segments ─► sites ─► media (rayon) ─► splice ─► wrap ─► output.html.temp ─► rename
//! ```

mod document;
mod sites;

pub use document::{PAGE_CONTENT_OPEN, Rewriter};
pub use sites::{Site, collect_sites, replacement, rewrite_sites};

use crate::{
    debug,
    logger::ProgressLine,
    media::{MediaOptions, MediaStats, SizeReport},
    utils::path::with_appended,
};
use anyhow::{Context, Result, bail};
use std::{
    fs::{self, File},
    io::{BufRead, BufReader, BufWriter, Read, Write},
    path::Path,
};

/// How a file is read and what the decoder shows while loading.
#[derive(Debug, Clone)]
pub struct RewriteSettings {
    /// Segment size for chunked mode; `None` reads the whole file.
    pub chunk_size: Option<usize>,
    pub loader_text: String,
    /// Module label of the progress line; `None` hides it.
    pub progress: Option<&'static str>,
}

#[derive(Debug)]
pub struct RewriteReport {
    pub stats: MediaStats,
    pub sizes: SizeReport,
}

/// Rewrite `input` into `output` through `<output>.temp`.
///
/// The temp file is renamed on success and removed on failure.
pub fn rewrite_file(
    input: &Path,
    output: &Path,
    opts: &MediaOptions,
    settings: &RewriteSettings,
) -> Result<RewriteReport> {
    if !input.is_file() {
        bail!("input file `{}` does not exist", input.display());
    }
    let original = fs::metadata(input)
        .with_context(|| format!("failed to read {}", input.display()))?
        .len();

    let temp = with_appended(output, ".temp");
    let result = match settings.chunk_size {
        Some(size) => rewrite_chunked(input, &temp, size, opts, settings),
        None => rewrite_whole(input, &temp, opts, settings),
    };

    let stats = match result {
        Ok(stats) => stats,
        Err(e) => {
            let _ = fs::remove_file(&temp);
            return Err(e);
        }
    };

    fs::rename(&temp, output)
        .with_context(|| format!("failed to move {} to {}", temp.display(), output.display()))?;
    let optimised = fs::metadata(output)
        .with_context(|| format!("failed to read {}", output.display()))?
        .len();

    Ok(RewriteReport {
        stats,
        sizes: SizeReport { original, optimised },
    })
}

fn rewrite_whole(
    input: &Path,
    temp: &Path,
    opts: &MediaOptions,
    settings: &RewriteSettings,
) -> Result<MediaStats> {
    let html = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;

    let progress = settings
        .progress
        .map(|module| ProgressLine::new(module, &sites::totals(&collect_sites(&html))));

    let mut rewriter = Rewriter::new(opts, &settings.loader_text);
    let mut out = rewriter.rewrite(&html, progress.as_ref());
    let (trailer, stats) = rewriter.finish();
    out.push_str(&trailer);

    if let Some(progress) = progress {
        progress.finish();
    }

    fs::write(temp, out).with_context(|| format!("failed to write {}", temp.display()))?;
    Ok(stats)
}

fn rewrite_chunked(
    input: &Path,
    temp: &Path,
    chunk_size: usize,
    opts: &MediaOptions,
    settings: &RewriteSettings,
) -> Result<MediaStats> {
    let file = File::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    let mut reader = BufReader::new(file);
    let mut writer = BufWriter::new(
        File::create(temp).with_context(|| format!("failed to create {}", temp.display()))?,
    );

    let mut rewriter = Rewriter::new(opts, &settings.loader_text);
    let mut index = 0usize;
    while let Some(segment) = next_segment(&mut reader, chunk_size)
        .with_context(|| format!("failed to read {}", input.display()))?
    {
        index += 1;
        debug!("optimise"; "chunk {index}: {} bytes", segment.len());
        let text = String::from_utf8(segment)
            .with_context(|| format!("chunk {index} of {} is not valid UTF-8", input.display()))?;
        writer.write_all(rewriter.rewrite(&text, None).as_bytes())?;
    }

    let (trailer, stats) = rewriter.finish();
    writer.write_all(trailer.as_bytes())?;
    writer
        .flush()
        .with_context(|| format!("failed to write {}", temp.display()))?;
    Ok(stats)
}

/// Read about `chunk_size` bytes, extended to the next `>` so no tag is split.
///
/// A data URI never contains `>`, so every site lands in a single segment.
fn next_segment(reader: &mut impl BufRead, chunk_size: usize) -> std::io::Result<Option<Vec<u8>>> {
    let mut buf = Vec::with_capacity(chunk_size);
    reader.by_ref().take(chunk_size as u64).read_to_end(&mut buf)?;
    if buf.is_empty() {
        return Ok(None);
    }
    if buf.len() == chunk_size && buf.last() != Some(&b'>') {
        reader.read_until(b'>', &mut buf)?;
    }
    Ok(Some(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::OptimiseConfig,
        media::{Status, to_data_uri},
        utils::mime::types,
    };
    use tempfile::TempDir;

    fn svg_uri() -> String {
        let svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\">\n{}</svg>\n",
            "    <!-- c -->\n    <circle r=\"4\"/>\n".repeat(200)
        );
        to_data_uri(types::SVG, svg.as_bytes())
    }

    fn document() -> String {
        format!(
            concat!(
                "<!DOCTYPE html><html><head><style>.bg {{ background-image: url(\"{uri}\"); }}</style></head>\n",
                "<body>\n<p>intro</p>\n<img alt=\"logo\" src=\"{uri}\">\n",
                "<img src=\"data:image/png;base64,@@@@\">\n",
                "<p>{filler}</p>\n</body></html>\n"
            ),
            uri = svg_uri(),
            filler = "lorem ipsum ".repeat(200),
        )
    }

    fn options() -> MediaOptions {
        let config = OptimiseConfig::default();
        MediaOptions::optimise(&config, &[crate::utils::mime::MediaKind::Svg])
    }

    fn settings(chunk_size: Option<usize>) -> RewriteSettings {
        RewriteSettings {
            chunk_size,
            loader_text: "Loading ...".into(),
            progress: None,
        }
    }

    #[test]
    fn test_rewrite_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("book.html");
        let output = dir.path().join("book-optimised.html");
        fs::write(&input, document()).unwrap();

        let report = rewrite_file(&input, &output, &options(), &settings(None)).unwrap();
        let html = fs::read_to_string(&output).unwrap();

        assert!(!dir.path().join("book-optimised.html.temp").exists());
        assert!(html.contains("background-image: url(data:image/svg+xml;base64,"));
        assert!(html.contains("<img alt=\"logo\" src=\"\" data-optimized-src=\""));
        assert!(html.contains("data-compression=\"gzip\""));
        assert!(html.contains("src=\"data:image/png;base64,@@@@\""));
        assert!(html.contains(PAGE_CONTENT_OPEN));

        assert_eq!(report.stats.image.detected, 2);
        assert_eq!(report.stats.image.details[0].status, Status::ProcessedMinified);
        assert_eq!(report.stats.image.details[1].status, Status::ProcessedGzip);
        assert!(report.sizes.optimised < report.sizes.original);
    }

    #[test]
    fn test_chunked_matches_whole() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("book.html");
        fs::write(&input, document()).unwrap();

        let whole = dir.path().join("whole.html");
        let chunked = dir.path().join("chunked.html");
        rewrite_file(&input, &whole, &options(), &settings(None)).unwrap();
        let report = rewrite_file(&input, &chunked, &options(), &settings(Some(256))).unwrap();

        assert_eq!(
            fs::read_to_string(&whole).unwrap(),
            fs::read_to_string(&chunked).unwrap()
        );
        assert_eq!(report.stats.image.detected, 2);
    }

    #[test]
    fn test_missing_input() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.html");
        let err = rewrite_file(&dir.path().join("nope.html"), &output, &options(), &settings(None))
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
        assert!(!output.exists());
    }

    #[test]
    fn test_invalid_utf8_removes_temp() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("bad.html");
        let output = dir.path().join("out.html");
        fs::write(&input, b"<p>\xff\xfe</p>").unwrap();

        assert!(rewrite_file(&input, &output, &options(), &settings(Some(4))).is_err());
        assert!(!dir.path().join("out.html.temp").exists());
        assert!(!output.exists());
    }

    #[test]
    fn test_next_segment_extends_to_tag_end() {
        let mut reader = BufReader::new("<p class=\"a\">text</p>".as_bytes());
        assert_eq!(next_segment(&mut reader, 4).unwrap().unwrap(), b"<p class=\"a\">");
        assert_eq!(next_segment(&mut reader, 4).unwrap().unwrap(), b"text</p>");
        assert!(next_segment(&mut reader, 4).unwrap().is_none());
    }
}
