//! SVG minification and gzip.

use super::{Compression, MediaError, Optimised, Outcome, Status};
use crate::utils::mime::types;
use flate2::write::GzEncoder;
use quick_xml::{Reader, Writer, events::Event};
use std::io::{Cursor, Write};

/// Re-serialize `data` without comments and inter-tag whitespace.
pub fn minify_svg(data: &[u8]) -> Result<Vec<u8>, MediaError> {
    let mut reader = Reader::from_reader(data);
    reader.config_mut().trim_text(true);
    let mut writer = Writer::new(Cursor::new(Vec::with_capacity(data.len())));

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(Event::Comment(_)) => {}
            Ok(event) => writer
                .write_event(event)
                .map_err(|e| MediaError::Svg(e.to_string()))?,
            Err(e) => {
                return Err(MediaError::Svg(format!(
                    "{e} at position {}",
                    reader.error_position()
                )));
            }
        }
    }

    Ok(writer.into_inner().into_inner())
}

/// Gzip at the best compression level.
pub fn gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::best());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Minify, then gzip when `allow_gzip` and the result is smaller.
///
/// Gzip is only usable where the client-side decoder restores the payload,
/// so inline sites (CSS) pass `allow_gzip = false`.
pub fn optimise_svg(data: &[u8], allow_gzip: bool) -> Outcome {
    let minified = match minify_svg(data) {
        Ok(minified) => minified,
        Err(e) => return Outcome::skipped(Status::SkippedError, format!("Exception: {e}")),
    };

    if allow_gzip {
        match gzip(&minified) {
            Ok(compressed) if compressed.len() < data.len() => {
                return Outcome::optimised(
                    Status::ProcessedGzip,
                    Optimised {
                        bytes: compressed,
                        mime: types::SVG.to_owned(),
                        compression: Compression::Gzip,
                    },
                );
            }
            Ok(_) => {}
            Err(e) => return Outcome::skipped(Status::SkippedError, format!("Exception: {e}")),
        }
    }

    if minified.len() < data.len() {
        return Outcome::optimised(
            Status::ProcessedMinified,
            Optimised {
                bytes: minified,
                mime: types::SVG.to_owned(),
                compression: Compression::None,
            },
        );
    }

    Outcome::skipped(Status::SkippedNoReduction, "No size reduction achieved")
}
