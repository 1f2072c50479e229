//! Per-asset statuses and the run summary.

use crate::utils::mime::MediaKind;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Processed,
    ProcessedWebp,
    ProcessedGzip,
    ProcessedMinified,
    SkippedSmall,
    SkippedNoReduction,
    SkippedInvalid,
    SkippedError,
}

impl Status {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::ProcessedWebp => "processed_webp",
            Self::ProcessedGzip => "processed_gzip",
            Self::ProcessedMinified => "processed_minified",
            Self::SkippedSmall => "skipped_small",
            Self::SkippedNoReduction => "skipped_no_reduction",
            Self::SkippedInvalid => "skipped_invalid",
            Self::SkippedError => "skipped_error",
        }
    }

    pub const fn is_processed(self) -> bool {
        matches!(
            self,
            Self::Processed | Self::ProcessedWebp | Self::ProcessedGzip | Self::ProcessedMinified
        )
    }

    /// Failed assets are left untouched in the output.
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::SkippedInvalid | Self::SkippedError)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to one asset.
#[derive(Debug, Clone)]
pub struct AssetDetail {
    pub mime: String,
    /// Decoded size of the original payload.
    pub size: usize,
    pub status: Status,
    pub reason: Option<String>,
    /// Original and optimised byte sizes, when an optimised version exists.
    pub sizes: Option<(usize, usize)>,
}

impl AssetDetail {
    pub fn savings_percent(&self) -> Option<f64> {
        let (original, optimised) = self.sizes?;
        (original > 0).then(|| (original as f64 - optimised as f64) / original as f64 * 100.0)
    }

    fn describe(&self, index: usize, label: &str) -> Vec<String> {
        let mut lines = vec![
            format!("{index}. {label} file: {}", self.mime),
            format!("   Size: {} bytes", self.size),
            format!("   Status: {}", self.status),
        ];
        if let Some(reason) = &self.reason {
            lines.push(format!("   Reason: {reason}"));
        }
        if let (Some((original, optimised)), Some(percent)) = (self.sizes, self.savings_percent()) {
            lines.push(format!("   Original size: {original} bytes"));
            lines.push(format!("   Optimised size: {optimised} bytes"));
            lines.push(format!("   Savings: {percent:.2}%"));
        }
        lines
    }
}

/// Counters for one summary group.
#[derive(Debug, Default, Clone)]
pub struct KindStats {
    pub detected: usize,
    pub processed: usize,
    pub skipped_small: usize,
    pub skipped_no_reduction: usize,
    pub skipped_error: usize,
    pub details: Vec<AssetDetail>,
}

impl KindStats {
    pub fn record(&mut self, detail: AssetDetail) {
        self.detected += 1;
        match detail.status {
            s if s.is_processed() => self.processed += 1,
            Status::SkippedSmall => self.skipped_small += 1,
            Status::SkippedNoReduction => self.skipped_no_reduction += 1,
            _ => self.skipped_error += 1,
        }
        self.details.push(detail);
    }

    pub fn merge(&mut self, other: Self) {
        self.detected += other.detected;
        self.processed += other.processed;
        self.skipped_small += other.skipped_small;
        self.skipped_no_reduction += other.skipped_no_reduction;
        self.skipped_error += other.skipped_error;
        self.details.extend(other.details);
    }

    /// Summary block, e.g. `=== IMAGE OPTIMISATION SUMMARY ===`.
    pub fn summary(&self, label: &str) -> Vec<String> {
        vec![
            format!("=== {} OPTIMISATION SUMMARY ===", label.to_uppercase()),
            format!("Total {label} files detected: {}", self.detected),
            format!("{} files processed: {}", capitalize(label), self.processed),
            format!("{} files skipped (too small): {}", capitalize(label), self.skipped_small),
            format!(
                "{} files skipped (no size reduction): {}",
                capitalize(label),
                self.skipped_no_reduction
            ),
            format!("{} files skipped (errors): {}", capitalize(label), self.skipped_error),
        ]
    }

    /// Numbered per-asset detail lines.
    pub fn detail_lines(&self, label: &str) -> Vec<String> {
        self.details
            .iter()
            .enumerate()
            .flat_map(|(i, detail)| detail.describe(i + 1, &capitalize(label)))
            .collect()
    }
}

/// Image (SVG included) and audio counters of a run.
#[derive(Debug, Default, Clone)]
pub struct MediaStats {
    pub image: KindStats,
    pub audio: KindStats,
}

impl MediaStats {
    pub fn record(&mut self, kind: MediaKind, detail: AssetDetail) {
        match kind {
            MediaKind::Image | MediaKind::Svg => self.image.record(detail),
            MediaKind::Audio => self.audio.record(detail),
        }
    }

    pub fn merge(&mut self, other: Self) {
        self.image.merge(other.image);
        self.audio.merge(other.audio);
    }
}

/// Byte totals of a rewritten document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeReport {
    pub original: u64,
    pub optimised: u64,
}

impl SizeReport {
    /// Negative when the output grew.
    pub fn savings(&self) -> i64 {
        self.original as i64 - self.optimised as i64
    }

    pub fn savings_percent(&self) -> f64 {
        if self.original == 0 {
            0.0
        } else {
            self.savings() as f64 / self.original as f64 * 100.0
        }
    }

    pub fn lines(&self) -> [String; 3] {
        [
            format!("Original size: {} bytes", self.original),
            format!("Optimised size: {} bytes", self.optimised),
            format!("Savings: {} bytes ({:.2}%)", self.savings(), self.savings_percent()),
        ]
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
