//! CSV dialect detection.
//!
//! Firmware revisions are not consistent about the export delimiter
//! (comma, semicolon or tab have all been seen in the field), so each
//! file's dialect is inferred from a bounded sample of its content.
//! Detection never fails: an ambiguous or structureless sample falls
//! back to the comma dialect.

/// Maximum number of chars of content inspected during detection.
const SAMPLE_LEN: usize = 2000;

/// Maximum number of sample lines scored per candidate.
const SAMPLE_LINES: usize = 10;

/// Candidate delimiters, in fallback-priority order.
const CANDIDATES: [u8; 3] = [b',', b';', b'\t'];

/// A detected CSV convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: u8,
}

impl Dialect {
    /// The fallback convention: comma-delimited, standard quoting.
    pub fn fallback() -> Dialect {
        Dialect { delimiter: b',' }
    }
}

/// Infer the dialect from decoded file content.
///
/// Only the first [`SAMPLE_LEN`] chars are inspected; the caller's
/// content is borrowed, untouched, and fully re-readable afterwards.
/// Candidates are scored by how consistently they split the sample's
/// lines; when no candidate splits anything the comma fallback wins.
pub fn sniff(content: &str) -> Dialect {
    let sample = truncate_chars(content, SAMPLE_LEN);

    let mut best: Option<(f32, u8)> = None;
    for &delimiter in &CANDIDATES {
        let Some(score) = consistency_score(sample, delimiter) else {
            continue;
        };
        if best.is_none_or(|(best_score, _)| score > best_score) {
            best = Some((score, delimiter));
        }
    }

    match best {
        Some((_, delimiter)) => Dialect { delimiter },
        None => Dialect::fallback(),
    }
}

/// Score a candidate by per-line occurrence consistency: high mean
/// count, low spread. `None` when the candidate never appears.
fn consistency_score(sample: &str, delimiter: u8) -> Option<f32> {
    let counts: Vec<usize> = sample
        .lines()
        .take(SAMPLE_LINES)
        .map(|line| line.bytes().filter(|&b| b == delimiter).count())
        .collect();
    if counts.is_empty() {
        return None;
    }

    let mean = counts.iter().sum::<usize>() as f32 / counts.len() as f32;
    if mean == 0.0 {
        return None;
    }

    let variance = counts
        .iter()
        .map(|&count| (count as f32 - mean).powi(2))
        .sum::<f32>()
        / counts.len() as f32;

    Some(mean / (1.0 + variance.sqrt()))
}

fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
