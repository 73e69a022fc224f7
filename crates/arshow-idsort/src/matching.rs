//! Fuzzy vocabulary matching and folder naming.

/// Best vocabulary entry for a piece of OCR text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VocabMatch {
    pub label: String,
    /// Similarity in `0..=100`.
    pub score: u8,
}

/// Lowercase, turn anything that is not alphanumeric into a space, trim.
pub fn normalize_for_match(text: &str) -> String {
    let mapped: String = text
        .chars()
        .flat_map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().collect::<Vec<_>>()
            } else {
                vec![' ']
            }
        })
        .collect();
    mapped.trim().to_string()
}

/// Indel similarity `2 * LCS / (|a| + |b|)` of the normalized strings,
/// scaled to `0..=100`. Empty input scores 0.
pub fn similarity(a: &str, b: &str) -> u8 {
    let a = normalize_for_match(a);
    let b = normalize_for_match(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    (rapidfuzz::fuzz::ratio(a.chars(), b.chars()) * 100.0).round() as u8
}

/// Highest-scoring vocabulary entry; ties keep the earlier entry.
pub fn best_match<S: AsRef<str>>(text: &str, vocabulary: &[S]) -> Option<VocabMatch> {
    let mut best: Option<VocabMatch> = None;
    for label in vocabulary {
        let label = label.as_ref();
        if label.trim().is_empty() {
            continue;
        }
        let score = similarity(text, label);
        if best.as_ref().map_or(true, |b| score > b.score) {
            best = Some(VocabMatch {
                label: label.to_string(),
                score,
            });
        }
    }
    best
}

/// Keep `[A-Za-z0-9 ]`, trim, and turn spaces into underscores.
pub fn sanitize_folder_name(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect();
    kept.trim().replace(' ', "_")
}
