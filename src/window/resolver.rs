use crate::window::window_model::WindowDescriptor;

// ============================================================================
// Fuzzy window resolution
// ============================================================================
//
// Queries come from humans ("safari", "the finder window", a typoed app
// name), so matching is additive and forgiving: every signal that fires adds
// its weight, and only a total of zero excludes a window. An exact identifier
// match carries a weight no combination of text signals reaches on realistic
// window lists, so addressing by id always wins.

const SCORE_IDENTIFIER_EXACT: u32 = 1000;
const SCORE_FIELD_EXACT: u32 = 100;
const SCORE_COMBINED_CONTAINS: u32 = 50;
const SCORE_FIELD_CONTAINS: u32 = 25;
const SCORE_TOKEN_MATCH: u32 = 10;
const SCORE_TRIGRAM_MATCH: u32 = 2;

const MIN_TOKEN_LEN: usize = 2;
const MIN_TRIGRAM_TOKEN_LEN: usize = 3;

/// Rank windows against a free-text query, best match first. Windows scoring
/// zero are excluded entirely; ties keep the input order.
pub fn rank(query: &str, windows: &[WindowDescriptor]) -> Vec<WindowDescriptor> {
    let mut scored: Vec<(u32, &WindowDescriptor)> = windows
        .iter()
        .filter_map(|w| {
            let score = score_window(query, w);
            if score > 0 { Some((score, w)) } else { None }
        })
        .collect();
    // sort_by is stable, so equal scores preserve the extractor's ordering
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, w)| w.clone()).collect()
}

/// Best-scoring window for the query, if any window matches at all.
pub fn resolve_best(query: &str, windows: &[WindowDescriptor]) -> Option<WindowDescriptor> {
    rank(query, windows).into_iter().next()
}

/// Additive, case-insensitive match score between a query and one window.
pub fn score_window(query: &str, window: &WindowDescriptor) -> u32 {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return 0;
    }

    let app = window.app.to_lowercase();
    let title = window.title.to_lowercase();
    let identity = window.identity().to_lowercase();
    let combined = format!("{} {}", app, title);

    let mut score = 0;

    if query == identity {
        score += SCORE_IDENTIFIER_EXACT;
    }
    if query == app {
        score += SCORE_FIELD_EXACT;
    }
    if query == title {
        score += SCORE_FIELD_EXACT;
    }
    if combined.contains(&query) {
        score += SCORE_COMBINED_CONTAINS;
    }
    if app.contains(&query) {
        score += SCORE_FIELD_CONTAINS;
    }
    if title.contains(&query) {
        score += SCORE_FIELD_CONTAINS;
    }

    let combined_tokens: Vec<&str> = combined.split_whitespace().collect();
    for token in query.split_whitespace() {
        if token.chars().count() < MIN_TOKEN_LEN {
            continue;
        }
        if combined_tokens.iter().any(|t| t.contains(token)) {
            score += SCORE_TOKEN_MATCH;
        }
        if token.chars().count() >= MIN_TRIGRAM_TOKEN_LEN {
            for gram in trigrams(token) {
                if combined_tokens.iter().any(|t| t.contains(&gram)) {
                    score += SCORE_TRIGRAM_MATCH;
                }
            }
        }
    }

    score
}

/// Sliding 3-character windows over a token. Operates on chars so multibyte
/// text never splits inside a code point.
fn trigrams(token: &str) -> Vec<String> {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() < 3 {
        return Vec::new();
    }
    (0..=chars.len() - 3)
        .map(|i| chars[i..i + 3].iter().collect())
        .collect()
}
