//! Fuzzy subject matching
//!
//! Maps a free-text subject name onto the closest entry of a candidate list
//! using the Levenshtein ratio. The best candidate is always returned for a
//! non-empty list; callers that need a confidence cut-off inspect
//! [`Match::ratio`].

use crate::{Error, Result};

/// Best candidate chosen for a query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<'a> {
    /// Candidate text, borrowed from the candidate list
    pub candidate: &'a str,
    /// Position of the candidate in the list
    pub index: usize,
    /// Similarity ratio in [0, 1]
    pub ratio: f64,
}

/// Levenshtein ratio between two strings
///
/// `(len(a) + len(b) - distance) / (len(a) + len(b))`, where insertion,
/// deletion and substitution each cost 1 and lengths are counted in chars.
/// Two empty strings are identical (ratio 1.0).
///
/// # Examples
/// ```
/// use examsched_common::matcher::similarity_ratio;
///
/// assert_eq!(similarity_ratio("Physics", "Physics"), 1.0);
/// assert_eq!(similarity_ratio("", "abc"), 0.0);
/// // kitten -> sitting: distance 3, total length 13
/// assert!((similarity_ratio("kitten", "sitting") - 10.0 / 13.0).abs() < 1e-12);
/// ```
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 1.0;
    }

    let distance = strsim::levenshtein(a, b);
    (total - distance) as f64 / total as f64
}

/// Find the candidate most similar to `query`
///
/// Ties go to the earliest candidate in list order.
///
/// # Errors
/// [`Error::EmptyCandidateSet`] when `candidates` is empty.
pub fn best_match<'a, S>(query: &str, candidates: &'a [S]) -> Result<Match<'a>>
where
    S: AsRef<str>,
{
    let mut best: Option<Match<'a>> = None;

    for (index, candidate) in candidates.iter().enumerate() {
        let candidate = candidate.as_ref();
        let ratio = similarity_ratio(query, candidate);

        // Strictly greater: first candidate reaching the maximum wins
        if best.map_or(true, |b| ratio > b.ratio) {
            best = Some(Match {
                candidate,
                index,
                ratio,
            });
        }
    }

    best.ok_or(Error::EmptyCandidateSet)
}

/// Match every query against the same candidate list, preserving order
pub fn best_matches<'a, Q, S>(queries: &[Q], candidates: &'a [S]) -> Result<Vec<Match<'a>>>
where
    Q: AsRef<str>,
    S: AsRef<str>,
{
    queries
        .iter()
        .map(|q| best_match(q.as_ref(), candidates))
        .collect()
}
