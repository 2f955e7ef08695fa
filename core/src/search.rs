use crate::corpus::DocId;
use crate::index::VectorIndex;
use crate::tokenizer::normalize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Ranked result cap per query.
pub const MAX_RESULTS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub doc_id: DocId,
    pub score: f64,
}

/// Rank corpus documents by cosine similarity to the query. Returns at most
/// [`MAX_RESULTS`] hits with positive scores, descending by score. Reads
/// only the immutable index, so any number of searches may run in parallel.
pub fn search(index: &VectorIndex, raw_query: &str) -> Vec<Hit> {
    let tokens = normalize(raw_query);
    if tokens.is_empty() {
        return Vec::new();
    }

    // Candidate pruning: only documents sharing at least one term with the
    // query can score above zero. BTreeSet keeps candidate enumeration (and
    // therefore tie order) deterministic.
    let mut candidates: BTreeSet<DocId> = BTreeSet::new();
    for token in &tokens {
        if let Some(doc_ids) = index.inverted.get(token) {
            candidates.extend(doc_ids.iter().copied());
        }
    }
    if candidates.is_empty() {
        return Vec::new();
    }

    // Query vector: tf = count / total tokens, weighted by corpus IDF.
    // Terms outside the corpus vocabulary have idf 0 and drop out.
    // Term-sorted maps fix the f64 summation order for the magnitude and
    // the dot products, so identical calls score bit-identically.
    let mut term_freq: BTreeMap<&str, u32> = BTreeMap::new();
    for token in &tokens {
        *term_freq.entry(token.as_str()).or_insert(0) += 1;
    }
    let total_tokens = tokens.len() as f64;
    let mut query_vector: BTreeMap<&str, f64> = BTreeMap::new();
    let mut sum_squares = 0.0f64;
    for (term, count) in term_freq {
        let idf = index.idf(term);
        if idf == 0.0 {
            continue;
        }
        let weight = (count as f64 / total_tokens) * idf;
        sum_squares += weight * weight;
        query_vector.insert(term, weight);
    }
    let query_magnitude = match sum_squares.sqrt() {
        m if m == 0.0 => 1.0,
        m => m,
    };

    // Cosine against each candidate, iterating the small query vector and
    // looking terms up in the document vector.
    let mut hits: Vec<Hit> = Vec::with_capacity(candidates.len());
    for doc_id in candidates {
        let doc_vector = &index.vectors[doc_id];
        let mut dot = 0.0f64;
        for (term, query_weight) in &query_vector {
            if let Some(doc_weight) = doc_vector.get(*term) {
                dot += query_weight * doc_weight;
            }
        }
        let doc_magnitude = match index.magnitudes[doc_id] {
            m if m == 0.0 => 1.0,
            m => m,
        };
        let score = dot / (query_magnitude * doc_magnitude);
        if score > 0.0 {
            hits.push(Hit { doc_id, score });
        }
    }

    // Stable sort, so tied scores keep ascending doc id order.
    hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    hits.truncate(MAX_RESULTS);
    hits
}
