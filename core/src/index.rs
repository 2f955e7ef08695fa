use crate::corpus::{DocId, Problem};
use crate::tokenizer::normalize;
use std::collections::{BTreeMap, HashMap};

/// Immutable TF-IDF index over the whole corpus: sparse per-document
/// vectors, their cached Euclidean magnitudes, and an inverted index for
/// candidate pruning. Built once at startup and only read afterwards.
pub struct VectorIndex {
    /// Sparse term -> weight vectors, parallel to the corpus.
    pub vectors: Vec<HashMap<String, f64>>,
    /// Euclidean norm of each vector, parallel to the corpus. Zero only
    /// when the document produced no indexable terms.
    pub magnitudes: Vec<f64>,
    /// Term -> ascending doc ids whose vector holds that term.
    pub inverted: HashMap<String, Vec<DocId>>,
    doc_freq: HashMap<String, u32>,
    num_docs: usize,
}

/// Smoothed IDF: non-increasing in df and finite even when every document
/// contains the term (df = N gives ln 2).
fn smoothed_idf(num_docs: usize, doc_freq: u32) -> f64 {
    (1.0 + num_docs as f64 / doc_freq as f64).ln()
}

impl VectorIndex {
    /// Build the index from the ordered corpus. Deterministic: the same
    /// corpus always yields the same vectors, magnitudes, and inverted
    /// index.
    pub fn build(problems: &[Problem]) -> Self {
        let num_docs = problems.len();

        // First pass: per-document term counts and corpus document
        // frequencies. Counts are term-sorted so the squared-weight
        // accumulation below sums in a fixed order, keeping magnitudes
        // bit-identical across rebuilds.
        let mut term_counts: Vec<BTreeMap<String, u32>> = Vec::with_capacity(num_docs);
        let mut doc_freq: HashMap<String, u32> = HashMap::new();
        for problem in problems {
            let mut counts: BTreeMap<String, u32> = BTreeMap::new();
            for term in normalize(&problem.indexable_text()) {
                *counts.entry(term).or_insert(0) += 1;
            }
            for term in counts.keys() {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            term_counts.push(counts);
        }

        // Second pass: TF-IDF weights, magnitudes, inverted index. Docs are
        // visited in corpus order, so each posting list comes out sorted by
        // doc id.
        let mut vectors: Vec<HashMap<String, f64>> = Vec::with_capacity(num_docs);
        let mut magnitudes: Vec<f64> = Vec::with_capacity(num_docs);
        let mut inverted: HashMap<String, Vec<DocId>> = HashMap::new();
        for (doc_id, counts) in term_counts.into_iter().enumerate() {
            let mut vector: HashMap<String, f64> = HashMap::with_capacity(counts.len());
            let mut sum_squares = 0.0f64;
            for (term, count) in counts {
                let weight = count as f64 * smoothed_idf(num_docs, doc_freq[&term]);
                if weight > 0.0 {
                    sum_squares += weight * weight;
                    inverted.entry(term.clone()).or_default().push(doc_id);
                    vector.insert(term, weight);
                }
            }
            vectors.push(vector);
            magnitudes.push(sum_squares.sqrt());
        }

        tracing::info!(num_docs, num_terms = inverted.len(), "vector index built");

        Self {
            vectors,
            magnitudes,
            inverted,
            doc_freq,
            num_docs,
        }
    }

    /// Corpus-wide IDF for a term. Terms absent from the vocabulary get 0,
    /// so they drop out of query vectors instead of inflating them.
    pub fn idf(&self, term: &str) -> f64 {
        match self.doc_freq.get(term) {
            Some(&df) => smoothed_idf(self.num_docs, df),
            None => 0.0,
        }
    }

    pub fn num_docs(&self) -> usize {
        self.num_docs
    }

    pub fn num_terms(&self) -> usize {
        self.inverted.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem(title: &str, description: &str, url: &str) -> Problem {
        Problem {
            title: title.into(),
            description: if description.is_empty() {
                None
            } else {
                Some(description.into())
            },
            url: url.into(),
        }
    }

    fn sample_corpus() -> Vec<Problem> {
        vec![
            problem(
                "Two Sum",
                "array hashmap target indices",
                "https://leetcode.com/problems/two-sum",
            ),
            problem(
                "Graph Coloring",
                "graph adjacency chromatic",
                "https://codeforces.com/problemset/graph",
            ),
            problem(
                "Binary Search",
                "sorted array search target",
                "https://leetcode.com/problems/binary-search",
            ),
        ]
    }

    #[test]
    fn magnitude_is_norm_of_vector() {
        let index = VectorIndex::build(&sample_corpus());
        for (vector, &magnitude) in index.vectors.iter().zip(&index.magnitudes) {
            let expected: f64 = vector.values().map(|w| w * w).sum::<f64>().sqrt();
            assert!((magnitude - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn inverted_index_matches_vectors_exactly() {
        let index = VectorIndex::build(&sample_corpus());
        for (term, doc_ids) in &index.inverted {
            for &doc_id in doc_ids {
                assert!(index.vectors[doc_id].get(term).is_some_and(|&w| w > 0.0));
            }
        }
        for (doc_id, vector) in index.vectors.iter().enumerate() {
            for term in vector.keys() {
                assert!(index.inverted[term].contains(&doc_id));
            }
        }
    }

    #[test]
    fn posting_lists_are_sorted_by_doc_id() {
        let index = VectorIndex::build(&sample_corpus());
        for doc_ids in index.inverted.values() {
            assert!(doc_ids.windows(2).all(|w| w[0] < w[1]));
        }
    }

    // Enough documents and vocabulary that the magnitude sums accumulate
    // many terms; a corpus this size catches order-dependent summation.
    fn wide_corpus() -> Vec<Problem> {
        let topics = [
            "array", "graph", "tree", "string", "geometry", "bitmask", "greedy", "flow",
        ];
        let verbs = [
            "sort", "search", "merge", "partition", "color", "traverse", "match", "count",
        ];
        (0..40)
            .map(|i| {
                let topic = topics[i % topics.len()];
                let verb = verbs[(i / topics.len()) % verbs.len()];
                problem(
                    &format!("{verb} the {topic}"),
                    &format!(
                        "{verb} queries over a {topic} with {} updates and {} constraints",
                        topics[(i + 3) % topics.len()],
                        verbs[(i + 5) % verbs.len()],
                    ),
                    &format!("https://codeforces.com/problemset/{i}"),
                )
            })
            .collect()
    }

    #[test]
    fn rebuild_is_deterministic() {
        let corpus = wide_corpus();
        let a = VectorIndex::build(&corpus);
        let b = VectorIndex::build(&corpus);
        assert_eq!(a.vectors, b.vectors);
        assert_eq!(a.inverted, b.inverted);
        assert_eq!(a.magnitudes.len(), b.magnitudes.len());
        for (x, y) in a.magnitudes.iter().zip(&b.magnitudes) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }

    #[test]
    fn empty_document_gets_empty_vector_and_zero_magnitude() {
        let corpus = vec![problem("", "", "https://codeforces.com/x")];
        let index = VectorIndex::build(&corpus);
        assert!(index.vectors[0].is_empty());
        assert_eq!(index.magnitudes[0], 0.0);
    }

    #[test]
    fn identical_documents_get_identical_vectors() {
        let twin = problem("Two Sum", "array hashmap", "https://leetcode.com/a");
        let corpus = vec![twin.clone(), twin];
        let index = VectorIndex::build(&corpus);
        assert_eq!(index.vectors[0], index.vectors[1]);
        assert_eq!(index.magnitudes[0], index.magnitudes[1]);
    }

    #[test]
    fn idf_is_non_increasing_in_document_frequency() {
        assert!(smoothed_idf(10, 1) > smoothed_idf(10, 2));
        assert!(smoothed_idf(10, 2) > smoothed_idf(10, 10));
        // Defined even when every document contains the term.
        assert!(smoothed_idf(10, 10).is_finite());
        assert!(smoothed_idf(10, 10) > 0.0);
    }

    #[test]
    fn unknown_term_has_zero_idf() {
        let index = VectorIndex::build(&sample_corpus());
        assert_eq!(index.idf("xyzzy"), 0.0);
    }
}
