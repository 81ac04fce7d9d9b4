use rayon::prelude::*;
use std::cmp::Ordering;

use super::cooccurrence::{Cooccurrence, CooccurrenceMatrix};
use crate::models::ProductId;

/// Cosine similarity between two count vectors
///
/// Returns 0.0 when either vector has zero norm instead of NaN.
pub fn cosine_similarity(a: &[u32], b: &[u32]) -> f64 {
    cosine(a, b, norm(a), norm(b))
}

fn cosine(a: &[u32], b: &[u32], norm_a: f64, norm_b: f64) -> f64 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot(a, b) / (norm_a * norm_b)
}

fn dot(a: &[u32], b: &[u32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum()
}

fn norm(v: &[u32]) -> f64 {
    dot(v, v).sqrt()
}

fn dot_exact(a: &[u32], b: &[u32]) -> u128 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| u128::from(x) * u128::from(y))
        .sum()
}

/// Cosine against a fixed query row, kept as integers for exact ordering
///
/// The query norm is shared by every candidate, so `dot / sqrt(norm_sq)`
/// orders the same as the full cosine. Rounded `f64` scores can differ in
/// the last bit for ratios that are equal, which would bypass the id
/// tie-break.
#[derive(Debug, Clone, Copy)]
struct ExactScore {
    dot: u128,
    norm_sq: u128,
}

impl ExactScore {
    fn new(query_row: &[u32], candidate_row: &[u32]) -> Self {
        Self {
            dot: dot_exact(query_row, candidate_row),
            norm_sq: dot_exact(candidate_row, candidate_row),
        }
    }

    fn cmp_score(&self, other: &Self) -> Ordering {
        match (self.dot, other.dot) {
            (0, 0) => Ordering::Equal,
            (0, _) => Ordering::Less,
            (_, 0) => Ordering::Greater,
            // a / sqrt(x) vs b / sqrt(y)  <=>  a^2 * y vs b^2 * x
            (a, b) => (a * a * other.norm_sq).cmp(&(b * b * self.norm_sq)),
        }
    }
}

/// Pairwise cosine similarity between the rows of a co-occurrence matrix
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimilarityMatrix {
    dimension: usize,
    scores: Vec<f64>,
}

impl SimilarityMatrix {
    /// Computes every row pair; rows are filled in parallel with norms computed once
    pub fn from_cooccurrence(matrix: &CooccurrenceMatrix) -> Self {
        let dimension = matrix.dimension();
        let norms: Vec<f64> = (0..dimension).map(|i| norm(matrix.row(i))).collect();
        let mut scores = vec![0.0; dimension * dimension];

        if dimension > 0 {
            scores
                .par_chunks_mut(dimension)
                .enumerate()
                .for_each(|(i, out)| {
                    let row_i = matrix.row(i);
                    for (j, score) in out.iter_mut().enumerate() {
                        *score = cosine(row_i, matrix.row(j), norms[i], norms[j]);
                    }
                });
        }

        Self { dimension, scores }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.scores[i * self.dimension + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        let start = i * self.dimension;
        &self.scores[start..start + self.dimension]
    }
}

/// A recommended product and its similarity to the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredProduct {
    pub product_id: ProductId,
    pub score: f64,
}

/// Ranks products by similarity to a query product
#[derive(Debug, Clone, Copy)]
pub struct Ranker {
    limit: usize,
}

impl Ranker {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    /// Returns up to `limit` products most similar to `query`
    ///
    /// The query itself is excluded by position, so other products scoring
    /// 1.0 still qualify. Equal scores are ordered by ascending product id.
    /// An unknown query, or one never bought together with anything,
    /// yields an empty ranking.
    pub fn rank(&self, cooccurrence: &Cooccurrence, query: ProductId) -> Vec<ScoredProduct> {
        let Some(query_index) = cooccurrence.index.index_of(query) else {
            tracing::debug!(product_id = %query, "Product not present in any transaction");
            return Vec::new();
        };

        if cooccurrence.matrix.is_isolated(query_index) {
            tracing::debug!(product_id = %query, "Product has no co-purchases");
            return Vec::new();
        }

        let similarity = SimilarityMatrix::from_cooccurrence(&cooccurrence.matrix);

        let query_row = cooccurrence.matrix.row(query_index);

        let mut ranked: Vec<(ScoredProduct, ExactScore)> = similarity
            .row(query_index)
            .iter()
            .enumerate()
            .filter(|&(index, _)| index != query_index)
            .filter_map(|(index, &score)| {
                cooccurrence.index.product_at(index).map(|product_id| {
                    let exact = ExactScore::new(query_row, cooccurrence.matrix.row(index));
                    (ScoredProduct { product_id, score }, exact)
                })
            })
            .collect();

        ranked.sort_by(|(a, exact_a), (b, exact_b)| {
            exact_b
                .cmp_score(exact_a)
                .then_with(|| a.product_id.cmp(&b.product_id))
        });
        ranked.truncate(self.limit);
        ranked.into_iter().map(|(scored, _)| scored).collect()
    }
}
