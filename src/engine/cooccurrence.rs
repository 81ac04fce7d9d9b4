use indexmap::IndexSet;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{ProductId, Transaction, TransactionRow};

/// Groups raw store rows into one transaction per invoice
///
/// Rows sharing an invoice belong to the same purchase. The order of the
/// returned transactions follows the invoice ordering, which the engine
/// does not depend on.
pub fn group_transactions(rows: impl IntoIterator<Item = TransactionRow>) -> Vec<Transaction> {
    let mut by_invoice: BTreeMap<String, BTreeSet<ProductId>> = BTreeMap::new();
    for row in rows {
        by_invoice.entry(row.invoice).or_default().insert(row.product_id);
    }

    by_invoice.into_values().map(Transaction::new).collect()
}

/// Bijection between product identifiers and dense matrix positions
///
/// Positions follow ascending product identifier, so the index built from
/// a given corpus is always the same.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductIndex {
    products: IndexSet<ProductId>,
}

impl ProductIndex {
    /// Indexes every product that appears in at least one transaction
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let distinct: BTreeSet<ProductId> = transactions
            .iter()
            .flat_map(|transaction| transaction.products())
            .collect();

        Self {
            products: distinct.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Dense position of a product, if it was ever transacted
    pub fn index_of(&self, product_id: ProductId) -> Option<usize> {
        self.products.get_index_of(&product_id)
    }

    /// Product stored at a dense position
    pub fn product_at(&self, index: usize) -> Option<ProductId> {
        self.products.get_index(index).copied()
    }

    /// All indexed products in position order
    pub fn products(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.products.iter().copied()
    }
}

/// Square matrix of pairwise co-purchase counts
///
/// `get(i, j)` is the number of transactions containing both product `i`
/// and product `j`. Symmetric, with a zero diagonal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CooccurrenceMatrix {
    dimension: usize,
    counts: Vec<u32>,
}

impl CooccurrenceMatrix {
    fn zeros(dimension: usize) -> Self {
        Self {
            dimension,
            counts: vec![0; dimension * dimension],
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn get(&self, i: usize, j: usize) -> u32 {
        self.counts[i * self.dimension + j]
    }

    pub fn row(&self, i: usize) -> &[u32] {
        let start = i * self.dimension;
        &self.counts[start..start + self.dimension]
    }

    /// True when the product at `i` was never bought alongside anything
    pub fn is_isolated(&self, i: usize) -> bool {
        self.row(i).iter().all(|&count| count == 0)
    }

    fn increment(&mut self, i: usize, j: usize) {
        self.counts[i * self.dimension + j] += 1;
    }
}

/// Product index together with the co-occurrence counts built over it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cooccurrence {
    pub index: ProductIndex,
    pub matrix: CooccurrenceMatrix,
}

impl Cooccurrence {
    /// Counts co-purchases across all transactions
    ///
    /// Every ordered pair of distinct products within a transaction
    /// increments its cell once, so each unordered pair lands in both
    /// `(i, j)` and `(j, i)`. Empty and single-product transactions
    /// contribute nothing.
    pub fn build(transactions: &[Transaction]) -> Self {
        let index = ProductIndex::from_transactions(transactions);
        let mut matrix = CooccurrenceMatrix::zeros(index.len());

        for transaction in transactions.iter().filter(|t| t.len() > 1) {
            let members: Vec<usize> = transaction
                .products()
                .filter_map(|product_id| index.index_of(product_id))
                .collect();

            for &i in &members {
                for &j in &members {
                    if i != j {
                        matrix.increment(i, j);
                    }
                }
            }
        }

        tracing::debug!(
            transaction_count = transactions.len(),
            product_count = index.len(),
            "Built co-occurrence matrix"
        );

        Self { index, matrix }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(ids: &[i64]) -> Transaction {
        ids.iter().copied().map(ProductId).collect()
    }

    fn sample_corpus() -> Vec<Transaction> {
        vec![
            tx(&[1, 2]),
            tx(&[1, 2, 3]),
            tx(&[2, 3]),
            tx(&[4]),
            tx(&[]),
            tx(&[1, 3, 5, 6]),
            tx(&[2, 5, 6]),
        ]
    }

    fn cell(cooc: &Cooccurrence, a: i64, b: i64) -> u32 {
        let i = cooc.index.index_of(ProductId(a)).unwrap();
        let j = cooc.index.index_of(ProductId(b)).unwrap();
        cooc.matrix.get(i, j)
    }

    #[test]
    fn test_group_transactions_by_invoice() {
        let rows = vec![
            TransactionRow::new("INV-2", 3),
            TransactionRow::new("INV-1", 1),
            TransactionRow::new("INV-1", 2),
            TransactionRow::new("INV-1", 2),
            TransactionRow::new("INV-2", 1),
        ];

        let transactions = group_transactions(rows);
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0], tx(&[1, 2]));
        assert_eq!(transactions[1], tx(&[1, 3]));
    }

    #[test]
    fn test_group_transactions_empty() {
        assert!(group_transactions(Vec::new()).is_empty());
    }

    #[test]
    fn test_product_index_is_bijective() {
        let index = ProductIndex::from_transactions(&sample_corpus());
        assert_eq!(index.len(), 6);

        for (position, product_id) in index.products().enumerate() {
            assert_eq!(index.index_of(product_id), Some(position));
            assert_eq!(index.product_at(position), Some(product_id));
        }
        assert_eq!(index.index_of(ProductId(99)), None);
        assert_eq!(index.product_at(6), None);
    }

    #[test]
    fn test_product_index_orders_by_identifier() {
        let index = ProductIndex::from_transactions(&[tx(&[30, 10]), tx(&[20])]);
        let products: Vec<ProductId> = index.products().collect();
        assert_eq!(products, vec![ProductId(10), ProductId(20), ProductId(30)]);
    }

    #[test]
    fn test_basket_scenario_counts() {
        let cooc = Cooccurrence::build(&[tx(&[1, 2]), tx(&[1, 2, 3]), tx(&[2, 3])]);

        assert_eq!(cell(&cooc, 1, 2), 2);
        assert_eq!(cell(&cooc, 2, 1), 2);
        assert_eq!(cell(&cooc, 1, 3), 1);
        assert_eq!(cell(&cooc, 3, 1), 1);
        assert_eq!(cell(&cooc, 2, 3), 2);
        assert_eq!(cell(&cooc, 3, 2), 2);
    }

    #[test]
    fn test_matrix_is_symmetric_with_zero_diagonal() {
        let cooc = Cooccurrence::build(&sample_corpus());
        let n = cooc.matrix.dimension();

        for i in 0..n {
            assert_eq!(cooc.matrix.get(i, i), 0);
            for j in 0..n {
                assert_eq!(cooc.matrix.get(i, j), cooc.matrix.get(j, i));
            }
        }
    }

    #[test]
    fn test_counts_match_transactions_containing_both() {
        let corpus = sample_corpus();
        let cooc = Cooccurrence::build(&corpus);

        for a in cooc.index.products() {
            for b in cooc.index.products() {
                if a == b {
                    continue;
                }
                let expected = corpus
                    .iter()
                    .filter(|t| t.contains(a) && t.contains(b))
                    .count() as u32;
                assert_eq!(cell(&cooc, a.0, b.0), expected, "pair ({}, {})", a, b);
            }
        }
    }

    #[test]
    fn test_single_product_transaction_is_all_zero() {
        let cooc = Cooccurrence::build(&[tx(&[1])]);
        assert_eq!(cooc.index.len(), 1);
        assert_eq!(cooc.matrix.get(0, 0), 0);
        assert!(cooc.matrix.is_isolated(0));
    }

    #[test]
    fn test_empty_corpus() {
        let cooc = Cooccurrence::build(&[]);
        assert!(cooc.index.is_empty());
        assert_eq!(cooc.matrix.dimension(), 0);
    }

    #[test]
    fn test_isolated_product_in_larger_corpus() {
        let cooc = Cooccurrence::build(&sample_corpus());
        let isolated = cooc.index.index_of(ProductId(4)).unwrap();
        let connected = cooc.index.index_of(ProductId(1)).unwrap();
        assert!(cooc.matrix.is_isolated(isolated));
        assert!(!cooc.matrix.is_isolated(connected));
    }
}
