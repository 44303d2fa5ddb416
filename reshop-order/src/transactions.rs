use crate::models::Transaction;
use chrono::{DateTime, SubsecRound, Utc};
use reshop_shared::ItemId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// Sales count for one item name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PopularItem {
    pub item_name: String,
    pub sales: usize,
}

/// Totals for the sales report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SalesSummary {
    pub transaction_count: usize,
    pub total_revenue: u64,
    pub report_date: DateTime<Utc>,
}

/// Append-only record of completed sales.
///
/// Revenue is recomputed from the entries on every call rather than kept as
/// a running total, so it always matches the log.
#[derive(Debug, Clone, Default)]
pub struct TransactionLog {
    entries: Vec<Transaction>,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sale by item name only
    pub fn record(&mut self, item_name: impl Into<String>, price: u32, timestamp: DateTime<Utc>) -> &Transaction {
        self.push(Transaction {
            item_id: None,
            item_name: item_name.into(),
            price,
            timestamp,
        })
    }

    /// Record a sale of a known catalog item
    pub fn record_sale(
        &mut self,
        item_id: ItemId,
        item_name: impl Into<String>,
        price: u32,
        timestamp: DateTime<Utc>,
    ) -> &Transaction {
        self.push(Transaction {
            item_id: Some(item_id),
            item_name: item_name.into(),
            price,
            timestamp,
        })
    }

    // The data file keeps whole seconds, so entries do too
    fn push(&mut self, mut transaction: Transaction) -> &Transaction {
        transaction.timestamp = transaction.timestamp.trunc_subsecs(0);
        info!(
            "Recorded sale of '{}' for {} at {}",
            transaction.item_name,
            transaction.price,
            transaction.timestamp.to_rfc3339()
        );
        self.entries.push(transaction);
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[Transaction] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_revenue(&self) -> u64 {
        self.entries.iter().map(|t| u64::from(t.price)).sum()
    }

    pub fn sales_summary(&self) -> SalesSummary {
        SalesSummary {
            transaction_count: self.entries.len(),
            total_revenue: self.total_revenue(),
            report_date: Utc::now(),
        }
    }

    /// Best sellers by number of sales, at most `limit` entries.
    ///
    /// Names are compared exactly. Equal counts keep the order in which the
    /// name was first sold.
    pub fn popularity_ranking(&self, limit: usize) -> Vec<PopularItem> {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut ranking: Vec<PopularItem> = Vec::new();

        for transaction in &self.entries {
            match positions.get(transaction.item_name.as_str()) {
                Some(&pos) => ranking[pos].sales += 1,
                None => {
                    positions.insert(&transaction.item_name, ranking.len());
                    ranking.push(PopularItem {
                        item_name: transaction.item_name.clone(),
                        sales: 1,
                    });
                }
            }
        }

        // sort_by is stable, which preserves first-seen order on ties
        ranking.sort_by(|a, b| b.sales.cmp(&a.sales));
        ranking.truncate(limit);
        ranking
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_total_revenue() {
        let mut log = TransactionLog::new();
        assert_eq!(log.total_revenue(), 0);

        log.record("Laptop", 1000, at(30));
        log.record_sale(ItemId(3), "Tablet", 240, at(10));
        log.record("Laptop", 800, at(20));

        assert_eq!(log.total_revenue(), 2040);
        assert_eq!(log.len(), 3);
        assert_eq!(log.entries()[1].item_id, Some(ItemId(3)));
    }

    #[test]
    fn test_popularity_ranking() {
        let mut log = TransactionLog::new();
        for name in ["A", "B", "A", "C", "A", "B"] {
            log.record(name, 1, at(0));
        }

        let ranking = log.popularity_ranking(2);
        assert_eq!(
            ranking,
            vec![
                PopularItem { item_name: "A".to_string(), sales: 3 },
                PopularItem { item_name: "B".to_string(), sales: 2 },
            ]
        );
    }

    #[test]
    fn test_popularity_ties_keep_first_seen_order() {
        let mut log = TransactionLog::new();
        for name in ["Chair", "Lamp", "Desk", "Lamp", "Chair", "Desk"] {
            log.record(name, 1, at(0));
        }

        let names: Vec<String> = log
            .popularity_ranking(10)
            .into_iter()
            .map(|p| p.item_name)
            .collect();
        assert_eq!(names, vec!["Chair", "Lamp", "Desk"]);
    }

    #[test]
    fn test_sales_summary() {
        let mut log = TransactionLog::new();
        log.record("Bookshelf", 80, at(0));
        log.record("Bookshelf", 64, at(5));

        let summary = log.sales_summary();
        assert_eq!(summary.transaction_count, 2);
        assert_eq!(summary.total_revenue, 144);
    }

    #[test]
    fn test_timestamps_are_whole_seconds() {
        let mut log = TransactionLog::new();
        let precise = Utc.timestamp_opt(1_700_000_000, 703_730_567).unwrap();
        log.record("Lamp", 20, precise);

        assert_eq!(log.entries()[0].timestamp, at(1_700_000_000));
    }
}
