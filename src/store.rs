//! In-memory record list with its derived views.
//!
//! The store holds the most recently fetched collection and nothing else.
//! It is replaced whole by [`RecordStore::apply_fetch`]; every view below is
//! recomputed on demand from that snapshot.

use tracing::debug;

use crate::currency::{format_currency_value, CurrencyCode, LocaleConfig};
use crate::purchase::{MonthFilter, MonthKey, PurchaseRecord, RecordId};
use crate::validation::round_cents;

/// Generation token handed out before a fetch starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<PurchaseRecord>,
    issued: u64,
    applied: Option<u64>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fetch. Any ticket issued earlier becomes stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        FetchTicket(self.issued)
    }

    /// Replaces the collection with `records` if `ticket` is the latest one
    /// issued. Returns `false` and leaves the store untouched otherwise.
    pub fn apply_fetch(&mut self, ticket: FetchTicket, mut records: Vec<PurchaseRecord>) -> bool {
        if ticket.0 != self.issued {
            debug!(
                ticket = ticket.0,
                latest = self.issued,
                "discarding superseded fetch"
            );
            return false;
        }
        // Stable: same-day purchases keep the order the server sent them in.
        records.sort_by(|a, b| b.date.cmp(&a.date));
        self.records = records;
        self.applied = Some(ticket.0);
        true
    }

    /// Generation of the snapshot currently held, if any fetch was applied.
    pub fn generation(&self) -> Option<u64> {
        self.applied
    }

    pub fn is_loaded(&self) -> bool {
        self.applied.is_some()
    }

    /// All records, newest purchase first.
    pub fn records(&self) -> &[PurchaseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find(&self, id: &RecordId) -> Option<&PurchaseRecord> {
        self.records.iter().find(|record| &record.id == id)
    }

    pub fn filtered(&self, filter: &MonthFilter) -> Vec<&PurchaseRecord> {
        self.records
            .iter()
            .filter(|record| filter.matches(record.date))
            .collect()
    }

    /// Distinct months in first-seen order of the sorted list.
    pub fn months(&self) -> Vec<MonthKey> {
        let mut months: Vec<MonthKey> = Vec::new();
        for record in &self.records {
            let key = record.month();
            if !months.contains(&key) {
                months.push(key);
            }
        }
        months
    }

    /// Filter choices offered to the user: the sentinel, then each month.
    pub fn available_months(&self) -> Vec<MonthFilter> {
        std::iter::once(MonthFilter::All)
            .chain(self.months().into_iter().map(MonthFilter::Month))
            .collect()
    }

    /// Sum of prices in the filtered view.
    pub fn total(&self, filter: &MonthFilter) -> f64 {
        let sum: f64 = self
            .records
            .iter()
            .filter(|record| filter.matches(record.date))
            .map(|record| record.price)
            .sum();
        round_cents(sum)
    }

    pub fn formatted_total(
        &self,
        filter: &MonthFilter,
        currency: &CurrencyCode,
        locale: &LocaleConfig,
    ) -> String {
        format_currency_value(self.total(filter), currency, locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: &str, date: &str, price: f64) -> PurchaseRecord {
        PurchaseRecord {
            id: RecordId::new(id),
            brand: format!("Marca {id}"),
            quantity: 1.0,
            price,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        }
    }

    fn loaded(records: Vec<PurchaseRecord>) -> RecordStore {
        let mut store = RecordStore::new();
        let ticket = store.begin_fetch();
        assert!(store.apply_fetch(ticket, records));
        store
    }

    #[test]
    fn fetch_sorts_by_date_descending_with_stable_ties() {
        let store = loaded(vec![
            record("a", "2024-01-01", 1.0),
            record("b", "2024-03-10", 1.0),
            record("c", "2024-03-10", 1.0),
            record("d", "2024-02-20", 1.0),
        ]);
        let ids: Vec<&str> = store.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["b", "c", "d", "a"]);
    }

    #[test]
    fn stale_tickets_are_discarded() {
        let mut store = RecordStore::new();
        let first = store.begin_fetch();
        let second = store.begin_fetch();
        assert!(store.apply_fetch(second, vec![record("new", "2024-01-01", 1.0)]));
        assert!(!store.apply_fetch(first, vec![record("old", "2023-01-01", 1.0)]));
        assert_eq!(store.records()[0].id.as_str(), "new");
        assert_eq!(store.generation(), Some(second.generation()));
    }

    #[test]
    fn unloaded_store_is_empty() {
        let store = RecordStore::new();
        assert!(!store.is_loaded());
        assert!(store.is_empty());
        assert_eq!(store.available_months(), vec![MonthFilter::All]);
        assert_eq!(store.total(&MonthFilter::All), 0.0);
    }

    #[test]
    fn total_is_rounded_to_cents() {
        let store = loaded(vec![
            record("a", "2024-01-01", 0.1),
            record("b", "2024-01-02", 0.2),
        ]);
        assert_eq!(store.total(&MonthFilter::All), 0.3);
    }
}
