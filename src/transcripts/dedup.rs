// Deduplication of transcript records.
//
// The same event is sometimes captured by more than one PDF, each export
// carrying a slightly different event label ("Q3 2023 Earnings Call" vs.
// "Q3 2023 Earnings Call and Business Update"). Earnings events are
// collapsed per (Ticker, Date) keeping the most descriptive label; every
// other event type only loses exact duplicates.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use super::record::TranscriptRecord;

type DateKey = (Option<NaiveDate>, String);

/// Collapse duplicate records and sort the survivors by (Ticker, Date).
///
/// - Non-earnings: first occurrence of each (Ticker, Date, Event Type) wins.
/// - Earnings: one record per (Ticker, Date), the one with the longest
///   Event Type label. Equal lengths keep the first seen.
///
/// The sort is stable, so within one (Ticker, Date) non-earnings records
/// keep their input order and precede the surviving earnings record.
pub fn dedup_records(records: Vec<TranscriptRecord>) -> Vec<TranscriptRecord> {
    let (earnings, other): (Vec<_>, Vec<_>) =
        records.into_iter().partition(|r| r.meta.is_earnings());

    let mut seen: HashSet<(String, DateKey, String)> = HashSet::new();
    let mut kept: Vec<TranscriptRecord> = other
        .into_iter()
        .filter(|r| {
            seen.insert((
                r.meta.ticker.clone(),
                r.meta.date_key(),
                r.meta.event_type.clone(),
            ))
        })
        .collect();

    let mut slot: HashMap<(String, DateKey), usize> = HashMap::new();
    let mut best: Vec<TranscriptRecord> = Vec::new();
    for record in earnings {
        match slot.entry((record.meta.ticker.clone(), record.meta.date_key())) {
            Entry::Occupied(e) => {
                let current = &mut best[*e.get()];
                if label_len(&record) > label_len(current) {
                    *current = record;
                }
            }
            Entry::Vacant(e) => {
                e.insert(best.len());
                best.push(record);
            }
        }
    }

    kept.extend(best);
    kept.sort_by(|a, b| {
        a.meta
            .ticker
            .cmp(&b.meta.ticker)
            .then_with(|| a.meta.date_key().cmp(&b.meta.date_key()))
    });
    kept
}

/// Label length in characters, not bytes.
fn label_len(record: &TranscriptRecord) -> usize {
    record.meta.event_type.chars().count()
}
