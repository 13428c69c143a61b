//! Record listing: filters, text search and ordering

use shared::{Record, RecordQuery, SortKey, SortOrder};
use std::cmp::Ordering;

fn matches_search(record: &Record, term: &str) -> bool {
    let term = term.to_lowercase();
    record.material_type.as_str().to_lowercase().contains(&term)
        || record.registered_by.to_lowercase().contains(&term)
        || record.state.as_str().to_lowercase().contains(&term)
        || record.id.to_string().contains(&term)
}

fn matches(record: &Record, query: &RecordQuery) -> bool {
    if let Some(material_type) = &query.material_type {
        if &record.material_type != material_type {
            return false;
        }
    }
    if let Some(state) = query.state {
        if record.state != state {
            return false;
        }
    }

    let date = record.registered_at.date();
    if query.from.is_some_and(|from| date < from) {
        return false;
    }
    if query.to.is_some_and(|to| date > to) {
        return false;
    }

    match query.search.as_deref().map(str::trim) {
        Some(term) if term.chars().count() >= RecordQuery::MIN_SEARCH_LEN => matches_search(record, term),
        _ => true,
    }
}

fn compare(a: &Record, b: &Record, key: SortKey) -> Ordering {
    let primary = match key {
        SortKey::Id => Ordering::Equal,
        SortKey::Weight => a.weight_kg.total_cmp(&b.weight_kg),
        SortKey::RegisteredAt => a.registered_at.cmp(&b.registered_at),
        SortKey::MaterialType => a
            .material_type
            .as_str()
            .to_lowercase()
            .cmp(&b.material_type.as_str().to_lowercase()),
        SortKey::RegisteredBy => a.registered_by.to_lowercase().cmp(&b.registered_by.to_lowercase()),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

/// Records matching `query`, ordered by its sort key (id when unset)
pub fn filter_records(records: &[Record], query: &RecordQuery) -> Vec<Record> {
    let mut selected: Vec<Record> = records.iter().filter(|record| matches(record, query)).cloned().collect();

    let key = query.sort.unwrap_or_default();
    selected.sort_by(|a, b| match query.order {
        SortOrder::Asc => compare(a, b, key),
        SortOrder::Desc => compare(b, a, key),
    });
    selected
}
