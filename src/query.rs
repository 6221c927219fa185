//! Filter, sort and paginate over in-memory record lists. Every function
//! takes its inputs by reference and returns a fresh list.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::dates;
use crate::error::Result;
use crate::models::{
    DateWindow, FilterCriteria, Location, Page, Searchable, SortDirection, SortKey, SortSpec,
    Sortable, Timestamped,
};

/// Maps a category label to the date window it stands for.
pub trait CategoryResolver {
    fn resolve(&self, label: &str) -> Option<DateWindow>;
}

/// Resolves lived locations to the period spent there. Labels are matched by
/// stable key first, then by city name; the first matching city wins.
#[derive(Debug, Clone)]
pub struct LocationIndex {
    entries: Vec<LocationEntry>,
}

#[derive(Debug, Clone)]
struct LocationEntry {
    key: Uuid,
    city: String,
    window: DateWindow,
}

impl LocationIndex {
    /// Ongoing stays (blank `end_date`) run until `today`.
    pub fn new(locations: &[Location], today: NaiveDate) -> Result<Self> {
        let mut entries = Vec::with_capacity(locations.len());
        for location in locations {
            let start = location.date()?;
            let end = dates::parse_optional_date("end_date", &location.end_date)?.unwrap_or(today);
            entries.push(LocationEntry {
                key: location.key(),
                city: location.city.clone(),
                window: DateWindow { start, end },
            });
        }
        Ok(Self { entries })
    }
}

impl CategoryResolver for LocationIndex {
    fn resolve(&self, label: &str) -> Option<DateWindow> {
        if let Ok(key) = Uuid::parse_str(label) {
            if let Some(entry) = self.entries.iter().find(|entry| entry.key == key) {
                return Some(entry.window);
            }
        }
        self.entries
            .iter()
            .find(|entry| entry.city == label)
            .map(|entry| entry.window)
    }
}

pub fn in_date_range(date: NaiveDate, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    start.map_or(true, |start| date >= start) && end.map_or(true, |end| date <= end)
}

/// Keep the records that pass every active criterion.
///
/// An unresolvable category label leaves the list unfiltered by category
/// rather than emptying it.
pub fn apply_filters<T, R>(records: &[T], criteria: &FilterCriteria, resolver: &R) -> Result<Vec<T>>
where
    T: Timestamped + Searchable + Clone,
    R: CategoryResolver + ?Sized,
{
    let window = match criteria.category() {
        Some(label) => {
            let window = resolver.resolve(label);
            if window.is_none() {
                tracing::debug!(label, "unknown category, skipping category filter");
            }
            window
        }
        None => None,
    };
    let needle = criteria.query().map(str::to_lowercase);
    let needs_date = criteria.start.is_some() || criteria.end.is_some() || window.is_some();

    let mut kept = Vec::with_capacity(records.len());
    for record in records {
        if needs_date {
            let date = record.date()?;
            if !in_date_range(date, criteria.start, criteria.end) {
                continue;
            }
            if let Some(window) = window {
                if !window.contains(date) {
                    continue;
                }
            }
        }

        if let Some(needle) = &needle {
            let matched = record
                .text_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(needle.as_str()));
            if !matched {
                continue;
            }
        }

        kept.push(record.clone());
    }

    tracing::debug!(input = records.len(), kept = kept.len(), "filters applied");
    Ok(kept)
}

/// Stable sort on the selected field. Dates compare chronologically, text
/// lexicographically.
pub fn sort_records<T>(records: &[T], spec: &SortSpec<T::Field>) -> Result<Vec<T>>
where
    T: Sortable + Clone,
{
    let Some(field) = spec.field else {
        return Ok(records.to_vec());
    };

    let mut keyed = records
        .iter()
        .map(|record| record.sort_key(field).map(|key| (key, record)))
        .collect::<Result<Vec<(SortKey<'_>, &T)>>>()?;

    match spec.direction {
        SortDirection::Asc => keyed.sort_by(|a, b| a.0.cmp(&b.0)),
        SortDirection::Desc => keyed.sort_by(|a, b| b.0.cmp(&a.0)),
    }

    Ok(keyed.into_iter().map(|(_, record)| record.clone()).collect())
}

/// Slice out one page. Always at least one page, so an empty list yields
/// page 1 of 1. Out-of-range page numbers are clamped and a zero page size
/// is treated as 1.
pub fn paginate<T: Clone>(records: &[T], page_number: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_pages = records.len().div_ceil(page_size).max(1);
    let page_number = page_number.clamp(1, total_pages);

    let start = (page_number - 1) * page_size;
    let end = (start + page_size).min(records.len());
    let items = records.get(start..end).map(<[T]>::to_vec).unwrap_or_default();

    Page {
        items,
        page_number,
        total_pages,
        total_items: records.len(),
        page_size,
    }
}
