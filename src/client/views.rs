// src/client/views.rs
//
// Per-view snapshots and the projections derived from them.

use chrono::Datelike;
use std::collections::BTreeMap;

use crate::client::api::FieldDataApi;
use crate::client::error::ClientError;
use crate::client::notification::Notification;
use crate::client::query::{Everything, HasCoordinates, RecordPredicate, SearchTerm};
use crate::domain::{Category, FieldDataRecord, RecordId};

pub const RECENT_REPORTS: usize = 5;

/// A view's private copy of the records it cares about.
///
/// Refreshing re-fetches the whole collection and re-applies the view's
/// predicate. A failed refresh keeps the last good snapshot.
#[derive(Debug)]
pub struct CollectionView<P> {
    predicate: P,
    records: Vec<FieldDataRecord>,
    loaded: bool,
    notification: Option<Notification>,
}

impl<P: RecordPredicate> CollectionView<P> {
    pub fn new(predicate: P) -> Self {
        Self {
            predicate,
            records: Vec::new(),
            loaded: false,
            notification: None,
        }
    }

    /// Returns how many records the view now holds.
    pub fn refresh<A: FieldDataApi>(&mut self, api: &A) -> Result<usize, ClientError> {
        match api.list_where(&self.predicate) {
            Ok(records) => {
                self.records = records;
                self.loaded = true;
                Ok(self.records.len())
            }
            Err(e) => {
                self.notification = Some(Notification::error("Error", "Failed to load field data"));
                Err(e)
            }
        }
    }

    pub fn records(&self) -> &[FieldDataRecord] {
        &self.records
    }

    /// False until the first successful refresh.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn take_notification(&mut self) -> Option<Notification> {
        self.notification.take()
    }
}

impl CollectionView<HasCoordinates> {
    pub fn map() -> Self {
        Self::new(HasCoordinates)
    }

    pub fn pins(&self) -> Vec<MapPin> {
        map_pins(&self.records)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapPin {
    pub id: RecordId,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub category: Category,
}

/// Records missing either coordinate are skipped.
pub fn map_pins(records: &[FieldDataRecord]) -> Vec<MapPin> {
    records
        .iter()
        .filter_map(|r| {
            let (lat, lng) = r.coordinates()?;
            Some(MapPin {
                id: r.id.clone(),
                name: r.title.clone(),
                lat,
                lng,
                category: r.category,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: Category,
    pub label: &'static str,
    pub count: usize,
}

/// One entry per category, in `Category::ALL` order, zeros included.
pub fn category_totals(records: &[FieldDataRecord]) -> Vec<CategoryTotal> {
    Category::ALL
        .into_iter()
        .map(|category| CategoryTotal {
            category,
            label: category.label(),
            count: records.iter().filter(|r| r.category == category).count(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyCounts {
    pub year: i32,
    pub month: u32,
    /// Short month name, e.g. "Jan".
    pub label: String,
    pub counts: BTreeMap<Category, usize>,
}

impl MonthlyCounts {
    pub fn count(&self, category: Category) -> usize {
        self.counts.get(&category).copied().unwrap_or(0)
    }
}

/// Group by calendar month of `created_at`, buckets in order of first appearance.
pub fn monthly_counts(records: &[FieldDataRecord]) -> Vec<MonthlyCounts> {
    let mut buckets: Vec<MonthlyCounts> = Vec::new();

    for r in records {
        let (year, month) = (r.created_at.year(), r.created_at.month());
        let pos = match buckets
            .iter()
            .position(|b| b.year == year && b.month == month)
        {
            Some(pos) => pos,
            None => {
                buckets.push(MonthlyCounts {
                    year,
                    month,
                    label: r.created_at.format("%b").to_string(),
                    counts: BTreeMap::new(),
                });
                buckets.len() - 1
            }
        };
        *buckets[pos].counts.entry(r.category).or_insert(0) += 1;
    }

    buckets
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub id: RecordId,
    pub title: String,
    pub date: String,
    pub status: &'static str,
    /// Capitalised category, e.g. "Water".
    pub kind: String,
}

pub fn recent_reports(
    records: &[FieldDataRecord],
    search: &SearchTerm,
    limit: usize,
) -> Vec<ReportRow> {
    records
        .iter()
        .filter(|r| search.matches(r))
        .take(limit)
        .map(|r| ReportRow {
            id: r.id.clone(),
            title: r.title.clone(),
            date: r.created_at.format("%Y-%m-%d").to_string(),
            status: "Completed",
            kind: capitalize(r.category.as_str()),
        })
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The reports page: the full collection plus a search box over it.
#[derive(Debug)]
pub struct ReportsView {
    view: CollectionView<Everything>,
    search: SearchTerm,
}

impl Default for ReportsView {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportsView {
    pub fn new() -> Self {
        Self {
            view: CollectionView::new(Everything),
            search: SearchTerm::default(),
        }
    }

    pub fn refresh<A: FieldDataApi>(&mut self, api: &A) -> Result<usize, ClientError> {
        self.view.refresh(api)
    }

    /// Only the table follows the search box; the charts cover everything.
    pub fn set_search(&mut self, term: &str) {
        self.search = SearchTerm::new(term);
    }

    pub fn category_totals(&self) -> Vec<CategoryTotal> {
        category_totals(self.view.records())
    }

    pub fn monthly_counts(&self) -> Vec<MonthlyCounts> {
        monthly_counts(self.view.records())
    }

    pub fn recent_reports(&self) -> Vec<ReportRow> {
        recent_reports(self.view.records(), &self.search, RECENT_REPORTS)
    }

    pub fn take_notification(&mut self) -> Option<Notification> {
        self.view.take_notification()
    }
}
