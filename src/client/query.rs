use crate::domain::{Category, FieldDataRecord};

/// A filter over records, written once and shared by every view.
pub trait RecordPredicate {
    fn matches(&self, record: &FieldDataRecord) -> bool;
}

impl<F> RecordPredicate for F
where
    F: Fn(&FieldDataRecord) -> bool,
{
    fn matches(&self, record: &FieldDataRecord) -> bool {
        self(record)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Everything;

impl RecordPredicate for Everything {
    fn matches(&self, _: &FieldDataRecord) -> bool {
        true
    }
}

/// Records that can be placed on a map.
#[derive(Debug, Clone, Copy, Default)]
pub struct HasCoordinates;

impl RecordPredicate for HasCoordinates {
    fn matches(&self, record: &FieldDataRecord) -> bool {
        record.coordinates().is_some()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InCategory(pub Category);

impl RecordPredicate for InCategory {
    fn matches(&self, record: &FieldDataRecord) -> bool {
        record.category == self.0
    }
}

/// Case-insensitive substring match on title, description or category.
/// A blank term matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    pub fn new(term: &str) -> Self {
        SearchTerm(term.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl RecordPredicate for SearchTerm {
    fn matches(&self, record: &FieldDataRecord) -> bool {
        if self.0.is_empty() {
            return true;
        }
        record.title.to_lowercase().contains(&self.0)
            || record.description.to_lowercase().contains(&self.0)
            || record.category.as_str().contains(&self.0)
    }
}
