// src/client/form.rs
//
// The data-collection form and the list of entries shown beneath it.

use std::collections::HashSet;

use crate::client::api::FieldDataApi;
use crate::client::error::ClientError;
use crate::client::notification::Notification;
use crate::domain::{Category, FieldDataInput, FieldDataRecord, RecordId};

/// How the form's own list catches up after a successful create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncStrategy {
    /// Append the server's response locally and skip the extra round trip.
    /// The list is only exact if nobody else wrote in the meantime; the next
    /// refresh reconciles it.
    #[default]
    AppendThenReconcile,
    /// Re-list after every successful create.
    RefetchAfterWrite,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("a submission is already in flight")]
    SubmitInFlight,
    #[error(transparent)]
    Client(#[from] ClientError),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormFields {
    pub title: String,
    pub category: Option<Category>,
    pub location: String,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub user_id: Option<String>,
    pub time_taken: Option<f64>,
}

impl FormFields {
    pub fn to_input(&self) -> FieldDataInput {
        FieldDataInput {
            title: Some(self.title.clone()),
            category: self.category.map(|c| c.as_str().to_string()),
            location: Some(self.location.clone()),
            latitude: self.latitude,
            longitude: self.longitude,
            description: Some(self.description.clone()),
            user_id: self.user_id.clone(),
            time_taken: self.time_taken,
            created_at: None,
        }
    }
}

/// Issued by [`CreationForm::begin_refresh`]; only the newest one is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone)]
struct LocalEntry {
    record: FieldDataRecord,
    /// Newest ticket issued when this entry was appended; `None` if it came from a fetch.
    appended_at: Option<u64>,
}

#[derive(Debug, Default)]
pub struct CreationForm {
    pub fields: FormFields,
    strategy: SyncStrategy,
    entries: Vec<LocalEntry>,
    in_flight: bool,
    issued: u64,
    notification: Option<Notification>,
}

impl CreationForm {
    pub fn new(strategy: SyncStrategy) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }

    pub fn strategy(&self) -> SyncStrategy {
        self.strategy
    }

    /// Drives the submit control: disabled while a request is outstanding.
    pub fn can_submit(&self) -> bool {
        !self.in_flight
    }

    pub fn entries(&self) -> impl Iterator<Item = &FieldDataRecord> + '_ {
        self.entries.iter().map(|e| &e.record)
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn take_notification(&mut self) -> Option<Notification> {
        self.notification.take()
    }

    /// Fill the location from a device fix, as "lat, lng" with six decimals.
    pub fn capture_location(&mut self, latitude: f64, longitude: f64) {
        let text = format!("{latitude:.6}, {longitude:.6}");
        self.fields.location = text.clone();
        self.fields.latitude = Some(latitude);
        self.fields.longitude = Some(longitude);
        self.notification = Some(Notification::info("Location Captured", text));
    }

    /// Mark a submission as outstanding and hand back the payload to send.
    pub fn begin_submit(&mut self) -> Result<FieldDataInput, FormError> {
        if self.in_flight {
            return Err(FormError::SubmitInFlight);
        }
        self.in_flight = true;
        Ok(self.fields.to_input())
    }

    /// Settle the outstanding submission.
    ///
    /// Success appends the server's record and clears the fields. Failure
    /// leaves the fields untouched so the user can fix and resubmit.
    pub fn finish_submit(
        &mut self,
        outcome: Result<FieldDataRecord, ClientError>,
    ) -> Result<FieldDataRecord, ClientError> {
        self.in_flight = false;

        match outcome {
            Ok(record) => {
                self.entries.push(LocalEntry {
                    record: record.clone(),
                    appended_at: Some(self.issued),
                });
                self.fields = FormFields::default();
                self.notification = Some(Notification::info(
                    "Data Entry Saved",
                    "Your field data has been recorded successfully.",
                ));
                Ok(record)
            }
            Err(e) => {
                self.notification = Some(submit_failure(&e));
                Err(e)
            }
        }
    }

    pub fn submit<A: FieldDataApi>(&mut self, api: &A) -> Result<FieldDataRecord, FormError> {
        let input = self.begin_submit()?;
        let record = self.finish_submit(api.create(&input))?;

        if self.strategy == SyncStrategy::RefetchAfterWrite && self.refresh(api).is_err() {
            // the save went through; a failed re-list must not read as a failed save
            self.notification = Some(Notification::info(
                "Data Entry Saved",
                "Your field data has been recorded, but the list could not be refreshed.",
            ));
        }
        Ok(record)
    }

    pub fn begin_refresh(&mut self) -> FetchTicket {
        self.issued += 1;
        FetchTicket(self.issued)
    }

    /// Apply a list response. Returns whether local state changed.
    ///
    /// Responses for anything but the newest ticket are stale and dropped.
    /// The fetched list replaces local state; entries appended after the
    /// ticket was issued that the response does not contain yet are kept.
    /// The result is newest first by `created_at`.
    pub fn apply_refresh(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<Vec<FieldDataRecord>, ClientError>,
    ) -> bool {
        if ticket.0 != self.issued {
            return false;
        }

        let records = match outcome {
            Ok(records) => records,
            Err(_) => {
                self.notification = Some(Notification::error("Error", "Failed to load field data"));
                return false;
            }
        };

        let fetched: HashSet<RecordId> = records.iter().map(|r| r.id.clone()).collect();
        let pending: Vec<LocalEntry> = self
            .entries
            .drain(..)
            .filter(|e| matches!(e.appended_at, Some(at) if at >= ticket.0))
            .filter(|e| !fetched.contains(&e.record.id))
            .collect();

        self.entries = pending
            .into_iter()
            .chain(records.into_iter().map(|record| LocalEntry {
                record,
                appended_at: None,
            }))
            .collect();
        // stable: on equal timestamps the local append stays ahead
        self.entries
            .sort_by(|a, b| b.record.created_at.cmp(&a.record.created_at));
        true
    }

    pub fn refresh<A: FieldDataApi>(&mut self, api: &A) -> Result<(), ClientError> {
        let ticket = self.begin_refresh();
        let outcome = api.list();
        let err = outcome.as_ref().err().cloned();
        self.apply_refresh(ticket, outcome);
        match err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn submit_failure(err: &ClientError) -> Notification {
    match err {
        ClientError::Network(_) => Notification::error(
            "Network error",
            "Could not reach the server. Your entry was not saved; check your connection and try again.",
        ),
        ClientError::Rejected { message, .. } => {
            Notification::error("Submission rejected", message.clone())
        }
        ClientError::Decode(_) | ClientError::InvalidUrl(_) => {
            Notification::error("Error", "An unexpected error occurred")
        }
    }
}
