//! Client side of the field-data contract.
//!
//! Every view owns its own snapshot and fetches it itself; nothing here is
//! shared between views, so two views can disagree until each refreshes.

pub mod api;
pub mod error;
pub mod form;
pub mod notification;
pub mod query;
pub mod views;

pub use api::{FieldDataApi, FieldDataClient};
pub use error::ClientError;
pub use form::{CreationForm, FetchTicket, FormError, FormFields, SyncStrategy};
pub use notification::{Notification, Variant};
pub use query::{Everything, HasCoordinates, InCategory, RecordPredicate, SearchTerm};
pub use views::{CollectionView, ReportsView};
