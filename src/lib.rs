//! Field data hub: a REST adapter over the field-data store, and the
//! client-side cache the dashboard views use to talk to it.

pub mod client;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod responses;
pub mod router;
pub mod spreadsheets;
