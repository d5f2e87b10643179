//! Smart Money analytics SDK.
//!
//! # Overview
//!
//! Client of a blockchain-analytics HTTP API and the normalization layer
//! turning its loosely-typed JSON records into schema-fixed tables.
//!
//! Use [`client::Client`] with [`types::Query`] payloads to fetch raw
//! records, then [`table::normalize`] (or [`client::Client::fetch`]) to get
//! a [`table::Table`] of the matching [`table::SchemaKind`].
//!
//! [`view`] provides the derived views a dashboard needs (sorting, top-N,
//! age filtering, correlation) and [`cache::QueryCache`] keeps the last
//! table of each view until its query changes or a refresh is requested.
//!
//! # Data quality
//!
//! Normalization never fails because of a bad value: a cell that can not be
//! coerced to its column type becomes [`table::Cell::Missing`]. Columns are
//! fixed per schema, so an empty response still yields the full column set.
//!
//! # Limitations/follow-ups
//!
//! * Calls are never retried; a timeout surfaces as [`error::ApiError::Timeout`].
//!
//! * Only the first page of a query is fetched, paging is left to callers.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod snapshot;
pub mod table;
pub mod types;
pub mod view;

pub use client::Client;
pub use config::ClientConfig;
pub use table::{Cell, SchemaKind, Table};
