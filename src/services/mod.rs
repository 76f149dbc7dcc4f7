//! Service layer for crease.
//!
//! Ingest flows compose fetching, parsing and storage. They are driven by
//! the CLI and the scheduler alike.

pub mod ingest;

pub use ingest::{IngestError, IngestJob, IngestOptions, Ingestor, OperationOutcome};
