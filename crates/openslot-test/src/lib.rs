//! openslot availability server - integration test support.
//!
//! Provides an in-memory calendar source, ICS and settings fixtures, a
//! ready-made test service, and a scripted `CalDAV` server for exercising
//! the real client.

pub mod fake;
pub mod fixtures;
pub mod mock_caldav;

pub use openslot_app as app;
pub use openslot_core as core;
pub use openslot_rfc as rfc;
pub use openslot_service as service;
