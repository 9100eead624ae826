//! HTTP-level integration tests.

mod auth;
mod availability;
mod caldav_client;
mod calendars;
mod helpers;
mod selection;
