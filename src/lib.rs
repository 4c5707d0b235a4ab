//! This crate provides a client to the Taskify task API.
//!
//! It provides an HTTP client in the [`client`] module, that handles authentication: bearer tokens are attached to
//! every request, and expired sessions are refreshed transparently (see the module documentation).
//! Tokens are kept in a [`TokenStore`](credentials::TokenStore), either in memory or in a file.
//!
//! Tasks can be scheduled on a single date, repeat on some weekdays, and be excluded on specific dates.
//! The [`recurrence`] module decides on which days a task shows up.
//!
//! An [`Agenda`] combines any [`TaskSource`](traits::TaskSource) (the client, or an in-memory
//! [`MemoryTaskSource`](mock_source::MemoryTaskSource)) with a two-week [`DayStrip`](calendar::DayStrip),
//! to display the tasks of a selected day.

pub mod traits;

pub mod error;
pub use error::Error;
pub mod task;
pub use task::{DayOfWeek, Priority, Task, TaskRequest};
pub mod recurrence;
pub mod calendar;
pub mod agenda;
pub use agenda::Agenda;

pub mod client;
pub use client::Client;
pub mod credentials;

pub mod mock_source;
pub mod mock_behaviour;

pub mod config;
pub mod utils;
