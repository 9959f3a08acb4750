//! Read-only Jira REST adapter.

pub mod client;

pub use client::{JiraClient, JiraError, SearchQuery};
