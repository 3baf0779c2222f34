//! Result types returned by the services and served by the HTTP API,
//! grouped by dashboard view.

pub mod catalog;
pub mod dashboard;
pub mod demographics;
pub mod revenue;
