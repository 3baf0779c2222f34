//! Record store implementations:
//! - `airtable`: Airtable REST API, formula filters
//! - `nocodb`: NocoDB v2 REST API, comparison filters
//! - `local`: in-memory store for tests and local development
#[cfg(feature = "airtable-store")]
pub mod airtable;
pub mod local;
#[cfg(feature = "nocodb-store")]
pub mod nocodb;
#[cfg(any(feature = "airtable-store", feature = "nocodb-store"))]
mod remote;

#[cfg(feature = "airtable-store")]
pub use airtable::AirtableStore;
pub use local::LocalStore;
#[cfg(feature = "nocodb-store")]
pub use nocodb::NocoDbStore;
