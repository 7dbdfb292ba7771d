//! Automated status lookup for the IRS "Where's My Refund" form.
//!
//! One invocation resolves the four query fields (SSN, tax year, filing
//! status, expected amount) from a key-value store or interactive prompts,
//! drives a headless browser through the form, and scrapes the reported
//! status text. Single session, strictly sequential, no retries.

pub mod backend;
pub mod errors;
pub mod form;
pub mod input;
pub mod query;
pub mod session;
pub mod store;

pub use backend::{create_backend, Browser, BrowserBackend};
pub use errors::CheckError;
pub use form::{Outcome, WMR_URL};
pub use input::{offer_save, resolve, Prompter, Resolved, StdinPrompter};
pub use query::{FilingStatus, RefundQuery, TaxYear};
pub use session::Session;
pub use store::{RawValues, Store};
