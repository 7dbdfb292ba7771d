//! Key-value backing store for the four query fields.
//!
//! The store is a snapshot of the process environment (populated from a
//! `.env` file by the caller), held as a plain value so the resolver never
//! touches ambient state. Writing back is opt-in and plaintext.

use std::fs;
use std::path::Path;

use crate::errors::CheckError;

pub const SSN_KEY: &str = "SSN";
pub const TAX_YEAR_KEY: &str = "TAX_YEAR";
pub const FILING_STATUS_KEY: &str = "FILING_STATUS";
pub const REFUND_AMOUNT_KEY: &str = "REFUND_AMOUNT";

/// Snapshot of the four recognized keys.
#[derive(Debug, Clone, Default)]
pub struct Store {
    pub ssn: Option<String>,
    pub tax_year: Option<String>,
    pub filing_status: Option<String>,
    pub amount: Option<String>,
}

impl Store {
    /// Snapshot the recognized keys from the process environment. Call after
    /// the `.env` file has been loaded.
    pub fn from_env() -> Self {
        Self {
            ssn: std::env::var(SSN_KEY).ok(),
            tax_year: std::env::var(TAX_YEAR_KEY).ok(),
            filing_status: std::env::var(FILING_STATUS_KEY).ok(),
            amount: std::env::var(REFUND_AMOUNT_KEY).ok(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.ssn.is_some()
            && self.tax_year.is_some()
            && self.filing_status.is_some()
            && self.amount.is_some()
    }
}

/// The four raw values as collected, kept un-normalized for write-back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValues {
    pub ssn: String,
    pub tax_year: String,
    pub filing_status: String,
    pub amount: String,
}

impl RawValues {
    /// Write the four values as `KEY=value` lines. The file is plaintext;
    /// callers must warn and get confirmation before invoking this.
    pub fn save(&self, path: &Path) -> Result<(), CheckError> {
        let contents = format!(
            "{SSN_KEY}={}\n{TAX_YEAR_KEY}={}\n{FILING_STATUS_KEY}={}\n{REFUND_AMOUNT_KEY}={}\n",
            self.ssn, self.tax_year, self.filing_status, self.amount
        );
        fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_completeness() {
        let mut store = Store::default();
        assert!(!store.is_complete());
        store.ssn = Some("111223333".into());
        store.tax_year = Some("2023".into());
        store.filing_status = Some("MFJ".into());
        assert!(!store.is_complete());
        store.amount = Some("1234".into());
        assert!(store.is_complete());
    }

    #[test]
    fn save_writes_all_four_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        let raw = RawValues {
            ssn: "111-22-3333".into(),
            tax_year: "2023".into(),
            filing_status: "MFJ".into(),
            amount: "1234".into(),
        };
        raw.save(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("SSN=111-22-3333"));
        assert!(contents.contains("TAX_YEAR=2023"));
        assert!(contents.contains("FILING_STATUS=MFJ"));
        assert!(contents.contains("REFUND_AMOUNT=1234"));
    }
}
