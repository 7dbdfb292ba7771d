use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Timed out waiting for {0}")]
    Timeout(String),

    #[error("Invalid filing status '{0}'. Use one of: SINGLE, MFJ, MFS, HOH, QW")]
    InvalidFilingStatus(String),

    #[error("Invalid tax year '{0}'. Supported years: 2024, 2023, 2022, 2021")]
    InvalidTaxYear(String),

    #[error("WebDriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CheckError {
    /// Whether the process should exit nonzero. Only an unmapped stored
    /// filing status is a fatal configuration error; everything else is
    /// reported as a failed run and exits normally.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CheckError::InvalidFilingStatus(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unmapped_filing_status_is_fatal() {
        assert!(CheckError::InvalidFilingStatus("MARRIED".to_string()).is_fatal());
        assert!(!CheckError::InvalidTaxYear("1999".to_string()).is_fatal());
        assert!(!CheckError::Timeout("input#ssnInputControl".to_string()).is_fatal());
    }
}
