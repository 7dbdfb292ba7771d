use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CheckError;

/// Tax years the refund form accepts. The year string doubles as the
/// `for` attribute of the radio label on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxYear {
    Y2024,
    Y2023,
    Y2022,
    Y2021,
}

impl TaxYear {
    pub const SUPPORTED: [TaxYear; 4] = [
        TaxYear::Y2024,
        TaxYear::Y2023,
        TaxYear::Y2022,
        TaxYear::Y2021,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaxYear::Y2024 => "2024",
            TaxYear::Y2023 => "2023",
            TaxYear::Y2022 => "2022",
            TaxYear::Y2021 => "2021",
        }
    }
}

impl FromStr for TaxYear {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "2024" => Ok(TaxYear::Y2024),
            "2023" => Ok(TaxYear::Y2023),
            "2022" => Ok(TaxYear::Y2022),
            "2021" => Ok(TaxYear::Y2021),
            other => Err(CheckError::InvalidTaxYear(other.to_string())),
        }
    }
}

impl fmt::Display for TaxYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Federal filing status. Each variant maps to the distinct element id the
/// form uses for its radio label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilingStatus {
    Single,
    MarriedFilingJointly,
    MarriedFilingSeparately,
    HeadOfHousehold,
    QualifyingSurvivingSpouse,
}

impl FilingStatus {
    pub const ALL: [FilingStatus; 5] = [
        FilingStatus::Single,
        FilingStatus::MarriedFilingJointly,
        FilingStatus::MarriedFilingSeparately,
        FilingStatus::HeadOfHousehold,
        FilingStatus::QualifyingSurvivingSpouse,
    ];

    /// Short human-readable code, as stored in the key-value store.
    pub fn code(&self) -> &'static str {
        match self {
            FilingStatus::Single => "SINGLE",
            FilingStatus::MarriedFilingJointly => "MFJ",
            FilingStatus::MarriedFilingSeparately => "MFS",
            FilingStatus::HeadOfHousehold => "HOH",
            FilingStatus::QualifyingSurvivingSpouse => "QW",
        }
    }

    /// The `for` attribute of the status radio label on the form.
    pub fn form_id(&self) -> &'static str {
        match self {
            FilingStatus::Single => "SINGLE",
            FilingStatus::MarriedFilingJointly => "MARRIED_FILING_JOINT",
            FilingStatus::MarriedFilingSeparately => "MARRIED_FILING_SEPARATE",
            FilingStatus::HeadOfHousehold => "HEAD_OF_HOUSEHOLD",
            FilingStatus::QualifyingSurvivingSpouse => "QUALIFYING_SURVIVING_SPOUSE",
        }
    }

    /// Long description shown in the interactive menu.
    pub fn description(&self) -> &'static str {
        match self {
            FilingStatus::Single => "Single",
            FilingStatus::MarriedFilingJointly => "Married Filing Jointly",
            FilingStatus::MarriedFilingSeparately => "Married Filing Separately",
            FilingStatus::HeadOfHousehold => "Head of Household",
            FilingStatus::QualifyingSurvivingSpouse => "Qualifying Widow(er)",
        }
    }

    /// Parse a stored short code, case-insensitively. An unknown code is a
    /// configuration error and terminal for the run.
    pub fn from_code(code: &str) -> Result<Self, CheckError> {
        match code.trim().to_uppercase().as_str() {
            "SINGLE" => Ok(FilingStatus::Single),
            "MFJ" => Ok(FilingStatus::MarriedFilingJointly),
            "MFS" => Ok(FilingStatus::MarriedFilingSeparately),
            "HOH" => Ok(FilingStatus::HeadOfHousehold),
            "QW" => Ok(FilingStatus::QualifyingSurvivingSpouse),
            other => Err(CheckError::InvalidFilingStatus(other.to_string())),
        }
    }

    /// Map a numbered menu choice ("1".."5") to a status.
    pub fn from_menu_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(FilingStatus::Single),
            "2" => Some(FilingStatus::MarriedFilingJointly),
            "3" => Some(FilingStatus::MarriedFilingSeparately),
            "4" => Some(FilingStatus::HeadOfHousehold),
            "5" => Some(FilingStatus::QualifyingSurvivingSpouse),
            _ => None,
        }
    }
}

impl fmt::Display for FilingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Strip separator characters so "123-45-6789" and "123456789" compare equal.
pub fn normalize_ssn(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '-' | ' '))
        .collect()
}

/// Digits-only check for the expected refund amount.
pub fn is_valid_amount(raw: &str) -> bool {
    !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit())
}

/// The single transient record driven through the form. Created once per
/// invocation and used immutably; the SSN must never be printed in full.
#[derive(Debug, Clone)]
pub struct RefundQuery {
    pub ssn: String,
    pub tax_year: TaxYear,
    pub filing_status: FilingStatus,
    pub amount: String,
}

impl RefundQuery {
    /// Masked form of the SSN for display: last four characters only.
    pub fn masked_ssn(&self) -> String {
        let chars: Vec<char> = self.ssn.chars().collect();
        if chars.len() >= 4 {
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("...{tail}")
        } else {
            "****".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_status_maps_to_a_distinct_form_id() {
        let ids: HashSet<&str> = FilingStatus::ALL.iter().map(|s| s.form_id()).collect();
        assert_eq!(ids.len(), FilingStatus::ALL.len());
    }

    #[test]
    fn status_codes_round_trip() {
        for status in FilingStatus::ALL {
            assert_eq!(FilingStatus::from_code(status.code()).unwrap(), status);
        }
    }

    #[test]
    fn status_codes_are_case_insensitive() {
        assert_eq!(
            FilingStatus::from_code("mfj").unwrap(),
            FilingStatus::MarriedFilingJointly
        );
    }

    #[test]
    fn unknown_status_code_is_an_error() {
        let err = FilingStatus::from_code("MARRIED").unwrap_err();
        assert!(matches!(err, CheckError::InvalidFilingStatus(_)));
    }

    #[test]
    fn menu_choices_cover_all_statuses() {
        assert_eq!(
            FilingStatus::from_menu_choice("2"),
            Some(FilingStatus::MarriedFilingJointly)
        );
        assert_eq!(
            FilingStatus::from_menu_choice("5"),
            Some(FilingStatus::QualifyingSurvivingSpouse)
        );
        assert_eq!(FilingStatus::from_menu_choice("0"), None);
        assert_eq!(FilingStatus::from_menu_choice("6"), None);
        assert_eq!(FilingStatus::from_menu_choice("x"), None);
    }

    #[test]
    fn ssn_normalization_strips_separators() {
        assert_eq!(normalize_ssn("123-45-6789"), normalize_ssn("123456789"));
        assert_eq!(normalize_ssn("123 45 6789"), "123456789");
    }

    #[test]
    fn tax_year_accepts_only_supported_set() {
        for year in TaxYear::SUPPORTED {
            assert_eq!(year.as_str().parse::<TaxYear>().unwrap(), year);
        }
        assert!("2020".parse::<TaxYear>().is_err());
        assert!("2025".parse::<TaxYear>().is_err());
        assert!("abcd".parse::<TaxYear>().is_err());
    }

    #[test]
    fn amount_must_be_digits_only() {
        assert!(is_valid_amount("1234"));
        assert!(!is_valid_amount("12.34"));
        assert!(!is_valid_amount("$1234"));
        assert!(!is_valid_amount(""));
    }

    #[test]
    fn masked_ssn_shows_last_four_only() {
        let query = RefundQuery {
            ssn: "111223333".to_string(),
            tax_year: TaxYear::Y2023,
            filing_status: FilingStatus::MarriedFilingJointly,
            amount: "1234".to_string(),
        };
        assert_eq!(query.masked_ssn(), "...3333");
        assert!(!query.masked_ssn().contains("11122"));
    }

    #[test]
    fn masked_ssn_tolerates_non_ascii_entry() {
        // Prompted input is not digit-validated; masking must not panic on
        // a multibyte character inside the tail.
        let query = RefundQuery {
            ssn: "12345é789".to_string(),
            tax_year: TaxYear::Y2023,
            filing_status: FilingStatus::Single,
            amount: "1".to_string(),
        };
        assert_eq!(query.masked_ssn(), "...é789");

        let short = RefundQuery {
            ssn: "é9".to_string(),
            ..query
        };
        assert_eq!(short.masked_ssn(), "****");
    }
}
