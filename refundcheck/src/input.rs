//! Input resolver: produce the [`RefundQuery`] from the store or from
//! interactive prompts.

use std::io::{self, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::errors::CheckError;
use crate::query::{is_valid_amount, normalize_ssn, FilingStatus, RefundQuery, TaxYear};
use crate::store::{RawValues, Store};

/// Seam for interactive input, so resolver flows are testable without a
/// terminal.
pub trait Prompter {
    /// Prompt with echo.
    fn prompt(&mut self, message: &str) -> Result<String, CheckError>;

    /// Prompt with input hidden (SSN entry).
    fn prompt_hidden(&mut self, message: &str) -> Result<String, CheckError>;

    /// Yes/no confirmation.
    fn confirm(&mut self, message: &str) -> Result<bool, CheckError>;

    /// Informational line shown to the user.
    fn say(&mut self, message: &str);
}

/// Real terminal prompter over stdin/stdout.
#[derive(Debug, Default)]
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn prompt(&mut self, message: &str) -> Result<String, CheckError> {
        print!("{message}");
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    fn prompt_hidden(&mut self, message: &str) -> Result<String, CheckError> {
        let value = rpassword::prompt_password(message)?;
        Ok(value.trim().to_string())
    }

    fn confirm(&mut self, message: &str) -> Result<bool, CheckError> {
        let answer = self.prompt(message)?;
        Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
    }

    fn say(&mut self, message: &str) {
        println!("{message}");
    }
}

/// Resolver output: the typed query, the raw values as entered (for
/// optional write-back), and whether any prompting occurred.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub query: RefundQuery,
    pub raw: RawValues,
    pub prompted: bool,
}

/// Produce the four-field record. Uses the store verbatim when complete,
/// otherwise collects every field interactively.
pub fn resolve(store: &Store, prompter: &mut dyn Prompter) -> Result<Resolved, CheckError> {
    if store.is_complete() {
        debug!("all four values present in store, skipping prompts");
        let ssn_raw = store.ssn.clone().unwrap_or_default();
        let year_raw = store.tax_year.clone().unwrap_or_default();
        let status_raw = store.filing_status.clone().unwrap_or_default();
        let amount_raw = store.amount.clone().unwrap_or_default();

        let query = RefundQuery {
            ssn: normalize_ssn(&ssn_raw),
            tax_year: year_raw.parse()?,
            filing_status: FilingStatus::from_code(&status_raw)?,
            amount: amount_raw.clone(),
        };
        return Ok(Resolved {
            query,
            raw: RawValues {
                ssn: ssn_raw,
                tax_year: year_raw,
                filing_status: status_raw,
                amount: amount_raw,
            },
            prompted: false,
        });
    }

    prompter.say("Could not find all required information in the store. Please enter manually:");

    let ssn_raw =
        prompter.prompt_hidden("Enter your Social Security Number (XXX-XX-XXXX or XXXXXXXXX): ")?;

    let tax_year = loop {
        let entered = prompter.prompt("Enter the tax year (2024, 2023, 2022 or 2021): ")?;
        match entered.parse::<TaxYear>() {
            Ok(year) => break (entered, year),
            Err(_) => {
                prompter.say("Invalid tax year. Please choose from 2024, 2023, 2022 or 2021.")
            }
        }
    };

    prompter.say("Select your filing status:");
    for (i, status) in FilingStatus::ALL.iter().enumerate() {
        prompter.say(&format!(
            "  {}. {:<6} ({})",
            i + 1,
            status.code(),
            status.description()
        ));
    }
    let filing_status = loop {
        let choice = prompter.prompt(&format!(
            "Enter the number for your filing status (1-{}): ",
            FilingStatus::ALL.len()
        ))?;
        match FilingStatus::from_menu_choice(&choice) {
            Some(status) => break status,
            None => prompter.say("Invalid selection. Please enter a valid number."),
        }
    };

    let amount_raw = loop {
        let entered =
            prompter.prompt("Enter your expected refund amount (numbers only, e.g. 1234): ")?;
        if is_valid_amount(&entered) {
            break entered;
        }
        prompter.say("Invalid amount. Please enter numbers only.");
    };

    let (year_raw, year) = tax_year;
    let query = RefundQuery {
        ssn: normalize_ssn(&ssn_raw),
        tax_year: year,
        filing_status,
        amount: amount_raw.clone(),
    };
    Ok(Resolved {
        query,
        raw: RawValues {
            ssn: ssn_raw,
            tax_year: year_raw,
            filing_status: filing_status.code().to_string(),
            amount: amount_raw,
        },
        prompted: true,
    })
}

/// Offer to persist the raw values after interactive collection. Returns
/// whether a write happened. Gated on explicit confirmation; the opt-in
/// flag gate is the caller's responsibility.
pub fn offer_save(
    path: &Path,
    raw: &RawValues,
    prompter: &mut dyn Prompter,
) -> Result<bool, CheckError> {
    prompter.say(&format!(
        "Warning: saving writes your SSN and refund details to {} in plaintext.",
        path.display()
    ));
    if !prompter.confirm("Save these values for next time? [y/N]: ")? {
        return Ok(false);
    }
    raw.save(path)?;
    warn!(path = %path.display(), "sensitive values written in plaintext");
    Ok(true)
}
