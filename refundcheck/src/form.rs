//! The "Where's My Refund" form procedure: five await-and-fill steps,
//! submit, then two-stage result extraction.

use std::future::Future;

use thirtyfour::prelude::*;
use tracing::{debug, info};

use crate::errors::CheckError;
use crate::query::RefundQuery;
use crate::session::Session;

/// Fixed target URL; the element contract below is owned by the remote
/// site and breaks whenever its structure changes.
pub const WMR_URL: &str = "https://sa.www4.irs.gov/wmr/";

const SSN_INPUT: &str = "input#ssnInputControl";
const AMOUNT_INPUT: &str = "input[name='refundAmountInput']";
const SUBMIT_ANCHOR: &str = "#anchor-ui-0";
const CURRENT_STEP: &str = "li div.current-step";
const ALERT_CONTENT: &str = ".section-alert__content";

/// What the page reported after submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Primary indicator: the refund tracker's current step.
    Status(String),
    /// Secondary indicator: an alert message from the site.
    Alert(String),
    /// Neither indicator appeared before the timeout.
    Undetermined,
}

/// Year and status radios are driven by clicking the label whose `for`
/// attribute carries the value, not by setting the input directly.
fn label_for(key: &str) -> String {
    format!("label[for='{key}']")
}

/// Drive the form start to finish and extract the outcome. Any wait
/// failure aborts the run; nothing is retried.
pub async fn run(session: &Session, query: &RefundQuery) -> Result<Outcome, CheckError> {
    session.goto(WMR_URL).await?;

    info!("filling out form");
    let ssn_input = session.wait_for(SSN_INPUT).await?;
    ssn_input.send_keys(&query.ssn).await?;
    debug!("SSN entered");

    let year_label = session
        .wait_for_clickable(&label_for(query.tax_year.as_str()))
        .await?;
    year_label.click().await?;
    debug!(year = query.tax_year.as_str(), "tax year selected");

    let status_label = session
        .wait_for_clickable(&label_for(query.filing_status.form_id()))
        .await?;
    status_label.click().await?;
    debug!(status = query.filing_status.form_id(), "filing status selected");

    let amount_input = session.wait_for(AMOUNT_INPUT).await?;
    amount_input.send_keys(&query.amount).await?;
    debug!("refund amount entered");

    let submit = session.wait_for_clickable(SUBMIT_ANCHOR).await?;
    submit.click().await?;
    info!("form submitted, waiting for results");

    classify(probe_status(session), || probe_alert(session)).await
}

/// Wait for the current-step tracker; its status text lives on the
/// enclosing list item. `None` means the wait timed out.
async fn probe_status(session: &Session) -> Result<Option<String>, CheckError> {
    match session.wait_for_visible(CURRENT_STEP).await {
        Ok(step_div) => {
            let item = step_div.find(By::XPath("./parent::li")).await?;
            Ok(Some(item.text().await?))
        }
        Err(CheckError::Timeout(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Wait for the alert box. `None` means the wait timed out.
async fn probe_alert(session: &Session) -> Result<Option<String>, CheckError> {
    match session.wait_for_visible(ALERT_CONTENT).await {
        Ok(alert) => Ok(Some(alert.text().await?)),
        Err(CheckError::Timeout(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// The extraction decision: primary probe first, secondary only after the
/// primary yields nothing, undetermined when both come up empty. At most
/// one indicator is expected; a page showing both reports the primary and
/// the secondary is never inspected.
async fn classify<PFut, S, SFut>(primary: PFut, secondary: S) -> Result<Outcome, CheckError>
where
    PFut: Future<Output = Result<Option<String>, CheckError>>,
    S: FnOnce() -> SFut,
    SFut: Future<Output = Result<Option<String>, CheckError>>,
{
    if let Some(text) = primary.await? {
        return Ok(Outcome::Status(text.trim().to_string()));
    }
    match secondary().await? {
        Some(text) => Ok(Outcome::Alert(text.trim().to_string())),
        None => Ok(Outcome::Undetermined),
    }
}
