//! Refund status checker CLI.
//!
//! Resolves the query (from a `.env` store or interactive prompts), drives
//! a headless browser through the IRS "Where's My Refund" form and prints
//! whichever status or alert text the site reports.

use std::path::Path;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use refundcheck::{
    create_backend, form, offer_save, resolve, Browser, Outcome, RefundQuery, Session,
    StdinPrompter, Store,
};

#[derive(Parser)]
#[command(name = "refundcheck")]
#[command(about = "Check the status of a federal tax refund from the command line")]
struct Cli {
    /// Browser to drive (requires the matching WebDriver server running)
    #[arg(long, short, value_enum, default_value_t = BrowserChoice::Firefox)]
    browser: BrowserChoice,

    /// Verbose progress logging
    #[arg(long, short)]
    verbose: bool,

    /// Write a screenshot and page markup to the working directory at teardown
    #[arg(long)]
    debug_dump: bool,

    /// Offer to save interactively entered values back to .env (plaintext)
    #[arg(long)]
    save: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
#[clap(rename_all = "lower")]
enum BrowserChoice {
    #[default]
    Firefox,
    Chrome,
    Edge,
}

impl std::fmt::Display for BrowserChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", format!("{self:?}").to_lowercase())
    }
}

impl From<BrowserChoice> for Browser {
    fn from(choice: BrowserChoice) -> Self {
        match choice {
            BrowserChoice::Firefox => Browser::Firefox,
            BrowserChoice::Chrome => Browser::Chrome,
            BrowserChoice::Edge => Browser::Edge,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "refundcheck=debug,refundcheck_cli=debug"
    } else {
        "refundcheck=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}

fn print_summary(query: &RefundQuery) {
    println!("\n{}", "--- Query ---".bold());
    println!("SSN: {}", query.masked_ssn());
    println!("Tax year: {}", query.tax_year);
    println!(
        "Filing status: {} ({})",
        query.filing_status.code(),
        query.filing_status.form_id()
    );
    println!("Expected amount: ${}", query.amount);
    println!("-------------");
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let store = Store::from_env();
    let mut prompter = StdinPrompter;
    // Only an unmapped stored filing status exits nonzero; other resolver
    // errors are reported as a failed run.
    let resolved = match resolve(&store, &mut prompter) {
        Ok(resolved) => resolved,
        Err(e) if e.is_fatal() => return Err(e.into()),
        Err(e) => {
            eprintln!("{} {e}", "Run failed:".red());
            return Ok(());
        }
    };

    if cli.save && resolved.prompted {
        offer_save(Path::new(".env"), &resolved.raw, &mut prompter)?;
    }

    print_summary(&resolved.query);
    check_status(&cli, &resolved.query).await;
    Ok(())
}

/// One browser run. Every failure is terminal for the session and only
/// reported; the browser is released on every path.
async fn check_status(cli: &Cli, query: &RefundQuery) {
    let backend = create_backend(cli.browser.into());
    println!("Using {} browser.", backend.name());

    let session = match Session::launch(backend.as_ref()).await {
        Ok(session) => session,
        Err(e) => {
            eprintln!("{} {e}", "Failed to start browser session:".red());
            eprintln!(
                "Is the {} WebDriver server running at {}?",
                backend.name(),
                backend.webdriver_url()
            );
            return;
        }
    };

    match form::run(&session, query).await {
        Ok(Outcome::Status(text)) => {
            println!("\n{}\n{text}", "--- Refund Status ---".green().bold());
        }
        Ok(Outcome::Alert(text)) => {
            println!("\n{}\n{text}", "--- Message from IRS ---".yellow().bold());
        }
        Ok(Outcome::Undetermined) => {
            println!(
                "Could not determine refund status or find a message after submission (timeout)."
            );
        }
        Err(e) => {
            eprintln!("{} {e}", "Run failed:".red());
            if !cli.debug_dump {
                eprintln!("Re-run with --debug-dump to capture a screenshot and page markup.");
            }
        }
    }

    if cli.debug_dump {
        match session.dump_artifacts("refund_check_debug").await {
            Ok((png, html)) => {
                println!("Debug artifacts: {} / {}", png.display(), html.display());
            }
            Err(e) => eprintln!("Failed to write debug artifacts: {e}"),
        }
    }

    debug!("releasing browser session");
    if let Err(e) = session.quit().await {
        eprintln!("Failed to close browser cleanly: {e}");
    }
}
