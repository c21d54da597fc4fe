//! Page walkthrough binary
//!
//! Drives the landing page against the mock identity provider and prints
//! each region after every step.

use lexicon_identity::mocks::{FailureInjection, MockConfig, MockIdentityProvider};
use lexicon_page::{MemoryViewPort, PageConfig, PageController, PageEnvironment, Region};
use lexicon_runtime::telemetry::{TelemetryConfig, init_tracing};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(&TelemetryConfig::from_env());

    println!("=== Lexicon landing page walkthrough ===\n");

    let provider = Arc::new(MockIdentityProvider::new(
        MockConfig::default()
            .with_sign_in_delay(Duration::from_millis(300))
            .with_sign_out_delay(Duration::from_millis(150))
            .with_failure_injection(FailureInjection::NeverFail),
    ));
    let viewport = Arc::new(MemoryViewPort::new());
    let env = PageEnvironment::new(PageConfig::default().with_notice_duration(Duration::from_secs(1)));
    let controller = PageController::new(Arc::clone(&provider), Arc::clone(&viewport), env);

    controller.initialize().await?;
    print_page("Anonymous visitor", &viewport)?;

    println!(">>> Signing in with Google");
    let user = controller.sign_in_with_google().await?;
    tracing::info!(user_id = %user.id.as_str(), "Signed in");
    print_page("Signed in", &viewport)?;

    println!(">>> Clicking \"Practice\"");
    viewport.click("action-practice").await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    print_region("Notices", &viewport, Region::Notices)?;

    println!(">>> Searching for \"serendipity\"");
    viewport.submit("search-input", "serendipity").await;
    tokio::time::sleep(Duration::from_millis(1100)).await;
    print_region("Notices after expiry", &viewport, Region::Notices)?;

    println!(">>> Clicking \"Sign Out\"");
    viewport.click("signout-btn").await;
    print_page("Signed out", &viewport)?;

    controller.cleanup();
    println!("=== Walkthrough complete ===");
    Ok(())
}

fn print_page(title: &str, viewport: &MemoryViewPort) -> anyhow::Result<()> {
    print_region(&format!("{title}: header"), viewport, Region::AuthSection)?;
    print_region(&format!("{title}: main"), viewport, Region::MainContent)
}

fn print_region(title: &str, viewport: &MemoryViewPort, region: Region) -> anyhow::Result<()> {
    let fragment = viewport.fragment(region);
    println!("--- {title} ---");
    println!("{}\n", serde_json::to_string_pretty(&fragment)?);
    Ok(())
}
