//! Scripted walk through the event creation wizard.
//!
//! Uses `PostgreSQL` when `DATABASE_URL` is set and the in-memory store
//! otherwise.

use anyhow::Context;
use chrono::{Duration, Utc};
use event_wizard::{Transition, WizardConfig, WizardController, WizardEnvironment};
use event_wizard_core::draft::{DraftPatch, Monetization, OwnerId};
use event_wizard_core::environment::SystemClock;
use event_wizard_core::persistence::DraftStore;
use event_wizard_core::step::StepId;
use event_wizard_postgres::PostgresDraftStore;
use event_wizard_runtime::cache::InMemoryDraftCache;
use event_wizard_runtime::repository::DraftRepository;
use event_wizard_testing::InMemoryDraftStore;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = WizardConfig::from_env();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting event wizard demo");

    let store: Arc<dyn DraftStore> = match &config.database.url {
        Some(url) => {
            info!("Connecting to draft database...");
            let store = PostgresDraftStore::connect(
                url,
                config.database.max_connections,
                config.connect_timeout(),
            )
            .await
            .context("connecting to the draft database")?;
            store.migrate().await.context("running migrations")?;
            info!("Draft database ready");
            Arc::new(store)
        },
        None => {
            warn!("DATABASE_URL not set, drafts are kept in memory");
            Arc::new(InMemoryDraftStore::new())
        },
    };

    let repository = DraftRepository::new(store, Arc::new(InMemoryDraftCache::new()), Arc::new(SystemClock))
        .with_retry_policy(config.retry_policy())
        .with_placeholder(config.save.placeholder_name.clone());
    let wizard = WizardController::new_draft(WizardEnvironment::new(repository), OwnerId::generate());

    walkthrough(&wizard).await?;
    wizard
        .close(std::time::Duration::from_secs(5))
        .await
        .context("closing the session")
}

/// Stop the script when a command is refused.
fn accepted(transition: Transition, what: &str) -> anyhow::Result<()> {
    match transition {
        Transition::Accepted => Ok(()),
        Transition::Rejected(reason) => anyhow::bail!("{what} was refused: {reason}"),
    }
}

async fn walkthrough(wizard: &WizardController) -> anyhow::Result<()> {
    let starts_at = Utc::now() + Duration::days(30);
    let basics = DraftPatch::new()
        .name("Rust Meetup")
        .monetization(Monetization::Paid)
        .schedule(starts_at, starts_at + Duration::hours(3));
    accepted(wizard.edit(basics).await?, "editing basics")?;

    accepted(wizard.next().await?, "leaving basics")?;
    info!(step = %wizard.current_step_id().await, "Basics saved");

    let branding = DraftPatch::new().branding(Some(serde_json::json!({ "accent": "#dea584" })));
    accepted(wizard.save(branding).await?, "saving branding")?;
    accepted(wizard.next().await?, "leaving design")?;
    info!(step = %wizard.current_step_id().await, "Design saved");

    // Tickets are not sold after all
    accepted(
        wizard.edit(DraftPatch::new().monetization(Monetization::Free)).await?,
        "switching to free",
    )?;
    info!(
        step = %wizard.current_step_id().await,
        percentage = wizard.completion_percentage().await,
        "Switched to a free event"
    );

    let capacity = DraftPatch::new().capacity(Some(80)).waitlist(true, Some(20));
    accepted(wizard.save(capacity).await?, "saving capacity")?;
    for step in wizard.topology().await.iter().filter(|step| step.is_sub_step()) {
        accepted(wizard.mark_complete(step).await?, "marking a sub-step complete")?;
    }

    accepted(wizard.jump_to(StepId::LAUNCH).await?, "jumping to launch")?;
    info!(percentage = wizard.completion_percentage().await, "Ready to launch");

    accepted(wizard.finish().await?, "finishing")?;
    let draft = wizard.draft().await;
    info!(
        draft_id = ?draft.id,
        status = draft.status.as_str(),
        percentage = wizard.completion_percentage().await,
        "Wizard finished"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use event_wizard::RejectReason;
    use event_wizard_core::draft::EventStatus;
    use event_wizard_testing::test_clock;

    fn in_memory_wizard() -> WizardController {
        let repository = DraftRepository::new(
            Arc::new(InMemoryDraftStore::new()),
            Arc::new(InMemoryDraftCache::new()),
            Arc::new(test_clock()),
        );
        WizardController::new_draft(WizardEnvironment::new(repository), OwnerId::generate())
    }

    #[tokio::test]
    async fn test_walkthrough_publishes_the_event() {
        let wizard = in_memory_wizard();

        walkthrough(&wizard).await.unwrap();

        let draft = wizard.draft().await;
        assert_eq!(draft.status, EventStatus::Published);
        assert_eq!(wizard.current_step_id().await, StepId::LAUNCH);
        assert_eq!(wizard.completion_percentage().await, 100);
    }

    #[tokio::test]
    async fn test_refused_command_stops_the_script() {
        let wizard = in_memory_wizard();

        // Nothing named or scheduled yet
        let error = accepted(wizard.next().await.unwrap(), "leaving basics").unwrap_err();

        assert!(error.to_string().starts_with("leaving basics was refused"));
        assert_eq!(wizard.current_step_id().await, StepId::BASICS);
        assert!(accepted(Transition::Rejected(RejectReason::AtBoundary), "backing up").is_err());
        assert!(accepted(Transition::Accepted, "anything").is_ok());
    }
}
