//! Oremarket Demo
//!
//! Bootstraps an in-memory marketplace and walks the full flow: an admin
//! clears a miner and a buyer, the miner lists copper, the buyer offers,
//! the miner accepts, the buyer pays. Run with `RUST_LOG=info` (or
//! `debug` to watch the store-level status swaps).

use std::sync::Arc;

use chrono::Utc;
use rust_decimal_macros::dec;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oremarket_market::StaticGateway;
use oremarket_service::{MarketConfig, MarketplaceService};
use oremarket_store::{MemoryStore, UserStore};
use oremarket_types::{
    ComplianceStatus, Currency, ListingDraft, NewUser, Role, User, UserId,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Oremarket demo...");

    let store = Arc::new(MemoryStore::new());

    // Admins are provisioned out of band, not through registration
    let admin = store
        .put_user(User {
            id: UserId::new(),
            first_name: "Naledi".to_string(),
            last_name: "Kgosi".to_string(),
            email: "naledi@oremarket.example".to_string(),
            role: Role::Admin,
            compliance_status: ComplianceStatus::Compliant,
            email_verified: true,
            company_name: None,
            phone_number: None,
            location: None,
            member_since: Utc::now(),
        })
        .await?;

    let service = MarketplaceService::new(
        store,
        Arc::new(StaticGateway::accepting()),
        MarketConfig::from_env(),
    );

    // Register participants; both start compliance-pending
    let miner = service
        .register_user(NewUser {
            first_name: "Kefilwe".to_string(),
            last_name: "Dube".to_string(),
            email: "kefilwe@dubemining.example".to_string(),
            role: Role::Miner,
            company_name: Some("Dube Mining".to_string()),
            location: Some("Gaborone".to_string()),
        })
        .await?;
    let buyer = service
        .register_user(NewUser {
            first_name: "Ada".to_string(),
            last_name: "Obi".to_string(),
            email: "ada@smelters.example".to_string(),
            role: Role::Buyer,
            company_name: Some("Obi Smelters".to_string()),
            location: Some("Lagos".to_string()),
        })
        .await?;

    // A pending miner cannot list yet
    if let Err(err) = service
        .create_listing(
            &miner.id,
            ListingDraft {
                mineral_type: "copper".to_string(),
                description: "Grade A cathodes".to_string(),
                quantity: dec!(500),
                unit: "t".to_string(),
                price_per_unit: dec!(10),
                currency: Currency::USD,
                location: "Ndola".to_string(),
            },
        )
        .await
    {
        tracing::info!(code = err.error_code(), "listing blocked as expected: {err}");
    }

    // Admin clears both participants
    service
        .set_compliance_status(&admin.id, &miner.id, ComplianceStatus::Compliant)
        .await?;
    service
        .set_compliance_status(&admin.id, &buyer.id, ComplianceStatus::Compliant)
        .await?;

    // Miner lists, buyer offers, miner accepts, buyer pays
    let listing = service
        .create_listing(
            &miner.id,
            ListingDraft {
                mineral_type: "copper".to_string(),
                description: "Grade A cathodes".to_string(),
                quantity: dec!(500),
                unit: "t".to_string(),
                price_per_unit: dec!(10),
                currency: Currency::USD,
                location: "Ndola".to_string(),
            },
        )
        .await?;
    tracing::info!(listing = %listing.id, status = %listing.status, "listing live");

    let offer = service
        .submit_offer(
            &buyer.id,
            &listing.id,
            dec!(9.25),
            dec!(100),
            Some("FOB Ndola, 30-day terms".to_string()),
        )
        .await?;
    tracing::info!(offer = %offer.id, total = %offer.total(), "offer in");

    service.accept_offer(&miner.id, &offer.id).await?;
    let settlement = service.complete_offer(&buyer.id, &offer.id).await?;

    tracing::info!(
        transaction = %settlement.transaction.id,
        total = %settlement.transaction.total(),
        currency = %settlement.transaction.currency,
        payment_ref = settlement.transaction.payment_ref.as_deref().unwrap_or("-"),
        "settled"
    );

    let sold = service.get_listing(&listing.id).await?;
    tracing::info!(listing = %sold.id, status = %sold.status, "final listing state");

    Ok(())
}
