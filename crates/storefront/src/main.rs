//! `storefront` - demo runner for the storefront inbox and location flows.
//!
//! Seeds an inbox, prints its dated sections, then walks through the
//! location permission prompt against a simulated platform.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

use std::sync::Arc;

use anyhow::Context;
use chrono::{Datelike, Duration, Local, Utc};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_core::{
    AppConfig, AppEvent, AuthorizationStatus, EventBus, InMemoryLocationServices, InboxItem,
    InboxItemId, InboxStore, InboxViewModel, LocationController, LocationFix, LocationToggle,
    NotificationPayload, SimulatedPlatform,
};

const DEFAULT_LOG_FILTER: &str = "storefront=debug,storefront_core=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load_from(&path)
            .await
            .with_context(|| format!("failed to load config from {path}"))?,
        None => AppConfig::load().await.context("failed to load config")?,
    };

    // Initialize logging
    let default_filter = config
        .log_filter
        .clone()
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting storefront demo against {}",
        config.environment.base_url()
    );

    run_inbox_demo()?;
    run_location_demo(&config).await?;

    Ok(())
}

/// Builds a demo notification.
fn sample_item(id: &str, days_ago: i64, title: &str) -> InboxItem {
    InboxItem::new(
        id,
        Utc::now() - Duration::days(days_ago),
        NotificationPayload {
            id: format!("notification-{id}"),
            kind: "re.notifica.notification.Alert".to_string(),
            title: Some(title.to_string()),
            message: format!("{title} - tap to open"),
        },
    )
}

fn print_sections(model: &InboxViewModel) {
    if model.is_empty() {
        println!("Inbox is empty.");
        return;
    }

    let current_year = Local::now().year();
    for section in model.sections() {
        println!("{}", section.group.title(current_year));
        for item in &section.items {
            let marker = if item.opened { ' ' } else { '*' };
            println!("  {marker} {}", item.notification.display_title());
        }
    }
}

fn run_inbox_demo() -> anyhow::Result<()> {
    let bus = EventBus::new();
    let mut events = bus.subscribe();
    bus.publish(AppEvent::Launched);
    let mut store = InboxStore::new(bus);

    for item in [
        sample_item("welcome", 0, "Welcome to the store"),
        sample_item("order", 1, "Your order has shipped"),
        sample_item("sale", 4, "Weekend sale starts now"),
        sample_item("survey", 25, "Tell us how we did"),
        sample_item("loyalty", 70, "Your loyalty card is ready"),
        sample_item("launch", 400, "We are open"),
    ] {
        store.insert(item);
    }

    let mut model = InboxViewModel::new(&store.items());
    print_sections(&model);

    store
        .mark_as_read(&InboxItemId::new("order"))
        .context("failed to mark demo item as read")?;
    store
        .remove(&InboxItemId::new("launch"))
        .context("failed to remove demo item")?;

    while let Ok(event) = events.try_recv() {
        match &event {
            AppEvent::Launched => info!("Inbox ready"),
            AppEvent::BadgeUpdated(badge) => info!("Unread items: {}", badge),
            _ => {}
        }
        model.handle_event(&event);
    }

    println!();
    print_sections(&model);
    Ok(())
}

async fn run_location_demo(config: &AppConfig) -> anyhow::Result<()> {
    let platform = Arc::new(SimulatedPlatform::new(AuthorizationStatus::NotDetermined));
    let services = Arc::new(InMemoryLocationServices::new());
    let controller = Arc::new(LocationController::new(
        platform.clone(),
        services.clone(),
        config.location.request_always_authorization,
    ));

    let mut capabilities = controller.subscribe_capabilities();
    let listener = controller.clone().listen(platform.subscribe());

    let mut toggle = LocationToggle::new(controller.clone()).await;
    let result = toggle.set_enabled(true).await;
    info!("Location permission request finished: {:?}", result);

    capabilities
        .recv()
        .await
        .context("location controller stopped")?;
    toggle.refresh().await;

    services.record_fix(LocationFix {
        latitude: 41.1579,
        longitude: -8.6291,
    });

    println!();
    println!("Location enabled: {}", toggle.is_enabled());
    println!("Geofencing: {}", controller.has_geofencing_capabilities());
    if let Some(fix) = services.last_fix() {
        println!("Last fix: {:.4}, {:.4}", fix.latitude, fix.longitude);
    }
    if toggle.showing_settings_permission_dialog() {
        println!("Open the system settings to change location access.");
    }

    listener.abort();
    Ok(())
}
