use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use booknstay_app::controller::{HomeEvent, Tab};
use booknstay_app::route::{route, Route, RouteEvent};
use booknstay_app::runtime::HomeSession;
use booknstay_app::session::SessionGateway;
use booknstay_app::view;
use booknstay_core::store::DocumentStore;
use booknstay_core::AuthProvider;
use booknstay_shared::models::PaymentMethod;
use booknstay_store::{app_config::Config, MemoryAuth, MemoryBackend};

/// Scripted walk through the whole flow against the in-memory backend:
/// splash → login → search → select → pay → history → logout.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log.filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(project = %config.backend.project_id, "starting BookNStay demo");

    let backend = Arc::new(MemoryBackend::new());
    let auth = Arc::new(MemoryAuth::new());
    seed_hotels(backend.as_ref()).await?;
    auth.register("Ada Guest", "ada@example.com", "hunter2");

    // Splash: observe the session once and route.
    let gateway = SessionGateway::new(auth.clone());
    let mut screen = route(
        Route::Splash,
        RouteEvent::SplashFinished {
            signed_in: gateway.current_user().is_some(),
        },
    );
    println!("== {:?}", screen);

    let user = gateway.sign_in("ada@example.com", "hunter2").await?;
    screen = route(screen, RouteEvent::SignedIn);
    if let Some(name) = auth.display_name(&user) {
        println!("Welcome back, {}", name);
    }
    println!("== {:?}", screen);

    let session = HomeSession::mount(backend.clone(), auth.clone()).await?;
    let mut model = session.model();

    // First catalog snapshot.
    model.wait_for(|m| !m.loading).await?;
    println!("{}", view::render(&model.borrow()));

    // Destination search.
    session.dispatch(HomeEvent::EditDestination("paris".to_string()));
    session.dispatch(HomeEvent::Search);
    model.wait_for(|m| m.is_searching()).await?;
    print_notice(&session);
    println!("{}", view::render(&model.borrow()));

    // Pick the first result and pay.
    let picked = model
        .borrow()
        .shown_hotels()
        .first()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("no stays to pick"))?;
    session.dispatch(HomeEvent::SelectHotel(picked));
    session.dispatch(HomeEvent::EditCheckIn("01/03/2026".to_string()));
    session.dispatch(HomeEvent::EditCheckOut("05/03/2026".to_string()));
    session.dispatch(HomeEvent::EditGuests("2 adults, 1 room".to_string()));
    session.dispatch(HomeEvent::ChoosePayment(PaymentMethod::Card));
    model.wait_for(|m| m.tab == Tab::Payment && !m.form.guests.is_empty()).await?;
    println!("{}", view::render(&model.borrow()));

    session.dispatch(HomeEvent::Submit);
    model.wait_for(|m| m.tab == Tab::History).await?;
    print_notice(&session);
    model.wait_for(|m| !m.bookings.is_empty()).await?;
    println!("{}", view::render(&model.borrow()));

    // Logout tears the screen down and clears the session.
    session.dispatch(HomeEvent::Logout);
    session.shutdown().await;
    screen = route(screen, RouteEvent::SignedOut);
    println!("== {:?}", screen);
    tracing::info!(
        live_subscriptions = backend.live_subscriptions().await,
        signed_in = auth.current_user().is_some(),
        "demo finished"
    );

    Ok(())
}

fn print_notice(session: &HomeSession) {
    if let Some(notice) = session.model().borrow().notice.clone() {
        println!("[toast] {}", notice);
    }
}

async fn seed_hotels(backend: &MemoryBackend) -> anyhow::Result<()> {
    let hotels = [
        json!({ "name": "City Hotel", "location": "Soho", "price": "£120/night", "city": "London", "rating": 4.7 }),
        json!({ "name": "Grand Stay", "location": "Rive Gauche", "price": "€150/night", "city": "Paris", "rating": 4.9 }),
        json!({ "name": "Harbor Inn", "location": "Aker Brygge", "price": "kr 1200/night", "city": "Oslo", "rating": 4.2 }),
        // Malformed on purpose: no name, so the catalog must drop it.
        json!({ "location": "Nowhere", "city": "Atlantis", "rating": 5.0 }),
    ];
    for fields in hotels {
        backend.append("hotels", as_map(fields)?).await?;
    }
    Ok(())
}

fn as_map(value: Value) -> anyhow::Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("expected a JSON object, got {}", other),
    }
}
