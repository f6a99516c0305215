use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use booknstay_booking::{BookingEvent, BookingStore};
use booknstay_catalog::{CatalogEvent, CatalogReader};
use booknstay_core::auth::AuthProvider;
use booknstay_core::store::{DocumentStore, StoreError};

use crate::controller::{update, Command, HomeEvent, HomeModel};

/// A mounted home screen: both live views open, one single-threaded event
/// loop owning the model. Everything remote arrives as an event on that
/// loop; nothing else ever touches the model.
pub struct HomeSession {
    intents: mpsc::UnboundedSender<HomeEvent>,
    model_rx: watch::Receiver<HomeModel>,
    handle: JoinHandle<()>,
}

impl HomeSession {
    /// Opens the catalog and booking-history subscriptions and starts the
    /// event loop. The subscriptions live until logout or `shutdown`.
    pub async fn mount(
        store: Arc<dyn DocumentStore>,
        auth: Arc<dyn AuthProvider>,
    ) -> Result<Self, StoreError> {
        let catalog = CatalogReader::open(store.as_ref()).await?;
        let bookings = BookingStore::open(store, auth.clone()).await?;

        let (intent_tx, intent_rx) = mpsc::unbounded_channel();
        let (model_tx, model_rx) = watch::channel(HomeModel::new());
        let handle = tokio::spawn(run_loop(catalog, bookings, auth, intent_rx, model_tx));

        info!("home screen mounted");
        Ok(Self {
            intents: intent_tx,
            model_rx,
            handle,
        })
    }

    /// Queues a user intent. False once the screen has been torn down.
    pub fn dispatch(&self, event: HomeEvent) -> bool {
        self.intents.send(event).is_ok()
    }

    /// Watch handle onto the current model, for rendering.
    pub fn model(&self) -> watch::Receiver<HomeModel> {
        self.model_rx.clone()
    }

    /// Tears the screen down: the loop drains, releases both
    /// subscriptions, and ends.
    pub async fn shutdown(self) {
        drop(self.intents);
        let _ = self.handle.await;
    }
}

async fn run_loop(
    mut catalog: CatalogReader,
    mut bookings: BookingStore,
    auth: Arc<dyn AuthProvider>,
    mut intents: mpsc::UnboundedReceiver<HomeEvent>,
    model_tx: watch::Sender<HomeModel>,
) {
    let mut model = HomeModel::new();
    let mut signing_out = false;

    loop {
        let event = tokio::select! {
            intent = intents.recv() => match intent {
                Some(event) => event,
                // Owner dropped the session handle.
                None => break,
            },
            Some(event) = catalog.next_event() => match event {
                CatalogEvent::Updated(hotels) => HomeEvent::CatalogUpdated(hotels),
                CatalogEvent::Failed(error) => HomeEvent::CatalogFailed(error),
            },
            Some(event) = bookings.next_event() => match event {
                BookingEvent::Updated(list) => HomeEvent::BookingsUpdated(list),
            },
        };

        let commands = update(&mut model, event);
        let _ = model_tx.send(model.clone());

        for command in commands {
            match command {
                Command::CreateBooking { hotel, form } => {
                    // One write, two terminal outcomes, no pending state.
                    let outcome = match bookings.create_booking(&hotel, &form).await {
                        Ok(booking_id) => HomeEvent::BookingAccepted { booking_id },
                        Err(error) => HomeEvent::BookingRejected {
                            reason: error.to_string(),
                        },
                    };
                    let follow_up = update(&mut model, outcome);
                    debug_assert!(follow_up.is_empty());
                    let _ = model_tx.send(model.clone());
                }
                Command::SignOut => {
                    signing_out = true;
                }
            }
        }

        if signing_out {
            break;
        }
    }

    // Teardown order matters: both live views go first, the session is
    // cleared only after the screen is gone.
    catalog.release();
    bookings.release();
    if signing_out {
        auth.sign_out();
    }
    debug!("home screen torn down");
}
