use booknstay_booking::BookingForm;
use booknstay_catalog::search_hotels;
use booknstay_core::store::StoreError;
use booknstay_shared::models::{Booking, Hotel, PaymentMethod};

/// Bottom-navigation tabs on the home screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Home,
    History,
    Payment,
}

/// Everything the home screen renders from. Mutated only by `update`, so
/// the whole screen is testable without any rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct HomeModel {
    pub tab: Tab,
    /// The fetched popular-hotels mirror, replaced wholesale per snapshot.
    pub hotels: Vec<Hotel>,
    /// True until the first catalog delivery, update or error alike.
    pub loading: bool,
    pub destination: String,
    /// Some while a destination search is active; the shown list. Never
    /// replaces the fetched mirror.
    pub search_results: Option<Vec<Hotel>>,
    /// Only meaningful on the payment tab.
    pub selected: Option<Hotel>,
    pub form: BookingForm,
    pub bookings: Vec<Booking>,
    /// Transient toast text; the renderer takes it exactly once.
    pub notice: Option<String>,
}

impl HomeModel {
    pub fn new() -> Self {
        Self {
            tab: Tab::Home,
            hotels: Vec::new(),
            loading: true,
            destination: String::new(),
            search_results: None,
            selected: None,
            form: BookingForm::default(),
            bookings: Vec::new(),
            notice: None,
        }
    }

    /// The hotel list the home tab shows: search results while a search is
    /// active, the full mirror otherwise.
    pub fn shown_hotels(&self) -> &[Hotel] {
        self.search_results.as_deref().unwrap_or(&self.hotels)
    }

    pub fn is_searching(&self) -> bool {
        self.search_results.is_some()
    }

    /// Drains the pending toast, if any.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }
}

impl Default for HomeModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Every way the home screen can change: user intents plus backend
/// notifications, all funnelled through the one update function.
#[derive(Debug, Clone)]
pub enum HomeEvent {
    SelectTab(Tab),
    EditDestination(String),
    Search,
    SelectHotel(Hotel),
    EditCheckIn(String),
    EditCheckOut(String),
    EditGuests(String),
    ChoosePayment(PaymentMethod),
    Submit,
    BackToHome,
    Logout,

    CatalogUpdated(Vec<Hotel>),
    CatalogFailed(StoreError),
    BookingsUpdated(Vec<Booking>),
    BookingAccepted { booking_id: String },
    BookingRejected { reason: String },
}

/// Side effects the runtime performs after a transition. The reducer never
/// touches a backend itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateBooking { hotel: Hotel, form: BookingForm },
    SignOut,
}

/// The home-screen state machine. Exactly one event in, the new state in
/// place, and whatever side effects fall out.
pub fn update(model: &mut HomeModel, event: HomeEvent) -> Vec<Command> {
    match event {
        HomeEvent::SelectTab(tab) => {
            model.tab = tab;
            Vec::new()
        }

        HomeEvent::EditDestination(destination) => {
            if destination.trim().is_empty() {
                // Blank destination means unfiltered, immediately.
                model.search_results = None;
            }
            model.destination = destination;
            Vec::new()
        }

        HomeEvent::Search => {
            if model.destination.trim().is_empty() {
                model.notice = Some("Please enter a destination".to_string());
                model.search_results = None;
                return Vec::new();
            }
            let results = search_hotels(&model.hotels, &model.destination);
            model.notice = Some(if results.is_empty() {
                format!("No stays found for {}", model.destination)
            } else {
                format!(
                    "Found {} stays in/near {}",
                    results.len(),
                    model.destination
                )
            });
            model.search_results = Some(results);
            Vec::new()
        }

        HomeEvent::SelectHotel(hotel) => {
            model.selected = Some(hotel);
            model.form = BookingForm::default();
            model.tab = Tab::Payment;
            Vec::new()
        }

        HomeEvent::EditCheckIn(value) => {
            model.form.check_in = value;
            Vec::new()
        }

        HomeEvent::EditCheckOut(value) => {
            model.form.check_out = value;
            Vec::new()
        }

        HomeEvent::EditGuests(value) => {
            model.form.guests = value;
            Vec::new()
        }

        HomeEvent::ChoosePayment(method) => {
            model.form.payment_method = method;
            Vec::new()
        }

        HomeEvent::Submit => {
            let Some(hotel) = model.selected.clone() else {
                model.notice = Some("No hotel selected.".to_string());
                return Vec::new();
            };
            if model.form.has_blank_field() {
                model.notice = Some("Please fill all booking details".to_string());
                return Vec::new();
            }
            vec![Command::CreateBooking {
                hotel,
                form: model.form.clone(),
            }]
        }

        HomeEvent::BackToHome => {
            model.tab = Tab::Home;
            Vec::new()
        }

        HomeEvent::Logout => {
            // The screen dies with the session; state is fully discarded.
            *model = HomeModel::new();
            vec![Command::SignOut]
        }

        HomeEvent::CatalogUpdated(hotels) => {
            model.hotels = hotels;
            model.loading = false;
            if model.search_results.is_some() {
                // An active search keeps showing results, recomputed over
                // the fresh mirror.
                model.search_results =
                    Some(search_hotels(&model.hotels, &model.destination));
            }
            Vec::new()
        }

        HomeEvent::CatalogFailed(_) => {
            // Last-known list stays; only the spinner goes away.
            model.loading = false;
            Vec::new()
        }

        HomeEvent::BookingsUpdated(bookings) => {
            model.bookings = bookings;
            Vec::new()
        }

        HomeEvent::BookingAccepted { .. } => {
            model.notice = Some("Booking confirmed!".to_string());
            model.selected = None;
            model.form = BookingForm::default();
            model.tab = Tab::History;
            Vec::new()
        }

        HomeEvent::BookingRejected { reason } => {
            model.notice = Some(format!("Error: {}", reason));
            Vec::new()
        }
    }
}
