use booknstay_shared::models::{Booking, Hotel};

use crate::controller::{HomeModel, Tab};

/// Stateless text rendering of the controller state. Pure functions only;
/// a real front end would map the same model to widgets instead.

pub fn hotel_card(hotel: &Hotel) -> String {
    let place = if hotel.city.is_empty() {
        hotel.location.clone()
    } else if hotel.location.is_empty() {
        hotel.city.clone()
    } else {
        format!("{} • {}", hotel.city, hotel.location)
    };
    format!("{}\n  {}\n  {}", hotel.name, place, hotel.price)
}

pub fn booking_card(booking: &Booking) -> String {
    format!(
        "{}\n  {} • {} - {}\n  Guests: {}\n  {} • {}",
        booking.hotel_name,
        booking.city,
        booking.check_in,
        booking.check_out,
        booking.guests,
        booking.price,
        booking.payment_method
    )
}

pub fn render_home(model: &HomeModel) -> String {
    let mut out = String::from("BookNStay\nFind your perfect stay\n");
    out.push_str(if model.is_searching() {
        "Search results\n"
    } else {
        "Popular stays\n"
    });

    if model.loading {
        out.push_str("Loading…\n");
        return out;
    }

    let shown = model.shown_hotels();
    if shown.is_empty() {
        if model.is_searching() {
            out.push_str(&format!("No stays found for \"{}\".\n", model.destination));
        } else {
            out.push_str("No popular stays available.\n");
        }
        return out;
    }

    for hotel in shown {
        out.push_str(&hotel_card(hotel));
        out.push('\n');
    }
    out
}

pub fn render_history(model: &HomeModel) -> String {
    let mut out = String::from("Booking history\n");
    if model.bookings.is_empty() {
        out.push_str("No bookings yet.\n");
        return out;
    }
    for booking in &model.bookings {
        out.push_str(&booking_card(booking));
        out.push('\n');
    }
    out
}

pub fn render_payment(model: &HomeModel) -> String {
    let mut out = String::from("Payment\n");
    match &model.selected {
        None => {
            out.push_str("No hotel selected.\n");
        }
        Some(hotel) => {
            out.push_str(&hotel_card(hotel));
            out.push('\n');
            out.push_str(&format!(
                "Check-in: {}\nCheck-out: {}\nGuests: {}\nPayment method: {}\n",
                model.form.check_in,
                model.form.check_out,
                model.form.guests,
                model.form.payment_method
            ));
        }
    }
    out
}

/// The whole screen for the current tab.
pub fn render(model: &HomeModel) -> String {
    match model.tab {
        Tab::Home => render_home(model),
        Tab::History => render_history(model),
        Tab::Payment => render_payment(model),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booknstay_shared::models::PaymentMethod;

    fn hotel(city: &str, location: &str) -> Hotel {
        Hotel {
            id: "h1".to_string(),
            name: "City Hotel".to_string(),
            location: location.to_string(),
            price: "£100".to_string(),
            city: city.to_string(),
        }
    }

    #[test]
    fn hotel_card_joins_city_and_location() {
        assert!(hotel_card(&hotel("London", "Soho")).contains("London • Soho"));
        assert!(hotel_card(&hotel("", "Soho")).contains("\n  Soho\n"));
        assert!(hotel_card(&hotel("London", "")).contains("\n  London\n"));
    }

    #[test]
    fn home_shows_loading_until_first_snapshot() {
        let model = HomeModel::new();
        assert!(render_home(&model).contains("Loading…"));
    }

    #[test]
    fn empty_search_and_empty_catalog_read_differently() {
        let mut model = HomeModel::new();
        model.loading = false;
        assert!(render_home(&model).contains("No popular stays available."));

        model.destination = "zzz".to_string();
        model.search_results = Some(Vec::new());
        assert!(render_home(&model).contains("No stays found for \"zzz\"."));
        assert!(render_home(&model).contains("Search results"));
    }

    #[test]
    fn payment_without_selection_prompts_back_home() {
        let mut model = HomeModel::new();
        model.tab = Tab::Payment;
        assert!(render(&model).contains("No hotel selected."));
    }

    #[test]
    fn booking_card_shows_the_snapshot_fields() {
        let booking = Booking {
            id: "b1".to_string(),
            user_id: "u1".to_string(),
            hotel_id: "h1".to_string(),
            hotel_name: "City Hotel".to_string(),
            city: "London".to_string(),
            check_in: "01/03".to_string(),
            check_out: "05/03".to_string(),
            guests: "2 adults".to_string(),
            price: "£100".to_string(),
            payment_method: PaymentMethod::Cash,
            created_at: None,
        };
        let card = booking_card(&booking);
        assert!(card.contains("London • 01/03 - 05/03"));
        assert!(card.contains("£100 • Cash"));
    }
}
