use booknstay_shared::models::Hotel;

/// Destination search over the already fetched list. Case-insensitive
/// substring match against city or hotel name; never issues a remote query.
/// A blank destination means "show the unfiltered list".
pub fn search_hotels(hotels: &[Hotel], destination: &str) -> Vec<Hotel> {
    let needle = destination.trim().to_lowercase();
    if needle.is_empty() {
        return hotels.to_vec();
    }

    hotels
        .iter()
        .filter(|hotel| {
            hotel.city.to_lowercase().contains(&needle)
                || hotel.name.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}
