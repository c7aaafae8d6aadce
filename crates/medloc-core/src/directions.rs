//! Links handed to external collaborators: the maps directions view and the
//! phone dialer. Nothing is consumed back from either.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::geo::Coordinate;

const MAPS_DIRECTIONS_BASE: &str = "https://www.google.com/maps/dir/?api=1";

fn encode_point(point: Coordinate) -> String {
    let raw = format!("{},{}", point.latitude(), point.longitude());
    utf8_percent_encode(&raw, NON_ALPHANUMERIC).to_string()
}

/// Build a directions URL to `destination`, optionally from `origin`.
///
/// Without an origin the maps service starts from the device's own location.
#[must_use]
pub fn directions_url(destination: Coordinate, origin: Option<Coordinate>) -> String {
    let mut url = format!(
        "{MAPS_DIRECTIONS_BASE}&destination={}",
        encode_point(destination)
    );
    if let Some(origin) = origin {
        url.push_str("&origin=");
        url.push_str(&encode_point(origin));
    }
    url
}

/// Build a `tel:` link from a free-form phone number, keeping digits and a
/// leading `+`. Returns `None` when no digits remain.
#[must_use]
pub fn tel_link(phone: &str) -> Option<String> {
    let trimmed = phone.trim();
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    let prefix = if trimmed.starts_with('+') { "+" } else { "" };
    Some(format!("tel:{prefix}{digits}"))
}
