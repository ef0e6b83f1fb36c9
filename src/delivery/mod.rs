//! Delivery eligibility check
//!
//! Decides whether a seller delivers to a buyer, comparing the buyer's
//! declared location against the seller's declared service area. The same
//! function backs both the order-creation path (authoritative) and the
//! client pre-check endpoint.
//!
//! Matching is intentionally permissive: the buyer location matches if it
//! contains any service-area token as a substring, so "6th of October, Giza
//! Governate" is eligible for a service area of "Cairo, Giza".

use thiserror::Error;

/// Why a delivery check failed
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// Buyer has no governate and no address on file. Blocks order creation.
    #[error("buyer has no location on file")]
    MissingLocation,

    /// Seller declared a service area and the buyer's location matched none
    /// of its entries.
    #[error("buyer location outside seller service area: {service_area}")]
    OutsideServiceArea { service_area: String },
}

/// Check whether a seller delivers to a buyer.
///
/// - `buyer_location`: the buyer's governate if set, otherwise their street
///   address (caller resolves that preference, see [`resolve_buyer_location`]).
/// - `service_area`: the seller's comma-separated area list. `None` or a
///   blank string means the seller ships everywhere.
pub fn check_delivery(
    buyer_location: Option<&str>,
    service_area: Option<&str>,
) -> Result<(), DeliveryError> {
    let location = match buyer_location {
        Some(l) if !l.trim().is_empty() => l.trim().to_lowercase(),
        _ => return Err(DeliveryError::MissingLocation),
    };

    let area = match service_area {
        Some(a) if !a.trim().is_empty() => a,
        // No service area declared: global delivery (default-open)
        _ => return Ok(()),
    };

    let eligible = area
        .split(',')
        .map(|token| token.trim().to_lowercase())
        .filter(|token| !token.is_empty())
        .any(|token| location.contains(&token));

    if eligible {
        Ok(())
    } else {
        Err(DeliveryError::OutsideServiceArea {
            service_area: area.trim().to_string(),
        })
    }
}

/// Pick the buyer's effective location: governate preferred, address fallback.
pub fn resolve_buyer_location<'a>(
    governate: Option<&'a str>,
    address: Option<&'a str>,
) -> Option<&'a str> {
    governate
        .filter(|g| !g.trim().is_empty())
        .or(address.filter(|a| !a.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_service_area_delivers_everywhere() {
        assert!(check_delivery(Some("Alexandria"), None).is_ok());
        assert!(check_delivery(Some("Alexandria"), Some("")).is_ok());
        assert!(check_delivery(Some("Alexandria"), Some("   ")).is_ok());
    }

    #[test]
    fn substring_match_is_case_insensitive() {
        // "giza" token matches inside the longer buyer location
        assert!(check_delivery(
            Some("6th of October, Giza Governate"),
            Some("Cairo, Giza")
        )
        .is_ok());
        assert!(check_delivery(Some("GIZA"), Some("giza")).is_ok());
    }

    #[test]
    fn location_outside_area_is_rejected() {
        let err = check_delivery(Some("Alexandria"), Some("Cairo, Giza")).unwrap_err();
        assert_eq!(
            err,
            DeliveryError::OutsideServiceArea {
                service_area: "Cairo, Giza".to_string()
            }
        );
    }

    #[test]
    fn missing_location_blocks_check() {
        assert_eq!(
            check_delivery(None, Some("Cairo")),
            Err(DeliveryError::MissingLocation)
        );
        assert_eq!(
            check_delivery(Some("  "), Some("Cairo")),
            Err(DeliveryError::MissingLocation)
        );
        // Even for sellers who ship everywhere: no location, no order
        assert_eq!(check_delivery(None, None), Err(DeliveryError::MissingLocation));
    }

    #[test]
    fn tokens_are_trimmed() {
        assert!(check_delivery(Some("Nasr City, Cairo"), Some(" Giza ,  Cairo ")).is_ok());
    }

    #[test]
    fn resolve_prefers_governate() {
        assert_eq!(
            resolve_buyer_location(Some("Giza"), Some("Street 9, Maadi")),
            Some("Giza")
        );
        assert_eq!(
            resolve_buyer_location(None, Some("Street 9, Maadi")),
            Some("Street 9, Maadi")
        );
        assert_eq!(resolve_buyer_location(Some(" "), None), None);
    }
}
