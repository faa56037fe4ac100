//! QR symbols for the listing link and the map directions.

use image::{GrayImage, Luma};
use qrcode::{EcLevel, QrCode};
use reqwest::Url;

use crate::error::{ReportError, ReportResult};

/// A rendered 2D barcode, ready to be placed on the canvas.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub payload: String,
    pub level: EcLevel,
    pub image: GrayImage,
}

/// Encode `payload` as a QR symbol at the given error-correction level.
///
/// `what` names the symbol in error messages.
pub fn generate_symbol(what: &'static str, payload: &str, level: EcLevel) -> ReportResult<Symbol> {
    if payload.is_empty() {
        return Err(ReportError::SymbolGeneration {
            what,
            reason: "empty payload".to_string(),
        });
    }
    let code = QrCode::with_error_correction_level(payload.as_bytes(), level).map_err(|e| {
        ReportError::SymbolGeneration {
            what,
            reason: e.to_string(),
        }
    })?;
    let image = code.render::<Luma<u8>>().build();
    log::debug!(
        "Generated {} symbol ({:?}, {}x{} px)",
        what,
        level,
        image.width(),
        image.height()
    );
    Ok(Symbol {
        payload: payload.to_string(),
        level,
        image,
    })
}

/// Directions link for `address`, rooted at `map_base`.
pub fn map_directions_url(map_base: &str, address: Option<&str>) -> ReportResult<String> {
    let url = Url::parse_with_params(
        map_base,
        &[("api", "1"), ("destination", address.unwrap_or_default())],
    )
    .map_err(|e| ReportError::SymbolGeneration {
        what: "map",
        reason: format!("bad map link base {:?}: {}", map_base, e),
    })?;
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_is_refused() {
        let err = generate_symbol("listing", "", EcLevel::M).unwrap_err();
        assert!(matches!(err, ReportError::SymbolGeneration { what: "listing", .. }));
    }

    #[test]
    fn symbol_is_square_with_requested_level() {
        let symbol = generate_symbol("listing", "https://www.google.com", EcLevel::M).unwrap();
        assert_eq!(symbol.level, EcLevel::M);
        assert_eq!(symbol.image.width(), symbol.image.height());
        assert!(symbol.image.width() > 21);
    }

    #[test]
    fn oversized_payload_fails() {
        let payload = "x".repeat(8000);
        assert!(generate_symbol("map", &payload, EcLevel::H).is_err());
    }

    #[test]
    fn directions_link_encodes_address() {
        let url = map_directions_url(
            "https://www.google.com/maps/dir/",
            Some("12 Elm St, Springfield"),
        )
        .unwrap();
        assert_eq!(
            url,
            "https://www.google.com/maps/dir/?api=1&destination=12+Elm+St%2C+Springfield"
        );
    }

    #[test]
    fn directions_link_without_address_is_still_valid() {
        let url = map_directions_url("https://www.google.com/maps/dir/", None).unwrap();
        assert!(url.ends_with("?api=1&destination="));
    }

    #[test]
    fn bad_map_base_is_a_symbol_failure() {
        assert!(matches!(
            map_directions_url("not a url", Some("x")),
            Err(ReportError::SymbolGeneration { what: "map", .. })
        ));
    }
}
