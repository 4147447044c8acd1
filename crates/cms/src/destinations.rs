//! Location → destination-page slug mapping for the marketing site.
//!
//! Locations arrive as free text out of deal names ("Aspen, CO",
//! "cabo san lucas"); the marketing site keys destination pages by slug.
//! The table covers the spellings the booking desk actually produces.

/// Destination slug for a free-text location, if the location is mapped.
pub fn destination_slug(location: &str) -> Option<&'static str> {
    let normalized = location.to_lowercase();
    let slug = match normalized.trim() {
        "aspen" | "aspen, colorado" | "aspen, co" => "aspen-colorado",
        "los cabos" | "cabo" | "cabo san lucas" | "san jose del cabo" => {
            "mexico-los-cabos-luxury-rentals"
        }
        "jackson hole" | "jackson hole, wyoming" | "jackson hole, wy" => "jackson-hole-wyoming",
        "park city" | "park city, utah" | "park city, ut" => "park-city-utah",
        "scottsdale" | "scottsdale, arizona" | "scottsdale, az" => "scottsdale-arizona",
        "big sky" | "big sky, montana" | "big sky, mt" => "big-sky-montana",
        "lake tahoe" | "tahoe" => "lake-tahoe-california",
        "steamboat springs" | "steamboat" => "steamboat-springs-colorado",
        "telluride" | "telluride, colorado" => "telluride-colorado",
        "vail" | "vail, colorado" => "vail-colorado",
        "breckenridge" | "breckenridge, colorado" => "breckenridge-colorado",
        _ => return None,
    };
    Some(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_locations_map() {
        assert_eq!(destination_slug("Aspen"), Some("aspen-colorado"));
        assert_eq!(destination_slug("aspen, co"), Some("aspen-colorado"));
        assert_eq!(
            destination_slug("Cabo San Lucas"),
            Some("mexico-los-cabos-luxury-rentals")
        );
        assert_eq!(destination_slug("  Tahoe  "), Some("lake-tahoe-california"));
    }

    #[test]
    fn test_unknown_location_unmapped() {
        assert_eq!(destination_slug("Marrakech"), None);
        assert_eq!(destination_slug(""), None);
    }
}
