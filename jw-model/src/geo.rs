//! Point-geometry text parsing.
//!
//! The server describes zone locations as `POINT(<lon> <lat>)` in WGS84.
//! Parsing is a deliberate pattern match over that one shape, with no
//! grammar and no polygon support. Anything that does not match yields
//! `None` and the zone is silently omitted from map rendering.

/// A WGS84 map coordinate.
///
/// Note the field order: geometry text carries longitude first, but map
/// rendering wants latitude first, so this struct names both explicitly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Parse `POINT(<lon> <lat>)` text into a [`GeoPoint`].
///
/// Whitespace between `POINT` and the opening parenthesis is tolerated, as
/// is extra whitespace around the coordinates. Exactly two finite numeric
/// fields are required; everything else is rejected.
pub fn parse_point_text(text: &str) -> Option<GeoPoint> {
    let rest = text.trim().strip_prefix("POINT")?;
    let inner = rest.trim_start().strip_prefix('(')?.strip_suffix(')')?;
    let mut fields = inner.split_whitespace();
    let lon: f64 = fields.next()?.parse().ok()?;
    let lat: f64 = fields.next()?.parse().ok()?;
    if fields.next().is_some() || !lon.is_finite() || !lat.is_finite() {
        return None;
    }
    Some(GeoPoint { lat, lon })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_point() {
        let point = parse_point_text("POINT(121.4 35.6)").unwrap();
        assert_eq!(point.lat, 35.6);
        assert_eq!(point.lon, 121.4);
    }

    #[test]
    fn parses_point_with_loose_whitespace() {
        let point = parse_point_text("  POINT (119.5   38.2)  ").unwrap();
        assert_eq!(point.lat, 38.2);
        assert_eq!(point.lon, 119.5);
    }

    #[test]
    fn rejects_non_point_text() {
        assert_eq!(parse_point_text("not a point"), None);
        assert_eq!(parse_point_text(""), None);
        assert_eq!(parse_point_text("POINT()"), None);
        assert_eq!(parse_point_text("POINT(121.4)"), None);
        assert_eq!(parse_point_text("POINT(121.4 35.6 7.0)"), None);
        assert_eq!(parse_point_text("POLYGON((0 0, 1 1))"), None);
    }

    #[test]
    fn rejects_non_numeric_coordinates() {
        assert_eq!(parse_point_text("POINT(east north)"), None);
        assert_eq!(parse_point_text("POINT(121.4 nope)"), None);
        assert_eq!(parse_point_text("POINT(NaN 35.6)"), None);
        assert_eq!(parse_point_text("POINT(inf 35.6)"), None);
    }
}
