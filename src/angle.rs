//! Angle arithmetic in degrees. Every heading in the crate goes through here so
//! that wrap-around at 0°/360° is handled in exactly one place.

/// Normalize an angle to [0, 360).
pub fn normalize(degrees: f64) -> f64 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if normalized >= 360.0 { 0.0 } else { normalized }
}

/// Shortest signed rotation from `from` to `to`, in (-180, 180].
pub fn signed_difference(to: f64, from: f64) -> f64 {
    let diff = (to - from).rem_euclid(360.0);
    if diff > 180.0 { diff - 360.0 } else { diff }
}

/// Circular mean of a set of headings: the direction of the sum of their unit vectors.
/// Returns None when there is nothing to average or the vectors cancel out.
pub fn circular_mean(headings: &[f64]) -> Option<f64> {
    if headings.is_empty() {
        return None;
    }

    let (sin_sum, cos_sum) = headings.iter().fold((0.0, 0.0), |(s, c), h| {
        let rad = h.to_radians();
        (s + rad.sin(), c + rad.cos())
    });

    if sin_sum.abs() < 1e-12 && cos_sum.abs() < 1e-12 {
        return None;
    }

    Some(normalize(sin_sum.atan2(cos_sum).to_degrees()))
}

/// 8-point compass abbreviation for a heading (N, NE, E, ...).
pub fn compass_point(heading: f64) -> &'static str {
    const POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    // each point covers 45 degrees, centered on its heading
    let index = ((normalize(heading) + 22.5) / 45.0) as usize % 8;
    POINTS[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(370.0), 10.0);
        assert_eq!(normalize(-10.0), 350.0);
        assert_eq!(normalize(360.0), 0.0);
        assert_eq!(normalize(-1e-15), 0.0);
        assert_eq!(normalize(720.5), 0.5);
    }

    #[test]
    fn test_signed_difference() {
        assert_eq!(signed_difference(10.0, 350.0), 20.0);
        assert_eq!(signed_difference(350.0, 10.0), -20.0);
        assert_eq!(signed_difference(90.0, 85.0), 5.0);
        // exactly opposite resolves to +180, never -180
        assert_eq!(signed_difference(180.0, 0.0), 180.0);
        assert_eq!(signed_difference(0.0, 180.0), 180.0);
    }

    #[test]
    fn test_circular_mean_wraparound() {
        let mean = circular_mean(&[10.0, 350.0]).unwrap();
        assert!(signed_difference(mean, 0.0).abs() < 1e-9, "mean was {}", mean);

        let mean = circular_mean(&[80.0, 100.0]).unwrap();
        assert!((mean - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_circular_mean_degenerate() {
        assert!(circular_mean(&[]).is_none());
        assert!(circular_mean(&[0.0, 180.0]).is_none());
    }

    #[test]
    fn test_compass_point() {
        assert_eq!(compass_point(0.0), "N");
        assert_eq!(compass_point(22.4), "N");
        assert_eq!(compass_point(22.5), "NE");
        assert_eq!(compass_point(90.0), "E");
        assert_eq!(compass_point(200.0), "S");
        assert_eq!(compass_point(350.0), "N");
        assert_eq!(compass_point(-45.0), "NW");
    }
}
