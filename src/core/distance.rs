//! Geodesic distance between two points on the WGS-84 ellipsoid
//!
//! Uses Vincenty's inverse formula. For nearly antipodal points the
//! iteration can fail to converge; those fall back to a great-circle
//! distance on the mean-radius sphere.

use tracing::debug;

use super::types::GeoPoint;

// =============================================================================
// WGS-84 CONSTANTS
// =============================================================================

/// Semi-major axis (meters)
const WGS84_A: f64 = 6_378_137.0;
/// Flattening
const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// Semi-minor axis (meters)
const WGS84_B: f64 = (1.0 - WGS84_F) * WGS84_A;
/// Mean Earth radius (meters), used by the spherical fallback
const MEAN_RADIUS: f64 = 6_371_008.8;

const MAX_ITERATIONS: usize = 200;
const CONVERGENCE_THRESHOLD: f64 = 1e-12;

// =============================================================================
// DISTANCE
// =============================================================================

/// Distance in meters from `origin` to `point`
pub fn distance(origin: GeoPoint, point: GeoPoint) -> f64 {
    let meters = vincenty(origin, point).unwrap_or_else(|| {
        debug!(%origin, %point, "[distance] Vincenty did not converge, using great circle");
        great_circle(origin, point)
    });
    debug!("Distance is {}m.", meters as i64);
    meters
}

/// Vincenty inverse solution. `None` when the iteration does not converge.
fn vincenty(p1: GeoPoint, p2: GeoPoint) -> Option<f64> {
    let l = (p2.lng - p1.lng).to_radians();
    let u1 = ((1.0 - WGS84_F) * p1.lat.to_radians().tan()).atan();
    let u2 = ((1.0 - WGS84_F) * p2.lat.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    for _ in 0..MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();
        if sin_sigma == 0.0 {
            // Coincident points
            return Some(0.0);
        }

        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        // Equatorial line: cos_sq_alpha = 0
        let cos_2sigma_m = if cos_sq_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        } else {
            0.0
        };

        let c = WGS84_F / 16.0 * cos_sq_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos_sq_alpha));
        let lambda_prev = lambda;
        lambda = l
            + (1.0 - c)
                * WGS84_F
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));

        if (lambda - lambda_prev).abs() < CONVERGENCE_THRESHOLD {
            let u_sq = cos_sq_alpha * (WGS84_A.powi(2) - WGS84_B.powi(2)) / WGS84_B.powi(2);
            let a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
            let b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
            let delta_sigma = b
                * sin_sigma
                * (cos_2sigma_m
                    + b / 4.0
                        * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))
                            - b / 6.0
                                * cos_2sigma_m
                                * (-3.0 + 4.0 * sin_sigma.powi(2))
                                * (-3.0 + 4.0 * cos_2sigma_m.powi(2))));
            let meters = WGS84_B * a * (sigma - delta_sigma);
            return meters.is_finite().then_some(meters);
        }
    }

    None
}

/// Haversine distance on a sphere of mean Earth radius
fn great_circle(p1: GeoPoint, p2: GeoPoint) -> f64 {
    let d_lat = (p2.lat - p1.lat).to_radians();
    let d_lng = (p2.lng - p1.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + p1.lat.to_radians().cos() * p2.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * MEAN_RADIUS * h.sqrt().min(1.0).asin()
}
