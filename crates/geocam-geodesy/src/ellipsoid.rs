//! WGS84 ellipsoid and Earth-centred, Earth-fixed (ECEF) conversions.
//!
//! NAD83 uses the GRS80 ellipsoid, which differs from WGS84 by well under a
//! millimetre at the surface; both are served by the constants below.

/// Semi-major axis in meters.
pub const WGS84_A: f64 = 6_378_137.0;

/// Flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// First eccentricity squared.
pub const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);

/// Iterations used by [`ecef_to_geodetic`]. Converges to well below a
/// nanometre for points near the surface.
const GEODETIC_ITERATIONS: usize = 6;

/// Convert geodetic coordinates (degrees, meters) to ECEF meters.
pub fn geodetic_to_ecef(lat_deg: f64, lon_deg: f64, height: f64) -> [f64; 3] {
    let (sin_lat, cos_lat) = lat_deg.to_radians().sin_cos();
    let (sin_lon, cos_lon) = lon_deg.to_radians().sin_cos();

    let n = prime_vertical_radius(sin_lat);

    [
        (n + height) * cos_lat * cos_lon,
        (n + height) * cos_lat * sin_lon,
        (n * (1.0 - WGS84_E2) + height) * sin_lat,
    ]
}

/// Convert ECEF meters to geodetic `(lat_deg, lon_deg, height)`.
pub fn ecef_to_geodetic(ecef: [f64; 3]) -> (f64, f64, f64) {
    let [x, y, z] = ecef;
    let p = x.hypot(y);
    let lon = y.atan2(x);

    let mut lat = z.atan2(p * (1.0 - WGS84_E2));
    let mut height = 0.0;
    for _ in 0..GEODETIC_ITERATIONS {
        let (sin_lat, cos_lat) = lat.sin_cos();
        let n = prime_vertical_radius(sin_lat);
        height = if cos_lat.abs() > 1e-12 {
            p / cos_lat - n
        } else {
            z.abs() - n * (1.0 - WGS84_E2)
        };
        lat = z.atan2(p * (1.0 - WGS84_E2 * n / (n + height)));
    }

    (lat.to_degrees(), lon.to_degrees(), height)
}

/// Radius of curvature in the prime vertical.
fn prime_vertical_radius(sin_lat: f64) -> f64 {
    WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt()
}

/// Rotation from ECEF deltas to East-North-Up at a geodetic origin.
///
/// Rows are the East, North and Up unit vectors expressed in ECEF.
pub fn ecef_to_enu_rotation(lat_deg: f64, lon_deg: f64) -> [[f64; 3]; 3] {
    let (sin_lat, cos_lat) = lat_deg.to_radians().sin_cos();
    let (sin_lon, cos_lon) = lon_deg.to_radians().sin_cos();

    [
        [-sin_lon, cos_lon, 0.0],
        [-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat],
        [cos_lat * cos_lon, cos_lat * sin_lon, sin_lat],
    ]
}
