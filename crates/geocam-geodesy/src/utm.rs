//! UTM projection on the WGS84 ellipsoid.
//!
//! Transverse Mercator using the 4th-order Krüger series in the third
//! flattening `n`. Within a zone the series is accurate to well below a
//! millimetre. The inverse is solved iteratively against the forward
//! series, so `to_utm_in_zone` and `to_latlon` round trip to float
//! precision.

use crate::ellipsoid::{WGS84_A, WGS84_E2, WGS84_F};
use crate::{GeodesyError, Result};
use serde::{Deserialize, Serialize};

/// UTM scale factor on the central meridian.
pub const UTM_K0: f64 = 0.9996;

/// False easting applied in every zone (meters).
pub const FALSE_EASTING: f64 = 500_000.0;

/// False northing applied in the southern hemisphere (meters).
pub const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Hemisphere of a UTM coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hemisphere {
    /// Northern hemisphere (no false northing).
    #[default]
    North,
    /// Southern hemisphere (10 000 km false northing).
    South,
}

impl Hemisphere {
    /// Hemisphere containing the given latitude.
    pub fn from_latitude(lat: f64) -> Self {
        if lat < 0.0 {
            Hemisphere::South
        } else {
            Hemisphere::North
        }
    }

    /// Whether this is the southern hemisphere.
    pub fn is_south(self) -> bool {
        self == Hemisphere::South
    }

    fn false_northing(self) -> f64 {
        match self {
            Hemisphere::North => 0.0,
            Hemisphere::South => FALSE_NORTHING_SOUTH,
        }
    }
}

impl std::fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Hemisphere::North => write!(f, "northern"),
            Hemisphere::South => write!(f, "southern"),
        }
    }
}

/// A validated UTM zone number (1-60).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct UtmZone(u8);

impl UtmZone {
    /// Create a zone, rejecting numbers outside 1..=60.
    pub fn new(zone: u8) -> Result<Self> {
        if (1..=60).contains(&zone) {
            Ok(UtmZone(zone))
        } else {
            Err(GeodesyError::InvalidZone(zone))
        }
    }

    /// Zone containing the given longitude.
    pub fn from_longitude(lon: f64) -> Self {
        let zone = ((lon + 180.0) / 6.0).floor() as i32 + 1;
        UtmZone(zone.clamp(1, 60) as u8)
    }

    /// The zone number.
    pub fn number(self) -> u8 {
        self.0
    }

    /// Longitude of the zone's central meridian in degrees.
    pub fn central_meridian(self) -> f64 {
        f64::from(self.0) * 6.0 - 183.0
    }
}

impl TryFrom<u8> for UtmZone {
    type Error = GeodesyError;

    fn try_from(zone: u8) -> Result<Self> {
        UtmZone::new(zone)
    }
}

impl From<UtmZone> for u8 {
    fn from(zone: UtmZone) -> u8 {
        zone.0
    }
}

impl std::str::FromStr for Hemisphere {
    type Err = GeodesyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "northern" => Ok(Hemisphere::North),
            "southern" => Ok(Hemisphere::South),
            other => Err(GeodesyError::parse(format!("hemisphere '{}'", other))),
        }
    }
}

impl std::fmt::Display for UtmZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A zone-qualified UTM position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtmCoord {
    /// Easting in meters.
    pub easting: f64,
    /// Northing in meters (includes the false northing in the south).
    pub northing: f64,
    /// Zone the coordinate is expressed in.
    pub zone: UtmZone,
    /// Hemisphere the northing refers to.
    pub hemisphere: Hemisphere,
}

/// Series coefficients derived from the third flattening.
struct KruegerSeries {
    /// Rectifying radius scaled by `1 / (1 + n)`.
    a_hat: f64,
    alpha: [f64; 4],
    beta: [f64; 4],
}

impl KruegerSeries {
    fn wgs84() -> Self {
        let n = WGS84_F / (2.0 - WGS84_F);
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;

        KruegerSeries {
            a_hat: WGS84_A / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0),
            alpha: [
                n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0 + 41.0 * n4 / 180.0,
                13.0 * n2 / 48.0 - 3.0 * n3 / 5.0 + 557.0 * n4 / 1440.0,
                61.0 * n3 / 240.0 - 103.0 * n4 / 140.0,
                49561.0 * n4 / 161280.0,
            ],
            beta: [
                n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0 - n4 / 360.0,
                n2 / 48.0 + n3 / 15.0 - 437.0 * n4 / 1440.0,
                17.0 * n3 / 480.0 - 37.0 * n4 / 840.0,
                4397.0 * n4 / 161280.0,
            ],
        }
    }

    /// Conformal sphere `(xi', eta')` to the normalized TM plane `(xi, eta)`.
    fn forward(&self, xi_p: f64, eta_p: f64) -> (f64, f64) {
        let mut xi = xi_p;
        let mut eta = eta_p;
        for (j, alpha) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi += alpha * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += alpha * (k * xi_p).cos() * (k * eta_p).sinh();
        }
        (xi, eta)
    }

    /// Inverse of [`KruegerSeries::forward`].
    ///
    /// The beta series gives the starting point; fixed-point steps against
    /// the forward series then remove its truncation error.
    fn inverse(&self, xi: f64, eta: f64) -> (f64, f64) {
        let mut xi_p = xi;
        let mut eta_p = eta;
        for (j, beta) in self.beta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi_p -= beta * (k * xi).sin() * (k * eta).cosh();
            eta_p -= beta * (k * xi).cos() * (k * eta).sinh();
        }
        for _ in 0..3 {
            let (fx, fe) = self.forward(xi_p, eta_p);
            xi_p += xi - fx;
            eta_p += eta - fe;
        }
        (xi_p, eta_p)
    }
}

/// Tangent of the conformal latitude for a geodetic tangent `tau`.
fn conformal_tan(tau: f64, e: f64) -> f64 {
    let tau1 = tau.hypot(1.0);
    let sig = (e * (e * tau / tau1).atanh()).sinh();
    tau * sig.hypot(1.0) - sig * tau1
}

/// Geodetic tangent for a conformal tangent `tau_p`, by Newton iteration.
fn geodetic_tan(tau_p: f64, e: f64) -> f64 {
    let e2m = 1.0 - e * e;
    let mut tau = tau_p / e2m;
    for _ in 0..6 {
        let tau_i = conformal_tan(tau, e);
        let dtau = (tau_p - tau_i) / tau_i.hypot(1.0) * (1.0 + e2m * tau * tau)
            / (e2m * tau.hypot(1.0));
        tau += dtau;
        if dtau.abs() <= 1e-15 * tau.abs().max(1.0) {
            break;
        }
    }
    tau
}

/// Project geodetic coordinates into the zone containing them.
///
/// The hemisphere follows the sign of the latitude.
pub fn to_utm(lat: f64, lon: f64) -> UtmCoord {
    let zone = UtmZone::from_longitude(lon);
    let hemisphere = Hemisphere::from_latitude(lat);
    let (easting, northing) = to_utm_in_zone(lat, lon, zone, hemisphere);
    UtmCoord {
        easting,
        northing,
        zone,
        hemisphere,
    }
}

/// Project geodetic coordinates into a given zone and hemisphere.
///
/// Points outside the zone are still projected (with growing scale error),
/// which keeps neighbouring tiles in one consistent plane.
pub fn to_utm_in_zone(lat: f64, lon: f64, zone: UtmZone, hemisphere: Hemisphere) -> (f64, f64) {
    let series = KruegerSeries::wgs84();
    let e = WGS84_E2.sqrt();

    let phi = lat.to_radians();
    let dlon = (lon - zone.central_meridian()).to_radians();

    let sin_phi = phi.sin();
    let t = (sin_phi.atanh() - e * (e * sin_phi).atanh()).sinh();
    let xi_p = t.atan2(dlon.cos());
    let eta_p = (dlon.sin() / (1.0 + t * t).sqrt()).atanh();

    let (xi, eta) = series.forward(xi_p, eta_p);

    let easting = FALSE_EASTING + UTM_K0 * series.a_hat * eta;
    let northing = hemisphere.false_northing() + UTM_K0 * series.a_hat * xi;
    (easting, northing)
}

/// Convert a UTM position back to geodetic `(lat, lon, elevation)`.
///
/// Elevation passes through unchanged.
pub fn to_latlon(
    zone: UtmZone,
    hemisphere: Hemisphere,
    easting: f64,
    northing: f64,
    elevation: f64,
) -> (f64, f64, f64) {
    let series = KruegerSeries::wgs84();
    let e = WGS84_E2.sqrt();

    let xi = (northing - hemisphere.false_northing()) / (UTM_K0 * series.a_hat);
    let eta = (easting - FALSE_EASTING) / (UTM_K0 * series.a_hat);
    let (xi_p, eta_p) = series.inverse(xi, eta);

    // Tangent of the conformal latitude.
    let tau_p = xi_p.sin() / eta_p.sinh().hypot(xi_p.cos());
    let lat = geodetic_tan(tau_p, e).atan().to_degrees();
    let lon = zone.central_meridian() + eta_p.sinh().atan2(xi_p.cos()).to_degrees();
    (lat, lon, elevation)
}
