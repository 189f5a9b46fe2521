//! Local tangent-plane coordinate contexts.
//!
//! A [`CoordinateContext`] anchors a local Cartesian frame at a geographic
//! origin and converts between that frame and a global frame (WGS84 or UTM).
//!
//! - WGS84 contexts use the East-North-Up tangent plane at the origin.
//! - UTM contexts use east/north offsets in the UTM plane from the UTM origin,
//!   with elevation measured from the origin elevation.
//!
//! Global WGS84 coordinates are always ordered `(longitude, latitude, elevation)`.
//! Global UTM coordinates are `(easting, northing, elevation)` in the context's
//! own zone.
//!
//! ## Binary Record
//!
//! | Field        | Size (bytes) | Description                          |
//! |--------------|--------------|--------------------------------------|
//! | version      | 2            | Record version, currently 1          |
//! | kind         | 1            | 0 = WGS84, 1 = UTM                   |
//! | origin       | 24           | latitude, longitude, elevation (f64) |
//! | utm origin   | 18 (UTM)     | easting, northing (f64), zone, hemisphere |
//!
//! All multi-byte values are little-endian.

use crate::ellipsoid::{ecef_to_enu_rotation, ecef_to_geodetic, geodetic_to_ecef};
use crate::utm::{self, Hemisphere, UtmCoord, UtmZone};
use crate::{GeodesyError, Result};
use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

/// Current version of the context binary record.
pub const CONTEXT_RECORD_VERSION: u16 = 1;

/// A global coordinate frame.
///
/// Doubles as the kind of a [`CoordinateContext`]: the frame its local axes
/// are laid out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlobalFrame {
    /// Geodetic longitude/latitude in degrees, elevation in meters.
    Wgs84,
    /// UTM easting/northing in meters.
    Utm,
}

impl std::fmt::Display for GlobalFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GlobalFrame::Wgs84 => write!(f, "wgs84"),
            GlobalFrame::Utm => write!(f, "utm"),
        }
    }
}

/// A local vertical coordinate system anchored at a geographic origin.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateContext {
    kind: GlobalFrame,
    origin_lat: f64,
    origin_lon: f64,
    origin_elev: f64,
    /// Present for UTM contexts.
    utm_origin: Option<UtmCoord>,
}

impl CoordinateContext {
    /// Create a WGS84 (East-North-Up) context at a geodetic origin.
    pub fn wgs84(lat: f64, lon: f64, elev: f64) -> Self {
        CoordinateContext {
            kind: GlobalFrame::Wgs84,
            origin_lat: lat,
            origin_lon: lon,
            origin_elev: elev,
            utm_origin: None,
        }
    }

    /// Create a UTM context at a geodetic origin.
    ///
    /// The UTM origin is taken in the zone containing the origin.
    pub fn utm(lat: f64, lon: f64, elev: f64) -> Self {
        CoordinateContext {
            kind: GlobalFrame::Utm,
            origin_lat: lat,
            origin_lon: lon,
            origin_elev: elev,
            utm_origin: Some(utm::to_utm(lat, lon)),
        }
    }

    /// Create a UTM context from an explicit UTM origin.
    pub fn from_utm_origin(
        easting: f64,
        northing: f64,
        elev: f64,
        zone: UtmZone,
        hemisphere: Hemisphere,
    ) -> Self {
        let (lat, lon, _) = utm::to_latlon(zone, hemisphere, easting, northing, elev);
        CoordinateContext {
            kind: GlobalFrame::Utm,
            origin_lat: lat,
            origin_lon: lon,
            origin_elev: elev,
            utm_origin: Some(UtmCoord {
                easting,
                northing,
                zone,
                hemisphere,
            }),
        }
    }

    /// The frame this context's local axes are laid out in.
    pub fn kind(&self) -> GlobalFrame {
        self.kind
    }

    /// Geodetic origin as `(lat, lon, elevation)`.
    pub fn origin(&self) -> (f64, f64, f64) {
        (self.origin_lat, self.origin_lon, self.origin_elev)
    }

    /// UTM origin, for UTM contexts.
    pub fn utm_origin(&self) -> Option<UtmCoord> {
        self.utm_origin
    }

    /// Elevation of the origin in meters.
    pub fn elevation_origin(&self) -> f64 {
        self.origin_elev
    }

    /// Zone and hemisphere used for UTM global coordinates.
    ///
    /// WGS84 contexts report the zone containing their origin.
    pub fn utm_frame(&self) -> (UtmZone, Hemisphere) {
        match self.utm_origin {
            Some(origin) => (origin.zone, origin.hemisphere),
            None => (
                UtmZone::from_longitude(self.origin_lon),
                Hemisphere::from_latitude(self.origin_lat),
            ),
        }
    }

    /// Convert a local point to global coordinates in `frame`.
    pub fn local_to_global(&self, x: f64, y: f64, z: f64, frame: GlobalFrame) -> (f64, f64, f64) {
        match (frame, self.utm_origin) {
            (GlobalFrame::Utm, Some(origin)) => {
                (origin.easting + x, origin.northing + y, self.origin_elev + z)
            }
            (GlobalFrame::Utm, None) => {
                let (lat, lon, h) = self.local_to_geodetic(x, y, z);
                let (zone, hemisphere) = self.utm_frame();
                let (e, n) = utm::to_utm_in_zone(lat, lon, zone, hemisphere);
                (e, n, h)
            }
            (GlobalFrame::Wgs84, _) => {
                let (lat, lon, h) = self.local_to_geodetic(x, y, z);
                (lon, lat, h)
            }
        }
    }

    /// Convert global coordinates in `frame` to this context's local frame.
    pub fn global_to_local(&self, a: f64, b: f64, c: f64, frame: GlobalFrame) -> (f64, f64, f64) {
        match (frame, self.utm_origin) {
            (GlobalFrame::Utm, Some(origin)) => {
                (a - origin.easting, b - origin.northing, c - self.origin_elev)
            }
            (GlobalFrame::Utm, None) => {
                let (zone, hemisphere) = self.utm_frame();
                let (lat, lon, h) = utm::to_latlon(zone, hemisphere, a, b, c);
                self.geodetic_to_local(lat, lon, h)
            }
            (GlobalFrame::Wgs84, _) => self.geodetic_to_local(b, a, c),
        }
    }

    fn local_to_geodetic(&self, x: f64, y: f64, z: f64) -> (f64, f64, f64) {
        match self.utm_origin {
            Some(origin) => utm::to_latlon(
                origin.zone,
                origin.hemisphere,
                origin.easting + x,
                origin.northing + y,
                self.origin_elev + z,
            ),
            None => {
                let base = geodetic_to_ecef(self.origin_lat, self.origin_lon, self.origin_elev);
                let r = ecef_to_enu_rotation(self.origin_lat, self.origin_lon);
                let local = [x, y, z];
                let mut ecef = base;
                for (axis, value) in ecef.iter_mut().enumerate() {
                    // Transpose of the ECEF -> ENU rotation.
                    *value += (0..3).map(|k| r[k][axis] * local[k]).sum::<f64>();
                }
                ecef_to_geodetic(ecef)
            }
        }
    }

    fn geodetic_to_local(&self, lat: f64, lon: f64, h: f64) -> (f64, f64, f64) {
        match self.utm_origin {
            Some(origin) => {
                let (e, n) = utm::to_utm_in_zone(lat, lon, origin.zone, origin.hemisphere);
                (e - origin.easting, n - origin.northing, h - self.origin_elev)
            }
            None => {
                let base = geodetic_to_ecef(self.origin_lat, self.origin_lon, self.origin_elev);
                let p = geodetic_to_ecef(lat, lon, h);
                let d = [p[0] - base[0], p[1] - base[1], p[2] - base[2]];
                let r = ecef_to_enu_rotation(self.origin_lat, self.origin_lon);
                let enu = r.map(|row| row[0] * d[0] + row[1] * d[1] + row[2] * d[2]);
                (enu[0], enu[1], enu[2])
            }
        }
    }

    // ========================================================================
    // Binary record
    // ========================================================================

    /// Append this context's binary record to `buf`.
    pub fn write_binary<B: BufMut>(&self, buf: &mut B) {
        buf.put_u16_le(CONTEXT_RECORD_VERSION);
        buf.put_u8(match self.kind {
            GlobalFrame::Wgs84 => 0,
            GlobalFrame::Utm => 1,
        });
        buf.put_f64_le(self.origin_lat);
        buf.put_f64_le(self.origin_lon);
        buf.put_f64_le(self.origin_elev);
        if let Some(origin) = self.utm_origin {
            buf.put_f64_le(origin.easting);
            buf.put_f64_le(origin.northing);
            buf.put_u8(origin.zone.number());
            buf.put_u8(u8::from(origin.hemisphere.is_south()));
        }
    }

    /// Read a context binary record from `buf`.
    ///
    /// Errors carry offsets relative to the start of the context record.
    pub fn read_binary<B: Buf>(buf: &mut B) -> Result<Self> {
        let start = buf.remaining();
        ensure_remaining(buf, 3, start - buf.remaining())?;
        let version = buf.get_u16_le();
        if version != CONTEXT_RECORD_VERSION {
            return Err(GeodesyError::UnsupportedVersion(version));
        }
        let kind = match buf.get_u8() {
            0 => GlobalFrame::Wgs84,
            1 => GlobalFrame::Utm,
            other => {
                return Err(GeodesyError::decode_at(
                    start - buf.remaining() - 1,
                    format!("unknown context kind {}", other),
                ))
            }
        };

        ensure_remaining(buf, 24, start - buf.remaining())?;
        let origin_lat = buf.get_f64_le();
        let origin_lon = buf.get_f64_le();
        let origin_elev = buf.get_f64_le();

        let utm_origin = match kind {
            GlobalFrame::Wgs84 => None,
            GlobalFrame::Utm => {
                ensure_remaining(buf, 18, start - buf.remaining())?;
                let easting = buf.get_f64_le();
                let northing = buf.get_f64_le();
                let zone_at = start - buf.remaining();
                let zone = UtmZone::new(buf.get_u8())
                    .map_err(|e| GeodesyError::decode_at(zone_at, e.to_string()))?;
                let hemisphere = match buf.get_u8() {
                    0 => Hemisphere::North,
                    _ => Hemisphere::South,
                };
                Some(UtmCoord {
                    easting,
                    northing,
                    zone,
                    hemisphere,
                })
            }
        };

        Ok(CoordinateContext {
            kind,
            origin_lat,
            origin_lon,
            origin_elev,
            utm_origin,
        })
    }
}

fn ensure_remaining<B: Buf>(buf: &B, needed: usize, offset: usize) -> Result<()> {
    if buf.remaining() < needed {
        return Err(GeodesyError::decode_at(
            offset,
            format!("need {} bytes, {} remaining", needed, buf.remaining()),
        ));
    }
    Ok(())
}

impl std::fmt::Display for CoordinateContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "coordinate context: {}", self.kind)?;
        write!(
            f,
            "  origin: lat {:.9} lon {:.9} elev {:.3}",
            self.origin_lat, self.origin_lon, self.origin_elev
        )?;
        if let Some(origin) = self.utm_origin {
            write!(
                f,
                "\n  utm origin: zone {} {}, easting {:.3} northing {:.3}",
                origin.zone, origin.hemisphere, origin.easting, origin.northing
            )?;
        }
        Ok(())
    }
}

/// Reads the text written by the `Display` impl. Values come back at the
/// printed precision.
impl std::str::FromStr for CoordinateContext {
    type Err = GeodesyError;

    fn from_str(s: &str) -> Result<Self> {
        let mut lines = s.lines().map(str::trim).filter(|line| !line.is_empty());

        let kind = match lines.next().and_then(|l| l.strip_prefix("coordinate context:")) {
            Some(k) if k.trim() == "wgs84" => GlobalFrame::Wgs84,
            Some(k) if k.trim() == "utm" => GlobalFrame::Utm,
            _ => return Err(GeodesyError::parse("context: missing 'coordinate context' line")),
        };

        let origin = lines
            .next()
            .and_then(|l| l.strip_prefix("origin:"))
            .ok_or_else(|| GeodesyError::parse("context: missing origin line"))?;
        let origin: Vec<&str> = origin.split_whitespace().collect();
        let lat = labelled(&origin, "lat")?;
        let lon = labelled(&origin, "lon")?;
        let elev = labelled(&origin, "elev")?;

        let utm_origin = match lines.next() {
            None => None,
            Some(line) => {
                let rest = line
                    .strip_prefix("utm origin:")
                    .ok_or_else(|| GeodesyError::parse(format!("context: unexpected line '{}'", line)))?;
                let rest = rest.replace(',', " ");
                let tokens: Vec<&str> = rest.split_whitespace().collect();
                let zone_at = tokens
                    .iter()
                    .position(|t| *t == "zone")
                    .ok_or_else(|| GeodesyError::parse("context: utm origin without zone"))?;
                let zone = tokens
                    .get(zone_at + 1)
                    .and_then(|t| t.parse::<u8>().ok())
                    .ok_or_else(|| GeodesyError::parse("context: invalid utm zone"))?;
                let hemisphere = tokens
                    .get(zone_at + 2)
                    .ok_or_else(|| GeodesyError::parse("context: missing hemisphere"))?
                    .parse::<Hemisphere>()?;
                Some(UtmCoord {
                    easting: labelled(&tokens, "easting")?,
                    northing: labelled(&tokens, "northing")?,
                    zone: UtmZone::new(zone)?,
                    hemisphere,
                })
            }
        };

        match (kind, utm_origin) {
            (GlobalFrame::Wgs84, None) => Ok(CoordinateContext::wgs84(lat, lon, elev)),
            (GlobalFrame::Utm, Some(utm_origin)) => Ok(CoordinateContext {
                kind,
                origin_lat: lat,
                origin_lon: lon,
                origin_elev: elev,
                utm_origin: Some(utm_origin),
            }),
            (GlobalFrame::Utm, None) => Ok(CoordinateContext::utm(lat, lon, elev)),
            (GlobalFrame::Wgs84, Some(_)) => Err(GeodesyError::parse("context: wgs84 context with a utm origin")),
        }
    }
}

/// Value following `label` in a whitespace-split line.
fn labelled(tokens: &[&str], label: &str) -> Result<f64> {
    tokens
        .iter()
        .position(|t| *t == label)
        .and_then(|i| tokens.get(i + 1))
        .and_then(|t| t.parse::<f64>().ok())
        .ok_or_else(|| GeodesyError::parse(format!("context: missing or invalid '{}'", label)))
}
