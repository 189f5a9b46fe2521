//! GeoTIFF header reader.
//!
//! Reads the georeferencing tags of a GeoTIFF and interprets the GeoKeys that
//! decide whether the raster is geographic WGS84 or UTM projected.

use crate::adapters::GeoHeader;
use crate::Result;
use geocam_geodesy::{Hemisphere, UtmZone};
use std::path::Path;
use tiff::decoder::Decoder;
use tiff::tags::Tag;
use tracing::debug;

/// ModelPixelScale tag.
const TAG_MODEL_PIXEL_SCALE: u16 = 33550;
/// ModelTiepoint tag.
const TAG_MODEL_TIEPOINT: u16 = 33922;
/// ModelTransformation tag.
const TAG_MODEL_TRANSFORMATION: u16 = 34264;
/// GeoKeyDirectory tag.
const TAG_GEO_KEY_DIRECTORY: u16 = 34735;

const KEY_MODEL_TYPE: u16 = 1024;
const KEY_GEOGRAPHIC_TYPE: u16 = 2048;
const KEY_GEOG_LINEAR_UNITS: u16 = 2052;
const KEY_GEOG_ANGULAR_UNITS: u16 = 2054;
const KEY_PROJECTED_CS_TYPE: u16 = 3072;

const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const GCS_WGS84: u16 = 4326;
const LINEAR_METER: u16 = 9001;
const ANGULAR_DEGREE: u16 = 9102;
const PCS_WGS84_UTM_NORTH: u16 = 32600;
const PCS_WGS84_UTM_SOUTH: u16 = 32700;
const PCS_NAD83_UTM_NORTH: u16 = 26900;
/// NAD83 UTM codes stop at zone 23.
const NAD83_MAX_ZONE: u16 = 23;

/// The GeoKeys relevant to model/unit validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GeoKeys {
    /// GTModelType (1 = projected, 2 = geographic).
    pub model_type: Option<u16>,
    /// GeographicType EPSG code.
    pub geographic_type: Option<u16>,
    /// GeogLinearUnits EPSG code.
    pub linear_units: Option<u16>,
    /// GeogAngularUnits EPSG code.
    pub angular_units: Option<u16>,
    /// ProjectedCSType EPSG code.
    pub projected_cs: Option<u16>,
}

impl GeoKeys {
    /// Parse a GeoKeyDirectory.
    ///
    /// The directory is a 4-value header followed by `(key, location, count,
    /// value)` entries. Only keys stored inline (location 0) are read.
    pub fn parse(directory: &[u16]) -> Self {
        let mut keys = GeoKeys::default();
        let declared = directory.get(3).copied().unwrap_or(0) as usize;
        for entry in directory.get(4..).unwrap_or_default().chunks_exact(4).take(declared) {
            let (key, location, value) = (entry[0], entry[1], entry[3]);
            if location != 0 {
                continue;
            }
            match key {
                KEY_MODEL_TYPE => keys.model_type = Some(value),
                KEY_GEOGRAPHIC_TYPE => keys.geographic_type = Some(value),
                KEY_GEOG_LINEAR_UNITS => keys.linear_units = Some(value),
                KEY_GEOG_ANGULAR_UNITS => keys.angular_units = Some(value),
                KEY_PROJECTED_CS_TYPE => keys.projected_cs = Some(value),
                _ => {}
            }
        }
        keys
    }

    /// Geographic WGS84 with meter/degree units; absent unit keys default to them.
    pub fn is_geographic_wgs84_deg_m(&self) -> bool {
        self.model_type == Some(MODEL_TYPE_GEOGRAPHIC)
            && self.geographic_type == Some(GCS_WGS84)
            && self.linear_units.map_or(true, |u| u == LINEAR_METER)
            && self.angular_units.map_or(true, |u| u == ANGULAR_DEGREE)
    }

    /// Zone and hemisphere of a WGS84 UTM projection (EPSG 326zz / 327zz).
    pub fn utm_wgs84_zone(&self) -> Option<(UtmZone, Hemisphere)> {
        let code = self.projected_cs?;
        let (zone, hemisphere) = if code > PCS_WGS84_UTM_SOUTH {
            (code - PCS_WGS84_UTM_SOUTH, Hemisphere::South)
        } else if code > PCS_WGS84_UTM_NORTH {
            (code - PCS_WGS84_UTM_NORTH, Hemisphere::North)
        } else {
            return None;
        };
        let zone = UtmZone::new(u8::try_from(zone).ok()?).ok()?;
        Some((zone, hemisphere))
    }

    /// Zone of a NAD83 UTM projection (EPSG 269zz, northern zones 1-23).
    pub fn utm_nad83_zone(&self) -> Option<(UtmZone, Hemisphere)> {
        let zone = self.projected_cs?.checked_sub(PCS_NAD83_UTM_NORTH)?;
        if zone == 0 || zone > NAD83_MAX_ZONE {
            return None;
        }
        let zone = UtmZone::new(u8::try_from(zone).ok()?).ok()?;
        Some((zone, Hemisphere::North))
    }
}

/// Georeferencing tags of a GeoTIFF.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TiffGeoHeader {
    transform: Option<Vec<f64>>,
    tie_points: Vec<[f64; 6]>,
    pixel_scale: Option<[f64; 3]>,
    keys: GeoKeys,
}

impl TiffGeoHeader {
    /// Build a header from already-decoded values.
    pub fn from_parts(
        transform: Option<Vec<f64>>,
        tie_points: Vec<[f64; 6]>,
        pixel_scale: Option<[f64; 3]>,
        keys: GeoKeys,
    ) -> Self {
        Self {
            transform,
            tie_points,
            pixel_scale,
            keys,
        }
    }

    /// Read the header of a GeoTIFF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let mut decoder = Decoder::new(file)?;
        let header = Self::from_decoder(&mut decoder)?;
        debug!(?header, "Read GeoTIFF header from {}", path.display());
        Ok(header)
    }

    /// Read the georeferencing tags from a decoder positioned on an image.
    pub fn from_decoder<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> Result<Self> {
        // Absent tags surface as errors; every tag is optional here.
        let transform = decoder
            .get_tag_f64_vec(Tag::from_u16_exhaustive(TAG_MODEL_TRANSFORMATION))
            .ok();

        let tie_points = decoder
            .get_tag_f64_vec(Tag::from_u16_exhaustive(TAG_MODEL_TIEPOINT))
            .map(|values| {
                values
                    .chunks_exact(6)
                    .map(|c| [c[0], c[1], c[2], c[3], c[4], c[5]])
                    .collect()
            })
            .unwrap_or_default();

        let pixel_scale = decoder
            .get_tag_f64_vec(Tag::from_u16_exhaustive(TAG_MODEL_PIXEL_SCALE))
            .ok()
            .and_then(|s| match s.as_slice() {
                [sx, sy, sz, ..] => Some([*sx, *sy, *sz]),
                [sx, sy] => Some([*sx, *sy, 0.0]),
                _ => None,
            });

        let keys = decoder
            .get_tag_u16_vec(Tag::from_u16_exhaustive(TAG_GEO_KEY_DIRECTORY))
            .map(|directory| GeoKeys::parse(&directory))
            .unwrap_or_default();

        Ok(Self {
            transform,
            tie_points,
            pixel_scale,
            keys,
        })
    }

    /// The interpreted GeoKeys.
    pub fn keys(&self) -> &GeoKeys {
        &self.keys
    }
}

impl GeoHeader for TiffGeoHeader {
    fn explicit_transform(&self) -> Option<&[f64]> {
        self.transform.as_deref()
    }

    fn tie_points(&self) -> &[[f64; 6]] {
        &self.tie_points
    }

    fn pixel_scale(&self) -> Option<[f64; 3]> {
        self.pixel_scale
    }

    fn is_geographic_wgs84_deg_m(&self) -> bool {
        self.keys.is_geographic_wgs84_deg_m()
    }

    fn utm_wgs84_zone(&self) -> Option<(UtmZone, Hemisphere)> {
        self.keys.utm_wgs84_zone()
    }

    fn utm_nad83_zone(&self) -> Option<(UtmZone, Hemisphere)> {
        self.keys.utm_nad83_zone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::canonical_from_header;

    fn directory(entries: &[(u16, u16)]) -> Vec<u16> {
        let mut dir = vec![1, 1, 0, entries.len() as u16];
        for &(key, value) in entries {
            dir.extend_from_slice(&[key, 0, 1, value]);
        }
        dir
    }

    #[test]
    fn test_geographic_keys() {
        let keys = GeoKeys::parse(&directory(&[(1024, 2), (2048, 4326), (2054, 9102)]));
        assert!(keys.is_geographic_wgs84_deg_m());
        assert_eq!(keys.utm_wgs84_zone(), None);

        let radians = GeoKeys::parse(&directory(&[(1024, 2), (2048, 4326), (2054, 9101)]));
        assert!(!radians.is_geographic_wgs84_deg_m());

        let nad27 = GeoKeys::parse(&directory(&[(1024, 2), (2048, 4267)]));
        assert!(!nad27.is_geographic_wgs84_deg_m());
    }

    #[test]
    fn test_utm_keys() {
        let north = GeoKeys::parse(&directory(&[(1024, 1), (3072, 32618)]));
        assert_eq!(north.utm_wgs84_zone(), Some((UtmZone::new(18).unwrap(), Hemisphere::North)));

        let south = GeoKeys::parse(&directory(&[(1024, 1), (3072, 32756)]));
        assert_eq!(south.utm_wgs84_zone(), Some((UtmZone::new(56).unwrap(), Hemisphere::South)));

        let nad83 = GeoKeys::parse(&directory(&[(1024, 1), (3072, 26910)]));
        assert_eq!(nad83.utm_wgs84_zone(), None);
        assert_eq!(nad83.utm_nad83_zone(), Some((UtmZone::new(10).unwrap(), Hemisphere::North)));

        for code in [32600, 32661, 32700, 26900, 26924, 3857] {
            let keys = GeoKeys::parse(&directory(&[(3072, code)]));
            assert_eq!(keys.utm_wgs84_zone(), None, "code {}", code);
            assert_eq!(keys.utm_nad83_zone(), None, "code {}", code);
        }
    }

    #[test]
    fn test_parse_skips_referenced_values_and_truncation() {
        let dir = vec![1, 1, 0, 3, 1024, 0, 1, 2, 2048, 34736, 1, 0, 3072];
        let keys = GeoKeys::parse(&dir);
        assert_eq!(keys.model_type, Some(2));
        assert_eq!(keys.geographic_type, None);
        assert_eq!(keys.projected_cs, None);
        assert_eq!(GeoKeys::parse(&[]), GeoKeys::default());
    }

    #[test]
    fn test_header_to_canonical() {
        let header = TiffGeoHeader::from_parts(
            None,
            vec![[0.0, 0.0, 0.0, 580_000.0, 4_500_000.0, 0.0]],
            Some([0.6, 0.6, 0.0]),
            GeoKeys::parse(&directory(&[(1024, 1), (3072, 32718)])),
        );
        let canonical = canonical_from_header(&header).unwrap();
        let utm = canonical.utm.unwrap();
        assert_eq!(utm.zone.number(), 18);
        assert_eq!(utm.hemisphere, Hemisphere::South);
        assert_eq!(canonical.transform.pixel_to_native(1.0, 1.0), (580_000.6, 4_499_999.4));
    }
}
