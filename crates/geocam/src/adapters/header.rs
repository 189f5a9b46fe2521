//! Header-metadata adapter.
//!
//! Turns raster header metadata (an explicit model transform, or a pixel
//! scale plus tie points, and a model/unit description) into a canonical
//! transform.

use crate::camera::{CanonicalTransform, UtmMetadata};
use crate::transform::AffineGeoTransform;
use crate::{GeoCameraError, Result};
use geocam_geodesy::{Hemisphere, UtmZone};
use tracing::{debug, warn};

/// Georeferencing metadata read from a raster header.
pub trait GeoHeader {
    /// Row-major model transformation matrix, if the header carries one.
    fn explicit_transform(&self) -> Option<&[f64]>;

    /// Tie points `(I, J, K, X, Y, Z)`.
    fn tie_points(&self) -> &[[f64; 6]];

    /// Per-axis pixel scale `(sx, sy, sz)`.
    fn pixel_scale(&self) -> Option<[f64; 3]>;

    /// Geographic WGS84 model with linear units in meters and angular units
    /// in degrees.
    fn is_geographic_wgs84_deg_m(&self) -> bool;

    /// Zone and hemisphere of a WGS84 UTM projected model.
    fn utm_wgs84_zone(&self) -> Option<(UtmZone, Hemisphere)>;

    /// Zone and hemisphere of a NAD83 UTM projected model.
    fn utm_nad83_zone(&self) -> Option<(UtmZone, Hemisphere)>;
}

/// Build the canonical transform described by a header.
pub fn canonical_from_header<H: GeoHeader + ?Sized>(header: &H) -> Result<CanonicalTransform> {
    let transform = if let Some(values) = header.explicit_transform() {
        if header.pixel_scale().is_some() || !header.tie_points().is_empty() {
            warn!("Explicit model transform given; ignoring pixel scale and tie points");
        }
        AffineGeoTransform::from_row_slice(values, false)?
    } else if let Some([sx, sy, sz]) = header.pixel_scale() {
        let tie_point = header
            .tie_points()
            .first()
            .copied()
            .ok_or_else(|| GeoCameraError::configuration("pixel scale given without tie points"))?;
        debug!(?tie_point, sx, sy, sz, "Transform from tie point");
        AffineGeoTransform::from_tie_point(tie_point, sx, sy, sz)
    } else {
        return Err(GeoCameraError::configuration(
            "header has neither a model transform nor a pixel scale",
        ));
    };

    if header.is_geographic_wgs84_deg_m() {
        return Ok(CanonicalTransform { transform, utm: None });
    }

    match header.utm_wgs84_zone().or_else(|| header.utm_nad83_zone()) {
        Some((zone, hemisphere)) => Ok(CanonicalTransform {
            transform,
            utm: Some(UtmMetadata::new(zone, hemisphere)),
        }),
        None => Err(GeoCameraError::configuration(
            "unsupported model: only geographic WGS84 (degrees/meters), WGS84 UTM and NAD83 UTM are accepted",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct StubHeader {
        transform: Option<Vec<f64>>,
        tie_points: Vec<[f64; 6]>,
        scale: Option<[f64; 3]>,
        geographic: bool,
        wgs84_utm: Option<(UtmZone, Hemisphere)>,
        nad83_utm: Option<(UtmZone, Hemisphere)>,
    }

    impl GeoHeader for StubHeader {
        fn explicit_transform(&self) -> Option<&[f64]> {
            self.transform.as_deref()
        }
        fn tie_points(&self) -> &[[f64; 6]] {
            &self.tie_points
        }
        fn pixel_scale(&self) -> Option<[f64; 3]> {
            self.scale
        }
        fn is_geographic_wgs84_deg_m(&self) -> bool {
            self.geographic
        }
        fn utm_wgs84_zone(&self) -> Option<(UtmZone, Hemisphere)> {
            self.wgs84_utm
        }
        fn utm_nad83_zone(&self) -> Option<(UtmZone, Hemisphere)> {
            self.nad83_utm
        }
    }

    #[test]
    fn test_tie_point_utm() {
        let header = StubHeader {
            tie_points: vec![[0.0, 0.0, 0.0, 350_000.0, 5_000_000.0, 0.0]],
            scale: Some([0.5, 0.5, 0.0]),
            wgs84_utm: Some((UtmZone::new(17).unwrap(), Hemisphere::North)),
            ..Default::default()
        };
        let canonical = canonical_from_header(&header).unwrap();
        assert!(canonical.transform.scale_tag());
        assert_eq!(canonical.transform.get(1, 1), -0.5);
        assert_eq!(canonical.utm.unwrap().zone.number(), 17);
    }

    #[test]
    fn test_explicit_transform_takes_precedence() {
        let mut values = vec![0.0; 16];
        values[0] = 2.0;
        values[5] = -2.0;
        values[15] = 1.0;
        let header = StubHeader {
            transform: Some(values),
            scale: Some([1.0, 1.0, 0.0]),
            tie_points: vec![[0.0; 6]],
            geographic: true,
            ..Default::default()
        };
        let canonical = canonical_from_header(&header).unwrap();
        assert!(!canonical.transform.scale_tag());
        assert_eq!(canonical.transform.get(0, 0), 2.0);
        assert!(canonical.utm.is_none());
    }

    #[test]
    fn test_explicit_transform_with_sub_unit_spacing() {
        // 0.25 m pixels rotated 90 degrees: columns run south, rows run west.
        let values = vec![
            0.0, -0.25, 0.0, 500_000.0, //
            -0.25, 0.0, 0.0, 4_000_000.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ];
        let header = StubHeader {
            transform: Some(values),
            wgs84_utm: Some((UtmZone::new(18).unwrap(), Hemisphere::North)),
            ..Default::default()
        };
        let camera = crate::GeoCamera::from_header(&header, None).unwrap();
        assert_eq!(camera.transform().pixel_to_native(4.0, 8.0), (499_998.0, 3_999_999.0));

        let (u, v) = camera.transform().native_to_pixel(499_998.0, 3_999_999.0);
        approx::assert_abs_diff_eq!(u, 4.0, epsilon = 1e-9);
        approx::assert_abs_diff_eq!(v, 8.0, epsilon = 1e-9);

        let spacing = camera.pixel_spacing();
        approx::assert_abs_diff_eq!(spacing.sx, 0.25, epsilon = 1e-3);
        approx::assert_abs_diff_eq!(spacing.sy, 0.25, epsilon = 1e-3);
    }

    #[test]
    fn test_nad83_utm() {
        let header = StubHeader {
            tie_points: vec![[0.0, 0.0, 0.0, 500_000.0, 4_000_000.0, 0.0]],
            scale: Some([1.0, 1.0, 0.0]),
            nad83_utm: Some((UtmZone::new(11).unwrap(), Hemisphere::North)),
            ..Default::default()
        };
        assert_eq!(canonical_from_header(&header).unwrap().utm.unwrap().zone.number(), 11);
    }

    #[test]
    fn test_rejections() {
        let empty = StubHeader {
            geographic: true,
            ..Default::default()
        };
        assert!(matches!(
            canonical_from_header(&empty),
            Err(GeoCameraError::Configuration(_))
        ));

        let no_ties = StubHeader {
            scale: Some([1.0, 1.0, 0.0]),
            geographic: true,
            ..Default::default()
        };
        assert!(canonical_from_header(&no_ties).is_err());

        let short_matrix = StubHeader {
            transform: Some(vec![1.0; 9]),
            geographic: true,
            ..Default::default()
        };
        assert!(canonical_from_header(&short_matrix).is_err());

        let unsupported_model = StubHeader {
            tie_points: vec![[0.0; 6]],
            scale: Some([1.0, 1.0, 0.0]),
            ..Default::default()
        };
        assert!(matches!(
            canonical_from_header(&unsupported_model),
            Err(GeoCameraError::Configuration(_))
        ));
    }
}
