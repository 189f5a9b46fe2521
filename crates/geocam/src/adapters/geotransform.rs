//! GDAL geotransform adapter.
//!
//! ```text
//! Xgeo = GT0 + Xpixel * GT1 + Yline * GT2
//! Ygeo = GT3 + Xpixel * GT4 + Yline * GT5
//! ```
//!
//! Pixel `(0, 0)` is the top-left corner of the top-left pixel.

use crate::camera::{CanonicalTransform, UtmMetadata};
use crate::transform::AffineGeoTransform;
use crate::Result;
use geocam_geodesy::Hemisphere;

/// Build the canonical transform for a geotransform; zone 0 means not UTM.
pub fn canonical_from_geotransform(
    geotransform: [f64; 6],
    utm_zone: u8,
    hemisphere: Hemisphere,
) -> Result<CanonicalTransform> {
    Ok(CanonicalTransform {
        transform: AffineGeoTransform::from_geotransform(geotransform),
        utm: UtmMetadata::from_zone_number(utm_zone, hemisphere)?,
    })
}
