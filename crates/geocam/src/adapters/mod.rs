//! Construction adapters.
//!
//! Each adapter turns one kind of georeferencing source into a
//! [`CanonicalTransform`]; [`GeoCamera::from_canonical`] then builds the
//! camera and extracts its pixel spacing.

mod filename;
mod geotransform;
mod header;
mod world_file;

pub use filename::{canonical_from_filename, Direction, FilenameConvention, TileName};
pub use geotransform::canonical_from_geotransform;
pub use header::{canonical_from_header, GeoHeader};
pub use world_file::{parse_world_file, read_world_file};

pub use crate::camera::CanonicalTransform;

use crate::camera::GeoCamera;
use crate::tiff_header::TiffGeoHeader;
use crate::Result;
use geocam_geodesy::{CoordinateContext, Hemisphere};
use std::path::Path;

impl GeoCamera {
    /// Camera from raster header metadata.
    pub fn from_header<H: GeoHeader + ?Sized>(header: &H, context: Option<CoordinateContext>) -> Result<Self> {
        Ok(Self::from_canonical(canonical_from_header(header)?, context))
    }

    /// Camera from the GeoTIFF tags of a file.
    pub fn from_geotiff<P: AsRef<Path>>(path: P, context: Option<CoordinateContext>) -> Result<Self> {
        let header = TiffGeoHeader::open(path)?;
        Self::from_header(&header, context)
    }

    /// Camera from a GDAL geotransform; zone 0 means not UTM.
    pub fn from_geotransform(
        geotransform: [f64; 6],
        utm_zone: u8,
        hemisphere: Hemisphere,
        context: Option<CoordinateContext>,
    ) -> Result<Self> {
        let canonical = canonical_from_geotransform(geotransform, utm_zone, hemisphere)?;
        Ok(Self::from_canonical(canonical, context))
    }

    /// Camera from a tile name of an `ni` x `nj` image.
    pub fn from_filename(
        name: &str,
        ni: u32,
        nj: u32,
        convention: FilenameConvention,
        context: Option<CoordinateContext>,
    ) -> Result<Self> {
        let canonical = canonical_from_filename(name, ni, nj, convention)?;
        Ok(Self::from_canonical(canonical, context))
    }

    /// Camera from a world file; zone 0 means not UTM.
    pub fn from_world_file<P: AsRef<Path>>(
        path: P,
        utm_zone: u8,
        hemisphere: Hemisphere,
        context: Option<CoordinateContext>,
    ) -> Result<Self> {
        let canonical = read_world_file(path, utm_zone, hemisphere)?;
        Ok(Self::from_canonical(canonical, context))
    }
}
