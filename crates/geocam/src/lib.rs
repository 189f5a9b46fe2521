//! # geocam
//!
//! A geodetic camera model: maps raster pixels to geographic coordinates
//! (WGS84 longitude/latitude or UTM easting/northing), and geographic
//! coordinates to a local tangent-plane frame.
//!
//! ## Overview
//!
//! A [`GeoCamera`] combines:
//! - an [`AffineGeoTransform`] from pixels to native coordinates
//! - optional [`UtmMetadata`] when the native coordinates are UTM
//! - an optional [`CoordinateContext`](geocam_geodesy::CoordinateContext)
//!   defining the local frame used by [`GeoCamera::project`] and
//!   [`GeoCamera::backproject`]
//!
//! Cameras are built from a GeoTIFF header, a GDAL geotransform, a tile name
//! such as `ortho_N35W73_S0.6x0.6_rgb.tif`, a world file, or a YAML
//! [`CameraConfig`] naming one of those sources. All of them go through one
//! canonical constructor, which also computes the ground pixel spacing.
//!
//! ## Example
//!
//! ```
//! use geocam::GeoCamera;
//! use geocam_geodesy::{CoordinateContext, Hemisphere};
//!
//! // 0.5 m pixels in UTM zone 18N, local frame anchored near the image.
//! let gt = [580_000.0, 0.5, 0.0, 4_500_000.0, 0.0, -0.5];
//! let context = CoordinateContext::utm(40.63, -74.05, 0.0);
//! let camera = GeoCamera::from_geotransform(gt, 18, Hemisphere::North, Some(context))?;
//!
//! let (x, y, z) = camera.backproject(100.0, 200.0);
//! let (u, v) = camera.project(x, y, z);
//! assert!((u - 100.0).abs() < 1e-4 && (v - 200.0).abs() < 1e-4);
//! # Ok::<(), geocam::GeoCameraError>(())
//! ```

pub mod adapters;
mod camera;
mod codec;
mod config;
mod error;
mod frame;
mod tiff_header;
mod transform;

pub use adapters::{CanonicalTransform, FilenameConvention, GeoHeader, TileName};
pub use camera::{GeoCamera, PixelSpacing, UtmMetadata};
pub use codec::{decode_camera, encode_camera, read_binary, write_binary, RecordVersion};
pub use config::{CameraConfig, CameraSource, ContextConfig};
pub use error::GeoCameraError;
pub use frame::{resolve_frame, EffectiveFrame};
pub use tiff_header::{GeoKeys, TiffGeoHeader};
pub use transform::AffineGeoTransform;

/// Result type for geo camera operations.
pub type Result<T> = std::result::Result<T, GeoCameraError>;
