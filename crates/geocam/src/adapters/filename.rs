//! Filename-encoded tile adapter.
//!
//! Tiles named like `prefix_N35W73_S0.6x0.6_suffix.tif` carry the tile
//! position and extent in the name: the coordinate token `N35W73` gives the
//! latitude of the southern edge and the longitude of the western edge, and
//! the scale token `S0.6x0.6` the latitude and longitude extents in degrees.
//!
//! Adjacent tiles share one row/column of pixels, so the extent is spread
//! over `n - 1` pixel steps and the origin is pulled inward by `0.5 / (n - 1)`.

use crate::camera::CanonicalTransform;
use crate::transform::AffineGeoTransform;
use crate::{GeoCameraError, Result};
use geocam_geodesy::Hemisphere;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Sign convention of the native coordinates produced from a tile name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilenameConvention {
    /// Unsigned magnitudes relative to the named hemisphere and direction.
    HemisphereRelative,
    /// Signed WGS84 degrees: south and west are negative.
    Global,
}

/// East/west marker of a tile name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Eastern longitudes.
    East,
    /// Western longitudes.
    West,
}

/// Position and extent parsed from a tile name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileName {
    /// Latitude marker.
    pub hemisphere: Hemisphere,
    /// Latitude magnitude in degrees.
    pub lat: f64,
    /// Longitude marker.
    pub direction: Direction,
    /// Longitude magnitude in degrees.
    pub lon: f64,
    /// Latitude extent in degrees.
    pub scale_lat: f64,
    /// Longitude extent in degrees.
    pub scale_lon: f64,
}

impl TileName {
    /// Parse a tile name; leading directories and an extension are ignored.
    pub fn parse(name: &str) -> Result<Self> {
        let (coords, scale) = tile_tokens(name)?;

        let (hemisphere, h_at) = match (coords.find('N'), coords.find('S')) {
            (Some(at), _) => (Hemisphere::North, at),
            (None, Some(at)) => (Hemisphere::South, at),
            (None, None) => return Err(malformed(name, "missing N/S marker")),
        };
        let (direction, d_at) = match (coords.find('E'), coords.find('W')) {
            (Some(at), _) => (Direction::East, at),
            (None, Some(at)) => (Direction::West, at),
            (None, None) => return Err(malformed(name, "missing E/W marker")),
        };
        if d_at < h_at {
            return Err(malformed(name, "longitude marker precedes latitude marker"));
        }

        let s_at = scale
            .find('S')
            .ok_or_else(|| malformed(name, "missing S scale marker"))?;
        let (scale_lat, scale_lon) = scale[s_at + 1..]
            .split_once('x')
            .ok_or_else(|| malformed(name, "missing x scale separator"))?;

        let tile = TileName {
            hemisphere,
            lat: parse_number(name, &coords[h_at + 1..d_at])?,
            direction,
            lon: parse_number(name, &coords[d_at + 1..])?,
            scale_lat: parse_number(name, scale_lat)?,
            scale_lon: parse_number(name, scale_lon)?,
        };
        debug!(?tile, "Parsed tile name");
        Ok(tile)
    }

    /// Latitude with south negative.
    pub fn signed_lat(&self) -> f64 {
        match self.hemisphere {
            Hemisphere::North => self.lat,
            Hemisphere::South => -self.lat,
        }
    }

    /// Longitude with west negative.
    pub fn signed_lon(&self) -> f64 {
        match self.direction {
            Direction::East => self.lon,
            Direction::West => -self.lon,
        }
    }

    /// Transform placing pixel `(0, 0)` at the upper-left corner and pixel
    /// `(ni - 1, nj - 1)` at the lower-right corner.
    pub fn transform(&self, ni: u32, nj: u32, convention: FilenameConvention) -> Result<AffineGeoTransform> {
        if ni < 2 || nj < 2 {
            return Err(GeoCameraError::configuration(format!(
                "tile of {}x{} pixels is too small for the overlap convention",
                ni, nj
            )));
        }
        let steps_i = f64::from(ni) - 1.0;
        let steps_j = f64::from(nj) - 1.0;

        let transform = match convention {
            FilenameConvention::Global => {
                let top = self.signed_lat() + self.scale_lat;
                AffineGeoTransform::scaled(
                    self.scale_lon / steps_i,
                    -self.scale_lat / steps_j,
                    self.signed_lon() + 0.5 / steps_i,
                    top - 0.5 / steps_j,
                )
            }
            FilenameConvention::HemisphereRelative => {
                let sign_x = match self.direction {
                    Direction::East => 1.0,
                    Direction::West => -1.0,
                };
                let sign_y = match self.hemisphere {
                    Hemisphere::North => -1.0,
                    Hemisphere::South => 1.0,
                };
                let top = self.lat - sign_y * self.scale_lat;
                AffineGeoTransform::scaled(
                    sign_x * self.scale_lon / steps_i,
                    sign_y * self.scale_lat / steps_j,
                    self.lon + sign_x * 0.5 / steps_i,
                    top + sign_y * 0.5 / steps_j,
                )
            }
        };
        debug!(
            upper_left = ?transform.pixel_to_native(0.0, 0.0),
            lower_right = ?transform.pixel_to_native(steps_i, steps_j),
            ?convention,
            "Tile corners"
        );
        Ok(transform)
    }
}

/// Build the canonical transform for a tile name.
pub fn canonical_from_filename(
    name: &str,
    ni: u32,
    nj: u32,
    convention: FilenameConvention,
) -> Result<CanonicalTransform> {
    let transform = TileName::parse(name)?.transform(ni, nj, convention)?;
    Ok(CanonicalTransform { transform, utm: None })
}

/// Split a tile name into its coordinate and scale tokens.
fn tile_tokens(name: &str) -> Result<(&str, &str)> {
    let file = Path::new(name)
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| malformed(name, "no file name"))?;
    let stem = match file.rsplit_once('.') {
        Some((stem, ext)) if is_extension(ext) => stem,
        _ => file,
    };
    let (_, rest) = stem
        .split_once('_')
        .ok_or_else(|| malformed(name, "no '_' before the coordinate token"))?;
    let mut tokens = rest.split('_');
    let coords = tokens.next().unwrap_or_default();
    let scale = tokens
        .next()
        .ok_or_else(|| malformed(name, "no scale token"))?;
    Ok((coords, scale))
}

/// An extension has a letter and is not the tail of a scale token
/// such as the `6x1` of `S0.6x1`.
fn is_extension(ext: &str) -> bool {
    let scale_tail = ext
        .split_once('x')
        .map_or(false, |(a, b)| a.parse::<f64>().is_ok() && b.parse::<f64>().is_ok());
    ext.chars().any(|c| c.is_ascii_alphabetic()) && !scale_tail
}

fn parse_number(name: &str, text: &str) -> Result<f64> {
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| malformed(name, &format!("invalid number '{}'", text)))
}

fn malformed(name: &str, reason: &str) -> GeoCameraError {
    GeoCameraError::format(format!("tile name '{}': {}", name, reason))
}
