//! World-file (`.tfw`, `.jgw`, ...) adapter and export.
//!
//! A world file holds six numbers, one per line:
//!
//! ```text
//! pixel width          (T00)
//! row rotation         (T01)
//! column rotation      (T10)
//! pixel height         (T11, negative for north-up images)
//! upper-left x         (T03)
//! upper-left y         (T13)
//! ```

use crate::camera::{CanonicalTransform, GeoCamera, UtmMetadata};
use crate::transform::AffineGeoTransform;
use crate::{GeoCameraError, Result};
use geocam_geodesy::Hemisphere;
use nalgebra::Matrix4;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Matrix entries stored in a world file, in file order.
const WORLD_FILE_ENTRIES: [(usize, usize); 6] = [(0, 0), (0, 1), (1, 0), (1, 1), (0, 3), (1, 3)];

/// Parse world-file text; zone 0 means not UTM.
pub fn parse_world_file(text: &str, utm_zone: u8, hemisphere: Hemisphere) -> Result<CanonicalTransform> {
    let values = text
        .split_whitespace()
        .map(|token| {
            token
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| GeoCameraError::format(format!("world file: invalid number '{}'", token)))
        })
        .collect::<Result<Vec<f64>>>()?;
    if values.len() != WORLD_FILE_ENTRIES.len() {
        return Err(GeoCameraError::format(format!(
            "world file: expected 6 values, found {}",
            values.len()
        )));
    }

    let mut matrix = Matrix4::identity();
    for (&(row, col), &value) in WORLD_FILE_ENTRIES.iter().zip(&values) {
        matrix[(row, col)] = value;
    }
    Ok(CanonicalTransform {
        transform: AffineGeoTransform::new(matrix, true),
        utm: UtmMetadata::from_zone_number(utm_zone, hemisphere)?,
    })
}

/// Read a world file from disk; zone 0 means not UTM.
pub fn read_world_file<P: AsRef<Path>>(
    path: P,
    utm_zone: u8,
    hemisphere: Hemisphere,
) -> Result<CanonicalTransform> {
    let path = path.as_ref();
    debug!("Reading world file {}", path.display());
    let text = std::fs::read_to_string(path)?;
    parse_world_file(&text, utm_zone, hemisphere)
}

/// Round to 12 significant digits.
fn significant_12(value: f64) -> f64 {
    format!("{:.11e}", value).parse().unwrap_or(value)
}

impl GeoCamera {
    /// Write the world-file representation of the transform.
    pub fn write_world_file<W: Write>(&self, writer: &mut W) -> Result<()> {
        for (row, col) in WORLD_FILE_ENTRIES {
            writeln!(writer, "{}", significant_12(self.transform().get(row, col)))?;
        }
        Ok(())
    }

    /// Save the world-file representation to `path`.
    pub fn save_as_world_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut file = std::fs::File::create(path)?;
        self.write_world_file(&mut file)?;
        debug!("Saved world file {}", path.display());
        Ok(())
    }
}
