//! YAML camera configuration.
//!
//! ```yaml
//! source:
//!   type: world_file
//!   path: ortho.tfw
//!   utm_zone: 18
//!   hemisphere: north
//! context:
//!   kind: utm
//!   latitude: 40.6
//!   longitude: -74.0
//!   elevation: 12.0
//! ```
//!
//! Relative paths in a configuration file are resolved against the directory
//! containing it.

use crate::adapters::FilenameConvention;
use crate::camera::GeoCamera;
use crate::Result;
use geocam_geodesy::{CoordinateContext, GlobalFrame, Hemisphere};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where a camera's georeferencing comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum CameraSource {
    /// GeoTIFF header tags.
    Geotiff {
        /// Path to the GeoTIFF.
        path: PathBuf,
    },
    /// GDAL geotransform `(ox, px_w, row_rot, oy, col_rot, px_h)`.
    Geotransform {
        /// The six coefficients.
        geotransform: [f64; 6],
        /// UTM zone, 0 when geographic.
        #[serde(default)]
        utm_zone: u8,
        /// Hemisphere of the UTM zone.
        #[serde(default)]
        hemisphere: Hemisphere,
    },
    /// Position and extent encoded in a tile name.
    Filename {
        /// Tile file name.
        name: String,
        /// Image width in pixels.
        ni: u32,
        /// Image height in pixels.
        nj: u32,
        /// Sign convention of the resulting native coordinates.
        convention: FilenameConvention,
    },
    /// World file.
    WorldFile {
        /// Path to the world file.
        path: PathBuf,
        /// UTM zone, 0 when geographic.
        #[serde(default)]
        utm_zone: u8,
        /// Hemisphere of the UTM zone.
        #[serde(default)]
        hemisphere: Hemisphere,
    },
}

/// Local coordinate context attached to the camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContextConfig {
    /// Frame of the local axes.
    pub kind: GlobalFrame,
    /// Origin latitude in degrees.
    pub latitude: f64,
    /// Origin longitude in degrees.
    pub longitude: f64,
    /// Origin elevation in meters.
    #[serde(default)]
    pub elevation: f64,
}

impl ContextConfig {
    /// Build the coordinate context.
    pub fn to_context(&self) -> CoordinateContext {
        match self.kind {
            GlobalFrame::Wgs84 => CoordinateContext::wgs84(self.latitude, self.longitude, self.elevation),
            GlobalFrame::Utm => CoordinateContext::utm(self.latitude, self.longitude, self.elevation),
        }
    }
}

/// A camera description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CameraConfig {
    /// Georeferencing source.
    pub source: CameraSource,
    /// Optional local coordinate context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextConfig>,
}

impl CameraConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load a configuration file, resolving relative source paths against
    /// its directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml_str(&text)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        debug!(?config, "Loaded camera configuration from {}", path.display());
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        match &mut self.source {
            CameraSource::Geotiff { path } | CameraSource::WorldFile { path, .. } if path.is_relative() => {
                *path = base.join(&*path);
            }
            _ => {}
        }
    }

    /// Build the camera through the matching adapter.
    pub fn build(&self) -> Result<GeoCamera> {
        let context = self.context.as_ref().map(ContextConfig::to_context);
        match &self.source {
            CameraSource::Geotiff { path } => GeoCamera::from_geotiff(path, context),
            CameraSource::Geotransform {
                geotransform,
                utm_zone,
                hemisphere,
            } => GeoCamera::from_geotransform(*geotransform, *utm_zone, *hemisphere, context),
            CameraSource::Filename {
                name,
                ni,
                nj,
                convention,
            } => GeoCamera::from_filename(name, *ni, *nj, *convention, context),
            CameraSource::WorldFile {
                path,
                utm_zone,
                hemisphere,
            } => GeoCamera::from_world_file(path, *utm_zone, *hemisphere, context),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GeoCameraError;

    #[test]
    fn test_parse_geotransform() {
        let yaml = r#"
source:
  type: geotransform
  geotransform: [580000.0, 0.5, 0.0, 4500000.0, 0.0, -0.5]
  utm_zone: 18
context:
  kind: wgs84
  latitude: 40.64
  longitude: -74.05
"#;
        let config = CameraConfig::from_yaml_str(yaml).unwrap();
        assert!(matches!(
            config.source,
            CameraSource::Geotransform {
                utm_zone: 18,
                hemisphere: Hemisphere::North,
                ..
            }
        ));
        let context = config.context.as_ref().unwrap();
        assert_eq!(context.kind, GlobalFrame::Wgs84);
        assert_eq!(context.elevation, 0.0);

        let camera = config.build().unwrap();
        assert!(camera.is_utm());
        assert_eq!(camera.pixel_spacing().sx, 0.5);
        assert_eq!(camera.context().unwrap().kind(), GlobalFrame::Wgs84);
    }

    #[test]
    fn test_parse_filename() {
        let yaml = r#"
source:
  type: filename
  name: ortho_N35W73_S0.6x0.6_rgb.tif
  ni: 1001
  nj: 1001
  convention: global
"#;
        let camera = CameraConfig::from_yaml_str(yaml).unwrap().build().unwrap();
        assert!(!camera.is_utm());
        assert!(camera.context().is_none());
    }

    #[test]
    fn test_filename_convention_required() {
        let yaml = r#"
source:
  type: filename
  name: ortho_N35W73_S0.6x0.6_rgb.tif
  ni: 1001
  nj: 1001
"#;
        assert!(matches!(
            CameraConfig::from_yaml_str(yaml),
            Err(GeoCameraError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let yaml = r#"
source:
  type: geotiff
  path: a.tif
  zone: 3
"#;
        assert!(CameraConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_relative_paths_resolved() {
        let mut config = CameraConfig {
            source: CameraSource::WorldFile {
                path: PathBuf::from("ortho.tfw"),
                utm_zone: 0,
                hemisphere: Hemisphere::North,
            },
            context: None,
        };
        config.resolve_paths(Path::new("/data/site"));
        assert_eq!(
            config.source,
            CameraSource::WorldFile {
                path: PathBuf::from("/data/site/ortho.tfw"),
                utm_zone: 0,
                hemisphere: Hemisphere::North,
            }
        );
    }

    #[test]
    fn test_missing_source_file() {
        let config = CameraConfig {
            source: CameraSource::Geotiff {
                path: std::env::temp_dir().join("geocam_config_missing.tif"),
            },
            context: None,
        };
        assert!(matches!(config.build(), Err(GeoCameraError::Io(_))));
    }
}
