//! # geocam-geodesy
//!
//! Geodetic building blocks for the `geocam` camera model:
//!
//! - [`ellipsoid`] - WGS84 constants and ECEF / East-North-Up conversions
//! - [`utm`] - UTM projection (Krüger series) with validated zones
//! - [`CoordinateContext`] - a local tangent-plane frame anchored at a
//!   geographic origin, convertible to and from WGS84 or UTM
//!
//! NAD83 UTM coordinates are served by the same projection; datum shifts
//! between NAD83 and WGS84 are not modelled.
//!
//! ## Example
//!
//! ```
//! use geocam_geodesy::{CoordinateContext, GlobalFrame};
//!
//! let ctx = CoordinateContext::wgs84(47.6062, -122.3321, 0.0);
//! let (lon, lat, elev) = ctx.local_to_global(100.0, 50.0, 0.0, GlobalFrame::Wgs84);
//! let (x, y, _) = ctx.global_to_local(lon, lat, elev, GlobalFrame::Wgs84);
//! assert!((x - 100.0).abs() < 1e-6 && (y - 50.0).abs() < 1e-6);
//! ```

mod context;
pub mod ellipsoid;
mod error;
pub mod utm;

pub use context::{CoordinateContext, GlobalFrame, CONTEXT_RECORD_VERSION};
pub use error::GeodesyError;
pub use utm::{Hemisphere, UtmCoord, UtmZone};

/// Result type for geodesy operations.
pub type Result<T> = std::result::Result<T, GeodesyError>;
