//! Geo camera state: transform, UTM metadata, coordinate context and the
//! cached pixel spacing.

use crate::frame::{resolve_frame, EffectiveFrame};
use crate::transform::AffineGeoTransform;
use crate::{GeoCameraError, Result};
use geocam_geodesy::utm::{self, Hemisphere, UtmCoord, UtmZone};
use geocam_geodesy::{CoordinateContext, GlobalFrame};
use tracing::{trace, warn};

/// Pixel distance used by the finite-difference spacing probe.
const SPACING_PROBE_PIXELS: f64 = 100_000.0;

/// Zone and hemisphere of a UTM-addressed camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtmMetadata {
    /// UTM zone of the native coordinates.
    pub zone: UtmZone,
    /// Hemisphere of the native northings.
    pub hemisphere: Hemisphere,
}

impl UtmMetadata {
    /// Create UTM metadata.
    pub fn new(zone: UtmZone, hemisphere: Hemisphere) -> Self {
        Self { zone, hemisphere }
    }

    /// UTM metadata from a raw zone number, where 0 means "not UTM".
    pub fn from_zone_number(zone: u8, hemisphere: Hemisphere) -> Result<Option<Self>> {
        if zone == 0 {
            return Ok(None);
        }
        Ok(Some(Self::new(UtmZone::new(zone)?, hemisphere)))
    }
}

/// Ground distance covered by one pixel along each image axis, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelSpacing {
    /// Spacing along image columns (i axis).
    pub sx: f64,
    /// Spacing along image rows (j axis).
    pub sy: f64,
}

/// Transform and UTM metadata produced by a construction adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalTransform {
    /// Pixel <-> native transform.
    pub transform: AffineGeoTransform,
    /// UTM metadata when the native coordinates are UTM.
    pub utm: Option<UtmMetadata>,
}

/// A camera mapping raster pixels to geographic and local coordinates.
///
/// Cloning a camera deep-copies its coordinate context. Every mutation
/// refreshes the cached pixel spacing.
#[derive(Debug, Clone)]
pub struct GeoCamera {
    transform: AffineGeoTransform,
    utm: Option<UtmMetadata>,
    context: Option<CoordinateContext>,
    spacing: PixelSpacing,
}

impl GeoCamera {
    /// Create a camera from a transform and an optional context.
    pub fn new(transform: AffineGeoTransform, context: Option<CoordinateContext>) -> Self {
        Self::from_canonical(CanonicalTransform { transform, utm: None }, context)
    }

    /// Create a camera from an adapter result. All constructors end here.
    pub fn from_canonical(canonical: CanonicalTransform, context: Option<CoordinateContext>) -> Self {
        let mut camera = GeoCamera {
            transform: canonical.transform,
            utm: canonical.utm,
            context,
            spacing: PixelSpacing::default(),
        };
        camera.refresh_pixel_spacing();
        camera
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The pixel <-> native transform.
    pub fn transform(&self) -> &AffineGeoTransform {
        &self.transform
    }

    /// UTM metadata, if the camera's native coordinates are UTM.
    pub fn utm(&self) -> Option<UtmMetadata> {
        self.utm
    }

    /// Whether native coordinates are UTM easting/northing.
    pub fn is_utm(&self) -> bool {
        self.utm.is_some()
    }

    /// The attached coordinate context.
    pub fn context(&self) -> Option<&CoordinateContext> {
        self.context.as_ref()
    }

    /// Ground spacing of one pixel, computed when the camera last changed.
    pub fn pixel_spacing(&self) -> PixelSpacing {
        self.spacing
    }

    /// Frame local coordinates are exchanged in.
    pub fn effective_frame(&self) -> EffectiveFrame {
        resolve_frame(self.context.as_ref().map(|c| c.kind()), self.is_utm())
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Declare the native coordinates to be UTM in the given zone.
    pub fn set_utm(&mut self, zone: UtmZone, hemisphere: Hemisphere) {
        self.utm = Some(UtmMetadata::new(zone, hemisphere));
        self.refresh_pixel_spacing();
    }

    /// Declare the native coordinates to be longitude/latitude.
    pub fn clear_utm(&mut self) {
        self.utm = None;
        self.refresh_pixel_spacing();
    }

    /// Select the diagonal fast path (`true`) or the full-matrix path.
    pub fn set_scale_format(&mut self, scale_tag: bool) {
        self.transform.set_scale_tag(scale_tag);
        self.refresh_pixel_spacing();
    }

    /// Attach, replace or remove the coordinate context.
    pub fn set_context(&mut self, context: Option<CoordinateContext>) {
        self.context = context;
        self.refresh_pixel_spacing();
    }

    /// Shift the image origin by `(tx, ty)` pixels.
    ///
    /// The z offset of a 3D translation has no effect on a planar camera and
    /// is not taken.
    pub fn translate(&mut self, tx: f64, ty: f64) {
        self.transform.translate_pixels(tx, ty);
        self.refresh_pixel_spacing();
    }

    fn refresh_pixel_spacing(&mut self) {
        self.spacing = self.compute_pixel_spacing();
    }

    /// Closed form for UTM diagonal transforms; otherwise a finite-difference
    /// probe through a local frame (the attached context, or a WGS84 frame at
    /// pixel `(0, 0)`).
    fn compute_pixel_spacing(&self) -> PixelSpacing {
        if self.is_utm() && self.transform.scale_tag() {
            return PixelSpacing {
                sx: self.transform.get(0, 0),
                sy: self.transform.get(1, 1).abs(),
            };
        }

        let (lon0, lat0) = self.img_to_global(0.0, 0.0);
        let fallback;
        let ctx = match &self.context {
            Some(ctx) => ctx,
            None => {
                fallback = CoordinateContext::wgs84(lat0, lon0, 0.0);
                &fallback
            }
        };

        let probe = |i: f64, j: f64| {
            let (lon, lat) = self.img_to_global(i, j);
            let (x, y, _) = ctx.global_to_local(lon, lat, 0.0, GlobalFrame::Wgs84);
            (x, y)
        };
        let (x0, y0) = probe(0.0, 0.0);
        let (xi, yi) = probe(SPACING_PROBE_PIXELS, 0.0);
        let (xj, yj) = probe(0.0, SPACING_PROBE_PIXELS);

        PixelSpacing {
            sx: (xi - x0).hypot(yi - y0) / SPACING_PROBE_PIXELS,
            sy: (xj - x0).hypot(yj - y0) / SPACING_PROBE_PIXELS,
        }
    }

    // ========================================================================
    // Local <-> global
    // ========================================================================

    /// Context and conversion frame, or `None` for the identity pass-through.
    fn resolved_context(&self) -> Option<(&CoordinateContext, GlobalFrame)> {
        let ctx = self.context.as_ref()?;
        resolve_frame(Some(ctx.kind()), self.is_utm())
            .global_frame()
            .map(|frame| (ctx, frame))
    }

    /// Convert a local point to global coordinates in the effective frame.
    ///
    /// The result is `(easting, northing, elevation)` when the effective frame
    /// is UTM, otherwise `(lon, lat, elevation)`.
    pub fn local_to_global(&self, x: f64, y: f64, z: f64) -> (f64, f64, f64) {
        match self.resolved_context() {
            Some((ctx, frame)) => ctx.local_to_global(x, y, z, frame),
            None => (x, y, z),
        }
    }

    /// Convert global coordinates in the effective frame to local coordinates.
    ///
    /// Fails without a context; the caller decides on a fallback.
    pub fn global_to_local(&self, gx: f64, gy: f64, gz: f64) -> Result<(f64, f64, f64)> {
        match self.resolved_context() {
            Some((ctx, frame)) => Ok(ctx.global_to_local(gx, gy, gz, frame)),
            None => {
                warn!("No coordinate context defined, cannot map global to local");
                Err(GeoCameraError::NoContext)
            }
        }
    }

    /// Elevation of the context origin, or 0 without a context.
    pub fn context_elevation_origin(&self) -> f64 {
        self.context.as_ref().map_or(0.0, CoordinateContext::elevation_origin)
    }

    /// Convert a local point to a UTM position in the zone containing it.
    pub fn local_to_utm(&self, x: f64, y: f64, z: f64) -> Result<UtmCoord> {
        let ctx = self.context.as_ref().ok_or(GeoCameraError::NoContext)?;
        let (lon, lat, _) = ctx.local_to_global(x, y, z, GlobalFrame::Wgs84);
        Ok(utm::to_utm(lat, lon))
    }

    // ========================================================================
    // Projection
    // ========================================================================

    /// Project a local 3D point into the image.
    pub fn project(&self, x: f64, y: f64, z: f64) -> (f64, f64) {
        let frame = self.effective_frame();
        trace!(?frame, x, y, z, "project");
        match self.resolved_context() {
            Some((ctx, GlobalFrame::Utm)) => {
                let (e, n, _) = ctx.local_to_global(x, y, z, GlobalFrame::Utm);
                let (zone, hemisphere) = ctx.utm_frame();
                self.global_utm_to_img(e, n, zone, hemisphere)
            }
            Some((ctx, GlobalFrame::Wgs84)) => {
                let (lon, lat, _) = ctx.local_to_global(x, y, z, GlobalFrame::Wgs84);
                self.global_to_img(lon, lat)
            }
            None => self.global_to_img(x, y),
        }
    }

    /// Back-project a pixel to local coordinates on the zero-elevation surface.
    ///
    /// Without a context the result is `(lon, lat, 0)`.
    pub fn backproject(&self, u: f64, v: f64) -> (f64, f64, f64) {
        let (nx, ny) = self.transform.pixel_to_native(u, v);
        trace!(frame = ?self.effective_frame(), u, v, nx, ny, "backproject");
        match (self.resolved_context(), self.utm) {
            (Some((ctx, GlobalFrame::Utm)), Some(utm))
                if ctx.utm_frame() == (utm.zone, utm.hemisphere) =>
            {
                ctx.global_to_local(nx, ny, 0.0, GlobalFrame::Utm)
            }
            (Some((ctx, _)), _) => {
                let (lon, lat) = self.native_to_lonlat(nx, ny);
                ctx.global_to_local(lon, lat, 0.0, GlobalFrame::Wgs84)
            }
            (None, _) => {
                let (lon, lat) = self.native_to_lonlat(nx, ny);
                (lon, lat, 0.0)
            }
        }
    }

    // ========================================================================
    // Pixel <-> global
    // ========================================================================

    fn native_to_lonlat(&self, nx: f64, ny: f64) -> (f64, f64) {
        match self.utm {
            Some(utm) => {
                let (lat, lon, _) = utm::to_latlon(utm.zone, utm.hemisphere, nx, ny, 0.0);
                (lon, lat)
            }
            None => (nx, ny),
        }
    }

    /// Pixel to WGS84 `(lon, lat)`.
    pub fn img_to_global(&self, i: f64, j: f64) -> (f64, f64) {
        let (nx, ny) = self.transform.pixel_to_native(i, j);
        self.native_to_lonlat(nx, ny)
    }

    /// WGS84 `(lon, lat)` to pixel. UTM cameras project into their own zone.
    pub fn global_to_img(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (nx, ny) = match self.utm {
            Some(utm) => utm::to_utm_in_zone(lat, lon, utm.zone, utm.hemisphere),
            None => (lon, lat),
        };
        self.transform.native_to_pixel(nx, ny)
    }

    /// Pixel to UTM. Non-UTM cameras use the zone containing the point.
    pub fn img_to_global_utm(&self, i: f64, j: f64) -> UtmCoord {
        let (nx, ny) = self.transform.pixel_to_native(i, j);
        match self.utm {
            Some(utm) => UtmCoord {
                easting: nx,
                northing: ny,
                zone: utm.zone,
                hemisphere: utm.hemisphere,
            },
            None => utm::to_utm(ny, nx),
        }
    }

    /// UTM position to pixel.
    ///
    /// Positions in a zone other than the camera's go through WGS84.
    pub fn global_utm_to_img(
        &self,
        easting: f64,
        northing: f64,
        zone: UtmZone,
        hemisphere: Hemisphere,
    ) -> (f64, f64) {
        if self.utm == Some(UtmMetadata::new(zone, hemisphere)) {
            return self.transform.native_to_pixel(easting, northing);
        }
        let (lat, lon, _) = utm::to_latlon(zone, hemisphere, easting, northing, 0.0);
        self.global_to_img(lon, lat)
    }

    /// UTM positions of the image corners `(0, 0)` and `(ni, nj)`.
    pub fn img_four_corners_in_utm(&self, ni: u32, nj: u32) -> Result<(UtmCoord, UtmCoord)> {
        if !self.is_utm() {
            return Err(GeoCameraError::NotUtm);
        }
        Ok((
            self.img_to_global_utm(0.0, 0.0),
            self.img_to_global_utm(f64::from(ni), f64::from(nj)),
        ))
    }

    // ========================================================================
    // Comparison
    // ========================================================================

    /// Compare every piece of state, including UTM metadata and the scale tag.
    pub fn matches_all(&self, other: &GeoCamera) -> bool {
        self.transform == other.transform && self.utm == other.utm && self.context == other.context
    }
}

/// Cameras compare equal when their matrices and contexts are equal; UTM
/// metadata and the scale tag are not compared (see [`GeoCamera::matches_all`]).
impl PartialEq for GeoCamera {
    fn eq(&self, other: &Self) -> bool {
        self.transform.matrix() == other.transform.matrix() && self.context == other.context
    }
}

impl std::fmt::Display for GeoCamera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let m = self.transform.matrix();
        for row in 0..4 {
            let cells: Vec<String> = (0..4).map(|col| format!("{:>18.9}", m[(row, col)])).collect();
            writeln!(f, "{}", cells.join(" "))?;
        }
        if let Some(ctx) = &self.context {
            writeln!(f, "{}", ctx)?;
        }
        match self.utm {
            None => write!(f, "WGS84 degrees/meters"),
            Some(utm) => write!(f, "UTM zone {}, {}", utm.zone, utm.hemisphere),
        }
    }
}

/// Reads the text written by the `Display` impl.
///
/// The dump does not carry the scale tag, so the parsed camera uses the
/// general matrix path. Values come back at the printed precision.
impl std::str::FromStr for GeoCamera {
    type Err = GeoCameraError;

    fn from_str(s: &str) -> Result<Self> {
        let lines: Vec<&str> = s.lines().map(str::trim).filter(|line| !line.is_empty()).collect();
        if lines.len() < 5 {
            return Err(GeoCameraError::format(format!(
                "camera dump: expected at least 5 lines, found {}",
                lines.len()
            )));
        }

        let mut values = Vec::with_capacity(16);
        for line in &lines[..4] {
            let row = line
                .split_whitespace()
                .map(|token| {
                    token
                        .parse::<f64>()
                        .map_err(|_| GeoCameraError::format(format!("camera dump: invalid number '{}'", token)))
                })
                .collect::<Result<Vec<f64>>>()?;
            if row.len() != 4 {
                return Err(GeoCameraError::format(format!(
                    "camera dump: matrix row '{}' does not have 4 values",
                    line
                )));
            }
            values.extend(row);
        }
        let transform = AffineGeoTransform::from_row_slice(&values, false)?;

        let (frame_line, context_lines) = lines[4..]
            .split_last()
            .ok_or_else(|| GeoCameraError::format("camera dump: missing frame line"))?;
        let context = if context_lines.is_empty() {
            None
        } else {
            Some(context_lines.join("\n").parse::<CoordinateContext>()?)
        };

        let utm = if *frame_line == "WGS84 degrees/meters" {
            None
        } else {
            let (zone, hemisphere) = frame_line
                .strip_prefix("UTM zone ")
                .and_then(|rest| rest.split_once(", "))
                .ok_or_else(|| GeoCameraError::format(format!("camera dump: unknown frame line '{}'", frame_line)))?;
            let zone = zone
                .parse::<u8>()
                .map_err(|_| GeoCameraError::format(format!("camera dump: invalid zone '{}'", zone)))?;
            Some(UtmMetadata::new(UtmZone::new(zone)?, hemisphere.parse::<Hemisphere>()?))
        };

        Ok(Self::from_canonical(CanonicalTransform { transform, utm }, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use geocam_geodesy::ellipsoid::{WGS84_A, WGS84_E2};
    use nalgebra::Matrix4;

    fn zone(n: u8) -> UtmZone {
        UtmZone::new(n).unwrap()
    }

    fn utm_camera(context: Option<CoordinateContext>) -> GeoCamera {
        GeoCamera::from_canonical(
            CanonicalTransform {
                transform: AffineGeoTransform::scaled(0.6, -0.6, 580_000.0, 4_500_000.0),
                utm: Some(UtmMetadata::new(zone(18), Hemisphere::North)),
            },
            context,
        )
    }

    fn wgs84_camera(context: Option<CoordinateContext>) -> GeoCamera {
        GeoCamera::new(AffineGeoTransform::scaled(1e-5, -1e-5, -73.0, 35.6), context)
    }

    #[test]
    fn test_closed_form_spacing() {
        let camera = utm_camera(None);
        assert_eq!(camera.pixel_spacing(), PixelSpacing { sx: 0.6, sy: 0.6 });
    }

    #[test]
    fn test_finite_difference_spacing_at_equator() {
        let deg: f64 = 1e-6;
        #[rustfmt::skip]
        let m = Matrix4::new(
            deg, 0.0,  0.0, 0.0,
            0.0, -deg, 0.0, 0.0,
            0.0, 0.0,  1.0, 0.0,
            0.0, 0.0,  0.0, 1.0,
        );
        let camera = GeoCamera::new(AffineGeoTransform::new(m, false), None);

        let expected_sx = WGS84_A * deg.to_radians();
        let expected_sy = WGS84_A * (1.0 - WGS84_E2) * deg.to_radians();
        let spacing = camera.pixel_spacing();
        assert_relative_eq!(spacing.sx, expected_sx, max_relative = 1e-3);
        assert_relative_eq!(spacing.sy, expected_sy, max_relative = 1e-3);
    }

    #[test]
    fn test_spacing_refreshes_on_set_utm() {
        let mut camera = GeoCamera::new(AffineGeoTransform::scaled(0.5, -0.5, 580_000.0, 4_500_000.0), None);
        camera.set_utm(zone(18), Hemisphere::North);
        assert_eq!(camera.pixel_spacing(), PixelSpacing { sx: 0.5, sy: 0.5 });
    }

    #[test]
    fn test_spacing_refreshes_on_clear_utm() {
        let mut camera = wgs84_camera(None);
        let geographic = camera.pixel_spacing();
        assert!(geographic.sx > 0.5 && geographic.sy > 1.0, "{:?}", geographic);

        // Declaring the degree values UTM meters gives the closed form.
        camera.set_utm(zone(18), Hemisphere::North);
        assert_eq!(camera.pixel_spacing(), PixelSpacing { sx: 1e-5, sy: 1e-5 });

        camera.clear_utm();
        assert!(!camera.is_utm());
        assert_eq!(camera.pixel_spacing(), geographic);
    }

    #[test]
    fn test_identity_frame_without_context() {
        let camera = wgs84_camera(None);
        assert_eq!(camera.effective_frame(), EffectiveFrame::Identity);
        assert_eq!(camera.local_to_global(1.0, 2.0, 3.0), (1.0, 2.0, 3.0));
        assert!(matches!(
            camera.global_to_local(1.0, 2.0, 3.0),
            Err(GeoCameraError::NoContext)
        ));
        assert_eq!(camera.context_elevation_origin(), 0.0);

        let (u, v) = camera.project(-72.99, 35.59, 0.0);
        assert_abs_diff_eq!(u, 1000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(v, 1000.0, epsilon = 1e-6);

        let (lon, lat, z) = camera.backproject(1000.0, 1000.0);
        assert_abs_diff_eq!(lon, -72.99, epsilon = 1e-12);
        assert_abs_diff_eq!(lat, 35.59, epsilon = 1e-12);
        assert_eq!(z, 0.0);
    }

    #[test]
    fn test_wgs84_project_backproject_roundtrip() {
        let camera = wgs84_camera(Some(CoordinateContext::wgs84(35.59, -72.99, 0.0)));
        assert_eq!(camera.effective_frame(), EffectiveFrame::Wgs84);
        for &(u, v) in &[(0.0, 0.0), (1000.0, 1000.0), (250.5, 1733.25)] {
            let (x, y, z) = camera.backproject(u, v);
            let (u2, v2) = camera.project(x, y, z);
            assert_relative_eq!(u2, u, epsilon = 1e-6, max_relative = 1e-6);
            assert_relative_eq!(v2, v, epsilon = 1e-6, max_relative = 1e-6);
        }
    }

    #[test]
    fn test_utm_project_backproject_roundtrip() {
        let ctx = CoordinateContext::from_utm_origin(580_300.0, 4_499_700.0, 10.0, zone(18), Hemisphere::North);
        let camera = utm_camera(Some(ctx));
        assert_eq!(camera.effective_frame(), EffectiveFrame::Utm);

        let (x, y, z) = camera.backproject(500.0, 500.0);
        assert_abs_diff_eq!(x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(y, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(z, -10.0, epsilon = 1e-9);

        let (u, v) = camera.project(x, y, z);
        assert_abs_diff_eq!(u, 500.0, epsilon = 1e-6);
        assert_abs_diff_eq!(v, 500.0, epsilon = 1e-6);
        assert_eq!(camera.context_elevation_origin(), 10.0);
    }

    #[test]
    fn test_utm_camera_with_wgs84_context() {
        let camera = utm_camera(Some(CoordinateContext::wgs84(40.6, -74.0, 0.0)));
        assert_eq!(camera.effective_frame(), EffectiveFrame::Wgs84);
        let (x, y, z) = camera.backproject(120.0, 80.0);
        let (u, v) = camera.project(x, y, z);
        assert_abs_diff_eq!(u, 120.0, epsilon = 1e-4);
        assert_abs_diff_eq!(v, 80.0, epsilon = 1e-4);
    }

    #[test]
    fn test_wgs84_camera_with_utm_context() {
        let camera = wgs84_camera(Some(CoordinateContext::utm(35.59, -72.99, 0.0)));
        assert_eq!(camera.effective_frame(), EffectiveFrame::Wgs84);
        let (x, y, z) = camera.backproject(10.0, 20.0);
        let (u, v) = camera.project(x, y, z);
        assert_abs_diff_eq!(u, 10.0, epsilon = 1e-5);
        assert_abs_diff_eq!(v, 20.0, epsilon = 1e-5);
    }

    #[test]
    fn test_img_to_global_utm_camera() {
        let camera = utm_camera(None);
        let (lon, lat) = camera.img_to_global(0.0, 0.0);
        let (lat2, lon2, _) = utm::to_latlon(zone(18), Hemisphere::North, 580_000.0, 4_500_000.0, 0.0);
        assert_eq!((lon, lat), (lon2, lat2));

        let (u, v) = camera.global_to_img(lon, lat);
        assert_abs_diff_eq!(u, 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(v, 0.0, epsilon = 1e-4);

        let coord = camera.img_to_global_utm(10.0, 10.0);
        assert_abs_diff_eq!(coord.easting, 580_006.0, epsilon = 1e-9);
        assert_abs_diff_eq!(coord.northing, 4_499_994.0, epsilon = 1e-9);
        let (u, v) = camera.global_utm_to_img(580_006.0, 4_499_994.0, zone(18), Hemisphere::North);
        assert_abs_diff_eq!(u, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(v, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_global_utm_to_img_for_wgs84_camera() {
        let camera = wgs84_camera(None);
        let coord = camera.img_to_global_utm(300.0, 400.0);
        assert_eq!(coord.zone.number(), 18);
        let (u, v) = camera.global_utm_to_img(coord.easting, coord.northing, coord.zone, coord.hemisphere);
        assert_abs_diff_eq!(u, 300.0, epsilon = 1e-5);
        assert_abs_diff_eq!(v, 400.0, epsilon = 1e-5);
    }

    #[test]
    fn test_four_corners_requires_utm() {
        assert!(matches!(
            wgs84_camera(None).img_four_corners_in_utm(10, 10),
            Err(GeoCameraError::NotUtm)
        ));
        let (c1, c2) = utm_camera(None).img_four_corners_in_utm(1000, 500).unwrap();
        assert_eq!((c1.easting, c1.northing), (580_000.0, 4_500_000.0));
        assert_abs_diff_eq!(c2.easting, 580_600.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c2.northing, 4_499_700.0, epsilon = 1e-9);
    }

    #[test]
    fn test_local_to_utm() {
        let camera = wgs84_camera(Some(CoordinateContext::wgs84(35.59, -72.99, 0.0)));
        let coord = camera.local_to_utm(0.0, 0.0, 0.0).unwrap();
        let expected = utm::to_utm(35.59, -72.99);
        assert_abs_diff_eq!(coord.easting, expected.easting, epsilon = 1e-6);
        assert_abs_diff_eq!(coord.northing, expected.northing, epsilon = 1e-6);
        assert!(wgs84_camera(None).local_to_utm(0.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_translate_moves_origin_and_refreshes_spacing() {
        let mut camera = wgs84_camera(None);
        let before = camera.pixel_spacing();
        let expected = camera.img_to_global(100.0, 200.0);
        camera.translate(100.0, 200.0);
        assert_eq!(camera.img_to_global(0.0, 0.0), expected);
        // The fallback frame moved south-east, so the east-west spacing changed.
        assert_ne!(camera.pixel_spacing(), before);
    }

    #[test]
    fn test_equality_ignores_utm_metadata() {
        let a = utm_camera(None);
        let mut b = a.clone();
        b.set_utm(zone(19), Hemisphere::South);
        assert_eq!(a, b);
        assert!(!a.matches_all(&b));
        assert!(a.matches_all(&a.clone()));

        let c = utm_camera(Some(CoordinateContext::wgs84(40.0, -74.0, 0.0)));
        assert_ne!(a, c);
    }

    #[test]
    fn test_clone_deep_copies_context() {
        let mut a = wgs84_camera(Some(CoordinateContext::wgs84(35.59, -72.99, 0.0)));
        let b = a.clone();
        a.set_context(Some(CoordinateContext::wgs84(0.0, 0.0, 0.0)));
        assert_eq!(b.context().unwrap().origin(), (35.59, -72.99, 0.0));
    }

    #[test]
    fn test_display() {
        let text = utm_camera(None).to_string();
        assert!(text.ends_with("UTM zone 18, northern"));

        let text = wgs84_camera(Some(CoordinateContext::wgs84(35.59, -72.99, 0.0))).to_string();
        assert!(text.contains("coordinate context: wgs84"));
        assert!(text.ends_with("WGS84 degrees/meters"));
    }

    #[test]
    fn test_display_parses_back() {
        let southern = GeoCamera::from_canonical(
            CanonicalTransform {
                transform: AffineGeoTransform::scaled(0.25, -0.25, 330_000.0, 6_250_000.0),
                utm: Some(UtmMetadata::new(zone(56), Hemisphere::South)),
            },
            Some(CoordinateContext::utm(-33.87, 151.21, 20.0)),
        );
        for camera in [southern, wgs84_camera(Some(CoordinateContext::wgs84(35.59, -72.99, 4.0))), utm_camera(None)] {
            let parsed: GeoCamera = camera.to_string().parse().unwrap();
            assert!(!parsed.transform().scale_tag());
            assert_eq!(parsed.utm(), camera.utm());
            assert_eq!(parsed.context().map(|c| c.kind()), camera.context().map(|c| c.kind()));
            for row in 0..4 {
                for col in 0..4 {
                    assert_abs_diff_eq!(parsed.transform().get(row, col), camera.transform().get(row, col), epsilon = 1e-9);
                }
            }
            let (x, y) = camera.transform().pixel_to_native(7.0, 9.0);
            let (u, v) = parsed.transform().native_to_pixel(x, y);
            assert_abs_diff_eq!(u, 7.0, epsilon = 1e-6);
            assert_abs_diff_eq!(v, 9.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_parse_rejects_malformed_dump() {
        let good = utm_camera(None).to_string();
        let bad_frame = good.replace("UTM zone 18, northern", "UTM zone 18 northern");
        let bad_zone = good.replace("UTM zone 18", "UTM zone 99");
        let short_row = good.replacen("1.000000000", "", 1);
        for text in ["", bad_frame.as_str(), bad_zone.as_str(), short_row.as_str()] {
            assert!(text.parse::<GeoCamera>().is_err(), "accepted {:?}", text);
        }
    }
}
