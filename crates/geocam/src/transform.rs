//! Affine pixel <-> native coordinate transform.
//!
//! The transform is a 4x4 homogeneous matrix `T` mapping a pixel `(i, j)` to
//! native coordinates `(x, y)` (longitude/latitude in degrees, or UTM
//! easting/northing in meters):
//!
//! ```text
//! | x |   | T00  T01  T02  T03 |   | i |
//! | y | = | T10  T11  T12  T13 | * | j |
//! | z |   | T20  T21  T22  T23 |   | 0 |
//! | 1 |   | 0    0    0    1   |   | 1 |
//! ```
//!
//! When `scale_tag` is set only the diagonal scale and the translation are
//! used (`x = T03 + i * T00`, `y = T13 + j * T11`). Otherwise the full matrix
//! is applied, and the reverse direction inverts it. A singular matrix is not
//! reported: the inverse direction then yields NaN.

use crate::{GeoCameraError, Result};
use nalgebra::{Matrix4, Vector4};

/// An affine pixel <-> native coordinate mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct AffineGeoTransform {
    matrix: Matrix4<f64>,
    scale_tag: bool,
}

impl Default for AffineGeoTransform {
    fn default() -> Self {
        Self::new(Matrix4::identity(), false)
    }
}

impl AffineGeoTransform {
    /// Create a transform from a full matrix.
    pub fn new(matrix: Matrix4<f64>, scale_tag: bool) -> Self {
        Self { matrix, scale_tag }
    }

    /// Create a transform from 16 row-major values.
    pub fn from_row_slice(values: &[f64], scale_tag: bool) -> Result<Self> {
        if values.len() != 16 {
            return Err(GeoCameraError::configuration(format!(
                "requires a 4x4 transform matrix, got {} values",
                values.len()
            )));
        }
        Ok(Self::new(Matrix4::from_row_slice(values), scale_tag))
    }

    /// Diagonal-scale transform: `x = tx + i * sx`, `y = ty + j * sy`.
    pub fn scaled(sx: f64, sy: f64, tx: f64, ty: f64) -> Self {
        let mut matrix = Matrix4::identity();
        matrix[(0, 0)] = sx;
        matrix[(1, 1)] = sy;
        matrix[(0, 3)] = tx;
        matrix[(1, 3)] = ty;
        Self::new(matrix, true)
    }

    /// Transform from per-axis pixel scale and a tie point `(I, J, K, X, Y, Z)`.
    ///
    /// Pixel rows grow downward while Y grows northward, so the Y scale is
    /// negated:
    ///
    /// ```text
    /// | Sx   0    0   Tx |      Tx = X - I * Sx
    /// | 0   -Sy   0   Ty |      Ty = Y + J * Sy
    /// | 0    0    Sz  Tz |      Tz = Z - K * Sz
    /// | 0    0    0   1  |
    /// ```
    pub fn from_tie_point(tie_point: [f64; 6], sx: f64, sy: f64, sz: f64) -> Self {
        let [i, j, k, x, y, z] = tie_point;
        #[rustfmt::skip]
        let matrix = Matrix4::new(
            sx,  0.0, 0.0, x - i * sx,
            0.0, -sy, 0.0, y + j * sy,
            0.0, 0.0, sz,  z - k * sz,
            0.0, 0.0, 0.0, 1.0,
        );
        Self::new(matrix, true)
    }

    /// Transform from a GDAL geotransform `(ox, px_w, row_rot, oy, col_rot, px_h)`.
    ///
    /// ```text
    /// | GT1  GT2  0  GT0 |
    /// | GT4  GT5  0  GT3 |
    /// | 0    0    1  0   |
    /// | 0    0    0  1   |
    /// ```
    pub fn from_geotransform(gt: [f64; 6]) -> Self {
        let mut matrix = Matrix4::identity();
        matrix[(0, 3)] = gt[0];
        matrix[(0, 0)] = gt[1];
        matrix[(0, 1)] = gt[2];
        matrix[(1, 3)] = gt[3];
        matrix[(1, 0)] = gt[4];
        matrix[(1, 1)] = gt[5];
        Self::new(matrix, true)
    }

    /// The GDAL geotransform encoded by this matrix.
    pub fn to_geotransform(&self) -> [f64; 6] {
        let m = &self.matrix;
        [m[(0, 3)], m[(0, 0)], m[(0, 1)], m[(1, 3)], m[(1, 0)], m[(1, 1)]]
    }

    /// The matrix.
    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    /// A single matrix entry.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.matrix[(row, col)]
    }

    /// Whether the diagonal fast path is used.
    pub fn scale_tag(&self) -> bool {
        self.scale_tag
    }

    /// Select the diagonal fast path or the full-matrix path.
    pub fn set_scale_tag(&mut self, scale_tag: bool) {
        self.scale_tag = scale_tag;
    }

    /// Map a pixel to native coordinates.
    pub fn pixel_to_native(&self, i: f64, j: f64) -> (f64, f64) {
        let m = &self.matrix;
        if self.scale_tag {
            return (m[(0, 3)] + i * m[(0, 0)], m[(1, 3)] + j * m[(1, 1)]);
        }
        let res = self.general_matrix() * Vector4::new(i, j, 0.0, 1.0);
        (res[0], res[1])
    }

    /// Map native coordinates to a (fractional) pixel.
    pub fn native_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let m = &self.matrix;
        if self.scale_tag {
            return ((x - m[(0, 3)]) / m[(0, 0)], (y - m[(1, 3)]) / m[(1, 1)]);
        }
        let inverse = self
            .general_matrix()
            .try_inverse()
            .unwrap_or_else(|| Matrix4::from_element(f64::NAN));
        let res = inverse * Vector4::new(x, y, 0.0, 1.0);
        (res[0], res[1])
    }

    /// Shift the pixel origin so that the old pixel `(tx, ty)` becomes `(0, 0)`.
    pub fn translate_pixels(&mut self, tx: f64, ty: f64) {
        if self.scale_tag {
            self.matrix[(0, 3)] += tx * self.matrix[(0, 0)];
            self.matrix[(1, 3)] += ty * self.matrix[(1, 1)];
        } else {
            let (x, y) = self.pixel_to_native(tx, ty);
            self.matrix[(0, 3)] = x;
            self.matrix[(1, 3)] = y;
        }
    }

    /// The matrix used by the general path; the z scale is forced to 1 so
    /// that a zero `T22` does not make an otherwise planar transform singular.
    fn general_matrix(&self) -> Matrix4<f64> {
        let mut m = self.matrix;
        m[(2, 2)] = 1.0;
        m
    }
}
