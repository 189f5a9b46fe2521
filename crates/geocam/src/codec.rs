//! Versioned binary camera record.
//!
//! ## Record Layout
//!
//! | Field       | Size (bytes) | Description                                  |
//! |-------------|--------------|----------------------------------------------|
//! | version     | 2            | Record version, currently 1                  |
//! | rows        | 4            | Matrix rows, always 4                        |
//! | cols        | 4            | Matrix columns, always 4                     |
//! | matrix      | 128          | 16 row-major f64 entries                     |
//! | has context | 1            | 0 = no context, 1 = context record follows   |
//! | context     | variable     | Coordinate context record                    |
//! | is_utm      | 1            | 0 or 1                                       |
//! | utm zone    | 4            | i32, 0 when not UTM                          |
//! | hemisphere  | 1            | 0 = north, 1 = south                         |
//! | scale_tag   | 1            | 0 or 1                                       |
//!
//! All multi-byte values are little-endian. The version is validated before
//! any other field is read.
//!
//! The `has context` byte is part of version 1: the context is optional on a
//! camera, and the flag records its absence instead of writing an empty
//! context record. Any value other than 0 or 1 is rejected.

use crate::camera::{CanonicalTransform, GeoCamera, UtmMetadata};
use crate::transform::AffineGeoTransform;
use crate::{GeoCameraError, Result};
use bytes::{Buf, BufMut};
use geocam_geodesy::{CoordinateContext, GeodesyError, Hemisphere, UtmZone};
use nalgebra::Matrix4;

/// Camera record versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum RecordVersion {
    /// Matrix, context, UTM metadata and scale tag.
    V1 = 1,
}

impl RecordVersion {
    /// Version written by this build.
    pub const CURRENT: RecordVersion = RecordVersion::V1;
}

impl TryFrom<u16> for RecordVersion {
    type Error = GeoCameraError;

    fn try_from(value: u16) -> Result<Self> {
        match value {
            1 => Ok(RecordVersion::V1),
            other => Err(GeoCameraError::UnsupportedVersion(other)),
        }
    }
}

/// Append the binary record of `camera` to `buf`.
pub fn write_binary<B: BufMut>(camera: &GeoCamera, buf: &mut B) {
    let transform = camera.transform();
    buf.put_u16_le(RecordVersion::CURRENT as u16);
    buf.put_u32_le(4);
    buf.put_u32_le(4);
    for row in 0..4 {
        for col in 0..4 {
            buf.put_f64_le(transform.get(row, col));
        }
    }

    match camera.context() {
        Some(ctx) => {
            buf.put_u8(1);
            ctx.write_binary(buf);
        }
        None => buf.put_u8(0),
    }

    let utm = camera.utm();
    buf.put_u8(u8::from(utm.is_some()));
    buf.put_i32_le(utm.map_or(0, |u| i32::from(u.zone.number())));
    buf.put_u8(u8::from(utm.map_or(false, |u| u.hemisphere.is_south())));
    buf.put_u8(u8::from(transform.scale_tag()));
}

/// Read a camera record from `buf`. Pixel spacing is recomputed.
pub fn read_binary<B: Buf>(buf: &mut B) -> Result<GeoCamera> {
    let start = buf.remaining();

    ensure_remaining(buf, 2, start - buf.remaining())?;
    RecordVersion::try_from(buf.get_u16_le())?;

    ensure_remaining(buf, 8, start - buf.remaining())?;
    let rows = buf.get_u32_le();
    let cols = buf.get_u32_le();
    if (rows, cols) != (4, 4) {
        return Err(GeoCameraError::decode_at(
            start - buf.remaining() - 8,
            format!("expected a 4x4 matrix, found {}x{}", rows, cols),
        ));
    }

    ensure_remaining(buf, 16 * 8 + 1, start - buf.remaining())?;
    let mut values = [0.0; 16];
    for value in values.iter_mut() {
        *value = buf.get_f64_le();
    }
    let matrix = Matrix4::from_row_slice(&values);

    let context = match buf.get_u8() {
        0 => None,
        1 => {
            let context_at = start - buf.remaining();
            Some(CoordinateContext::read_binary(buf).map_err(|e| match e {
                GeodesyError::Decode { offset, message } => {
                    GeoCameraError::decode_at(context_at + offset, message)
                }
                other => other.into(),
            })?)
        }
        other => {
            return Err(GeoCameraError::decode_at(
                start - buf.remaining() - 1,
                format!("invalid context flag {}", other),
            ))
        }
    };

    ensure_remaining(buf, 7, start - buf.remaining())?;
    let is_utm = buf.get_u8() != 0;
    let zone_at = start - buf.remaining();
    let zone = buf.get_i32_le();
    let hemisphere = if buf.get_u8() != 0 {
        Hemisphere::South
    } else {
        Hemisphere::North
    };
    let scale_tag = buf.get_u8() != 0;

    let utm = if is_utm {
        let zone = u8::try_from(zone)
            .ok()
            .and_then(|z| UtmZone::new(z).ok())
            .ok_or_else(|| GeoCameraError::decode_at(zone_at, format!("invalid UTM zone {}", zone)))?;
        Some(UtmMetadata::new(zone, hemisphere))
    } else {
        None
    };

    Ok(GeoCamera::from_canonical(
        CanonicalTransform {
            transform: AffineGeoTransform::new(matrix, scale_tag),
            utm,
        },
        context,
    ))
}

/// Encode a camera into a new buffer.
pub fn encode_camera(camera: &GeoCamera) -> Vec<u8> {
    let mut buf = Vec::with_capacity(160);
    write_binary(camera, &mut buf);
    buf
}

/// Decode a camera from a complete record.
pub fn decode_camera(data: &[u8]) -> Result<GeoCamera> {
    let mut buf = data;
    read_binary(&mut buf)
}

fn ensure_remaining<B: Buf>(buf: &B, needed: usize, offset: usize) -> Result<()> {
    if buf.remaining() < needed {
        return Err(GeoCameraError::decode_at(
            offset,
            format!("need {} bytes, {} remaining", needed, buf.remaining()),
        ));
    }
    Ok(())
}
