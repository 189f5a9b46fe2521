//! Effective global frame resolution.
//!
//! Which global frame a camera exchanges coordinates in depends on the kind
//! of its coordinate context and on whether the camera itself is
//! UTM-addressed:
//!
//! | context kind | camera is UTM | effective frame |
//! |--------------|---------------|-----------------|
//! | none         | any           | identity (local == global, WGS84 semantics) |
//! | utm          | yes           | UTM             |
//! | utm          | no            | WGS84           |
//! | wgs84        | any           | WGS84           |

use geocam_geodesy::GlobalFrame;

/// The frame local coordinates are exchanged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectiveFrame {
    /// No context: local coordinates are already longitude/latitude/elevation.
    Identity,
    /// Local <-> WGS84 through the context.
    Wgs84,
    /// Local <-> UTM through the context.
    Utm,
}

impl EffectiveFrame {
    /// The context conversion frame, or `None` for the identity pass-through.
    pub fn global_frame(self) -> Option<GlobalFrame> {
        match self {
            EffectiveFrame::Identity => None,
            EffectiveFrame::Wgs84 => Some(GlobalFrame::Wgs84),
            EffectiveFrame::Utm => Some(GlobalFrame::Utm),
        }
    }
}

/// Resolve the effective frame for a context kind and camera UTM flag.
pub fn resolve_frame(context_kind: Option<GlobalFrame>, camera_is_utm: bool) -> EffectiveFrame {
    match (context_kind, camera_is_utm) {
        (None, _) => EffectiveFrame::Identity,
        (Some(GlobalFrame::Utm), true) => EffectiveFrame::Utm,
        (Some(GlobalFrame::Utm), false) => EffectiveFrame::Wgs84,
        (Some(GlobalFrame::Wgs84), _) => EffectiveFrame::Wgs84,
    }
}
