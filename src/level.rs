//! Wheel-base leveling.
//!
//! Frames are drawn against a horizontal ground line. When the two contact
//! patches end up at different heights (mismatched wheel or tyre sizes, a
//! long fork) the whole point set is rotated about the rear contact patch
//! until they are level again.

use crate::calculators::names::{FRONT_CONTACT_PATCH, REAR_CONTACT_PATCH};
use crate::geometry::{rad_to_deg, rotate_about};
use crate::store::ValueStore;

/// A rotation that was applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leveling {
    /// Height of the front contact patch above (negative) or below the rear
    /// one, in pixels, before the rotation
    pub pixel_delta: f64,
    /// Applied tilt in degrees
    pub degrees: f64,
}

/// Rotate every point about the rear contact patch so both contact patches
/// share a y coordinate.
///
/// Returns `None` without touching the store when either patch is missing or
/// the frame is already level.
pub fn level(values: &mut ValueStore) -> Option<Leveling> {
    let rear = values.point(REAR_CONTACT_PATCH)?;
    let front = values.point(FRONT_CONTACT_PATCH)?;
    let delta = front - rear;
    if delta.y == 0.0 || delta.x == 0.0 {
        return None;
    }

    let tilt = (delta.y / delta.x).atan();
    for (name, p) in values.points_mut() {
        if name == REAR_CONTACT_PATCH {
            continue;
        }
        *p = rotate_about(*p, rear, tilt);
    }

    let leveling = Leveling {
        pixel_delta: delta.y,
        degrees: rad_to_deg(tilt),
    };
    crate::log::info!(
        pixel_delta = leveling.pixel_delta,
        degrees = leveling.degrees,
        "frame leveled"
    );
    Some(leveling)
}
