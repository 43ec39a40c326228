//! Fixed joints pinning a body point to a moving target

use slotmap::new_key_type;
use woodcut_math::Vec3;

use crate::body::BodyKey;

new_key_type! {
    /// Key to a joint in the physics world
    pub struct JointKey;
}

/// Pins `local_anchor` on `body` to a world-space `target`
///
/// The world moves the body each step so the anchor lands on the target. With
/// several joints on one body the offsets are averaged. A jointed body is not
/// pushed by contacts and ignores gravity while the joint exists.
#[derive(Clone, Copy, Debug)]
pub struct FixedJoint {
    pub body: BodyKey,
    /// Attachment point in body space
    pub local_anchor: Vec3,
    /// Where the anchor should be, in world space
    pub target: Vec3,
}

impl FixedJoint {
    pub fn new(body: BodyKey, local_anchor: Vec3, target: Vec3) -> Self {
        Self { body, local_anchor, target }
    }
}
