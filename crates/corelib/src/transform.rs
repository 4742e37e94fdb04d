use crate::{Mat4, Quat, Vec3};

/// Object placement with Euler rotation in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    /// Euler angles in degrees, applied X then Y then Z.
    pub rotation_deg: Vec3,
    pub scale: Vec3,
}

impl Transform {
    #[inline]
    pub const fn identity() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation_deg: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    #[inline]
    pub fn from_trs(translation: Vec3, rotation_deg: Vec3, scale: Vec3) -> Self {
        Self {
            translation,
            rotation_deg,
            scale,
        }
    }

    #[inline]
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_x(self.rotation_deg.x.to_radians())
            * Quat::from_rotation_y(self.rotation_deg.y.to_radians())
            * Quat::from_rotation_z(self.rotation_deg.z.to_radians())
    }

    /// Build matrix = T * Rx * Ry * Rz * S (column-major Mat4 per glam).
    #[inline]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation(), self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
