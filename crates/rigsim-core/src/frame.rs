//! Frame conversion between rotation matrices and roll-pitch-yaw angles.
//!
//! The rotation convention is fixed: a roll-pitch-yaw triple `(r, p, y)`
//! describes the rotation `Rz(y) · Ry(p) · Rx(r)`, i.e. roll about X first,
//! then pitch about Y, then yaw about Z, all about fixed axes.
//!
//! Away from the pitch singularity (`|pitch| = π/2`) the two conversions
//! are exact inverses. At the singularity roll and yaw collapse onto one
//! axis (gimbal lock) and only their combination is recoverable.

use nalgebra::{Isometry3, Matrix3, Rotation3, Translation3, UnitQuaternion, Vector3};

/// Converts a direction cosine matrix to roll-pitch-yaw angles (radians).
///
/// The `-R[2,0]` term is clamped to `[-1, 1]` before `asin`: rotation
/// matrices near gimbal lock can drift marginally outside the domain.
///
/// # Example
///
/// ```
/// use nalgebra::{Matrix3, Vector3};
/// use rigsim_core::dcm_to_euler_angles;
///
/// let rpy = dcm_to_euler_angles(&Matrix3::identity());
/// assert_eq!(rpy, Vector3::zeros());
/// ```
pub fn dcm_to_euler_angles(global_r_local: &Matrix3<f64>) -> Vector3<f64> {
    let r11 = global_r_local[(0, 0)];
    let r21 = global_r_local[(1, 0)];
    let mr31 = (-global_r_local[(2, 0)]).clamp(-1.0, 1.0);
    let r32 = global_r_local[(2, 1)];
    let r33 = global_r_local[(2, 2)];

    let yaw = r21.atan2(r11);
    let pitch = mr31.asin();
    let roll = r32.atan2(r33);
    Vector3::new(roll, pitch, yaw)
}

/// Converts roll-pitch-yaw angles (radians) to a direction cosine matrix.
///
/// Computes `Rz(yaw) · Ry(pitch) · Rx(roll)`.
pub fn euler_angles_to_dcm(rpy: &Vector3<f64>) -> Matrix3<f64> {
    let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), rpy.z);
    let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), rpy.y);
    let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), rpy.x);
    (rz * ry * rx).into_inner()
}

// ── Pose ────────────────────────────────────────────────────────

/// A rigid transform: position plus orientation.
///
/// Poses compose left to right: `a.compose(&b)` expresses `b` (given in
/// the frame of `a`) in the frame `a` is expressed in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    /// Translation component.
    pub position: Vector3<f64>,
    /// Rotation component.
    pub rotation: UnitQuaternion<f64>,
}

impl Pose {
    /// Creates a pose from a position and a rotation.
    pub fn new(position: Vector3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self { position, rotation }
    }

    /// The identity pose.
    pub fn identity() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Creates a pose from a position and roll-pitch-yaw angles.
    pub fn from_position_rpy(position: Vector3<f64>, rpy: Vector3<f64>) -> Self {
        let rotation = Rotation3::from_matrix_unchecked(euler_angles_to_dcm(&rpy));
        Self {
            position,
            rotation: UnitQuaternion::from_rotation_matrix(&rotation),
        }
    }

    /// Creates a pose from the six values of an SDF `<pose>` element
    /// (`x y z roll pitch yaw`).
    pub fn from_xyz_rpy(values: [f64; 6]) -> Self {
        Self::from_position_rpy(
            Vector3::new(values[0], values[1], values[2]),
            Vector3::new(values[3], values[4], values[5]),
        )
    }

    /// The orientation as a rotation matrix.
    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        self.rotation.to_rotation_matrix().into_inner()
    }

    /// The orientation as roll-pitch-yaw angles.
    pub fn rpy(&self) -> Vector3<f64> {
        dcm_to_euler_angles(&self.rotation_matrix())
    }

    /// Composes `self` with a pose expressed in `self`'s frame.
    pub fn compose(&self, child: &Pose) -> Pose {
        Pose::from_isometry(&(self.to_isometry() * child.to_isometry()))
    }

    /// The inverse transform.
    pub fn inverse(&self) -> Pose {
        Pose::from_isometry(&self.to_isometry().inverse())
    }

    /// Converts to an `nalgebra` isometry.
    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.position), self.rotation)
    }

    /// Converts from an `nalgebra` isometry.
    pub fn from_isometry(iso: &Isometry3<f64>) -> Self {
        Self {
            position: iso.translation.vector,
            rotation: iso.rotation,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn max_abs_error(a: &Matrix3<f64>, b: &Matrix3<f64>) -> f64 {
        (a - b).abs().max()
    }

    #[test]
    fn identity_maps_to_zero_angles() {
        assert_eq!(dcm_to_euler_angles(&Matrix3::identity()), Vector3::zeros());
        assert_eq!(euler_angles_to_dcm(&Vector3::zeros()), Matrix3::identity());
    }

    #[test]
    fn pure_yaw_reads_back_from_first_column() {
        let r = euler_angles_to_dcm(&Vector3::new(0.0, 0.0, 0.7));
        assert_relative_eq!(r[(0, 0)], 0.7f64.cos(), epsilon = 1e-15);
        assert_relative_eq!(r[(1, 0)], 0.7f64.sin(), epsilon = 1e-15);
        assert_relative_eq!(dcm_to_euler_angles(&r).z, 0.7, epsilon = 1e-12);
    }

    #[test]
    fn composition_order_is_yaw_pitch_roll() {
        let rpy = Vector3::new(0.3, -0.2, 1.1);
        let expected = Rotation3::from_axis_angle(&Vector3::z_axis(), 1.1)
            * Rotation3::from_axis_angle(&Vector3::y_axis(), -0.2)
            * Rotation3::from_axis_angle(&Vector3::x_axis(), 0.3);
        assert!(max_abs_error(&euler_angles_to_dcm(&rpy), expected.matrix()) < 1e-15);
    }

    #[test]
    fn round_trip_recovers_representative_rotations() {
        for rpy in [
            Vector3::new(0.1, 0.2, 0.3),
            Vector3::new(-3.0, 1.2, 2.9),
            Vector3::new(2.5, -1.5, -0.4),
            Vector3::new(0.0, 1.55, 0.0),
        ] {
            let r = euler_angles_to_dcm(&rpy);
            let back = euler_angles_to_dcm(&dcm_to_euler_angles(&r));
            assert!(max_abs_error(&r, &back) <= 1e-9, "rpy {rpy:?}");
        }
    }

    #[test]
    fn out_of_domain_element_is_clamped() {
        let mut r = euler_angles_to_dcm(&Vector3::new(0.0, -FRAC_PI_2, 0.0));
        r[(2, 0)] = 1.0 + 1e-12;
        let rpy = dcm_to_euler_angles(&r);
        assert!(rpy.y.is_finite());
        assert_relative_eq!(rpy.y, -FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn pose_compose_and_inverse_cancel() {
        let a = Pose::from_xyz_rpy([1.0, 2.0, 0.5, 0.1, 0.2, 0.3]);
        let b = Pose::from_xyz_rpy([-0.3, 0.0, 0.1, 0.0, 0.5, -1.0]);
        let back = a.compose(&b).compose(&b.inverse());
        assert_relative_eq!(back.position, a.position, epsilon = 1e-12);
        assert!(max_abs_error(&back.rotation_matrix(), &a.rotation_matrix()) < 1e-12);
    }

    #[test]
    fn pose_rpy_matches_construction() {
        let pose = Pose::from_position_rpy(Vector3::zeros(), Vector3::new(0.4, -0.3, 2.0));
        assert_relative_eq!(pose.rpy(), Vector3::new(0.4, -0.3, 2.0), epsilon = 1e-12);
    }
}
