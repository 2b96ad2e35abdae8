//! Standard test data: a differential-drive robot on an empty 1 ms world.
//!
//! The robot's chassis sits 0.1 m above the model origin with identity
//! orientation. Its two wheels are driven by the revolute joints
//! `left_wheel_hinge` and `right_wheel_hinge`.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// SDF text of the differential-drive model.
pub const DIFFERENTIAL_DRIVE_SDF: &str =
    include_str!("../test_data/differential_drive/model.sdf");

/// Name declared by [`DIFFERENTIAL_DRIVE_SDF`].
pub const DIFFERENTIAL_DRIVE_NAME: &str = "differential_drive";

/// Link names of the differential-drive model, in declaration order.
pub const DIFFERENTIAL_DRIVE_LINKS: [&str; 3] = ["chassis", "left_wheel", "right_wheel"];

/// Joint names of the differential-drive model, in declaration order.
pub const DIFFERENTIAL_DRIVE_JOINTS: [&str; 2] = ["left_wheel_hinge", "right_wheel_hinge"];

/// Chassis height above the model origin.
pub const CHASSIS_HEIGHT: f64 = 0.1;

/// Tick length of [`empty_test_world`].
pub const TEST_WORLD_STEP: Duration = Duration::from_millis(1);

/// Directory holding the test data files.
pub fn test_data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data")
}

/// Absolute path of the empty test world (ground plane, sun, 1 ms step).
pub fn empty_test_world() -> String {
    test_data_dir()
        .join("empty_test.world")
        .to_string_lossy()
        .into_owned()
}

/// Absolute path of a 1 ms world that perturbs commanded efforts with
/// seeded noise and runs unpaced.
pub fn noisy_test_world() -> String {
    test_data_dir()
        .join("noisy_test.world")
        .to_string_lossy()
        .into_owned()
}

/// Two-link planar arm in URDF, for conversion tests.
pub const TWO_LINK_ARM_URDF: &str = r#"<?xml version="1.0"?>
<robot name="two_link_arm">
  <link name="world"/>
  <link name="base">
    <inertial>
      <origin xyz="0 0 0.05"/>
      <mass value="2.0"/>
      <inertia ixx="0.01" ixy="0" ixz="0" iyy="0.01" iyz="0" izz="0.01"/>
    </inertial>
  </link>
  <link name="upper_arm">
    <inertial>
      <origin xyz="0.25 0 0"/>
      <mass value="1.0"/>
      <inertia ixx="0.001" ixy="0" ixz="0" iyy="0.02" iyz="0" izz="0.02"/>
    </inertial>
  </link>
  <link name="forearm">
    <inertial>
      <origin xyz="0.2 0 0"/>
      <mass value="0.5"/>
      <inertia ixx="0.001" ixy="0" ixz="0" iyy="0.01" iyz="0" izz="0.01"/>
    </inertial>
  </link>
  <joint name="anchor" type="fixed">
    <parent link="world"/>
    <child link="base"/>
    <origin xyz="0 0 0.5"/>
  </joint>
  <joint name="shoulder" type="revolute">
    <parent link="base"/>
    <child link="upper_arm"/>
    <origin xyz="0 0 0.1"/>
    <axis xyz="0 0 1"/>
    <limit lower="-1.57" upper="1.57" effort="20" velocity="3"/>
    <dynamics damping="0.1"/>
  </joint>
  <joint name="elbow" type="continuous">
    <parent link="upper_arm"/>
    <child link="forearm"/>
    <origin xyz="0.5 0 0"/>
    <axis xyz="0 0 1"/>
  </joint>
</robot>
"#;
