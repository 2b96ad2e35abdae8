//! Benchmark profiles for rigsim sessions.
//!
//! - [`chain_model_sdf`]: a serial chain of revolute joints of any length
//! - [`chain_profile`]: a session config stepping that chain unpaced
//! - [`driving_torques`]: deterministic per-joint torque commands

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::fmt::Write;

use rigsim_session::{SessionConfig, AS_FAST_AS_POSSIBLE};

/// Name of the model produced by [`chain_model_sdf`].
pub const CHAIN_MODEL_NAME: &str = "chain";

/// SDF for a chain of `links` unit-mass links spaced 0.1 m apart along X,
/// joined by `links - 1` damped revolute joints about Y.
pub fn chain_model_sdf(links: usize) -> String {
    let mut sdf = format!("<sdf version=\"1.6\"><model name=\"{CHAIN_MODEL_NAME}\">");
    for i in 0..links {
        let _ = write!(
            sdf,
            "<link name=\"link_{i}\"><pose>{x} 0 0 0 0 0</pose>\
             <inertial><mass>1</mass><inertia><ixx>0.001</ixx><iyy>0.001</iyy>\
             <izz>0.001</izz></inertia></inertial></link>",
            x = 0.1 * i as f64,
        );
    }
    for i in 1..links {
        let _ = write!(
            sdf,
            "<joint name=\"joint_{i}\" type=\"revolute\">\
             <parent>link_{p}</parent><child>link_{i}</child>\
             <axis><xyz>0 1 0</xyz><dynamics><damping>0.05</damping></dynamics></axis>\
             </joint>",
            p = i - 1,
        );
    }
    sdf.push_str("</model></sdf>");
    sdf
}

/// Session config for a `links`-long chain on the builtin empty world,
/// stepped as fast as possible.
pub fn chain_profile(links: usize, seed: u64) -> SessionConfig {
    SessionConfig {
        model_description: chain_model_sdf(links),
        seed,
        real_time_update_rate: AS_FAST_AS_POSSIBLE,
        ..SessionConfig::default()
    }
}

/// Torque for joint `joint` at tick `tick`: a slow square wave with a
/// per-joint phase, so every joint reverses direction periodically.
pub fn driving_torques(tick: u64, joint: usize) -> f64 {
    let phase = (tick / 50 + joint as u64) % 2;
    if phase == 0 {
        0.5
    } else {
        -0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigsim_description::{extract_model_name, parse_model};

    #[test]
    fn chain_profile_validates() {
        chain_profile(20, 42).validate().unwrap();
    }

    #[test]
    fn chain_has_one_joint_fewer_than_links() {
        let model = parse_model(&chain_model_sdf(8)).unwrap();
        assert_eq!(model.links.len(), 8);
        assert_eq!(model.joints.len(), 7);
        assert_eq!(extract_model_name(&chain_model_sdf(8)).unwrap(), CHAIN_MODEL_NAME);
    }

    #[test]
    fn driving_torques_alternate() {
        assert_eq!(driving_torques(0, 0), 0.5);
        assert_eq!(driving_torques(50, 0), -0.5);
        assert_eq!(driving_torques(0, 1), -0.5);
    }
}
