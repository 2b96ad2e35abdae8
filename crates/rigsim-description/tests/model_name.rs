//! Model name extraction over generated documents.

use proptest::prelude::*;
use rigsim_description::{convert_legacy_description, extract_model_name, parse_model};

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

proptest! {
    #[test]
    fn declared_name_is_returned_exactly(name in "[A-Za-z0-9_ &<>\"-]{1,24}") {
        let sdf = format!(
            r#"<?xml version="1.0"?><sdf version="1.6"><model name="{}"><link name="l"/></model></sdf>"#,
            xml_escape(&name)
        );
        prop_assert_eq!(extract_model_name(&sdf).unwrap(), name);
    }

    #[test]
    fn converted_robot_keeps_its_name(name in "[a-z][a-z0-9_]{0,15}") {
        let urdf = format!(r#"<robot name="{name}"><link name="base"/></robot>"#);
        let sdf = convert_legacy_description(&urdf).unwrap();
        prop_assert_eq!(extract_model_name(&sdf).unwrap(), name.clone());
        prop_assert_eq!(parse_model(&sdf).unwrap().name, name);
    }
}

#[test]
fn rootless_and_nameless_documents_fail() {
    assert!(extract_model_name("").is_err());
    assert!(extract_model_name("<!-- nothing here -->").is_err());
    assert!(extract_model_name(r#"<sdf version="1.6"/>"#).is_err());
    assert!(extract_model_name(r#"<sdf version="1.6"><model/></sdf>"#).is_err());
}

#[test]
fn prismatic_chain_converts() {
    let urdf = r#"<robot name="gantry">
        <link name="rail"/>
        <link name="carriage"><inertial><mass value="3"/><inertia ixx="0.1" iyy="0.1" izz="0.1"/></inertial></link>
        <joint name="slide" type="prismatic">
          <parent link="rail"/><child link="carriage"/>
          <origin xyz="0 0 0.05"/>
          <axis xyz="1 0 0"/>
          <limit lower="0" upper="2" effort="100" velocity="1"/>
        </joint>
      </robot>"#;
    let model = parse_model(&convert_legacy_description(urdf).unwrap()).unwrap();
    let slide = model.joint("slide").unwrap();
    assert_eq!(slide.kind.as_str(), "prismatic");
    assert_eq!((slide.axis.lower, slide.axis.upper), (0.0, 2.0));
    assert_eq!(slide.axis.velocity, 1.0);
}
