//! Model name extraction from SDF text.

use crate::error::DescriptionError;
use crate::xml::parse_document;

/// Returns the `name` attribute of the first `<model>` under the `<sdf>`
/// root.
///
/// Fails if the text has no root element, the root is not `<sdf>`, there
/// is no `<model>` child, or the model has no `name` attribute. An empty
/// `name=""` counts as missing.
///
/// ```
/// use rigsim_description::extract_model_name;
///
/// let sdf = r#"<sdf version="1.6"><model name="rover"/></sdf>"#;
/// assert_eq!(extract_model_name(sdf).unwrap(), "rover");
/// ```
pub fn extract_model_name(sdf: &str) -> Result<String, DescriptionError> {
    let root = parse_document(sdf)?;
    if root.name != "sdf" {
        return Err(DescriptionError::missing_element("sdf", "document root"));
    }
    let model = root.require_child("model")?;
    match model.attr("name") {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(DescriptionError::missing_attribute("name", "model")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_without_root_fails() {
        assert!(extract_model_name("").is_err());
        assert!(extract_model_name("just some words").is_err());
    }

    #[test]
    fn root_without_model_fails() {
        assert!(matches!(
            extract_model_name("<sdf version='1.6'><world name='w'/></sdf>"),
            Err(DescriptionError::MissingElement { .. })
        ));
    }

    #[test]
    fn model_without_name_fails() {
        for text in ["<sdf><model/></sdf>", "<sdf><model name=''/></sdf>"] {
            assert!(matches!(
                extract_model_name(text),
                Err(DescriptionError::MissingAttribute { .. })
            ));
        }
    }

    #[test]
    fn wrong_root_fails() {
        assert!(extract_model_name("<robot><model name='x'/></robot>").is_err());
    }

    #[test]
    fn returns_first_declared_name_exactly() {
        let text = "<sdf><model name='  Spaced Name '/><model name='second'/></sdf>";
        assert_eq!(extract_model_name(text).unwrap(), "  Spaced Name ");
    }
}
