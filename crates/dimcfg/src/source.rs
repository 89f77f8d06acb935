//! loading source documents into a [Value]
//!
//! The engine itself never touches the filesystem. These helpers exist for the binary and for tests.
use crate::value::Value;
use std::path::Path;

pub fn from_yaml_str(source: &str) -> Result<Value, LoadError> {
    let document: serde_yaml::Value = serde_yaml::from_str(source)?;
    Ok(document.into())
}

pub fn from_json_str(source: &str) -> Result<Value, LoadError> {
    let document: serde_json::Value = serde_json::from_str(source)?;
    Ok(document.into())
}

/// Load a YAML file, or JSON when the extension is `.json`
pub fn load_file(file_path: &Path) -> Result<Value, LoadError> {
    let file_path = file_path.canonicalize()?;
    tracing::info!(path=%file_path.display(), "loading file");

    let file_contents = std::fs::read_to_string(&file_path)?;
    let is_json = file_path
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));

    if is_json {
        from_json_str(&file_contents)
    } else {
        from_yaml_str(&file_contents)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Unable to parse yaml document")]
    YamlParseFailed(#[from] serde_yaml::Error),
    #[error("Unable to parse json document")]
    JsonParseFailed(#[from] serde_json::Error),
}

/// Utility macro to create a [Value] from a YAML literal
///
/// ```
/// # use dimcfg::yaml;
/// let document = yaml!("env/[[]]: { dev: [d1] }");
/// assert!(document.as_object().is_some());
/// ```
///
/// # Panic
/// Panics on invalid input
///
/// ```should_panic
/// # use dimcfg::yaml;
/// yaml!("key: [unclosed");
/// ```
#[macro_export]
macro_rules! yaml {
    { $expr:expr } => {
        $crate::source::from_yaml_str($expr).expect("document must parse")
    };
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn yaml_and_json_agree() {
        let from_yaml = from_yaml_str("a: [1, two]\nb: { c: true }").unwrap();
        let from_json = from_json_str(r#"{"a": [1, "two"], "b": {"c": true}}"#).unwrap();
        assert_eq!(from_yaml, from_json);
    }

    #[test]
    fn invalid_yaml() {
        assert!(matches!(
            from_yaml_str("a: [b"),
            Err(LoadError::YamlParseFailed(_))
        ));
    }
}
