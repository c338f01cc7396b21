//! # Method Records
//!
//! One entry of the descriptor file: a webservice function together with its
//! parameter and return descriptors and its access flags.

use crate::descriptor::{Descriptor, Flag};
use crate::error::AppResult;
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// A webservice method as produced by the extractor.
///
/// Fields the converter has no use for (`classname`, `capabilities`, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MethodRecord {
    /// Unique method identifier, e.g. `core_course_get_contents`.
    #[serde(default)]
    pub name: String,
    /// Human readable description.
    #[serde(default)]
    pub description: String,
    /// Owning component, e.g. `core_course`.
    #[serde(default)]
    pub component: String,
    /// Parameter descriptor (an object, or empty).
    #[serde(rename = "parameters_desc", default)]
    pub parameters: Descriptor,
    /// Return value descriptor.
    #[serde(rename = "returns_desc", default)]
    pub returns: Descriptor,
    /// Whether a user token is required.
    #[serde(rename = "loginrequired", default)]
    pub login_required: Flag,
    /// Whether the method may be called through the anonymous ajax endpoint.
    #[serde(rename = "allowed_from_ajax", default)]
    pub allowed_from_ajax: Flag,
    /// Whether the method only needs a read-only session.
    #[serde(rename = "readonlysession", default)]
    pub read_only_session: Flag,
}

impl MethodRecord {
    /// Creates a record with empty descriptors.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            component: String::new(),
            parameters: Descriptor::object(Vec::<(String, Descriptor)>::new()),
            returns: Descriptor::default(),
            login_required: Flag(false),
            allowed_from_ajax: Flag(false),
            read_only_session: Flag(false),
        }
    }

    /// Whether a user token is required.
    pub fn requires_login(&self) -> bool {
        self.login_required.0
    }

    /// Whether anonymous access is allowed.
    pub fn allows_anonymous(&self) -> bool {
        self.allowed_from_ajax.0
    }
}

/// All methods of one descriptor file keyed by identifier, in file order.
pub type MethodSet = IndexMap<String, MethodRecord>;

/// Decodes a descriptor document.
///
/// A record without a `name` takes its key as identifier.
pub fn parse_methods(content: &str) -> AppResult<MethodSet> {
    let mut methods: MethodSet = serde_json::from_str(content)?;
    for (key, method) in methods.iter_mut() {
        if method.name.is_empty() {
            method.name.clone_from(key);
        }
    }
    Ok(methods)
}

/// Reads and decodes the descriptor file at `path`.
pub fn load_methods(path: &Path) -> AppResult<MethodSet> {
    let content = fs::read_to_string(path)?;
    parse_methods(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Shape;
    use crate::error::AppError;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "core_webservice_get_site_info": {
            "name": "core_webservice_get_site_info",
            "classname": "core_webservice_external",
            "description": "Return some site info",
            "component": "core_webservice",
            "loginrequired": true,
            "allowed_from_ajax": "false",
            "readonlysession": "true",
            "parameters_desc": {
                "keys": {
                    "serviceshortnames": {
                        "content": { "type": "alphanum", "desc": "service shortname" },
                        "desc": "service shortnames",
                        "default": [],
                        "required": 2
                    }
                }
            },
            "returns_desc": {
                "keys": {
                    "sitename": { "type": "raw", "desc": "site name", "required": 1 }
                }
            }
        },
        "tool_mobile_get_public_config": {
            "loginrequired": "false",
            "allowed_from_ajax": true,
            "parameters_desc": { "keys": [] },
            "returns_desc": { "keys": [] }
        }
    }"#;

    #[test]
    fn test_parse_methods() {
        let methods = parse_methods(SAMPLE).unwrap();
        assert_eq!(methods.len(), 2);

        let info = &methods["core_webservice_get_site_info"];
        assert!(info.requires_login());
        assert!(!info.allows_anonymous());
        assert!(info.read_only_session.0);
        assert_eq!(info.component, "core_webservice");
        let params = info.parameters.keys().unwrap();
        assert!(matches!(params["serviceshortnames"].shape, Shape::List(_)));
        assert!(!params["serviceshortnames"].required);

        let public = &methods["tool_mobile_get_public_config"];
        assert_eq!(public.name, "tool_mobile_get_public_config");
        assert!(!public.requires_login());
        assert!(public.allows_anonymous());
        assert!(public.parameters.keys().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_flag_string_aborts() {
        let res = parse_methods(r#"{ "m": { "loginrequired": "maybe" } }"#);
        assert!(matches!(res, Err(AppError::Decode(_))));
    }

    #[test]
    fn test_load_methods_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("webservices.json");
        fs::File::create(&path)
            .unwrap()
            .write_all(SAMPLE.as_bytes())
            .unwrap();

        let methods = load_methods(&path).unwrap();
        let names: Vec<_> = methods.keys().cloned().collect();
        assert_eq!(
            names,
            vec!["core_webservice_get_site_info", "tool_mobile_get_public_config"]
        );
    }

    #[test]
    fn test_load_missing_file() {
        let res = load_methods(Path::new("/definitely/not/here.json"));
        assert!(matches!(res, Err(AppError::Io(_))));
    }
}
