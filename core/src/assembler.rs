//! # Spec Assembler
//!
//! Builds the OpenAPI 3.1 document from a method set: one operation per method,
//! with parameter and response schemas registered under `components/schemas`.
//!
//! Methods requiring a token are `POST`ed to the REST endpoint with a form encoded
//! body; anonymous methods are `GET` requests on the no-login ajax endpoint taking
//! their parameters in a single `args` query parameter. Both endpoints are shared by
//! all methods, so each path key carries the method identifier as fragment.

use crate::error::{AppError, AppResult};
use crate::method::{MethodRecord, MethodSet};
use crate::naming::{parameters_schema_name, response_schema_name, schema_ref};
use crate::synthesizer::{synthesize, SchemaNode};
use serde_json::{json, Map, Value};
use tracing::debug;

/// OpenAPI version emitted.
pub const OPENAPI_VERSION: &str = "3.1.0";
/// Endpoint of token authenticated methods.
pub const REST_PATH: &str = "/webservice/rest/server.php";
/// Endpoint of anonymous methods.
pub const AJAX_NOLOGIN_PATH: &str = "/lib/ajax/service-nologin.php";
/// Endpoint issuing user tokens.
pub const LOGIN_TOKEN_PATH: &str = "/login/token.php";
/// Name of the API key security scheme.
pub const TOKEN_SCHEME: &str = "wstoken";

const FORM_MEDIA_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_MEDIA_TYPE: &str = "application/json";
const DEFAULT_RESPONSE_DESCRIPTION: &str = "Successful response";

/// The `info` block of the generated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiInfo {
    /// The title of the API.
    pub title: String,
    /// The version of the API document.
    pub version: String,
    /// Optional description for the API.
    pub description: Option<String>,
}

impl Default for ApiInfo {
    fn default() -> Self {
        Self {
            title: "Moodle Webservice API".to_string(),
            version: "0.0.0".to_string(),
            description: Some("Auto-generated OpenAPI spec for Moodle's Webservice API.".to_string()),
        }
    }
}

impl ApiInfo {
    /// Sets the version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

/// Builds OpenAPI documents from method sets.
#[derive(Debug, Clone)]
pub struct SpecAssembler {
    /// Document metadata.
    pub info: ApiInfo,
    /// Inject the token issuing operation.
    pub add_login_token_path: bool,
    /// Coerce defaults into their declared types.
    pub fix_defaults: bool,
    /// Tag every operation with its owning component.
    pub add_tags: bool,
}

impl Default for SpecAssembler {
    fn default() -> Self {
        Self {
            info: ApiInfo::default(),
            add_login_token_path: true,
            fix_defaults: true,
            add_tags: true,
        }
    }
}

impl SpecAssembler {
    /// Builds the document. Fails without output on the first unreachable method.
    pub fn assemble(&self, methods: &MethodSet) -> AppResult<Value> {
        let mut schemas = Map::new();
        let mut paths = Map::new();

        if self.add_login_token_path {
            debug!("Adding login token path");
            paths.insert(LOGIN_TOKEN_PATH.to_string(), login_token_path_item());
        }

        for (name, method) in methods {
            let (path, verb, operation) = self.build_operation(name, method, &mut schemas)?;
            let mut path_item = Map::new();
            path_item.insert(verb.to_string(), operation);
            paths.insert(path, Value::Object(path_item));
        }

        let mut components = Map::new();
        components.insert("schemas".to_string(), Value::Object(schemas));
        components.insert(
            "securitySchemes".to_string(),
            json!({
                TOKEN_SCHEME: {
                    "type": "apiKey",
                    "description": "Webservice token",
                    "name": TOKEN_SCHEME,
                    "in": "query"
                }
            }),
        );

        let mut doc = Map::new();
        doc.insert("openapi".to_string(), json!(OPENAPI_VERSION));
        doc.insert("info".to_string(), self.info_value());
        doc.insert("servers".to_string(), servers_value());
        doc.insert("paths".to_string(), Value::Object(paths));
        doc.insert("components".to_string(), Value::Object(components));

        Ok(Value::Object(doc))
    }

    fn info_value(&self) -> Value {
        let mut info_obj = Map::new();
        info_obj.insert("title".to_string(), json!(self.info.title));
        info_obj.insert("version".to_string(), json!(self.info.version));
        if let Some(desc) = &self.info.description {
            info_obj.insert("description".to_string(), json!(desc));
        }
        Value::Object(info_obj)
    }

    /// Returns the path key, the HTTP verb and the operation object.
    fn build_operation(
        &self,
        name: &str,
        method: &MethodRecord,
        schemas: &mut Map<String, Value>,
    ) -> AppResult<(String, &'static str, Value)> {
        let login_required = method.requires_login();
        if !login_required && !method.allows_anonymous() {
            return Err(AppError::Unreachable(name.to_string()));
        }
        debug!(
            method = name,
            login_required,
            read_only_session = method.read_only_session.0,
            "Converting method"
        );

        let mut op = Map::new();
        op.insert("operationId".to_string(), json!(name));
        if !method.description.is_empty() {
            op.insert("summary".to_string(), json!(method.description));
            op.insert("description".to_string(), json!(method.description));
        }
        if self.add_tags {
            op.insert("tags".to_string(), json!([method.component]));
        }

        let params = synthesize(&method.parameters, self.fix_defaults);
        let has_params = !params.properties.is_empty();
        let params_name = parameters_schema_name(name);
        schemas.insert(params_name.clone(), schema_value(&params)?);
        let params_ref = json!({ "$ref": schema_ref(&params_name) });

        if has_params {
            let mut target = Map::new();
            target.insert("required".to_string(), json!(true));
            if !method.parameters.description.is_empty() {
                target.insert(
                    "description".to_string(),
                    json!(method.parameters.description),
                );
            }
            if login_required {
                target.insert(
                    "content".to_string(),
                    json!({ FORM_MEDIA_TYPE: { "schema": params_ref } }),
                );
                op.insert("requestBody".to_string(), Value::Object(target));
            } else {
                target.insert("name".to_string(), json!("args"));
                target.insert("in".to_string(), json!("query"));
                target.insert("schema".to_string(), params_ref);
                op.insert("parameters".to_string(), json!([Value::Object(target)]));
            }
        }

        let response_name = response_schema_name(name);
        let response = synthesize(&method.returns, self.fix_defaults);
        schemas.insert(response_name.clone(), schema_value(&response)?);

        let response_desc = if method.returns.description.is_empty() {
            DEFAULT_RESPONSE_DESCRIPTION
        } else {
            method.returns.description.as_str()
        };
        op.insert(
            "responses".to_string(),
            json!({
                "200": {
                    "description": response_desc,
                    "content": {
                        JSON_MEDIA_TYPE: { "schema": { "$ref": schema_ref(&response_name) } }
                    }
                }
            }),
        );

        if login_required {
            op.insert("security".to_string(), json!([{ TOKEN_SCHEME: [] }]));
            Ok((format!("{}#{}", REST_PATH, name), "post", Value::Object(op)))
        } else {
            Ok((
                format!("{}#{}", AJAX_NOLOGIN_PATH, name),
                "get",
                Value::Object(op),
            ))
        }
    }
}

fn schema_value(schema: &SchemaNode) -> AppResult<Value> {
    serde_json::to_value(schema).map_err(|e| AppError::Serialize(e.to_string()))
}

fn servers_value() -> Value {
    json!([{
        "url": "{scheme}://{host}",
        "description": "Custom Moodle server URL",
        "variables": {
            "scheme": { "enum": ["http", "https"], "default": "https" },
            "host": {
                "default": "localhost",
                "description": "The hostname of the Moodle server"
            }
        }
    }])
}

fn login_token_path_item() -> Value {
    let string_schema = json!({ "type": "string" });
    json!({
        "post": {
            "operationId": "login_token",
            "requestBody": {
                "required": true,
                "content": {
                    FORM_MEDIA_TYPE: {
                        "schema": {
                            "type": "object",
                            "properties": {
                                "username": string_schema,
                                "password": string_schema,
                                "service": string_schema
                            },
                            "required": ["username", "password", "service"]
                        }
                    }
                }
            },
            "responses": {
                "200": {
                    "description": DEFAULT_RESPONSE_DESCRIPTION,
                    "content": {
                        JSON_MEDIA_TYPE: {
                            "schema": {
                                "type": "object",
                                "properties": {
                                    "token": string_schema,
                                    "privatetoken": string_schema
                                },
                                "required": ["token", "privatetoken"]
                            }
                        }
                    }
                }
            }
        }
    })
}
