//! Maps engine commands onto the multi-object Apex REST resource.

use crate::domain::delegate::RemoteDelegate;
use crate::domain::error::CrmResult;
use crate::domain::validation::Command;
use crate::infra::salesforce::RemoteApi;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

/// A single Apex request derived from a command.
#[derive(Debug, Clone, PartialEq)]
pub struct ApexCall {
    pub method: Method,
    pub body: Option<JsonValue>,
    pub query: Option<Vec<(String, String)>>,
}

impl ApexCall {
    pub fn for_command(command: &Command) -> Self {
        let table = command.table().as_str().to_string();
        match command {
            Command::Add { fields, .. } => ApexCall {
                method: Method::POST,
                body: Some(json!({
                    "tablename": table,
                    "FirstName": fields.first_name,
                    "LastName": fields.last_name,
                    "Email": fields.email,
                })),
                query: None,
            },
            Command::Filter { filter, .. } => ApexCall {
                method: Method::GET,
                body: None,
                query: Some(vec![
                    ("tablename".to_string(), table),
                    ("filter".to_string(), filter.clone()),
                ]),
            },
            Command::Update { id, patch, .. } => {
                let mut body = json!({ "tablename": table, "Id": id });
                if let (Some(obj), Ok(JsonValue::Object(fields))) =
                    (body.as_object_mut(), serde_json::to_value(patch))
                {
                    obj.extend(fields);
                }
                ApexCall {
                    method: Method::PATCH,
                    body: Some(body),
                    query: None,
                }
            }
            Command::Delete { id, .. } => ApexCall {
                method: Method::DELETE,
                body: None,
                query: Some(vec![
                    ("tablename".to_string(), table),
                    ("Id".to_string(), id.clone()),
                ]),
            },
        }
    }
}

pub struct ApexDelegate {
    api: Arc<dyn RemoteApi>,
    path: String,
}

impl ApexDelegate {
    pub fn new(api: Arc<dyn RemoteApi>) -> Self {
        Self {
            api,
            path: String::new(),
        }
    }

    /// Sub-path appended to the Apex root for every call.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }
}

#[async_trait]
impl RemoteDelegate for ApexDelegate {
    async fn forward(&self, command: &Command) -> CrmResult<JsonValue> {
        let call = ApexCall::for_command(command);
        self.api
            .call(
                call.method,
                &self.path,
                call.body.as_ref(),
                call.query.as_deref(),
            )
            .await
    }
}
