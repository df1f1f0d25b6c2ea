//! Tracking service client over the ftrack JSON API.
//!
//! Every request is a POST of an operation batch to `{server}/api`,
//! authenticated with the `ftrack-user` / `ftrack-api-key` headers.

use async_trait::async_trait;
use fcu_core::context::LaunchContext;
use fcu_core::tracking::{
    ComponentRecord, NewVersion, StatusRecord, TaskRecord, TrackingService, VersionRecord,
};
use fcu_core::{FcuError, Result};
use serde_json::{Value, json};
use std::time::Duration;
use uuid::Uuid;

const USER_AGENT: &str = concat!("fcu/", env!("CARGO_PKG_VERSION"));
const DEFAULT_LOCATION: &str = "ftrack.unmanaged";
const REVIEW_COMPONENT: &str = "ftrackreview-mp4";

pub struct FtrackRestClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_user: String,
    api_key: String,
    location_name: String,
}

impl FtrackRestClient {
    pub fn new(server_url: &str, api_user: &str, api_key: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FcuError::tracking(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: format!("{}/api", server_url.trim_end_matches('/')),
            api_user: api_user.to_string(),
            api_key: api_key.to_string(),
            location_name: DEFAULT_LOCATION.to_string(),
        })
    }

    /// Builds a client from the launch environment, with `server_override`
    /// taking precedence over `FTRACK_SERVER`.
    ///
    /// # Errors
    ///
    /// `FcuError::Config` when the server, user or API key is missing.
    pub fn from_context(context: &LaunchContext, server_override: Option<&str>) -> Result<Self> {
        let server = server_override
            .or(context.server_url.as_deref())
            .ok_or_else(|| FcuError::config("No tracking server configured (FTRACK_SERVER)"))?;
        let user = context
            .api_user
            .as_deref()
            .ok_or_else(|| FcuError::config("No API user in the environment (LOGNAME)"))?;
        let key = context
            .api_key
            .as_deref()
            .ok_or_else(|| FcuError::config("No API key in the environment (FTRACK_APIKEY)"))?;
        Self::new(server, user, key)
    }

    pub fn with_location(mut self, location_name: impl Into<String>) -> Self {
        self.location_name = location_name.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call(&self, operations: Vec<Value>) -> Result<Vec<Value>> {
        let expected = operations.len();
        tracing::debug!(operations = expected, "[Tracking] POST {}", self.endpoint);

        let response = self
            .http_client
            .post(&self.endpoint)
            .header("ftrack-user", &self.api_user)
            .header("ftrack-api-key", &self.api_key)
            .json(&operations)
            .send()
            .await
            .map_err(|e| FcuError::tracking(e.to_string()))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| FcuError::tracking(format!("Unreadable response ({}): {}", status, e)))?;

        parse_batch(body, expected)
    }

    async fn query(&self, expression: String) -> Result<Vec<Value>> {
        let mut results = self
            .call(vec![json!({"action": "query", "expression": expression})])
            .await?;
        let result = results.pop().unwrap_or(Value::Null);
        Ok(result
            .get("data")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    async fn query_first(&self, expression: String) -> Result<Option<Value>> {
        Ok(self.query(expression).await?.into_iter().next())
    }

    async fn create(&self, entity_type: &str, data: Value) -> Result<Value> {
        let mut results = self.call(vec![create_operation(entity_type, data)]).await?;
        Ok(results
            .pop()
            .and_then(|r| r.get("data").cloned())
            .unwrap_or(Value::Null))
    }

    async fn update(&self, entity_type: &str, id: &str, data: Value) -> Result<()> {
        self.call(vec![json!({
            "action": "update",
            "entity_type": entity_type,
            "entity_key": [id],
            "entity_data": data,
        })])
        .await?;
        Ok(())
    }

    async fn location_id(&self) -> Result<String> {
        let location = self
            .query_first(format!(
                "select id from Location where name is {}",
                quote(&self.location_name)
            ))
            .await?
            .ok_or_else(|| FcuError::not_found("Location", self.location_name.clone()))?;
        string_field(&location, "id")
            .ok_or_else(|| FcuError::tracking("Location without id"))
    }

    async fn asset_id(&self, request: &NewVersion) -> Result<String> {
        let existing = self
            .query_first(format!(
                "select id from Asset where name is {} and type.short is {} and context_id is {}",
                quote(&request.asset_name),
                quote(&request.asset_type),
                quote(&request.parent_id)
            ))
            .await?;
        if let Some(id) = existing.as_ref().and_then(|a| string_field(a, "id")) {
            return Ok(id);
        }

        let asset_type = self
            .query_first(format!(
                "select id from AssetType where short is {}",
                quote(&request.asset_type)
            ))
            .await?
            .and_then(|t| string_field(&t, "id"))
            .ok_or_else(|| FcuError::not_found("AssetType", request.asset_type.clone()))?;

        let id = Uuid::new_v4().to_string();
        self.create(
            "Asset",
            json!({
                "id": id,
                "name": request.asset_name,
                "type_id": asset_type,
                "context_id": request.parent_id,
            }),
        )
        .await?;
        Ok(id)
    }
}

#[async_trait]
impl TrackingService for FtrackRestClient {
    async fn create_version(&self, request: &NewVersion) -> Result<VersionRecord> {
        let asset_id = self.asset_id(request).await?;
        let id = Uuid::new_v4().to_string();
        let created = self
            .create(
                "AssetVersion",
                json!({
                    "id": id,
                    "asset_id": asset_id,
                    "task_id": request.task_id,
                    "comment": request.comment,
                }),
            )
            .await?;

        tracing::info!(
            version_id = %id,
            "[Tracking] Created version of {} ({})",
            request.asset_name,
            request.asset_type
        );
        Ok(VersionRecord {
            id,
            asset_name: request.asset_name.clone(),
            asset_type: request.asset_type.clone(),
            version: created.get("version").and_then(Value::as_u64).unwrap_or(0) as u32,
            task_id: request.task_id.clone(),
        })
    }

    async fn get_version(&self, version_id: &str) -> Result<Option<VersionRecord>> {
        let version = self
            .query_first(format!(
                "select id, version, task_id, asset.name, asset.type.short from AssetVersion where id is {}",
                quote(version_id)
            ))
            .await?;
        Ok(version.as_ref().and_then(version_from))
    }

    async fn uses_versions(&self, version_id: &str) -> Result<Vec<String>> {
        let links = self
            .query(format!(
                "select to_id from AssetVersionLink where from_id is {}",
                quote(version_id)
            ))
            .await?;
        Ok(links.iter().filter_map(|l| string_field(l, "to_id")).collect())
    }

    async fn add_uses_versions(&self, version_id: &str, used: &[String]) -> Result<()> {
        if used.is_empty() {
            return Ok(());
        }
        let operations = used
            .iter()
            .map(|to_id| {
                create_operation(
                    "AssetVersionLink",
                    json!({"from_id": version_id, "to_id": to_id}),
                )
            })
            .collect();
        self.call(operations).await?;
        Ok(())
    }

    async fn components(&self, version_id: &str) -> Result<Vec<ComponentRecord>> {
        let components = self
            .query(format!(
                "select id, name, component_locations.resource_identifier from Component where version_id is {}",
                quote(version_id)
            ))
            .await?;
        Ok(components.iter().filter_map(component_from).collect())
    }

    async fn create_component(
        &self,
        version_id: &str,
        name: &str,
        path: &str,
    ) -> Result<ComponentRecord> {
        let location_id = self.location_id().await?;
        let id = Uuid::new_v4().to_string();
        let file_type = std::path::Path::new(path)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        self.call(vec![
            create_operation(
                "FileComponent",
                json!({"id": id, "name": name, "version_id": version_id, "file_type": file_type}),
            ),
            create_operation(
                "ComponentLocation",
                json!({"component_id": id, "location_id": location_id, "resource_identifier": path}),
            ),
        ])
        .await?;

        Ok(ComponentRecord {
            id,
            name: name.to_string(),
            path: Some(path.to_string()),
        })
    }

    async fn make_reviewable(&self, version_id: &str, path: &str) -> Result<()> {
        self.create_component(version_id, REVIEW_COMPONENT, path)
            .await?;
        Ok(())
    }

    async fn publish_version(&self, version_id: &str) -> Result<()> {
        self.update("AssetVersion", version_id, json!({"is_published": true}))
            .await
    }

    async fn get_task(&self, task_id: &str) -> Result<Option<TaskRecord>> {
        let task = self
            .query_first(format!(
                "select id, name, object_type_id, status_id from Task where id is {}",
                quote(task_id)
            ))
            .await?;
        Ok(task.as_ref().and_then(task_from))
    }

    async fn task_statuses(&self) -> Result<Vec<StatusRecord>> {
        let statuses = self.query("select id, name from Status".to_string()).await?;
        Ok(statuses
            .iter()
            .filter_map(|s| {
                Some(StatusRecord {
                    id: string_field(s, "id")?,
                    name: string_field(s, "name")?,
                })
            })
            .collect())
    }

    async fn set_task_status(&self, task_id: &str, status_id: &str) -> Result<()> {
        self.update("Task", task_id, json!({"status_id": status_id}))
            .await
    }

    async fn shot_fps(&self, shot_id: &str) -> Result<Option<f64>> {
        let shot = self
            .query_first(format!(
                "select custom_attributes from Shot where id is {}",
                quote(shot_id)
            ))
            .await?;
        Ok(shot.as_ref().and_then(fps_from))
    }
}

fn create_operation(entity_type: &str, data: Value) -> Value {
    json!({"action": "create", "entity_type": entity_type, "entity_data": data})
}

/// Quotes a value for a query expression.
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Validates a batch response: an array with one result per operation.
/// Server-side failures come back as an object carrying `exception`.
fn parse_batch(body: Value, expected: usize) -> Result<Vec<Value>> {
    match body {
        Value::Array(results) if results.len() == expected => Ok(results),
        Value::Array(results) => Err(FcuError::tracking(format!(
            "Expected {} results, got {}",
            expected,
            results.len()
        ))),
        Value::Object(map) if map.contains_key("exception") => {
            let message = map
                .get("content")
                .and_then(Value::as_str)
                .unwrap_or("unknown server error");
            Err(FcuError::tracking(message.to_string()))
        }
        other => Err(FcuError::tracking(format!("Unexpected response: {}", other))),
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn version_from(value: &Value) -> Option<VersionRecord> {
    let asset = value.get("asset")?;
    Some(VersionRecord {
        id: string_field(value, "id")?,
        asset_name: string_field(asset, "name").unwrap_or_default(),
        asset_type: asset
            .get("type")
            .and_then(|t| string_field(t, "short"))
            .unwrap_or_default(),
        version: value.get("version").and_then(Value::as_u64).unwrap_or(0) as u32,
        task_id: string_field(value, "task_id"),
    })
}

fn component_from(value: &Value) -> Option<ComponentRecord> {
    let path = value
        .get("component_locations")
        .and_then(Value::as_array)
        .and_then(|locations| {
            locations
                .iter()
                .find_map(|l| string_field(l, "resource_identifier"))
        });
    Some(ComponentRecord {
        id: string_field(value, "id")?,
        name: string_field(value, "name")?,
        path,
    })
}

fn task_from(value: &Value) -> Option<TaskRecord> {
    Some(TaskRecord {
        id: string_field(value, "id")?,
        name: string_field(value, "name").unwrap_or_default(),
        object_type_id: string_field(value, "object_type_id").unwrap_or_default(),
        status_id: string_field(value, "status_id"),
    })
}

fn fps_from(value: &Value) -> Option<f64> {
    let attributes = value.get("custom_attributes")?;
    match attributes {
        Value::Object(map) => map.get("fps").and_then(Value::as_f64),
        Value::Array(entries) => entries
            .iter()
            .find(|e| e.get("key").and_then(Value::as_str) == Some("fps"))
            .and_then(|e| e.get("value"))
            .and_then(Value::as_f64),
        _ => None,
    }
}
