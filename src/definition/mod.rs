//! Definition Documents
//!
//! The canonical Full Graph and Full Project Definitions exchanged with the
//! control plane. Field names and nesting are the wire contract.

pub mod graph;
pub mod project;

pub use graph::{
    AgentDefinition, ArtifactComponentDefinition, CanUseDefinition, CredentialReferenceDefinition,
    DataComponentDefinition, ExternalAgentDefinition, FullGraphDefinition, FunctionDefinition,
    FunctionToolDefinition, InternalAgentDefinition, McpServerDefinition, McpServerUrl,
    McpTransport, ToolDefinition, ToolServerConfig,
};
pub use project::{FullProjectDefinition, ProjectMetadata};

use crate::error::ApiError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

const TIMESTAMP_FIELDS: [&str; 2] = ["createdAt", "updatedAt"];

impl FullGraphDefinition {
    /// Content hash of the document, ignoring timestamps.
    pub fn fingerprint(&self) -> Result<String, ApiError> {
        fingerprint_of(self, |value| strip_timestamps(value))
    }
}

impl FullProjectDefinition {
    /// Content hash of the document and its graphs, ignoring timestamps.
    pub fn fingerprint(&self) -> Result<String, ApiError> {
        fingerprint_of(self, |value| {
            strip_timestamps(value);
            if let Some(Value::Object(graphs)) = value.get_mut("graphs") {
                for graph in graphs.values_mut() {
                    strip_timestamps(graph);
                }
            }
        })
    }
}

fn fingerprint_of<T: Serialize>(
    document: &T,
    normalize: impl FnOnce(&mut Value),
) -> Result<String, ApiError> {
    let mut value = serde_json::to_value(document)?;
    normalize(&mut value);
    let mut bytes = Vec::new();
    write_canonical(&value, &mut bytes)?;
    Ok(hex::encode(blake3::hash(&bytes).as_bytes()))
}

/// JSON encoding with object keys sorted at every level.
fn write_canonical(value: &Value, out: &mut Vec<u8>) -> Result<(), ApiError> {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push(b'{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                out.extend(serde_json::to_vec(key)?);
                out.push(b':');
                write_canonical(&map[key], out)?;
            }
            out.push(b'}');
        }
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_canonical(item, out)?;
            }
            out.push(b']');
        }
        scalar => out.extend(serde_json::to_vec(scalar)?),
    }
    Ok(())
}

fn strip_timestamps(value: &mut Value) {
    if let Value::Object(map) = value {
        for field in TIMESTAMP_FIELDS {
            map.remove(field);
        }
    }
}

/// Read a definition document, choosing the format from the file extension
/// (`.yaml`/`.yml`, `.toml`, anything else as JSON).
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, ApiError> {
    let content = std::fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let parsed = match extension.as_deref() {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
        Some("toml") => toml::from_str(&content).map_err(|e| e.to_string()),
        _ => serde_json::from_str(&content).map_err(|e| e.to_string()),
    };
    parsed.map_err(|e| {
        ApiError::Document(format!("Failed to parse {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::TransportKind;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn sample() -> FullGraphDefinition {
        let mut agents = BTreeMap::new();
        agents.insert(
            "router".to_string(),
            AgentDefinition::Internal(InternalAgentDefinition {
                id: "router".into(),
                name: "Router".into(),
                description: "Routes requests".into(),
                prompt: "Route.".into(),
                models: None,
                stop_when: None,
                can_transfer_to: vec![],
                can_delegate_to: vec!["partner".into()],
                can_use: vec![CanUseDefinition {
                    tool_id: "weather".into(),
                    tool_selection: None,
                    headers: None,
                }],
                data_components: vec![],
                artifact_components: vec![],
            }),
        );
        agents.insert(
            "partner".to_string(),
            AgentDefinition::External(ExternalAgentDefinition {
                id: "partner".into(),
                name: "Partner".into(),
                description: "Third party".into(),
                base_url: "https://partner.example.com".into(),
                credential_reference_id: None,
                headers: None,
            }),
        );
        let mut tools = BTreeMap::new();
        tools.insert(
            "weather".to_string(),
            ToolDefinition {
                id: "weather".into(),
                name: "Weather".into(),
                description: None,
                config: ToolServerConfig {
                    kind: "mcp".into(),
                    mcp: McpServerDefinition {
                        server: McpServerUrl {
                            url: "https://weather.example.com/mcp".into(),
                        },
                        transport: McpTransport {
                            kind: TransportKind::StreamableHttp,
                        },
                        active_tools: None,
                    },
                },
                credential_reference_id: None,
                headers: None,
                image_url: None,
            },
        );
        FullGraphDefinition {
            id: "g1".into(),
            name: "G1".into(),
            description: None,
            default_agent_id: Some("router".into()),
            agents,
            tools,
            functions: BTreeMap::new(),
            function_tools: BTreeMap::new(),
            data_components: BTreeMap::new(),
            artifact_components: BTreeMap::new(),
            credential_references: BTreeMap::new(),
            models: None,
            stop_when: None,
            status_updates: None,
            graph_prompt: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn agents_are_tagged_by_type() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["agents"]["router"]["type"], "internal");
        assert_eq!(value["agents"]["partner"]["type"], "external");
        assert_eq!(value["agents"]["partner"]["baseUrl"], "https://partner.example.com");
        assert_eq!(
            value["agents"]["router"]["canUse"][0],
            json!({"toolId": "weather", "toolSelection": null, "headers": null})
        );
        assert_eq!(value["tools"]["weather"]["config"]["type"], "mcp");
        assert_eq!(
            value["tools"]["weather"]["config"]["mcp"]["transport"]["type"],
            "streamableHttp"
        );
    }

    #[test]
    fn fingerprint_ignores_timestamps() {
        let plain = sample();
        let mut stamped = sample();
        stamped.created_at = Some("2026-01-01T00:00:00Z".into());
        stamped.updated_at = Some("2026-01-02T00:00:00Z".into());
        assert_eq!(plain.fingerprint().unwrap(), stamped.fingerprint().unwrap());

        let mut changed = sample();
        changed.name = "Renamed".into();
        assert_ne!(plain.fingerprint().unwrap(), changed.fingerprint().unwrap());
    }

    #[test]
    fn load_document_reads_json_and_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("graph.json");
        std::fs::write(&json_path, serde_json::to_string(&sample()).unwrap()).unwrap();
        let yaml_path = dir.path().join("graph.yaml");
        std::fs::write(&yaml_path, serde_yaml::to_string(&sample()).unwrap()).unwrap();

        let from_json: FullGraphDefinition = load_document(&json_path).unwrap();
        let from_yaml: FullGraphDefinition = load_document(&yaml_path).unwrap();
        assert_eq!(from_json, sample());
        assert_eq!(from_yaml, sample());

        let bad_path = dir.path().join("bad.json");
        std::fs::write(&bad_path, "{not json").unwrap();
        let err = load_document::<FullGraphDefinition>(&bad_path).unwrap_err();
        assert!(matches!(err, ApiError::Document(_)));
    }
}
