use super::blocks::Block;
use crate::ast::ValueType;
use crate::condition::SourceType;
use crate::data::{DataSourceSnapshot, typed_value};
use crate::error::FlowError;
use crate::resolver::{Catalog, TypedEnvironment};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Id of the start node every new flow is created with.
pub const START_NODE_ID: &str = "start";

/// Version stamped on exported documents.
pub const EXPORT_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerType {
    #[default]
    Polling,
    Schedule,
    Webhook,
}

/// Trigger settings. Only the field matching the trigger type is meaningful.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron_expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

/// A flow-scoped variable, readable by conditions as `variable` sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalVariable {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(rename = "type")]
    pub declared_type: ValueType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    #[serde(rename = "start")]
    Start,
    #[serde(rename = "if")]
    If,
    #[serde(rename = "javascript")]
    JavaScript,
    #[serde(rename = "cache")]
    Cache,
    #[serde(rename = "pushToIoT")]
    PushToIoT,
    #[serde(rename = "end")]
    End,
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BlockKind::Start => "start",
            BlockKind::If => "if",
            BlockKind::JavaScript => "javascript",
            BlockKind::Cache => "cache",
            BlockKind::PushToIoT => "pushToIoT",
            BlockKind::End => "end",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub data: NodeData,
}

impl FlowNode {
    pub fn new(id: &str, kind: BlockKind, label: &str) -> Self {
        Self {
            id: id.to_string(),
            kind,
            position: Position::default(),
            data: NodeData {
                label: label.to_string(),
                config: None,
            },
        }
    }

    /// Stores a typed block configuration as the node's opaque config.
    pub fn with_config<T: Serialize>(mut self, config: &T) -> Result<Self, FlowError> {
        self.data.config = Some(serde_json::to_value(config)?);
        Ok(self)
    }

    /// Parses the opaque config into the block matching this node's kind.
    pub fn block(&self) -> Result<Block, FlowError> {
        match self.kind {
            BlockKind::Start => Ok(Block::Start),
            BlockKind::End => Ok(Block::End),
            BlockKind::If => Ok(Block::If(self.config()?.unwrap_or_default())),
            BlockKind::JavaScript => self.required_config().map(Block::JavaScript),
            BlockKind::Cache => self.required_config().map(Block::Cache),
            BlockKind::PushToIoT => self.required_config().map(Block::PushToIoT),
        }
    }

    fn config<T: DeserializeOwned>(&self) -> Result<Option<T>, FlowError> {
        self.data
            .config
            .as_ref()
            .filter(|config| !config.is_null())
            .map(|config| {
                serde_json::from_value(config.clone()).map_err(|e| FlowError::InvalidBlockConfig {
                    node_id: self.id.clone(),
                    kind: self.kind.to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()
    }

    fn required_config<T: DeserializeOwned>(&self) -> Result<T, FlowError> {
        self.config()?.ok_or_else(|| FlowError::InvalidBlockConfig {
            node_id: self.id.clone(),
            kind: self.kind.to_string(),
            message: "block has not been configured".to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub edge_type: Option<String>,
}

impl FlowEdge {
    pub fn new(id: &str, source: &str, target: &str) -> Self {
        Self {
            id: id.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            source_handle: None,
            target_handle: None,
            label: None,
            edge_type: None,
        }
    }

    pub fn from_handle(mut self, handle: &str) -> Self {
        self.source_handle = Some(handle.to_string());
        self
    }
}

/// A persisted pipeline document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub trigger_type: TriggerType,
    #[serde(default)]
    pub trigger_config: TriggerConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source_id: Option<String>,
    #[serde(default)]
    pub global_variables: Vec<GlobalVariable>,
    #[serde(default)]
    pub nodes: Vec<FlowNode>,
    #[serde(default)]
    pub edges: Vec<FlowEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Flow {
    /// A new, empty flow holding only its start node.
    pub fn new(id: &str, name: &str) -> Self {
        let mut start = FlowNode::new(START_NODE_ID, BlockKind::Start, "Start");
        start.position = Position { x: 250.0, y: 50.0 };
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            trigger_type: TriggerType::default(),
            trigger_config: TriggerConfig::default(),
            data_source_id: None,
            global_variables: Vec::new(),
            nodes: vec![start],
            edges: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, FlowError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn outgoing<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a FlowEdge> + 'a {
        self.edges.iter().filter(move |edge| edge.source == node_id)
    }

    /// The flow's global variables as a resolver.
    pub fn variables(&self) -> TypedEnvironment {
        let mut env = TypedEnvironment::new();
        for variable in &self.global_variables {
            env.insert_with_id(
                SourceType::Variable,
                &variable.id,
                &variable.name,
                typed_value(&variable.value, variable.declared_type),
                variable.declared_type,
            );
        }
        env
    }

    /// A resolver over a data-source snapshot plus the flow's global variables.
    pub fn environment(&self, snapshot: &DataSourceSnapshot) -> TypedEnvironment {
        let mut env = snapshot.to_environment();
        env.merge(self.variables());
        env
    }

    /// Declared types known for this flow, optionally including a data source.
    pub fn catalog(&self, snapshot: Option<&DataSourceSnapshot>) -> Catalog {
        match snapshot {
            Some(snapshot) => Catalog::from(&self.environment(snapshot)),
            None => Catalog::from(&self.variables()),
        }
    }

    pub fn export(&self, exported_at: &str) -> FlowExport {
        FlowExport {
            flow: self.clone(),
            exported_at: exported_at.to_string(),
            version: EXPORT_VERSION.to_string(),
        }
    }
}

/// An exported document: the flow plus export metadata, flattened into one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowExport {
    #[serde(flatten)]
    pub flow: Flow,
    pub exported_at: String,
    pub version: String,
}
