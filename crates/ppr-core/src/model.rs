//! Entity model for Product-Process-Resource (PPR) graphs.
//!
//! Nodes are keyed by `name` everywhere an edge refers to them; the UUID is an
//! opaque record identifier carried through import/export.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The role a node plays in the PPR structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeType {
    #[serde(rename = "Product 1")]
    Product1,
    #[serde(rename = "Product 2")]
    Product2,
    Process,
    Resource,
}

impl NodeType {
    pub const ALL: [NodeType; 4] = [
        NodeType::Product1,
        NodeType::Product2,
        NodeType::Process,
        NodeType::Resource,
    ];

    /// Label used in documents and user-facing output.
    pub fn label(self) -> &'static str {
        match self {
            NodeType::Product1 => "Product 1",
            NodeType::Product2 => "Product 2",
            NodeType::Process => "Process",
            NodeType::Resource => "Resource",
        }
    }

    pub fn is_product(self) -> bool {
        matches!(self, NodeType::Product1 | NodeType::Product2)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "product1" | "p1" => Ok(NodeType::Product1),
            "product2" | "p2" => Ok(NodeType::Product2),
            "process" => Ok(NodeType::Process),
            "resource" => Ok(NodeType::Resource),
            _ => Err(format!(
                "unknown node type '{}' (expected one of: Product 1, Product 2, Process, Resource)",
                s
            )),
        }
    }
}

/// One of the two product lines, each owning its own edge collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProductLine {
    #[serde(rename = "product 1")]
    One,
    #[serde(rename = "product 2")]
    Two,
}

impl ProductLine {
    pub const ALL: [ProductLine; 2] = [ProductLine::One, ProductLine::Two];

    /// Key of this line's edge collection in a PPR document.
    pub fn key(self) -> &'static str {
        match self {
            ProductLine::One => "product 1",
            ProductLine::Two => "product 2",
        }
    }

    /// The product node type that belongs exclusively to this line.
    pub fn product_type(self) -> NodeType {
        match self {
            ProductLine::One => NodeType::Product1,
            ProductLine::Two => NodeType::Product2,
        }
    }

    /// Whether nodes of `node_type` take part in this line's graph.
    /// Processes and resources are shared; products belong to their own line.
    pub fn admits(self, node_type: NodeType) -> bool {
        !node_type.is_product() || node_type == self.product_type()
    }
}

impl fmt::Display for ProductLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ProductLine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "one" | "product 1" | "product1" | "p1" => Ok(ProductLine::One),
            "2" | "two" | "product 2" | "product2" | "p2" => Ok(ProductLine::Two),
            _ => Err(format!("unknown product line '{}' (expected 1 or 2)", s)),
        }
    }
}

/// Fixed relation vocabulary for edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RelationKind {
    #[serde(rename = "Input for")]
    InputFor,
    #[serde(rename = "Outputs")]
    Outputs,
    #[serde(rename = "Executed by")]
    ExecutedBy,
    #[serde(rename = "Connected to")]
    ConnectedTo,
}

impl RelationKind {
    pub const ALL: [RelationKind; 4] = [
        RelationKind::InputFor,
        RelationKind::Outputs,
        RelationKind::ExecutedBy,
        RelationKind::ConnectedTo,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RelationKind::InputFor => "Input for",
            RelationKind::Outputs => "Outputs",
            RelationKind::ExecutedBy => "Executed by",
            RelationKind::ConnectedTo => "Connected to",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RelationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace(['-', '_'], " ").to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().to_lowercase() == wanted)
            .ok_or_else(|| {
                let labels: Vec<&str> = Self::ALL.iter().map(|k| k.label()).collect();
                format!(
                    "unknown relation '{}' (expected one of: {})",
                    s,
                    labels.join(", ")
                )
            })
    }
}

/// A single attribute value. The editing forms store free text; imported
/// documents may carry numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Integer(i64),
    /// Integers above `i64::MAX`, kept exact instead of widening to float.
    UInteger(u64),
    Float(f64),
    Text(String),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Integer(v) => write!(f, "{}", v),
            AttributeValue::UInteger(v) => write!(f, "{}", v),
            AttributeValue::Float(v) => write!(f, "{}", v),
            AttributeValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Float(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl AttributeValue {
    /// Interpret user input: integers and floats become numbers, anything
    /// else stays text.
    pub fn parse_lenient(input: &str) -> Self {
        let trimmed = input.trim();
        if let Ok(v) = trimmed.parse::<i64>() {
            AttributeValue::Integer(v)
        } else if let Ok(v) = trimmed.parse::<u64>() {
            AttributeValue::UInteger(v)
        } else if let Ok(v) = trimmed.parse::<f64>()
            && v.is_finite()
        {
            AttributeValue::Float(v)
        } else {
            AttributeValue::Text(input.to_string())
        }
    }
}

/// Basic engineering data of a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Engineering {
    #[serde(rename = "Cost", default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<AttributeValue>,
    #[serde(rename = "Target Values", default, skip_serializing_if = "Option::is_none")]
    pub target_values: Option<AttributeValue>,
    /// Overall equipment effectiveness, in percent.
    #[serde(rename = "OEE", default, skip_serializing_if = "Option::is_none")]
    pub oee: Option<AttributeValue>,
    /// Mean time to repair, in minutes.
    #[serde(rename = "MTTR", default, skip_serializing_if = "Option::is_none")]
    pub mttr: Option<AttributeValue>,
    /// Mean time to failure.
    #[serde(rename = "MTTF", default, skip_serializing_if = "Option::is_none")]
    pub mttf: Option<AttributeValue>,
    /// Fields outside the known set, kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Electrical data of a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Electrical {
    /// Amperes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<AttributeValue>,
    /// Volts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage: Option<AttributeValue>,
    /// Watts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<AttributeValue>,
    /// Ohms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resistance: Option<AttributeValue>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Sustainability data of a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sustainable {
    /// Kilotons.
    #[serde(rename = "CO2 footprint", default, skip_serializing_if = "Option::is_none")]
    pub co2_footprint: Option<AttributeValue>,
    /// kWh.
    #[serde(
        rename = "energy consumption",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub energy_consumption: Option<AttributeValue>,
    /// Percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reusability: Option<AttributeValue>,
    /// Percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repairability: Option<AttributeValue>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Named attribute fields of one group, in display order.
pub type FieldList<'a> = Vec<(&'static str, Option<&'a AttributeValue>)>;

impl Engineering {
    pub fn fields(&self) -> FieldList<'_> {
        vec![
            ("Cost", self.cost.as_ref()),
            ("Target Values", self.target_values.as_ref()),
            ("OEE", self.oee.as_ref()),
            ("MTTR", self.mttr.as_ref()),
            ("MTTF", self.mttf.as_ref()),
        ]
    }
}

impl Electrical {
    pub fn fields(&self) -> FieldList<'_> {
        vec![
            ("current", self.current.as_ref()),
            ("voltage", self.voltage.as_ref()),
            ("power", self.power.as_ref()),
            ("resistance", self.resistance.as_ref()),
        ]
    }
}

impl Sustainable {
    pub fn fields(&self) -> FieldList<'_> {
        vec![
            ("CO2 footprint", self.co2_footprint.as_ref()),
            ("energy consumption", self.energy_consumption.as_ref()),
            ("reusability", self.reusability.as_ref()),
            ("repairability", self.repairability.as_ref()),
        ]
    }
}

/// Selector for one of the three attribute groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeGroup {
    Engineering,
    Electrical,
    Sustainable,
}

impl AttributeGroup {
    pub const ALL: [AttributeGroup; 3] = [
        AttributeGroup::Engineering,
        AttributeGroup::Electrical,
        AttributeGroup::Sustainable,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AttributeGroup::Engineering => "Engineering",
            AttributeGroup::Electrical => "Electrical",
            AttributeGroup::Sustainable => "Sustainable",
        }
    }
}

impl FromStr for AttributeGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "engineering" | "eng" => Ok(AttributeGroup::Engineering),
            "electrical" | "elec" => Ok(AttributeGroup::Electrical),
            "sustainable" | "sustainability" | "sus" => Ok(AttributeGroup::Sustainable),
            _ => Err(format!(
                "unknown attribute group '{}' (expected engineering, electrical or sustainable)",
                s
            )),
        }
    }
}

/// Borrowed view of one attribute group.
#[derive(Debug, Clone, Copy)]
pub enum AttributeView<'a> {
    Engineering(&'a Engineering),
    Electrical(&'a Electrical),
    Sustainable(&'a Sustainable),
}

impl<'a> AttributeView<'a> {
    pub fn fields(self) -> FieldList<'a> {
        match self {
            AttributeView::Engineering(g) => g.fields(),
            AttributeView::Electrical(g) => g.fields(),
            AttributeView::Sustainable(g) => g.fields(),
        }
    }

    pub fn extra(self) -> &'a BTreeMap<String, Value> {
        match self {
            AttributeView::Engineering(g) => &g.extra,
            AttributeView::Electrical(g) => &g.extra,
            AttributeView::Sustainable(g) => &g.extra,
        }
    }
}

/// The three attribute groups of a node. A group is `None` when the node
/// record does not carry it at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    pub engineering: Option<Engineering>,
    pub electrical: Option<Electrical>,
    pub sustainable: Option<Sustainable>,
    /// Unknown groups found under `submodels`.
    pub extra: BTreeMap<String, Value>,
}

impl Attributes {
    /// All three groups present with no values filled in.
    pub fn empty_groups() -> Self {
        Self {
            engineering: Some(Engineering::default()),
            electrical: Some(Electrical::default()),
            sustainable: Some(Sustainable::default()),
            extra: BTreeMap::new(),
        }
    }

    pub fn view(&self, group: AttributeGroup) -> Option<AttributeView<'_>> {
        match group {
            AttributeGroup::Engineering => self.engineering.as_ref().map(AttributeView::Engineering),
            AttributeGroup::Electrical => self.electrical.as_ref().map(AttributeView::Electrical),
            AttributeGroup::Sustainable => self.sustainable.as_ref().map(AttributeView::Sustainable),
        }
    }

    /// Set one field of a group, creating the group if the node lacked it.
    /// `field` matches a known field label case-insensitively; any other
    /// name is stored among the group's extra fields.
    pub fn set(&mut self, group: AttributeGroup, field: &str, value: AttributeValue) {
        let key = field.trim().to_lowercase();
        match group {
            AttributeGroup::Engineering => {
                let g = self.engineering.get_or_insert_with(Engineering::default);
                let slot = match key.as_str() {
                    "cost" => &mut g.cost,
                    "target values" | "target_values" => &mut g.target_values,
                    "oee" => &mut g.oee,
                    "mttr" => &mut g.mttr,
                    "mttf" => &mut g.mttf,
                    _ => return set_extra(&mut g.extra, field, value),
                };
                *slot = Some(value);
            }
            AttributeGroup::Electrical => {
                let g = self.electrical.get_or_insert_with(Electrical::default);
                let slot = match key.as_str() {
                    "current" => &mut g.current,
                    "voltage" => &mut g.voltage,
                    "power" => &mut g.power,
                    "resistance" => &mut g.resistance,
                    _ => return set_extra(&mut g.extra, field, value),
                };
                *slot = Some(value);
            }
            AttributeGroup::Sustainable => {
                let g = self.sustainable.get_or_insert_with(Sustainable::default);
                let slot = match key.as_str() {
                    "co2 footprint" | "co2_footprint" => &mut g.co2_footprint,
                    "energy consumption" | "energy_consumption" => &mut g.energy_consumption,
                    "reusability" => &mut g.reusability,
                    "repairability" => &mut g.repairability,
                    _ => return set_extra(&mut g.extra, field, value),
                };
                *slot = Some(value);
            }
        }
    }
}

fn set_extra(extra: &mut BTreeMap<String, Value>, field: &str, value: AttributeValue) {
    let json = match value {
        AttributeValue::Integer(v) => Value::from(v),
        AttributeValue::UInteger(v) => Value::from(v),
        AttributeValue::Float(v) => Value::from(v),
        AttributeValue::Text(v) => Value::from(v),
    };
    extra.insert(field.trim().to_string(), json);
}

/// How a node record lays out its attribute groups in a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AttributeLayout {
    /// `"submodels": {"Engineering": .., "Electrical": .., "Sustainable": ..}`
    #[default]
    Nested,
    /// `"engineering"`, `"electrical"`, `"sustainable"` as top-level keys.
    Flat,
}

/// A product, process, or resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NodeRecord", into = "NodeRecord")]
pub struct Node {
    pub id: Uuid,
    /// Cross-reference key used by edges; unique within a store.
    pub name: String,
    pub node_type: NodeType,
    pub attributes: Attributes,
    pub layout: AttributeLayout,
    /// Top-level record fields outside the known set, kept verbatim.
    pub extra: BTreeMap<String, Value>,
}

impl Node {
    pub fn new(name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            node_type,
            attributes: Attributes::empty_groups(),
            layout: AttributeLayout::Nested,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }
}

#[derive(Serialize, Deserialize)]
struct NodeRecord {
    name: String,
    #[serde(rename = "type")]
    node_type: NodeType,
    id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    submodels: Option<Submodels>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    engineering: Option<Engineering>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    electrical: Option<Electrical>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sustainable: Option<Sustainable>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

#[derive(Default, Serialize, Deserialize)]
struct Submodels {
    #[serde(rename = "Engineering", default, skip_serializing_if = "Option::is_none")]
    engineering: Option<Engineering>,
    #[serde(rename = "Electrical", default, skip_serializing_if = "Option::is_none")]
    electrical: Option<Electrical>,
    #[serde(rename = "Sustainable", default, skip_serializing_if = "Option::is_none")]
    sustainable: Option<Sustainable>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl TryFrom<NodeRecord> for Node {
    type Error = String;

    fn try_from(record: NodeRecord) -> Result<Self, Self::Error> {
        let has_flat = record.engineering.is_some()
            || record.electrical.is_some()
            || record.sustainable.is_some();

        let (attributes, layout) = match record.submodels {
            Some(_) if has_flat => {
                return Err(format!(
                    "node '{}' mixes `submodels` with top-level attribute groups",
                    record.name
                ));
            }
            Some(sub) => (
                Attributes {
                    engineering: sub.engineering,
                    electrical: sub.electrical,
                    sustainable: sub.sustainable,
                    extra: sub.extra,
                },
                AttributeLayout::Nested,
            ),
            None => (
                Attributes {
                    engineering: record.engineering,
                    electrical: record.electrical,
                    sustainable: record.sustainable,
                    extra: BTreeMap::new(),
                },
                AttributeLayout::Flat,
            ),
        };

        Ok(Node {
            id: record.id,
            name: record.name,
            node_type: record.node_type,
            attributes,
            layout,
            extra: record.extra,
        })
    }
}

impl From<Node> for NodeRecord {
    fn from(node: Node) -> Self {
        let Attributes {
            engineering,
            electrical,
            sustainable,
            extra: group_extra,
        } = node.attributes;

        match node.layout {
            AttributeLayout::Nested => NodeRecord {
                name: node.name,
                node_type: node.node_type,
                id: node.id,
                submodels: Some(Submodels {
                    engineering,
                    electrical,
                    sustainable,
                    extra: group_extra,
                }),
                engineering: None,
                electrical: None,
                sustainable: None,
                extra: node.extra,
            },
            AttributeLayout::Flat => NodeRecord {
                name: node.name,
                node_type: node.node_type,
                id: node.id,
                submodels: None,
                engineering,
                electrical,
                sustainable,
                extra: node.extra,
            },
        }
    }
}

/// A directed relation between two nodes, referenced by name.
/// The owning product line is the collection the edge is stored in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub relation: RelationKind,
    pub id: Uuid,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Edge {
    pub fn new(source: impl Into<String>, relation: RelationKind, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relation,
            id: Uuid::new_v4(),
            extra: BTreeMap::new(),
        }
    }

    /// Whether `name` is either endpoint.
    pub fn touches(&self, name: &str) -> bool {
        self.source == name || self.target == name
    }
}
