//! Wire types for the controller's XML REST payloads.
//!
//! Deserialized with `quick-xml`'s serde support. Repeated children are
//! always collected into a `Vec`, so a one-member list and a many-member
//! list look the same to callers; interleaved siblings (`<node>` vs
//! `<group>`, `<ae>` vs `<ze>`) are handled by the `overlapped-lists`
//! feature.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::Error;

/// Parse an XML body into `T`, keeping the raw body on failure.
pub fn parse<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    quick_xml::de::from_str(body).map_err(|e| Error::Xml {
        message: e.to_string(),
        body: body.to_owned(),
    })
}

// ── /rest/nodes ──────────────────────────────────────────────────────

/// The full node snapshot: devices plus scene groups.
///
/// `<root>` and `<folder>` children are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodesDocument {
    #[serde(rename = "node", default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(rename = "group", default)]
    pub groups: Vec<GroupRecord>,
}

/// A single `<node>` element.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeRecord {
    #[serde(rename = "@nodeDefId", default)]
    pub node_def_id: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub type_code: Option<String>,
    #[serde(default)]
    pub enabled: Option<String>,
    #[serde(default)]
    pub family: Option<Family>,
    /// Parent node address (node-server nodes).
    #[serde(default)]
    pub pnode: Option<String>,
    #[serde(default)]
    pub devtype: Option<DevType>,
    #[serde(rename = "property", default)]
    pub properties: Vec<PropertyRecord>,
}

/// `<family instance="3">10</family>`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Family {
    #[serde(rename = "@instance", default)]
    pub instance: Option<String>,
    #[serde(rename = "$text", default)]
    pub id: String,
}

/// Z-Wave nodes describe themselves with a `<devtype>` block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DevType {
    #[serde(default)]
    pub cat: Option<String>,
}

/// `<property id="ST" value="255" formatted="On" uom="100"/>`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyRecord {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@value", default)]
    pub value: String,
    #[serde(rename = "@formatted", default)]
    pub formatted: Option<String>,
    #[serde(rename = "@uom", default)]
    pub uom: Option<String>,
}

/// A scene (`<group>`) and its member links.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupRecord {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub members: Option<Members>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Members {
    #[serde(rename = "link", default)]
    pub links: Vec<Link>,
}

/// `<link type="16">17 54 AD 1</link>`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Link {
    #[serde(rename = "@type", default)]
    pub link_type: Option<String>,
    #[serde(rename = "$text", default)]
    pub address: String,
}

// ── /rest/vars ───────────────────────────────────────────────────────

/// `/rest/vars/definitions/{type}` answers with a `<CList>` of `<e>` entries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VariableDefinitions {
    #[serde(rename = "e", default)]
    pub entries: Vec<VariableDefinition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VariableDefinition {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@name", default)]
    pub name: String,
}

/// `/rest/vars/get/{type}` answers with `<vars>` of `<var>` entries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VariableValues {
    #[serde(rename = "var", default)]
    pub vars: Vec<VariableRecord>,
}

/// A variable's current value, also the root of `/rest/vars/get/{type}/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VariableRecord {
    #[serde(rename = "@type", default)]
    pub var_type: String,
    #[serde(rename = "@id", default)]
    pub id: String,
    #[serde(default)]
    pub init: Option<String>,
    #[serde(default)]
    pub val: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
}

// ── /rest/elk ────────────────────────────────────────────────────────

/// Alarm topology. Accepts both `<areas>` as the root and
/// `<topology><areas>` wrapping.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ElkTopology {
    #[serde(rename = "area", default)]
    area: Vec<ElkArea>,
    #[serde(default)]
    areas: Option<ElkAreas>,
}

impl ElkTopology {
    /// All areas, regardless of which wrapping the controller used.
    pub fn areas(&self) -> impl Iterator<Item = &ElkArea> {
        self.area
            .iter()
            .chain(self.areas.iter().flat_map(|a| a.area.iter()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ElkAreas {
    #[serde(rename = "area", default)]
    area: Vec<ElkArea>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ElkArea {
    #[serde(rename = "@id")]
    pub id: u32,
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "zone", default)]
    pub zones: Vec<ElkZone>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ElkZone {
    #[serde(rename = "@id")]
    pub id: u32,
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "@alarmDef", default)]
    pub alarm_def: Option<u32>,
}

/// Initial alarm status: area (`<ae>`) and zone (`<ze>`) updates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ElkStatus {
    #[serde(rename = "ae", default)]
    pub areas: Vec<AreaEvent>,
    #[serde(rename = "ze", default)]
    pub zones: Vec<ZoneEvent>,
}

/// `<ae type="3" area="1" val="1"/>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AreaEvent {
    #[serde(rename = "@type")]
    pub kind: u32,
    #[serde(rename = "@area")]
    pub area: u32,
    #[serde(rename = "@val", default)]
    pub val: String,
}

/// `<ze type="52" zone="5" val="1"/>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ZoneEvent {
    #[serde(rename = "@type")]
    pub kind: u32,
    #[serde(rename = "@zone")]
    pub zone: u32,
    #[serde(rename = "@val", default)]
    pub val: String,
}

// ── Tests ────────────────────────────────────────────────────────────
