//! Real-time event records pushed over the subscription socket.
//!
//! Every text frame is a small XML document. Frames that carry no
//! `<control>` (subscription acknowledgements, heartbeats without a
//! payload) parse to `None` rather than an error.

use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::error::Error;
use crate::xml::{self, AreaEvent, ZoneEvent};

/// A parsed `<Event>` frame.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "@seqnum", default)]
    pub seqnum: Option<u64>,
    #[serde(rename = "@sid", default)]
    pub sid: Option<String>,
    #[serde(default)]
    pub control: Option<String>,
    #[serde(default)]
    pub action: Option<Action>,
    #[serde(default)]
    pub node: Option<String>,
    #[serde(rename = "eventInfo", default)]
    pub event_info: Option<EventInfo>,
    #[serde(rename = "fmtAct", default)]
    pub fmt_act: Option<String>,
    #[serde(rename = "fmtName", default)]
    pub fmt_name: Option<String>,
}

/// `<action uom="17" prec="1">720</action>`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Action {
    #[serde(rename = "@uom", default)]
    pub uom: Option<String>,
    #[serde(rename = "@prec", default)]
    pub prec: Option<String>,
    #[serde(rename = "$text", default)]
    pub value: String,
}

/// Composite payload for security and variable events.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventInfo {
    #[serde(default)]
    pub ae: Option<AreaEvent>,
    #[serde(default)]
    pub ze: Option<ZoneEvent>,
    #[serde(default)]
    pub var: Option<VariableEvent>,
}

/// `<var type="2" id="3"><val>1</val><ts>20240102 03:04:05</ts></var>`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VariableEvent {
    #[serde(rename = "@type")]
    pub var_type: String,
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(default)]
    pub val: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
}

impl EventRecord {
    /// The control code, e.g. `ST`, `CLITEMP`, `_19`, `GV3`.
    pub fn control(&self) -> &str {
        self.control.as_deref().unwrap_or_default()
    }

    /// The raw action text, trimmed. Empty when absent.
    pub fn action_value(&self) -> &str {
        self.action.as_ref().map_or("", |a| a.value.trim())
    }

    /// Unit-of-measure code attached to the action.
    pub fn uom(&self) -> Option<u32> {
        self.action.as_ref()?.uom.as_deref()?.trim().parse().ok()
    }

    /// Fixed-point precision attached to the action.
    pub fn precision(&self) -> Option<u32> {
        self.action.as_ref()?.prec.as_deref()?.trim().parse().ok()
    }

    /// The addressed node, if the frame names one.
    pub fn node_address(&self) -> Option<&str> {
        self.node.as_deref().filter(|n| !n.is_empty())
    }
}

/// Parse a text frame into an event record.
///
/// Returns `Ok(None)` for well-formed frames that are not node events.
pub fn parse_event(text: &str) -> Result<Option<EventRecord>, Error> {
    let record: EventRecord = xml::parse(text)?;
    if record.control.as_deref().is_none_or(str::is_empty) {
        return Ok(None);
    }
    Ok(Some(record))
}

/// Decode the controller's compact `YYYYMMDD HH:MM:SS` timestamps.
pub fn parse_timestamp(ts: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(ts.trim(), "%Y%m%d %H:%M:%S").ok()
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn parse_status_event() {
        let frame = r#"<?xml version="1.0"?><Event seqnum="12" sid="uuid:46"><control>ST</control><action uom="100" prec="0">255</action><node>17 54 AD 1</node><eventInfo></eventInfo><fmtAct>On</fmtAct></Event>"#;
        let evt = parse_event(frame).unwrap().unwrap();
        assert_eq!(evt.seqnum, Some(12));
        assert_eq!(evt.control(), "ST");
        assert_eq!(evt.action_value(), "255");
        assert_eq!(evt.uom(), Some(100));
        assert_eq!(evt.precision(), Some(0));
        assert_eq!(evt.node_address(), Some("17 54 AD 1"));
        assert_eq!(evt.fmt_act.as_deref(), Some("On"));
    }

    #[test]
    fn parse_security_zone_event() {
        let frame = r#"<Event seqnum="3" sid="uuid:1"><control>_19</control><action>3</action><node></node><eventInfo><ze type="52" zone="5" val="1"/></eventInfo></Event>"#;
        let evt = parse_event(frame).unwrap().unwrap();
        assert_eq!(evt.action_value(), "3");
        assert_eq!(evt.node_address(), None);
        let ze = evt.event_info.unwrap().ze.unwrap();
        assert_eq!((ze.kind, ze.zone, ze.val.as_str()), (52, 5, "1"));
    }

    #[test]
    fn parse_variable_event() {
        let frame = r#"<Event seqnum="9" sid="uuid:1"><control>_1</control><action>6</action><node></node><eventInfo><var type="2" id="3"><val>1</val><ts>20240102 03:04:05</ts></var></eventInfo></Event>"#;
        let evt = parse_event(frame).unwrap().unwrap();
        let var = evt.event_info.unwrap().var.unwrap();
        assert_eq!(var.var_type, "2");
        assert_eq!(var.id, "3");
        assert_eq!(var.val.as_deref(), Some("1"));
    }

    #[test]
    fn subscription_response_is_not_an_event() {
        let frame = r#"<?xml version="1.0" encoding="UTF-8"?><SubscriptionResponse><SID>uuid:74</SID><duration>0</duration></SubscriptionResponse>"#;
        assert!(parse_event(frame).unwrap().is_none());
    }

    #[test]
    fn garbage_frame_is_an_error() {
        assert!(parse_event("<Event><control>ST").is_err());
    }

    #[test]
    fn compact_timestamp_month_is_one_based() {
        let ts = parse_timestamp("20240102 03:04:05").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2024, 1, 2));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (3, 4, 5));
        assert!(parse_timestamp("not a date").is_none());
    }
}
