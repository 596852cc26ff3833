#![allow(clippy::unwrap_used)]
// Integration tests for `RestClient` using wiremock.

use secrecy::SecretString;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use isy_api::{Error, RestClient, VariableKind};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, RestClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = RestClient::with_client(
        reqwest::Client::new(),
        base_url,
        "admin".into(),
        SecretString::from("admin".to_string()),
    );
    (server, client)
}

fn xml(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/xml")
        .set_body_string(body)
}

// ── Nodes ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_nodes_sends_basic_auth() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/nodes"))
        .and(header("authorization", "Basic YWRtaW46YWRtaW4="))
        .respond_with(xml(
            r#"<nodes>
                <root>Network</root>
                <node flag="128">
                    <address>17 54 AD 1</address>
                    <name>Hall</name>
                    <type>1.32.65.0</type>
                    <enabled>true</enabled>
                    <property id="ST" value="0" formatted="Off" uom="100"/>
                </node>
                <group flag="132">
                    <address>00:21:b9:02:00:aa</address>
                    <name>ISY</name>
                </group>
            </nodes>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let doc = client.nodes().await.unwrap();
    assert_eq!(doc.nodes.len(), 1);
    assert_eq!(doc.nodes[0].address.as_deref(), Some("17 54 AD 1"));
    assert_eq!(doc.groups.len(), 1);
}

#[tokio::test]
async fn test_unauthorized_maps_to_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/nodes"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.nodes().await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/elk/get/topology"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client.elk_topology().await.unwrap_err();
    assert!(matches!(err, Error::Status { status: 503, .. }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_malformed_body_is_xml_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/nodes"))
        .respond_with(xml("<nodes><node>"))
        .mount(&server)
        .await;

    let result = client.nodes().await;
    assert!(matches!(result, Err(Error::Xml { .. })), "got: {result:?}");
}

// ── Variables ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_variable_values_and_definitions() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/vars/definitions/2"))
        .respond_with(xml(
            r#"<CList type="VAR_STATE"><e id="1" name="Away"/><e id="2" name="Guests"/></CList>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/vars/get/2"))
        .respond_with(xml(
            r#"<vars><var type="2" id="1"><init>0</init><val>1</val><ts>20240102 03:04:05</ts></var></vars>"#,
        ))
        .mount(&server)
        .await;

    let defs = client.variable_definitions(VariableKind::State).await.unwrap();
    assert_eq!(defs.entries.len(), 2);
    assert_eq!(defs.entries[1].name, "Guests");

    let values = client.variable_values(VariableKind::State).await.unwrap();
    assert_eq!(values.vars.len(), 1);
    assert_eq!(values.vars[0].val.as_deref(), Some("1"));
}

#[tokio::test]
async fn test_single_variable_bare_element() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/vars/get/1/7"))
        .respond_with(xml(
            r#"<?xml version="1.0" encoding="UTF-8"?><var type="1" id="7"><init>3</init><val>42</val><ts>20240301 12:00:00</ts></var>"#,
        ))
        .mount(&server)
        .await;

    let values = client.variable(VariableKind::Integer, "7").await.unwrap();
    assert_eq!(values.vars.len(), 1);
    assert_eq!(values.vars[0].id, "7");
    assert_eq!(values.vars[0].init.as_deref(), Some("3"));
}

// ── Commands ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_node_command_path_is_percent_encoded() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/nodes/17%2054%20AD%201/cmd/DON/128"))
        .respond_with(xml(r#"<RestResponse succeeded="true"><status>200</status></RestResponse>"#))
        .expect(1)
        .mount(&server)
        .await;

    client
        .send_command("nodes/17 54 AD 1/cmd/DON/128")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_failed_command_reports_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/programs/0012/run"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client.send_command("programs/0012/run").await.unwrap_err();
    assert!(err.is_not_found());
}

// ── Security system ─────────────────────────────────────────────────

#[tokio::test]
async fn test_elk_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/elk/get/status"))
        .respond_with(xml(
            r#"<ElkStatus><ae type="1" area="1" val="0"/><ze type="51" zone="1" val="0"/><ae type="3" area="1" val="1"/></ElkStatus>"#,
        ))
        .mount(&server)
        .await;

    let status = client.elk_status().await.unwrap();
    assert_eq!(status.areas.len(), 2);
    assert_eq!(status.zones.len(), 1);
}
