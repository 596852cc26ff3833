// isy-api: Async transport for ISY-family controllers (REST + event stream)

pub mod client;
pub mod error;
pub mod event;
pub mod transport;
pub mod websocket;
pub mod xml;

pub use client::{RestClient, VariableKind};
pub use error::Error;
pub use event::{EventRecord, parse_event, parse_timestamp};
pub use transport::{TlsMode, TransportConfig};
pub use websocket::{EventSocket, Frame};
