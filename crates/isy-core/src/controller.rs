// ── Controller abstraction ──
//
// Lifecycle for one controller connection: snapshot load, event-stream
// supervision, event application, and command routing. Every Registry
// mutation happens under one async mutex, held for a whole unit of work.

use std::sync::Arc;

use isy_api::transport::{TlsMode, TransportConfig};
use isy_api::{EventRecord, RestClient, VariableKind};
use tokio::sync::{Mutex, broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::{Command, CommandEnvelope};
use crate::config::{ControllerConfig, TlsVerification};
use crate::dispatch::{ChangeObserver, EventDispatcher};
use crate::error::CoreError;
use crate::loader;
use crate::model::{
    AlarmPanel, AlarmZone, Change, Device, Node, SceneView, Value, Variable,
};
use crate::store::Registry;
use crate::supervisor::{ConnectionState, SocketConnector, Supervisor};

const COMMAND_CHANNEL_SIZE: usize = 64;
const EVENT_CHANNEL_SIZE: usize = 256;

// ── Change fan-out ───────────────────────────────────────────────────

/// Forwards every change to the broadcast channel and, when present, to
/// a caller-supplied observer.
struct Fanout {
    tx: broadcast::Sender<Change>,
    observer: Option<Arc<dyn ChangeObserver>>,
}

impl ChangeObserver for Fanout {
    fn node_changed(&self, node: &Node) {
        let _ = self.tx.send(Change::Node(node.clone()));
        if let Some(observer) = &self.observer {
            observer.node_changed(node);
        }
    }

    fn variable_changed(&self, variable: &Variable) {
        let _ = self.tx.send(Change::Variable(variable.clone()));
        if let Some(observer) = &self.observer {
            observer.variable_changed(variable);
        }
    }
}

// ── Controller ───────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable. Call [`initialize()`](Self::initialize) once to
/// load the snapshot and start the background tasks.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    client: RestClient,
    registry: Mutex<Registry>,
    dispatcher: EventDispatcher,
    changes: broadcast::Sender<Change>,
    connection_state: watch::Sender<ConnectionState>,
    command_tx: mpsc::Sender<CommandEnvelope>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Build a controller. Does not touch the network.
    pub fn new(config: ControllerConfig) -> Result<Self, CoreError> {
        Self::build(config, None)
    }

    /// Like [`new`](Self::new), with an extra observer called
    /// synchronously for every change.
    pub fn with_observer(
        config: ControllerConfig,
        observer: Arc<dyn ChangeObserver>,
    ) -> Result<Self, CoreError> {
        Self::build(config, Some(observer))
    }

    fn build(
        config: ControllerConfig,
        observer: Option<Arc<dyn ChangeObserver>>,
    ) -> Result<Self, CoreError> {
        let client = RestClient::new(
            config.url.clone(),
            config.credentials.username.clone(),
            config.credentials.password.clone(),
            &build_transport(&config),
        )?;
        let (changes, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let dispatcher = EventDispatcher::new(
            config.scenes_in_device_list,
            Arc::new(Fanout {
                tx: changes.clone(),
                observer,
            }),
        );

        Ok(Self {
            inner: Arc::new(ControllerInner {
                config,
                client,
                registry: Mutex::new(Registry::new()),
                dispatcher,
                changes,
                connection_state,
                command_tx,
                command_rx: Mutex::new(Some(command_rx)),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Load the snapshot, then start the command processor and, when
    /// enabled, the event stream. Any load failure is fatal.
    pub async fn initialize(&self) -> Result<(), CoreError> {
        let Some(command_rx) = self.inner.command_rx.lock().await.take() else {
            return Err(CoreError::Internal("controller already initialized".into()));
        };

        info!(url = %self.inner.config.url, "loading controller snapshot");
        let registry =
            loader::load(&self.inner.client, &self.inner.config, &self.inner.dispatcher).await?;
        *self.inner.registry.lock().await = registry;

        let mut handles = self.inner.task_handles.lock().await;
        handles.push(tokio::spawn(command_processor_task(
            self.clone(),
            command_rx,
        )));

        if self.inner.config.event_stream_enabled {
            let connector = SocketConnector {
                url: self.inner.config.subscribe_url()?,
                authorization: self.inner.client.authorization_header()?,
                transport: build_transport(&self.inner.config),
            };
            let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
            let supervisor = Supervisor::new(
                connector,
                self.inner.config.liveness,
                self.inner.connection_state.clone(),
                event_tx,
                self.inner.cancel.child_token(),
            );
            handles.push(tokio::spawn(supervisor.run()));
            handles.push(tokio::spawn(event_task(self.clone(), event_rx)));
        }

        info!("controller initialized");
        Ok(())
    }

    /// Rebuild the Registry wholesale from a fresh snapshot. The old
    /// Registry stays in place if the load fails.
    ///
    /// The Registry lock is held for the whole load, so events received
    /// meanwhile queue up and are applied to the fresh snapshot.
    pub async fn reload(&self) -> Result<(), CoreError> {
        let mut current = self.inner.registry.lock().await;
        let registry =
            loader::load(&self.inner.client, &self.inner.config, &self.inner.dispatcher).await?;
        *current = registry;
        drop(current);
        info!("controller snapshot reloaded");
        Ok(())
    }

    /// Stop every background task and wait for them.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        self.inner
            .connection_state
            .send_replace(ConnectionState::Disconnected);
        debug!("controller shut down");
    }

    /// One-shot: load, run the closure, shut down. The event stream is
    /// never opened.
    pub async fn oneshot<F, Fut, T>(config: ControllerConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.event_stream_enabled = false;

        let controller = Controller::new(cfg)?;
        controller.initialize().await?;
        let result = f(controller.clone()).await;
        controller.shutdown().await;
        result
    }

    // ── Events ───────────────────────────────────────────────────────

    /// Apply one event record under the Registry lock.
    pub async fn apply_event(&self, record: &EventRecord) {
        let mut registry = self.inner.registry.lock().await;
        self.inner.dispatcher.dispatch(&mut registry, record);
    }

    pub fn subscribe_changes(&self) -> broadcast::Receiver<Change> {
        self.inner.changes.subscribe()
    }

    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Send a command. Validation failures are errors; a transport
    /// failure is `Ok(false)`.
    pub async fn execute(&self, command: Command) -> Result<bool, CoreError> {
        if !self.inner.registry.lock().await.is_loaded() {
            return Err(CoreError::ControllerDisconnected);
        }

        let (tx, rx) = tokio::sync::oneshot::channel();
        self.inner
            .command_tx
            .send(CommandEnvelope {
                command,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::ControllerDisconnected)?;

        rx.await.map_err(|_| CoreError::ControllerDisconnected)?
    }

    /// Read one variable straight from the controller as `(value, init)`.
    /// The Registry is left untouched.
    pub async fn fetch_variable(
        &self,
        kind: VariableKind,
        id: &str,
    ) -> Result<(Option<f64>, Option<f64>), CoreError> {
        let values = self.inner.client.variable(kind, id).await?;
        let record = values
            .vars
            .into_iter()
            .find(|v| v.id.is_empty() || v.id == id)
            .ok_or_else(|| CoreError::VariableNotFound {
                kind: kind.label().to_owned(),
                id: id.to_owned(),
            })?;
        Ok((
            record.val.as_deref().and_then(Value::parse_numeric),
            record.init.as_deref().and_then(Value::parse_numeric),
        ))
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    /// The device list: devices plus any listed scenes, zones and panel.
    pub async fn nodes(&self) -> Vec<Node> {
        self.inner.registry.lock().await.node_list()
    }

    pub async fn node(&self, address: &str) -> Option<Node> {
        self.inner.registry.lock().await.node(address)
    }

    pub async fn devices(&self) -> Vec<Device> {
        self.inner.registry.lock().await.devices().cloned().collect()
    }

    pub async fn device(&self, address: &str) -> Option<Device> {
        self.inner.registry.lock().await.device(address).cloned()
    }

    pub async fn scenes(&self) -> Vec<SceneView> {
        let registry = self.inner.registry.lock().await;
        registry.scenes().map(|s| registry.scene_view(s)).collect()
    }

    pub async fn scene(&self, address: &str) -> Option<SceneView> {
        let registry = self.inner.registry.lock().await;
        registry.scene(address).map(|s| registry.scene_view(s))
    }

    pub async fn variables(&self) -> Vec<Variable> {
        self.inner.registry.lock().await.variables().cloned().collect()
    }

    pub async fn variable(&self, kind: VariableKind, id: &str) -> Option<Variable> {
        self.inner.registry.lock().await.variable(kind, id).cloned()
    }

    pub async fn panel(&self) -> Option<AlarmPanel> {
        self.inner.registry.lock().await.panel().cloned()
    }

    pub async fn zones(&self) -> Vec<AlarmZone> {
        self.inner.registry.lock().await.zones().cloned().collect()
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Apply forwarded event records in arrival order.
async fn event_task(controller: Controller, mut rx: mpsc::Receiver<EventRecord>) {
    let cancel = controller.inner.cancel.clone();
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            record = rx.recv() => {
                let Some(record) = record else { break };
                controller.apply_event(&record).await;
            }
        }
    }
}

async fn command_processor_task(controller: Controller, mut rx: mpsc::Receiver<CommandEnvelope>) {
    let cancel = controller.inner.cancel.clone();
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = route_command(&controller, &envelope.command).await;
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────────

async fn route_command(controller: &Controller, command: &Command) -> Result<bool, CoreError> {
    let path = {
        let registry = controller.inner.registry.lock().await;
        command.rest_path(&registry, controller.inner.config.elk_area)?
    };
    debug!(path = %path, "sending command");
    match controller.inner.client.send_command(&path).await {
        Ok(()) => Ok(true),
        Err(e) => {
            warn!(path = %path, error = %e, "command failed");
            Ok(false)
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn build_transport(config: &ControllerConfig) -> TransportConfig {
    TransportConfig {
        tls: match &config.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        },
        timeout: config.timeout,
    }
}
