//! Clap derive structures for the `isyctl` CLI.
//!
//! Defines the command tree, global flags and the small value enums the
//! handlers translate into core types. Kept free of crate imports so the
//! build script can include it for man-page generation.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// isyctl -- inspect and control ISY home automation controllers
#[derive(Debug, Parser)]
#[command(
    name = "isyctl",
    version,
    about = "Inspect and control ISY home automation controllers",
    long_about = "Command-line client for ISY-family home automation controllers.\n\n\
        Loads the controller's devices, scenes, variables and security panel\n\
        over REST, sends commands, and can follow the live event stream.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Controller profile to use
    #[arg(long, short = 'p', env = "ISY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Controller host or URL (overrides profile)
    #[arg(long, short = 'c', env = "ISY_CONTROLLER", global = true)]
    pub controller: Option<String>,

    /// Controller username (overrides profile)
    #[arg(long, short = 'u', env = "ISY_USERNAME", global = true)]
    pub username: Option<String>,

    /// Use HTTPS/WSS for bare controller hosts
    #[arg(long, env = "ISY_HTTPS", global = true)]
    pub https: bool,

    /// Accept the controller's self-signed TLS certificate
    #[arg(long, short = 'k', env = "ISY_INSECURE", global = true)]
    pub insecure: bool,

    /// Load the ELK security panel and zones
    #[arg(long, env = "ISY_ELK", global = true)]
    pub elk: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "ISY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ISY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List and inspect devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// List and inspect scenes
    Scenes(ScenesArgs),

    /// Read and write controller variables
    #[command(alias = "vars")]
    Variables(VariablesArgs),

    /// Security panel status and arming
    Panel(PanelArgs),

    /// Security zones
    Zones(ZonesArgs),

    /// Switch or dim a light
    Light(LightArgs),

    /// Lock or unlock a door lock
    Lock(LockArgs),

    /// Switch an outlet
    Outlet(OutletArgs),

    /// Set a fan's speed
    Fan(FanArgs),

    /// Switch a scene on or off
    Scene(SceneArgs),

    /// Run or control a controller program
    Program(ProgramArgs),

    /// Follow live changes until interrupted
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES & SCENES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List devices
    #[command(alias = "ls")]
    List {
        /// Only show devices of this kind (e.g. dimmableLight, lock)
        #[arg(long)]
        kind: Option<String>,
    },

    /// Show one device with all of its properties
    Get {
        /// Device address (e.g. "17 54 AD 1")
        address: String,
    },
}

#[derive(Debug, Args)]
pub struct ScenesArgs {
    #[command(subcommand)]
    pub command: ScenesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ScenesCommand {
    /// List scenes with their derived light state
    #[command(alias = "ls")]
    List,

    /// Show one scene and its members
    Get {
        /// Scene address
        address: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  VARIABLES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum VariableType {
    /// Integer variables (type 1)
    Integer,
    /// State variables (type 2)
    State,
}

#[derive(Debug, Args)]
pub struct VariablesArgs {
    #[command(subcommand)]
    pub command: VariablesCommand,
}

#[derive(Debug, Subcommand)]
pub enum VariablesCommand {
    /// List variables
    #[command(alias = "ls")]
    List {
        /// Only show one namespace
        #[arg(long, short = 't', value_enum)]
        r#type: Option<VariableType>,
    },

    /// Show one variable
    Get {
        #[arg(value_enum)]
        r#type: VariableType,
        id: String,

        /// Read the value back from the controller instead of the snapshot
        #[arg(long)]
        refresh: bool,
    },

    /// Set a variable's value
    Set {
        #[arg(value_enum)]
        r#type: VariableType,
        id: String,
        #[arg(allow_negative_numbers = true)]
        value: i64,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SECURITY
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ArmMode {
    Away,
    Stay,
    StayInstant,
    Night,
    NightInstant,
    Vacation,
}

#[derive(Debug, Args)]
pub struct PanelArgs {
    #[command(subcommand)]
    pub command: PanelCommand,
}

#[derive(Debug, Subcommand)]
pub enum PanelCommand {
    /// Show the panel's arming and alarm state
    Status,

    /// Arm the configured area
    Arm {
        #[arg(value_enum, default_value = "away")]
        mode: ArmMode,
    },

    /// Disarm the configured area
    Disarm,

    /// Clear every zone bypass in the area
    Unbypass,
}

#[derive(Debug, Args)]
pub struct ZonesArgs {
    #[command(subcommand)]
    pub command: ZonesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ZonesCommand {
    /// List zones
    #[command(alias = "ls")]
    List,

    /// Toggle a zone's bypass
    Bypass {
        /// Zone number
        zone: u32,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONTROL
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LightArgs {
    #[command(subcommand)]
    pub command: LightCommand,
}

#[derive(Debug, Subcommand)]
pub enum LightCommand {
    /// Turn a light on
    On { address: String },
    /// Turn a light off
    Off { address: String },
    /// Dim a light to a percentage
    Dim {
        address: String,
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        level: u8,
    },
}

#[derive(Debug, Args)]
pub struct LockArgs {
    #[command(subcommand)]
    pub command: LockCommand,
}

#[derive(Debug, Subcommand)]
pub enum LockCommand {
    /// Lock a door
    Lock { address: String },
    /// Unlock a door
    Unlock { address: String },
}

#[derive(Debug, Args)]
pub struct OutletArgs {
    #[command(subcommand)]
    pub command: OutletCommand,
}

#[derive(Debug, Subcommand)]
pub enum OutletCommand {
    /// Switch an outlet on
    On { address: String },
    /// Switch an outlet off
    Off { address: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FanSpeedArg {
    Off,
    Low,
    Medium,
    High,
}

#[derive(Debug, Args)]
pub struct FanArgs {
    #[command(subcommand)]
    pub command: FanCommand,
}

#[derive(Debug, Subcommand)]
pub enum FanCommand {
    /// Set a fan's speed
    Set {
        address: String,
        #[arg(value_enum)]
        speed: FanSpeedArg,
    },
}

#[derive(Debug, Args)]
pub struct SceneArgs {
    #[command(subcommand)]
    pub command: SceneCommand,
}

#[derive(Debug, Subcommand)]
pub enum SceneCommand {
    /// Switch a scene on
    On { address: String },
    /// Switch a scene off
    Off { address: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProgramOp {
    Run,
    RunThen,
    RunElse,
    Stop,
    Enable,
    Disable,
    EnableRunAtStartup,
    DisableRunAtStartup,
}

#[derive(Debug, Args)]
pub struct ProgramArgs {
    #[command(subcommand)]
    pub command: ProgramCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProgramCommand {
    /// Run or control a program by id
    Run {
        /// Program id (hex, e.g. 001A)
        id: String,

        #[arg(long, value_enum, default_value = "run")]
        action: ProgramOp,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WATCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Only report changes to these addresses
    #[arg(long, short = 'a')]
    pub address: Vec<String>,

    /// Also print connection state transitions
    #[arg(long)]
    pub connection: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG & COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// Interactive configuration wizard
    Init,

    /// Store the active profile's password in the system keyring
    SetPassword,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
