//! Security panel and zone handlers.

use tabled::Tabled;

use isy_core::{AlarmMode, AlarmPanel, AlarmZone, Command as CoreCommand, Controller};

use crate::cli::{ArmMode, GlobalOpts, PanelArgs, PanelCommand, ZonesArgs, ZonesCommand};
use crate::error::CliError;
use crate::output;

use super::util::{self, or_dash};

impl From<ArmMode> for AlarmMode {
    fn from(mode: ArmMode) -> Self {
        match mode {
            ArmMode::Away => Self::Away,
            ArmMode::Stay => Self::Stay,
            ArmMode::StayInstant => Self::StayInstant,
            ArmMode::Night => Self::Night,
            ArmMode::NightInstant => Self::NightInstant,
            ArmMode::Vacation => Self::Vacation,
        }
    }
}

// ── Views ───────────────────────────────────────────────────────────

#[derive(Tabled)]
struct ZoneRow {
    #[tabled(rename = "Zone")]
    zone: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Sensor")]
    sensor: String,
    #[tabled(rename = "Physical")]
    physical: String,
    #[tabled(rename = "Logical")]
    logical: String,
    #[tabled(rename = "Voltage")]
    voltage: String,
}

impl ZoneRow {
    fn new(z: &AlarmZone, color: bool) -> Self {
        Self {
            zone: z.zone,
            name: z.name.clone(),
            sensor: z.sensor.to_string(),
            physical: output::paint_state(&z.physical_state.to_string(), z.is_open(), color),
            logical: z.logical_state.to_string(),
            voltage: or_dash(z.voltage),
        }
    }
}

pub(super) fn panel_detail(p: &AlarmPanel) -> String {
    [
        format!("Area:       {}", p.area),
        format!("Name:       {}", p.name),
        format!("Mode:       {}", p.alarm_mode),
        format!("State:      {}", p.alarm_state),
        format!("Trip state: {}", p.alarm_trip_state),
        format!("Raw:        {}", p.status_text()),
        format!("Changed:    {}", p.last_changed.format("%Y-%m-%d %H:%M:%S")),
    ]
    .join("\n")
}

pub(super) fn zone_detail(z: &AlarmZone) -> String {
    [
        format!("Zone:       {}", z.zone),
        format!("Area:       {}", z.area),
        format!("Name:       {}", z.name),
        format!("Sensor:     {}", z.sensor),
        format!("Physical:   {}", z.physical_state),
        format!("Logical:    {}", z.logical_state),
        format!("Bypassed:   {}", if z.is_bypassed() { "yes" } else { "no" }),
        format!("Voltage:    {}", or_dash(z.voltage)),
        format!("Raw:        {}", z.status_text()),
    ]
    .join("\n")
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle_panel(
    controller: &Controller,
    args: PanelArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PanelCommand::Status => {
            let panel = controller.panel().await.ok_or(CliError::PanelDisabled)?;
            let out = output::render_single(&global.output, &panel, panel_detail, |p| {
                p.alarm_mode.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PanelCommand::Arm { mode } => {
            let mode = AlarmMode::from(mode);
            util::execute(
                controller,
                CoreCommand::SetAlarmMode { mode },
                &format!("Arming ({mode})"),
                global,
            )
            .await
        }

        PanelCommand::Disarm => {
            if !util::confirm("Disarm the security system?", global.yes)? {
                return Ok(());
            }
            util::execute(
                controller,
                CoreCommand::SetAlarmMode {
                    mode: AlarmMode::Disarmed,
                },
                "Disarming",
                global,
            )
            .await
        }

        PanelCommand::Unbypass => {
            util::execute(controller, CoreCommand::ClearBypasses, "Bypasses cleared", global).await
        }
    }
}

pub async fn handle_zones(
    controller: &Controller,
    args: ZonesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ZonesCommand::List => {
            if controller.panel().await.is_none() {
                return Err(CliError::PanelDisabled);
            }
            let zones = controller.zones().await;
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &zones,
                |z| ZoneRow::new(z, color),
                |z| z.zone.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ZonesCommand::Bypass { zone } => {
            util::execute(
                controller,
                CoreCommand::ToggleZoneBypass { zone },
                &format!("Zone {zone} bypass toggled"),
                global,
            )
            .await
        }
    }
}
