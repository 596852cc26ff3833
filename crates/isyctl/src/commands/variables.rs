//! Variable command handlers.

use tabled::Tabled;

use isy_core::{Command as CoreCommand, Controller, Variable, VariableKind};

use crate::cli::{GlobalOpts, VariableType, VariablesArgs, VariablesCommand};
use crate::error::CliError;
use crate::output;

use super::util::{self, or_dash};

impl From<VariableType> for VariableKind {
    fn from(t: VariableType) -> Self {
        match t {
            VariableType::Integer => Self::Integer,
            VariableType::State => Self::State,
        }
    }
}

#[derive(Tabled)]
struct VariableRow {
    #[tabled(rename = "Type")]
    kind: &'static str,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Init")]
    init: String,
    #[tabled(rename = "Changed")]
    changed: String,
}

impl From<&Variable> for VariableRow {
    fn from(v: &Variable) -> Self {
        Self {
            kind: v.kind.label(),
            id: v.id.clone(),
            name: v.name.clone(),
            value: or_dash(v.value),
            init: or_dash(v.init),
            changed: or_dash(v.last_changed.map(|t| t.format("%Y-%m-%d %H:%M:%S"))),
        }
    }
}

fn detail(v: &Variable) -> String {
    [
        format!("Type:    {}", v.kind.label()),
        format!("ID:      {}", v.id),
        format!("Name:    {}", v.name),
        format!("Value:   {}", or_dash(v.value)),
        format!("Init:    {}", or_dash(v.init)),
        format!(
            "Changed: {}",
            or_dash(v.last_changed.map(|t| t.format("%Y-%m-%d %H:%M:%S")))
        ),
    ]
    .join("\n")
}

fn not_found(kind: VariableKind, id: String) -> CliError {
    CliError::NotFound {
        resource_type: format!("{} variable", kind.label()),
        identifier: id,
        list_command: "variables list".into(),
    }
}

pub async fn handle(
    controller: &Controller,
    args: VariablesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        VariablesCommand::List { r#type } => {
            let only = r#type.map(VariableKind::from);
            let vars: Vec<Variable> = controller
                .variables()
                .await
                .into_iter()
                .filter(|v| only.is_none_or(|k| v.kind == k))
                .collect();
            let out = output::render_list(
                &global.output,
                &vars,
                |v| VariableRow::from(v),
                |v| format!("{}:{}", v.kind.code(), v.id),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        VariablesCommand::Get {
            r#type,
            id,
            refresh,
        } => {
            let kind = VariableKind::from(r#type);
            let mut var = controller
                .variable(kind, &id)
                .await
                .ok_or_else(|| not_found(kind, id.clone()))?;
            if refresh {
                let (value, init) = controller.fetch_variable(kind, &id).await?;
                var.value = value;
                var.init = init;
            }
            let out = output::render_single(&global.output, &var, detail, |v| {
                or_dash(v.value)
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        VariablesCommand::Set { r#type, id, value } => {
            let kind = VariableKind::from(r#type);
            let done = format!("{} variable {id} set to {value}", kind.label());
            util::execute(
                controller,
                CoreCommand::SetVariable { kind, id, value },
                &done,
                global,
            )
            .await
        }
    }
}
