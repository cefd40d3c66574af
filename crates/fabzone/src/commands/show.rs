//! `show`: read-only views of a fabric's zoning database.

use serde::Serialize;
use tabled::Tabled;

use fabzone_core::{Alias, DefaultZoneAccess, Fabric, Session, Zone, ZoneConfig};

use crate::cli::{GlobalOpts, ShowArgs, ShowCommand};
use crate::config;
use crate::error::CliError;
use crate::output::{self, members_cell};

// ── Row types ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AliasRow {
    #[tabled(rename = "Alias")]
    name: String,
    #[tabled(rename = "Members")]
    members: String,
    #[tabled(rename = "Used by")]
    zones: String,
}

#[derive(Tabled)]
struct ZoneRow {
    #[tabled(rename = "Zone")]
    name: String,
    #[tabled(rename = "Type")]
    zone_type: String,
    #[tabled(rename = "Members")]
    members: String,
    #[tabled(rename = "Principals")]
    principals: String,
    #[tabled(rename = "Effective")]
    effective: &'static str,
}

#[derive(Tabled)]
struct ConfigRow {
    #[tabled(rename = "Configuration")]
    name: String,
    #[tabled(rename = "Zones")]
    zones: String,
    #[tabled(rename = "Effective")]
    effective: &'static str,
}

/// Effective configuration view.
#[derive(Serialize)]
struct EffectiveView {
    fid: u16,
    cfg_name: Option<String>,
    default_zone_access: Option<String>,
    zones: Vec<Zone>,
}

fn mark(flag: bool) -> &'static str {
    if flag { "*" } else { "" }
}

fn access_label(fabric: &Fabric) -> Option<String> {
    fabric.default_zone_access().map(|a| match a {
        DefaultZoneAccess::NoAccess => "noaccess".to_owned(),
        DefaultZoneAccess::AllAccess => "allaccess".to_owned(),
    })
}

fn effective_detail(view: &EffectiveView) -> String {
    use std::fmt::Write;
    let mut out = String::new();
    let _ = writeln!(out, "Fabric ID:           {}", view.fid);
    let _ = writeln!(
        out,
        "Effective config:    {}",
        view.cfg_name.as_deref().unwrap_or("(none)")
    );
    let _ = writeln!(
        out,
        "Default zone access: {}",
        view.default_zone_access.as_deref().unwrap_or("unknown")
    );
    for zone in &view.zones {
        let _ = writeln!(out, "  {}: {}", zone.name, members_cell(&zone.members));
    }
    out.trim_end().to_owned()
}

// ── Rendering ───────────────────────────────────────────────────────

fn render(command: &ShowCommand, fabric: &Fabric, global: &GlobalOpts) -> String {
    match command {
        ShowCommand::Aliases => {
            let aliases: Vec<Alias> = fabric.aliases().cloned().collect();
            output::render_list(
                &global.output,
                &aliases,
                |a| AliasRow {
                    name: a.name.clone(),
                    members: members_cell(&a.members),
                    zones: members_cell(&fabric.zones_for_alias(&a.name)),
                },
                |a| a.name.clone(),
            )
        }
        ShowCommand::Zones => {
            let zones: Vec<Zone> = fabric.zones().cloned().collect();
            output::render_list(
                &global.output,
                &zones,
                |z| ZoneRow {
                    name: z.name.clone(),
                    zone_type: z.zone_type.to_string(),
                    members: members_cell(&z.members),
                    principals: members_cell(&z.principal_members),
                    effective: mark(fabric.is_effective_zone(&z.name)),
                },
                |z| z.name.clone(),
            )
        }
        ShowCommand::Configs => {
            let configs: Vec<ZoneConfig> = fabric
                .zone_configs()
                .filter(|c| !c.is_effective_marker())
                .cloned()
                .collect();
            let effective = fabric.effective_cfg_name();
            output::render_list(
                &global.output,
                &configs,
                |c| ConfigRow {
                    name: c.name.clone(),
                    zones: members_cell(&c.members),
                    effective: mark(effective == Some(c.name.as_str())),
                },
                |c| c.name.clone(),
            )
        }
        ShowCommand::Effective => {
            let view = EffectiveView {
                fid: fabric.fid(),
                cfg_name: fabric.effective_cfg_name().map(str::to_owned),
                default_zone_access: access_label(fabric),
                zones: fabric.effective_zones().cloned().collect(),
            };
            output::render_single(&global.output, &view, effective_detail, |v| {
                v.cfg_name.clone().unwrap_or_default()
            })
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ShowArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let target = config::resolve_target(global)?;
    let fid = target.fid.ok_or(CliError::MissingFid)?;

    let fabric = Session::oneshot(target.session, |session| async move {
        session.fetch_fabric(fid).await
    })
    .await?;

    let out = render(&args.command, &fabric, global);
    output::print_output(&out, global.quiet);
    Ok(())
}
