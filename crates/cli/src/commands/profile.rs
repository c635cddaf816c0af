//! Profile management commands

use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use fabric_profile::{Profile, ProfileBuilder};
use fabric_profile_service::{FleetService, ProfileService};
use tracing::debug;

use crate::commands::{ProfileCommands, split_pair};
use crate::error::CliError;
use crate::output;

/// Execute profile command
pub fn execute(
    cmd: &ProfileCommands,
    service: &ProfileService,
    fleet: &dyn FleetService,
    json: bool,
) -> Result<()> {
    match cmd {
        ProfileCommands::List { version } => {
            let version = service.required_version(version)?;
            let ids: Vec<String> = version.profile_ids().into_iter().map(str::to_string).collect();
            output::print_id_list("profiles", "Profiles:", &ids, json);
        }
        ProfileCommands::Show {
            version,
            profile,
            overlay,
        } => {
            if *overlay {
                let overlay = service.required_overlay_profile(version, profile)?;
                output::print_profile(&overlay, json);
            } else {
                let profile = service.required_profile(version, profile)?;
                output::print_profile(&profile, json);
            }
        }
        ProfileCommands::Create {
            version,
            profile,
            parents,
            files,
        } => {
            let built = build_profile(service, version, profile, parents, files)?;
            let stored = service.create_profile(&built)?;
            output::print_success(
                &format!("Profile {}/{} created", stored.version(), stored.id()),
                json,
            );
        }
        ProfileCommands::Update {
            version,
            profile,
            parents,
            files,
        } => {
            let built = build_profile(service, version, profile, parents, files)?;
            let stored = service.update_profile(&built)?;
            output::print_success(
                &format!("Profile {}/{} updated", stored.version(), stored.id()),
                json,
            );
        }
        ProfileCommands::Delete {
            version,
            profile,
            force,
        } => {
            service.delete_profile(fleet, version, profile, *force)?;
            output::print_success(&format!("Profile {}/{} deleted", version, profile), json);
        }
    }
    Ok(())
}

/// Assemble a profile from parent ids and `NAME=PATH` file arguments.
fn build_profile(
    service: &ProfileService,
    version: &str,
    profile: &str,
    parents: &[String],
    files: &[String],
) -> Result<Profile> {
    let mut builder = ProfileBuilder::new(version, profile);

    for parent in parents {
        let resolved: Arc<Profile> = service.required_profile(version, parent)?;
        builder = builder.with_parent(resolved);
    }

    for file in files {
        let (name, path) = split_pair(file, "NAME=PATH")?;
        if name.contains(['/', '\\']) {
            return Err(CliError::InvalidArgument(format!("file name '{name}' must not contain a path")).into());
        }
        let content = fs::read(path)
            .map_err(CliError::from)
            .with_context(|| format!("Failed to read {path}"))?;
        debug!(name, path, bytes = content.len(), "Read file configuration");
        builder = builder.with_file(name, content);
    }

    Ok(builder.build()?)
}
