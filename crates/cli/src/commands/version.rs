//! Version management commands

use anyhow::Result;
use fabric_profile::VersionBuilder;
use fabric_profile_service::ProfileService;

use crate::commands::{VersionCommands, split_pair};
use crate::output;

/// Execute version command
pub fn execute(cmd: &VersionCommands, service: &ProfileService, json: bool) -> Result<()> {
    match cmd {
        VersionCommands::List => {
            let versions = service.versions()?;
            output::print_id_list("versions", "Versions:", &versions, json);
        }
        VersionCommands::Show { version } => {
            let version = service.required_version(version)?;
            output::print_version(&version, json);
        }
        VersionCommands::Create {
            version,
            parent,
            attributes,
        } => {
            let mut builder = VersionBuilder::new(version.as_str());
            if let Some(parent) = parent {
                builder = builder.with_parent(parent.as_str());
            }
            for attribute in attributes {
                let (key, value) = split_pair(attribute, "KEY=VALUE")?;
                builder = builder.with_attribute(key, value);
            }
            let created = service.create_version(&builder.build()?)?;
            output::print_success(&format!("Version {} created", created.id()), json);
        }
        VersionCommands::Delete { version } => {
            service.delete_version(version)?;
            output::print_success(&format!("Version {} deleted", version), json);
        }
    }
    Ok(())
}
