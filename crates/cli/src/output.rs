//! Output formatting for CLI responses

use anyhow::Error;
use colored::*;
use fabric_profile::{Profile, Version};
use serde_json::{Value, json};

use crate::error::error_type_name;

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Failed to format output as JSON: {}", e),
    }
}

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    print_json(&json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "type": error_type_name(error)
        }
    }));
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

/// Print a success message
pub fn print_success(message: &str, json: bool) {
    if json {
        print_json(&json!({ "success": true, "message": message }));
    } else {
        println!("{} {}", "✓".green(), message);
    }
}

/// Print a list of ids under a heading
pub fn print_id_list(key: &str, heading: &str, ids: &[String], json: bool) {
    if json {
        let mut output = serde_json::Map::new();
        output.insert("success".to_string(), Value::Bool(true));
        output.insert(key.to_string(), json!(ids));
        print_json(&Value::Object(output));
        return;
    }
    if ids.is_empty() {
        println!("{}", format!("No {key} found").yellow());
        return;
    }
    println!("{}", heading.bold());
    for id in ids {
        println!("  {} {}", "●".green(), id);
    }
}

/// Print a version summary
pub fn print_version(version: &Version, json: bool) {
    if json {
        print_json(&json!({
            "success": true,
            "version": {
                "id": version.id(),
                "attributes": version.attributes(),
                "profiles": version.profile_ids(),
            }
        }));
        return;
    }
    println!("{} {}", "Version:".bold(), version.id().cyan());
    for (key, value) in version.attributes() {
        println!("  {}: {}", key, value);
    }
    println!("  Profiles: {}", version.profile_ids().join(", "));
}

/// Print a profile with its files
pub fn print_profile(profile: &Profile, json: bool) {
    if json {
        let files: serde_json::Map<String, Value> = profile
            .file_configurations()
            .iter()
            .map(|(name, content)| {
                (
                    name.clone(),
                    Value::String(String::from_utf8_lossy(content).into_owned()),
                )
            })
            .collect();
        print_json(&json!({
            "success": true,
            "profile": {
                "version": profile.version(),
                "id": profile.id(),
                "overlay": profile.is_overlay(),
                "parents": profile.parent_ids(),
                "attributes": profile.attributes(),
                "configurations": profile.configurations(),
                "files": files,
                "hash": profile.profile_hash(),
                "lastModified": profile.last_modified(),
            }
        }));
        return;
    }

    let kind = if profile.is_overlay() { " (overlay)" } else { "" };
    println!(
        "{} {}/{}{}",
        "Profile:".bold(),
        profile.version(),
        profile.id().cyan(),
        kind.dimmed()
    );
    let parents = profile.parent_ids();
    if !parents.is_empty() {
        println!("  Parents: {}", parents.join(" "));
    }
    for (name, content) in profile.file_configurations() {
        println!("  {} ({} bytes)", name.bold(), content.len());
        if let Some(section) = fabric_profile::section_name(name)
            .and_then(|section| profile.configuration(section))
        {
            for (key, value) in section {
                println!("    {} = {}", key, value);
            }
        }
    }
}
