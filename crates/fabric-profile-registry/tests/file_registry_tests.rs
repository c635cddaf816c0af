//! Integration tests for the directory-backed registry

use std::collections::BTreeMap;
use std::fs;

use fabric_errors::ErrorCategory;
use fabric_profile::{PARENTS, ProfileRecord};
use fabric_profile_registry::prelude::*;
use tempfile::TempDir;

fn must<T, E: std::fmt::Debug>(r: std::result::Result<T, E>) -> T {
    match r {
        Ok(v) => v,
        Err(e) => panic!("unexpected Err: {e:?}"),
    }
}

fn create_test_registry() -> (FileProfileRegistry, TempDir) {
    let temp_dir = must(TempDir::new());
    let registry = must(FileProfileRegistry::open(temp_dir.path().join("registry")));
    (registry, temp_dir)
}

fn record(version: &str, id: &str, files: &[(&str, &[u8])]) -> ProfileRecord {
    let mut record = ProfileRecord::new(version, id);
    for (name, content) in files {
        record
            .file_configurations
            .insert((*name).to_string(), content.to_vec());
    }
    record
}

mod layout {
    use super::*;

    #[test]
    fn test_profile_written_as_directory() {
        let (registry, _dir) = create_test_registry();
        must(registry.create_version("1.0"));

        let mut base = record("1.0", "base", &[("app.properties", b"a=1\n")]);
        base.attributes.insert("abstract".into(), "true".into());
        must(registry.create_profile(&base));

        let profile_dir = registry.root().join("1.0/profiles/base.profile");
        assert!(profile_dir.join("profile.json").is_file());
        assert_eq!(
            fs::read(profile_dir.join("app.properties")).ok(),
            Some(b"a=1\n".to_vec())
        );
        assert!(registry.root().join("1.0/version.json").is_file());
    }

    #[test]
    fn test_environment_variant_file_names_round_trip() {
        let (registry, _dir) = create_test_registry();
        must(registry.create_version("1.0"));
        let original = record(
            "1.0",
            "db",
            &[
                ("db.properties", b"url=local\n"),
                ("db.properties#prod", b"url=prod\n"),
            ],
        );
        must(registry.create_profile(&original));
        assert_eq!(must(registry.get_profile("1.0", "db")), Some(original));
    }

    #[test]
    fn test_unsafe_file_name_rejected_before_writing() {
        let (registry, _dir) = create_test_registry();
        must(registry.create_version("1.0"));
        let err = registry
            .create_profile(&record("1.0", "evil", &[("../../x", b"")]))
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Invalid);
        assert!(!must(registry.has_profile("1.0", "evil")));
    }
}

mod lifecycle {
    use super::*;

    #[test]
    fn test_reopen_sees_existing_data() {
        let (registry, dir) = create_test_registry();
        must(registry.create_version("1.0"));
        must(registry.set_version_attribute("1.0", "owner", Some("ops")));
        let mut child = record("1.0", "child", &[]);
        child.attributes.insert(PARENTS.into(), "base".into());
        must(registry.create_profile(&record("1.0", "base", &[])));
        must(registry.create_profile(&child));
        drop(registry);

        let reopened = must(FileProfileRegistry::open(dir.path().join("registry")));
        assert_eq!(must(reopened.versions()), vec!["1.0".to_string()]);
        assert_eq!(
            must(reopened.profiles("1.0")),
            vec!["base".to_string(), "child".to_string()]
        );
        let loaded = must(reopened.get_profile("1.0", "child"));
        assert_eq!(loaded.map(|r| r.parent_ids().join(" ")), Some("base".into()));
        assert_eq!(
            must(reopened.version_attributes("1.0")).get("owner").cloned(),
            Some("ops".to_string())
        );
    }

    #[test]
    fn test_update_removes_dropped_files() {
        let (registry, _dir) = create_test_registry();
        must(registry.create_version("1.0"));
        must(registry.create_profile(&record(
            "1.0",
            "web",
            &[("a.properties", b"a=1\n"), ("jetty.xml", b"<x/>")],
        )));

        must(registry.update_profile(&record("1.0", "web", &[("a.properties", b"a=2\n")])));

        let loaded = must(registry.get_profile("1.0", "web"));
        let files: Vec<String> = loaded
            .map(|r| r.file_configurations.into_keys().collect())
            .unwrap_or_default();
        assert_eq!(files, vec!["a.properties".to_string()]);
    }

    #[test]
    fn test_clone_version_rewrites_profile_versions() {
        let (registry, _dir) = create_test_registry();
        must(registry.create_version("1.0"));
        must(registry.create_profile(&record("1.0", "base", &[("f.txt", b"x")])));

        let attrs = BTreeMap::from([("released".to_string(), "false".to_string())]);
        must(registry.create_version_from("1.0", "1.1", &attrs));

        let cloned = must(registry.get_profile("1.1", "base"));
        assert_eq!(cloned, Some(record("1.1", "base", &[("f.txt", b"x")])));
        assert_eq!(
            must(registry.version_attributes("1.1")).get("released").cloned(),
            Some("false".to_string())
        );
    }

    #[test]
    fn test_clone_of_missing_version_fails_cleanly() {
        let (registry, _dir) = create_test_registry();
        let err = registry
            .create_version_from("0.9", "1.0", &BTreeMap::new())
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert!(must(registry.versions()).is_empty());
    }

    #[test]
    fn test_delete_profile_and_version() {
        let (registry, _dir) = create_test_registry();
        must(registry.create_version("1.0"));
        must(registry.create_profile(&record("1.0", "base", &[])));

        must(registry.delete_profile("1.0", "base"));
        assert!(!must(registry.has_profile("1.0", "base")));
        assert_eq!(
            registry.delete_profile("1.0", "base").unwrap_err().category(),
            ErrorCategory::NotFound
        );

        must(registry.delete_version("1.0"));
        assert!(!must(registry.has_version("1.0")));
        assert!(!registry.root().join("1.0").exists());
    }

    #[test]
    fn test_duplicate_version_is_conflict() {
        let (registry, _dir) = create_test_registry();
        must(registry.create_version("1.0"));
        assert_eq!(
            registry.create_version("1.0").unwrap_err().category(),
            ErrorCategory::Conflict
        );
    }
}

mod corruption {
    use super::*;

    #[test]
    fn test_corrupt_attributes_surface_as_persistence() {
        let (registry, _dir) = create_test_registry();
        must(registry.create_version("1.0"));
        must(registry.create_profile(&record("1.0", "base", &[])));
        must(fs::write(
            registry.root().join("1.0/profiles/base.profile/profile.json"),
            b"{not json",
        ));

        let err = registry.get_profile("1.0", "base").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Persistence);
    }

    #[test]
    fn test_stray_directories_are_ignored() {
        let (registry, _dir) = create_test_registry();
        must(registry.create_version("1.0"));
        must(fs::create_dir_all(registry.root().join("not-a-version")));
        must(fs::create_dir_all(registry.root().join("1.0/profiles/half.profile")));

        assert_eq!(must(registry.versions()), vec!["1.0".to_string()]);
        assert!(must(registry.profiles("1.0")).is_empty());
    }
}
