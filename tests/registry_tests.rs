mod common;

use std::fs;
use std::rc::Rc;

use quickrouter::controller::service_factory;
use quickrouter::registry::{ProvisioningMode, ResolveError, ServiceEntry, ServiceRegistry};

use common::EchoController;

fn registry_with_echo() -> ServiceRegistry {
    let mut registry = ServiceRegistry::new();
    registry.register_factory("EchoController", service_factory(|| EchoController));
    registry
}

#[test]
fn test_cached_resolution_returns_the_same_instance() {
    let mut registry = registry_with_echo();
    registry.register("Test", ServiceEntry::Class("EchoController".into()));

    let first = registry.resolve("Test", true).unwrap();
    let second = registry.resolve("Test", true).unwrap();
    assert!(Rc::ptr_eq(&first, &second));
}

#[test]
fn test_uncached_resolution_builds_a_fresh_instance() {
    let mut registry = registry_with_echo();
    registry.register("Test", ServiceEntry::Class("EchoController".into()));

    let cached = registry.resolve("Test", true).unwrap();
    let fresh = registry.resolve("Test", false).unwrap();
    assert!(!Rc::ptr_eq(&cached, &fresh));
    // The cache slot is untouched by the uncached resolution.
    let again = registry.resolve("Test", true).unwrap();
    assert!(Rc::ptr_eq(&cached, &again));
}

#[test]
fn test_reregistering_a_key_invalidates_its_cache_slot() {
    let mut registry = registry_with_echo();
    registry.register("Test", ServiceEntry::Class("EchoController".into()));
    let before = registry.resolve("Test", true).unwrap();

    registry.register("Test", ServiceEntry::Class("EchoController".into()));
    let after = registry.resolve("Test", true).unwrap();
    assert!(!Rc::ptr_eq(&before, &after));
}

#[test]
fn test_class_in_file_requires_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let present = dir.path().join("echo.rs");
    fs::write(&present, "// marker").unwrap();

    let mut registry = registry_with_echo();
    registry.register(
        "Present",
        ServiceEntry::ClassInFile {
            class: "EchoController".into(),
            file: present,
        },
    );
    registry.register(
        "Absent",
        ServiceEntry::ClassInFile {
            class: "EchoController".into(),
            file: dir.path().join("missing.rs"),
        },
    );

    assert!(registry.resolve("Present", true).is_ok());
    let err = registry.resolve("Absent", true).unwrap_err();
    assert!(matches!(err, ResolveError::MissingFile { .. }));
    assert!(err.to_string().contains("missing.rs"));
}

#[test]
fn test_folder_mode_finds_nested_service_files() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    fs::create_dir_all(&nested).unwrap();
    fs::write(nested.join("Cleanup.rs"), "// marker").unwrap();

    let mut registry = ServiceRegistry::new();
    registry.register_factory("Cleanup", service_factory(|| EchoController));
    registry.set_folders(vec![dir.path().to_path_buf()]);

    assert_eq!(registry.mode(), ProvisioningMode::Folders);
    assert!(registry.is_registered("Cleanup"));
    assert!(registry.resolve("Cleanup", true).is_ok());
}

#[test]
fn test_folder_mode_matches_file_names_case_insensitively() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("cleanup.rs"), "// marker").unwrap();

    let mut registry = ServiceRegistry::new();
    registry.register_factory("Cleanup", service_factory(|| EchoController));
    registry.set_folders(vec![dir.path().to_path_buf()]);

    assert!(registry.resolve("Cleanup", true).is_ok());
}

#[test]
fn test_folder_mode_exhaustion_names_the_key() {
    let dir = tempfile::tempdir().unwrap();

    let mut registry = ServiceRegistry::new();
    registry.register_factory("Cleanup", service_factory(|| EchoController));
    registry.set_folders(vec![dir.path().to_path_buf()]);

    assert!(!registry.is_registered("Cleanup"));
    let err = registry.resolve("Cleanup", true).unwrap_err();
    assert!(matches!(err, ResolveError::FoldersExhausted { .. }));
    assert!(err.to_string().contains("Cleanup"));
}

#[test]
fn test_is_registered_never_instantiates() {
    let registry = registry_with_echo();
    // No service entry for the key, so the lookup is negative in the
    // default service-list mode even though the factory exists.
    assert!(!registry.is_registered("EchoController"));
}
