mod common;

use common::{create_mod_zip, create_test_mod, create_zip, manifest_json, setup_test_env};
use sim_mod_keeper_lib::core::archive::ZipBackend;
use sim_mod_keeper_lib::core::installer::ModInstaller;
use sim_mod_keeper_lib::core::linker::Linker;
use sim_mod_keeper_lib::models::error::SError;
use sim_mod_keeper_lib::models::task_status::Silent;
use std::fs;

#[test]
fn test_archive_with_two_sibling_mods_installs_both_enabled() {
    let env = setup_test_env();
    let archive = env.root.join("downloads/Pack.v2.zip");
    let manifest_a = manifest_json("A", "1.0.0");
    let manifest_b = manifest_json("B", "1.0.0");
    create_zip(
        &archive,
        &[
            ("ModA/manifest.json", &manifest_a),
            ("ModA/layout.json", "{}"),
            ("ModB/manifest.json", &manifest_b),
        ],
    );

    let report = ModInstaller::install_archives(
        &env.roots,
        &[archive],
        &ZipBackend,
        &env.temp,
        &Silent,
    );

    assert!(report.is_success(), "{:?}", report.failures);
    let mut names: Vec<_> = report.installed.iter().map(|m| m.name.clone()).collect();
    names.sort();
    assert_eq!(names, vec!["ModA", "ModB"]);
    assert!(report.installed.iter().all(|m| m.is_enabled(&env.roots)));
    assert!(env.roots.mods.join("ModA/layout.json").is_file());
    assert!(Linker::is_junction(&env.roots.community.join("ModB")));
}

#[test]
fn test_staging_is_cleaned_up() {
    let env = setup_test_env();
    let archive = env.root.join("Single.zip");
    create_mod_zip(&archive, "Single");

    let report =
        ModInstaller::install_archives(&env.roots, &[archive], &ZipBackend, &env.temp, &Silent);

    assert_eq!(report.installed.len(), 1);
    assert_eq!(fs::read_dir(&env.temp).unwrap().count(), 0);
}

#[test]
fn test_bad_archive_does_not_abort_batch() {
    let env = setup_test_env();
    let broken = env.root.join("broken.zip");
    fs::write(&broken, "definitely not a zip").unwrap();
    let empty = env.root.join("empty.zip");
    create_zip(&empty, &[("readme.txt", "no mods here")]);
    let good = env.root.join("Good.zip");
    create_mod_zip(&good, "Good");

    let report = ModInstaller::install_archives(
        &env.roots,
        &[broken.clone(), empty.clone(), good],
        &ZipBackend,
        &env.temp,
        &Silent,
    );

    assert_eq!(report.installed.len(), 1);
    assert_eq!(report.installed[0].name, "Good");
    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.failures[0].input, broken);
    assert!(matches!(
        report.failures[0].error,
        SError::ExtractionError(_)
    ));
    assert_eq!(report.failures[1].input, empty);
    assert!(matches!(report.failures[1].error, SError::NoModsFound(_)));
    assert_eq!(fs::read_dir(&env.temp).unwrap().count(), 0);
}

#[test]
fn test_extract_archive_uses_unique_staging_folder() {
    let env = setup_test_env();
    let archive = env.root.join("Thing.v1.zip");
    create_mod_zip(&archive, "Thing");

    let first = ModInstaller::extract_archive(&archive, &ZipBackend, &env.temp, &Silent).unwrap();
    let second = ModInstaller::extract_archive(&archive, &ZipBackend, &env.temp, &Silent).unwrap();

    assert_ne!(first, second);
    assert_eq!(first.file_name(), Some("Thing"));
    assert!(first.join("Thing/manifest.json").is_file());
}

#[test]
fn test_find_mods_without_manifest_is_no_mods_found() {
    let env = setup_test_env();
    let dir = env.root.join("nothing");
    fs::create_dir_all(dir.join("deep/deeper")).unwrap();
    fs::write(dir.join("deep/readme.txt"), "hi").unwrap();

    assert!(matches!(
        ModInstaller::find_mods(&dir),
        Err(SError::NoModsFound(_))
    ));
    assert!(matches!(
        ModInstaller::install_directory(&env.roots, &dir, &Silent),
        Err(SError::NoModsFound(_))
    ));
}

#[test]
fn test_find_mods_reports_nested_folders() {
    let env = setup_test_env();
    let dir = env.root.join("bundle");
    create_test_mod(&dir, "Outer");
    create_test_mod(&dir.join("Outer/extras"), "Inner");
    create_test_mod(&dir.join("group"), "Sibling");

    let mut found: Vec<_> = ModInstaller::find_mods(&dir)
        .unwrap()
        .into_iter()
        .map(|p| p.file_name().unwrap_or_default().to_string())
        .collect();
    found.sort();

    assert_eq!(found, vec!["Inner", "Outer", "Sibling"]);
}

#[test]
fn test_install_directory_moves_and_links() {
    let env = setup_test_env();
    let dir = env.root.join("unpacked");
    let source = create_test_mod(&dir, "Loose");

    let installed = ModInstaller::install_directory(&env.roots, &dir, &Silent).unwrap();

    assert_eq!(installed.len(), 1);
    assert!(installed[0].is_enabled(&env.roots));
    assert!(!source.exists());
    assert!(env.roots.mods.join("Loose/manifest.json").is_file());
    assert!(env.roots.community.join("Loose/manifest.json").is_file());
}

#[test]
fn test_reinstall_replaces_previous_version() {
    let env = setup_test_env();
    let first = env.root.join("v1/Mod.zip");
    create_mod_zip(&first, "Mod");
    ModInstaller::install_archives(&env.roots, &[first], &ZipBackend, &env.temp, &Silent);

    let second = env.root.join("v2/Mod.zip");
    let manifest = manifest_json("Mod", "9.9.9");
    create_zip(&second, &[("Mod/manifest.json", &manifest)]);
    let report =
        ModInstaller::install_archives(&env.roots, &[second], &ZipBackend, &env.temp, &Silent);

    assert!(report.is_success(), "{:?}", report.failures);
    assert_eq!(report.installed[0].version, "9.9.9");
    assert!(!env
        .roots
        .mods
        .join("Mod/SimObjects/Airplanes/aircraft.cfg")
        .exists());
}
