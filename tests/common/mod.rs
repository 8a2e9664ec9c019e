#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use sim_mod_keeper_lib::core::mod_record::ModRoots;
use sim_mod_keeper_lib::models::paths::PackagesPathRules;
use std::fs::{self, File};
use std::io::Write;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub struct TestEnv {
    // Keeps the tree alive for the duration of the test.
    pub _tmp: TempDir,
    pub root: Utf8PathBuf,
    pub packages: Utf8PathBuf,
    pub roots: ModRoots,
    pub temp: Utf8PathBuf,
}

/// A fake simulator packages folder plus an empty mod store.
pub fn setup_test_env() -> TestEnv {
    let tmp = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap();

    let packages = root.join("Packages");
    let rules = PackagesPathRules::new(&packages);
    fs::create_dir_all(&rules.community).unwrap();
    fs::create_dir_all(rules.official.join("OneStore")).unwrap();

    let mods = root.join("modCache");
    let temp = root.join(".tmp");
    fs::create_dir_all(&mods).unwrap();
    fs::create_dir_all(&temp).unwrap();

    let roots = ModRoots::new(&rules.community, &mods);
    TestEnv {
        _tmp: tmp,
        root,
        packages,
        roots,
        temp,
    }
}

pub fn manifest_json(title: &str, version: &str) -> String {
    format!(
        r#"{{
    "dependencies": [],
    "content_type": "AIRCRAFT",
    "title": "{title}",
    "manufacturer": "Test Works",
    "creator": "tester",
    "package_version": "{version}",
    "minimum_game_version": "1.14.6",
    "release_notes": {{ "neutral": {{ "LastUpdate": "", "OlderHistory": "" }} }}
}}"#
    )
}

/// A mod folder with a manifest and a couple of payload files.
pub fn create_test_mod(parent: &Utf8Path, name: &str) -> Utf8PathBuf {
    let dir = parent.join(name);
    fs::create_dir_all(dir.join("SimObjects/Airplanes")).unwrap();
    fs::write(dir.join("manifest.json"), manifest_json(name, "1.0.0")).unwrap();
    fs::write(dir.join("layout.json"), r#"{"content": []}"#).unwrap();
    fs::write(dir.join("SimObjects/Airplanes/aircraft.cfg"), name).unwrap();
    dir
}

/// Zips `entries` (archive path, contents) into `archive`.
pub fn create_zip(archive: &Utf8Path, entries: &[(&str, &str)]) {
    if let Some(parent) = archive.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut writer = ZipWriter::new(File::create(archive).unwrap());
    for (name, content) in entries {
        writer
            .start_file(name.to_string(), SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

/// Archive holding one mod folder at its top level.
pub fn create_mod_zip(archive: &Utf8Path, name: &str) {
    let manifest = manifest_json(name, "2.0.0");
    let manifest_entry = format!("{name}/manifest.json");
    let payload_entry = format!("{name}/SimObjects/Airplanes/aircraft.cfg");
    create_zip(
        archive,
        &[(&manifest_entry, &manifest), (&payload_entry, name)],
    );
}

/// Platform directory link, the same primitive the manager uses.
pub fn make_link(source: &Utf8Path, target: &Utf8Path) {
    sim_mod_keeper_lib::core::linker::Linker::link(source, target).unwrap();
}
