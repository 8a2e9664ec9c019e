mod common;

use camino::Utf8PathBuf;
use common::{create_test_mod, setup_test_env};
use sim_mod_keeper_lib::config::{AppSettings, ConfigStore};
use sim_mod_keeper_lib::core::archive::ZipBackend;
use sim_mod_keeper_lib::core::flight_sim::{FlightSim, InstallSource, SimEnvironment};
use sim_mod_keeper_lib::models::error::SError;
use sim_mod_keeper_lib::models::paths::AppPathRules;
use sim_mod_keeper_lib::models::task_status::Silent;
use sim_mod_keeper_lib::utils::long_path;
use sim_mod_keeper_lib::AppRegistry;
use std::fs;
use std::sync::Arc;

fn settings_without_packages(env: &common::TestEnv) -> AppSettings {
    AppSettings {
        packages_path: None,
        mods_path: env.roots.mods.clone(),
        ..AppSettings::default()
    }
}

/// A simulator root whose UserCfg.opt points at `packages`.
fn write_sim_root(root: &camino::Utf8Path, packages: &camino::Utf8Path) {
    fs::create_dir_all(root).unwrap();
    fs::write(root.join("FlightSimulator.CFG"), "[Main]\n").unwrap();
    fs::write(
        root.join("UserCfg.opt"),
        format!("Version 62\nInstalledPackagesPath \"{packages}\"\n"),
    )
    .unwrap();
}

#[test]
fn test_packages_path_detection() {
    let env = setup_test_env();

    assert!(FlightSim::is_sim_packages_path(&env.packages));
    assert!(!FlightSim::is_sim_packages_path(&env.roots.community));
    assert!(!FlightSim::is_sim_packages_path(&env.root.join("missing")));
}

#[test]
fn test_set_packages_path_derives_folders() {
    let env = setup_test_env();
    let mut settings = settings_without_packages(&env);
    let mut sim = FlightSim::default();

    sim.set_packages_path(&env.packages, &mut settings).unwrap();

    assert!(long_path::same_resolved(
        sim.community_packages_path().unwrap(),
        &env.roots.community
    ));
    assert!(sim
        .official_packages_path()
        .unwrap()
        .ends_with("Official/OneStore"));
    assert!(settings.packages_path.is_some());
}

#[test]
fn test_official_without_store_folder_falls_back() {
    let env = setup_test_env();
    fs::remove_dir_all(env.packages.join("Official/OneStore")).unwrap();
    let mut settings = settings_without_packages(&env);
    let mut sim = FlightSim::default();

    sim.set_packages_path(&env.packages, &mut settings).unwrap();

    assert!(sim.official_packages_path().unwrap().ends_with("Official"));
}

#[test]
fn test_set_invalid_packages_path_is_rejected() {
    let env = setup_test_env();
    let mut settings = settings_without_packages(&env);
    let mut sim = FlightSim::default();

    let result = sim.set_packages_path(&env.root.join("nope"), &mut settings);

    assert!(matches!(result, Err(SError::InvalidPackagesPath(_))));
    assert!(settings.packages_path.is_none());
    assert!(sim.packages_path().is_none());
}

#[test]
fn test_saved_config_wins() {
    let env = setup_test_env();
    let mut settings = AppSettings {
        packages_path: Some(env.packages.clone()),
        ..settings_without_packages(&env)
    };
    let app_data = env.root.join("AppData");
    write_sim_root(&app_data.join("Microsoft Flight Simulator"), &env.root.join("other"));
    let sim_env = SimEnvironment {
        app_data: Some(app_data),
        ..SimEnvironment::default()
    };

    let mut sim = FlightSim::default();
    assert_eq!(
        sim.find_installation(&mut settings, &sim_env),
        Some(InstallSource::Config)
    );
}

#[test]
fn test_steam_user_cfg_is_followed() {
    let env = setup_test_env();
    let mut settings = settings_without_packages(&env);
    let app_data = env.root.join("AppData");
    write_sim_root(&app_data.join("Microsoft Flight Simulator"), &env.packages);
    let sim_env = SimEnvironment {
        app_data: Some(app_data),
        ..SimEnvironment::default()
    };

    let mut sim = FlightSim::default();
    let found = sim.find_installation(&mut settings, &sim_env);

    assert_eq!(found, Some(InstallSource::AppData));
    assert!(long_path::same_resolved(
        settings.packages_path.as_deref().unwrap(),
        &env.packages
    ));
}

#[test]
fn test_broken_strategy_falls_through_to_next() {
    let env = setup_test_env();
    let mut settings = AppSettings {
        packages_path: Some(env.root.join("moved-away")),
        ..settings_without_packages(&env)
    };
    let local = env.root.join("Local");
    // MS Store root with a UserCfg.opt lacking the key.
    let store_root = local
        .join("Packages")
        .join("Microsoft.FlightSimulator_8wekyb3d8bbwe")
        .join("LocalCache");
    fs::create_dir_all(&store_root).unwrap();
    fs::write(store_root.join("FlightSimulator.CFG"), "").unwrap();
    fs::write(store_root.join("UserCfg.opt"), "Version 62\n").unwrap();
    // Boxed edition packages folder.
    let boxed = local.join("MSFSPackages");
    fs::create_dir_all(boxed.join("Community")).unwrap();
    fs::create_dir_all(boxed.join("Official")).unwrap();

    let sim_env = SimEnvironment {
        local_app_data: Some(local),
        ..SimEnvironment::default()
    };
    let mut sim = FlightSim::default();

    assert_eq!(
        sim.find_installation(&mut settings, &sim_env),
        Some(InstallSource::Boxed)
    );
}

#[test]
fn test_nothing_found() {
    let env = setup_test_env();
    let mut settings = settings_without_packages(&env);
    let mut sim = FlightSim::default();

    assert_eq!(
        sim.find_installation(&mut settings, &SimEnvironment::default()),
        None
    );
    assert!(sim.roots(&env.roots.mods).is_err());
}

#[test]
fn test_game_version_from_fs_base() {
    let env = setup_test_env();
    let official = env.packages.join("Official/OneStore");
    create_test_mod(&official, "fs-base");
    let mut settings = settings_without_packages(&env);
    let mut sim = FlightSim::default();
    sim.set_packages_path(&env.packages, &mut settings).unwrap();

    assert_eq!(sim.game_version().as_deref(), Some("1.14.6"));
}

#[test]
fn test_registry_persists_found_installation() {
    let env = setup_test_env();
    let config = env.root.join("config/settings.toml");
    let store = ConfigStore::at(&config);
    store
        .save(&AppSettings {
            packages_path: Some(env.packages.clone()),
            ..settings_without_packages(&env)
        })
        .unwrap();

    let mut registry = AppRegistry::new(
        store.clone(),
        AppPathRules::new(&env.root.join("app")),
        Arc::new(ZipBackend),
    )
    .unwrap();
    assert_eq!(
        registry.find_installation(&SimEnvironment::default()).unwrap(),
        Some(InstallSource::Config)
    );

    create_test_mod(&env.roots.community, "A");
    let scan = registry.scan(&Silent).unwrap();
    assert_eq!(scan.mods.len(), 1);
    assert!(registry.find_mod("A").is_ok());
    assert!(matches!(
        registry.find_mod("Nope"),
        Err(SError::ModNotFound(_))
    ));

    let persisted = store.load().unwrap();
    let persisted_packages: Utf8PathBuf = persisted.packages_path.unwrap();
    assert!(long_path::same_resolved(&persisted_packages, &env.packages));
}
