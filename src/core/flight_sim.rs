use crate::config::AppSettings;
use crate::core::mod_record::{ModRecord, ModRoots};
use crate::models::error::SError;
use crate::models::paths::{PackagesPathRules, SimRootRules, FS_BASE_PACKAGE};
use crate::utils::long_path;
use camino::{Utf8Path, Utf8PathBuf};
use derive_more::Display;
use std::fs;
use tracing::{debug, info, instrument, warn};

const USER_CFG_PACKAGES_KEY: &str = "InstalledPackagesPath";
const MS_STORE_PACKAGE: &str = "Microsoft.FlightSimulator_8wekyb3d8bbwe";

/// Environment folders the installation probes start from.
#[derive(Clone, Debug, Default)]
pub struct SimEnvironment {
    pub app_data: Option<Utf8PathBuf>,
    pub local_app_data: Option<Utf8PathBuf>,
    pub program_files_x86: Option<Utf8PathBuf>,
}

impl SimEnvironment {
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().map(Utf8PathBuf::from);
        Self {
            app_data: var("APPDATA"),
            local_app_data: var("LOCALAPPDATA"),
            program_files_x86: var("PROGRAMFILES(X86)"),
        }
    }
}

/// Where a packages folder was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum InstallSource {
    #[display("saved configuration")]
    Config,
    #[display("Steam (AppData)")]
    AppData,
    #[display("Microsoft Store")]
    MsStore,
    #[display("boxed edition")]
    Boxed,
    #[display("Steam (Program Files)")]
    SteamProgramFiles,
    #[display("Steam (Program Files, Chucky)")]
    SteamChucky,
}

enum Probe {
    /// Candidate packages folder, checked directly.
    Packages(Utf8PathBuf),
    /// Simulator root whose UserCfg.opt names the packages folder.
    Root(Utf8PathBuf),
}

/// The located simulator installation.
#[derive(Clone, Debug, Default)]
pub struct FlightSim {
    packages_path: Option<Utf8PathBuf>,
    community_packages_path: Option<Utf8PathBuf>,
    official_packages_path: Option<Utf8PathBuf>,
}

impl FlightSim {
    pub fn packages_path(&self) -> Option<&Utf8Path> {
        self.packages_path.as_deref()
    }

    pub fn community_packages_path(&self) -> Option<&Utf8Path> {
        self.community_packages_path.as_deref()
    }

    pub fn official_packages_path(&self) -> Option<&Utf8Path> {
        self.official_packages_path.as_deref()
    }

    /// Community plus the given mod store, once an installation is known.
    pub fn roots(&self, mods_path: &Utf8Path) -> Result<ModRoots, SError> {
        let community = self
            .community_packages_path()
            .ok_or(SError::PathNotSet("simulator packages path"))?;
        Ok(ModRoots::new(community, mods_path))
    }

    /// A packages folder holds both `Community` and `Official`.
    pub fn is_sim_packages_path(path: &Utf8Path) -> bool {
        let rules = PackagesPathRules::new(&long_path::resolve(path));
        rules.community.is_dir() && rules.official.is_dir()
    }

    /// A simulator root folder holds `FlightSimulator.CFG`.
    pub fn is_sim_root_path(path: &Utf8Path) -> bool {
        SimRootRules::new(&long_path::resolve(path))
            .flight_sim_cfg
            .is_file()
    }

    /// Reads `InstalledPackagesPath` from `UserCfg.opt`. `path` may be the file
    /// itself or the folder holding it.
    pub fn parse_user_cfg(path: &Utf8Path) -> Result<Utf8PathBuf, SError> {
        let file = if path.is_dir() {
            SimRootRules::new(path).user_cfg
        } else {
            path.to_owned()
        };
        debug!("Parsing {file}");
        let text = fs::read_to_string(long_path::resolve(&file))?;

        let line = text
            .lines()
            .map(str::trim_start)
            .find(|l| l.starts_with(USER_CFG_PACKAGES_KEY))
            .ok_or_else(|| {
                SError::ParseError(format!("{USER_CFG_PACKAGES_KEY} not found in {file}"))
            })?;

        let value = line
            .split_once(char::is_whitespace)
            .map(|(_, v)| v.trim().trim_matches('"').trim_matches('\''))
            .unwrap_or_default();
        if value.is_empty() {
            return Err(SError::ParseError(format!(
                "{USER_CFG_PACKAGES_KEY} in {file} has no value"
            )));
        }

        Ok(Utf8PathBuf::from(value))
    }

    fn probes(settings: &AppSettings, env: &SimEnvironment) -> Vec<(InstallSource, Probe)> {
        let mut probes = Vec::new();

        if let Some(path) = &settings.packages_path {
            probes.push((InstallSource::Config, Probe::Packages(path.clone())));
        }
        if let Some(app_data) = &env.app_data {
            probes.push((
                InstallSource::AppData,
                Probe::Root(app_data.join("Microsoft Flight Simulator")),
            ));
        }
        if let Some(local) = &env.local_app_data {
            probes.push((
                InstallSource::MsStore,
                Probe::Root(local.join("Packages").join(MS_STORE_PACKAGE).join("LocalCache")),
            ));
            probes.push((InstallSource::Boxed, Probe::Packages(local.join("MSFSPackages"))));
        }
        if let Some(program_files) = &env.program_files_x86 {
            let steam_common = program_files.join("Steam").join("steamapps").join("common");
            probes.push((
                InstallSource::SteamProgramFiles,
                Probe::Root(steam_common.join("MicrosoftFlightSimulator")),
            ));
            probes.push((InstallSource::SteamChucky, Probe::Root(steam_common.join("Chucky"))));
        }

        probes
    }

    /// Tries each known location in order and adopts the first valid packages
    /// folder. The chosen path is written into `settings`.
    #[instrument(skip_all)]
    pub fn find_installation(
        &mut self,
        settings: &mut AppSettings,
        env: &SimEnvironment,
    ) -> Option<InstallSource> {
        for (source, probe) in Self::probes(settings, env) {
            debug!("Looking for packages via {source}");

            let packages = match probe {
                Probe::Packages(path) => path,
                Probe::Root(root) => {
                    if !Self::is_sim_root_path(&root) {
                        continue;
                    }
                    match Self::parse_user_cfg(&root) {
                        Ok(path) => path,
                        Err(e) => {
                            warn!("Could not read packages path from {root}: {e}");
                            continue;
                        }
                    }
                }
            };

            if !Self::is_sim_packages_path(&packages) {
                debug!("{packages} is not a packages folder");
                continue;
            }

            match self.set_packages_path(&packages, settings) {
                Ok(()) => {
                    info!("Found simulator packages at {packages} via {source}");
                    return Some(source);
                }
                Err(e) => warn!("Rejected {packages}: {e}"),
            }
        }

        warn!("No simulator installation found");
        None
    }

    /// Validates and adopts `path` as the packages folder.
    pub fn set_packages_path(
        &mut self,
        path: &Utf8Path,
        settings: &mut AppSettings,
    ) -> Result<(), SError> {
        if !Self::is_sim_packages_path(path) {
            return Err(SError::InvalidPackagesPath(path.to_owned()));
        }

        let packages = long_path::resolve(path);
        let rules = PackagesPathRules::new(&packages);
        let official = Self::official_store_folder(&rules.official)?;

        settings.packages_path = Some(long_path::display(&packages));
        self.community_packages_path = Some(rules.community);
        self.official_packages_path = Some(official);
        self.packages_path = Some(packages);
        Ok(())
    }

    /// `Official` holds one folder per store (`OneStore`, `Steam`); the first
    /// one is used, falling back to `Official` itself.
    fn official_store_folder(official: &Utf8Path) -> Result<Utf8PathBuf, SError> {
        let mut stores = official
            .read_dir_utf8()?
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_dir())
            .collect::<Vec<_>>();
        stores.sort();

        Ok(stores
            .into_iter()
            .next()
            .unwrap_or_else(|| official.to_owned()))
    }

    /// `minimum_game_version` of the base game package, when it can be read.
    pub fn game_version(&self) -> Option<String> {
        let fs_base = self.official_packages_path()?.join(FS_BASE_PACKAGE);
        match ModRecord::load(&fs_base) {
            Ok(record) if !record.minimum_game_version.is_empty() => {
                Some(record.minimum_game_version)
            }
            Ok(_) => None,
            Err(e) => {
                debug!("No game version from {fs_base}: {e}");
                None
            }
        }
    }
}
