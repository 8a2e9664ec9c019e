use crate::config::{app_base_dir, AppSettings, ConfigStore};
use crate::core::archive::{ArchiveBackend, ZipBackend};
use crate::core::backup;
use crate::core::discovery::{self, ScanResult};
use crate::core::flight_sim::{FlightSim, InstallSource, SimEnvironment};
use crate::core::installer::{InstallReport, ModInstaller};
use crate::core::mod_record::{ModRecord, ModRoots};
use crate::models::error::SError;
use crate::models::paths::AppPathRules;
use crate::models::task_status::Reporter;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Everything the engine needs, built once at start-up and passed explicitly.
pub struct AppRegistry {
    pub settings: AppSettings,
    pub flight_sim: FlightSim,
    pub app_paths: AppPathRules,
    store: ConfigStore,
    archive: Arc<dyn ArchiveBackend>,
}

impl AppRegistry {
    pub fn new(
        store: ConfigStore,
        app_paths: AppPathRules,
        archive: Arc<dyn ArchiveBackend>,
    ) -> Result<Self, SError> {
        let settings = store.load()?;
        fs::create_dir_all(&settings.mods_path)?;
        fs::create_dir_all(&app_paths.temp)?;

        Ok(Self {
            settings,
            flight_sim: FlightSim::default(),
            app_paths,
            store,
            archive,
        })
    }

    /// User config location, per-user data folder and the zip backend.
    pub fn open_default() -> Result<Self, SError> {
        Self::new(
            ConfigStore::user(),
            AppPathRules::new(&app_base_dir()),
            Arc::new(ZipBackend),
        )
    }

    pub fn save(&self) -> Result<(), SError> {
        self.store.save(&self.settings)
    }

    pub fn archive(&self) -> Arc<dyn ArchiveBackend> {
        Arc::clone(&self.archive)
    }

    /// Locates the simulator and persists the packages folder that was found.
    #[instrument(skip_all)]
    pub fn find_installation(
        &mut self,
        env: &SimEnvironment,
    ) -> Result<Option<InstallSource>, SError> {
        let found = self.flight_sim.find_installation(&mut self.settings, env);
        if found.is_some() {
            self.save()?;
        }
        Ok(found)
    }

    #[instrument(skip(self))]
    pub fn set_packages_path(&mut self, path: &Utf8Path) -> Result<(), SError> {
        self.flight_sim.set_packages_path(path, &mut self.settings)?;
        self.save()
    }

    #[instrument(skip(self))]
    pub fn set_mods_path(&mut self, path: &Utf8Path) -> Result<(), SError> {
        fs::create_dir_all(path)?;
        self.settings.mods_path = path.to_owned();
        info!("Mod store moved to {path}");
        self.save()
    }

    pub fn set_last_opened_path(&mut self, path: &Utf8Path) -> Result<(), SError> {
        self.settings.last_opened_path = Some(path.to_owned());
        self.save()
    }

    /// Snapshot of the Community folder and the mod store.
    pub fn roots(&self) -> Result<ModRoots, SError> {
        self.flight_sim.roots(&self.settings.mods_path)
    }

    #[instrument(skip_all)]
    pub fn scan(&self, reporter: &dyn Reporter) -> Result<ScanResult, SError> {
        discovery::get_all_mods(&self.roots()?, reporter)
    }

    /// Loads one mod by folder name, preferring its Community entry.
    pub fn find_mod(&self, name: &str) -> Result<ModRecord, SError> {
        let roots = self.roots()?;
        let candidates = [roots.community.join(name), roots.mods.join(name)];

        let path = candidates
            .iter()
            .find(|p| p.is_dir())
            .ok_or_else(|| SError::ModNotFound(name.to_string()))?;
        debug!("Resolved mod {name} to {path}");
        ModRecord::load(path)
    }

    #[instrument(skip(self, reporter))]
    pub fn install_archives(
        &self,
        archives: &[Utf8PathBuf],
        reporter: &dyn Reporter,
    ) -> Result<InstallReport, SError> {
        Ok(ModInstaller::install_archives(
            &self.roots()?,
            archives,
            self.archive.as_ref(),
            &self.app_paths.temp,
            reporter,
        ))
    }

    #[instrument(skip(self, reporter))]
    pub fn install_directory(
        &self,
        dir: &Utf8Path,
        reporter: &dyn Reporter,
    ) -> Result<Vec<ModRecord>, SError> {
        ModInstaller::install_directory(&self.roots()?, dir, reporter)
    }

    #[instrument(skip(self, reporter))]
    pub fn create_backup(
        &self,
        destination: &Utf8Path,
        reporter: &dyn Reporter,
    ) -> Result<Utf8PathBuf, SError> {
        let roots = self.roots()?;
        backup::create_backup(&roots.community, destination, self.archive.as_ref(), reporter)
    }
}
