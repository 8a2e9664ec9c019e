use camino::{Utf8Path, Utf8PathBuf};

macro_rules! define_paths {
    ($name:ident { $($field:ident : $default:expr),* $(,)? }) => {
        #[derive(Clone, Debug)]
        pub struct $name {
            $(pub $field: Utf8PathBuf,)*
        }

        impl $name {
            pub fn to_absolute(mut self, base: &Utf8Path) -> Self {
                $(self.$field = base.join(self.$field);)*
                self
            }

            pub fn new(base: &Utf8Path) -> Self {
                Self::default().to_absolute(base)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $($field: $default.into(),)*
                }
            }
        }
    };
}

// Inside a mod folder.
define_paths!(ModPaths {
    manifest: MANIFEST_FILE,
});

// Inside the simulator's packages root.
define_paths!(PackagesPathRules {
    community: "Community",
    official: "Official",
});

// Inside a simulator root folder (where the user config lives).
define_paths!(SimRootRules {
    flight_sim_cfg: "FlightSimulator.CFG",
    user_cfg: "UserCfg.opt",
});

// Inside the manager's own data folder.
define_paths!(AppPathRules {
    mods: "modCache",
    temp: ".tmp",
    logs: "logs",
});

/// Manifest file name, the marker `find_mods` looks for.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Folder of the base-game package whose manifest carries the game version.
pub const FS_BASE_PACKAGE: &str = "fs-base";
