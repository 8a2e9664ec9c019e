use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use sim_mod_keeper_lib::core::activation;
use sim_mod_keeper_lib::core::backup::{create_backup, default_backup_name};
use sim_mod_keeper_lib::core::flight_sim::SimEnvironment;
use sim_mod_keeper_lib::models::task_status::{ChannelReporter, Reporter, TaskStatus};
use sim_mod_keeper_lib::utils::file::FileUtils;
use sim_mod_keeper_lib::utils::logging;
use sim_mod_keeper_lib::utils::task::TaskRunner;
use sim_mod_keeper_lib::{AppRegistry, SError};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, warn};

#[derive(Debug, Parser)]
#[command(
    name = "sim-mod-keeper",
    version,
    about = "Manage Microsoft Flight Simulator community mods"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List enabled and disabled mods
    List,
    /// Show the manifest details and files of one mod
    Info { name: String },
    /// Link a stored mod into Community
    Enable { name: String },
    /// Take a mod out of Community and keep it in the store
    Disable { name: String },
    /// Remove a mod completely
    Uninstall { name: String },
    /// Install mods from archives
    Install {
        #[arg(required = true)]
        archives: Vec<Utf8PathBuf>,
    },
    /// Install every mod folder found under a directory
    InstallDir { dir: Utf8PathBuf },
    /// Archive the whole Community folder
    Backup {
        /// Output archive, defaults to a timestamped zip in the current folder
        #[arg(long)]
        out: Option<Utf8PathBuf>,
        /// Stop waiting after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Point the manager at the simulator packages folder
    SetPackages { path: Utf8PathBuf },
}

fn print_status(status: TaskStatus) {
    if let TaskStatus::Activity(activity) = status {
        eprintln!("{activity}");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, SError> {
    let mut registry = AppRegistry::open_default()?;
    let _log_guard = logging::init(&registry.app_paths.logs)?;
    let reporter: &dyn Reporter = &print_status;

    if let Command::SetPackages { path } = &cli.command {
        registry.set_packages_path(path)?;
        println!("Packages folder set to {path}");
        return Ok(ExitCode::SUCCESS);
    }

    let source = registry
        .find_installation(&SimEnvironment::from_env())?
        .ok_or(SError::InstallationNotFound)?;
    println!("Simulator found via {source}");

    match cli.command {
        Command::List => {
            let scan = registry.scan(reporter)?;
            let roots = registry.roots()?;
            for record in &scan.mods {
                let state = if record.is_enabled(&roots) {
                    "enabled "
                } else {
                    "disabled"
                };
                println!("[{state}] {:<40} {:<12} {}", record.name, record.version, record.title);
            }
            for e in &scan.errors {
                eprintln!("skipped: {e}");
            }
        }
        Command::Info { name } => {
            let mut record = registry.find_mod(&name)?;
            record.load_files()?;
            println!("{} ({})", record.title, record.name);
            println!("  type:       {}", record.content_type);
            println!("  creator:    {}", record.creator);
            println!("  version:    {}", record.version);
            println!("  min. game:  {}", record.minimum_game_version);
            println!("  location:   {}", record.abs_path);
            println!(
                "  files:      {} ({})",
                record.files.len(),
                FileUtils::human_readable_size(record.size)
            );
        }
        Command::Enable { name } => {
            let mut record = registry.find_mod(&name)?;
            activation::enable(&registry.roots()?, &mut record, reporter)?;
            println!("Enabled {name}");
        }
        Command::Disable { name } => {
            let mut record = registry.find_mod(&name)?;
            activation::disable(&registry.roots()?, &mut record, reporter)?;
            println!("Disabled {name}");
        }
        Command::Uninstall { name } => {
            let record = registry.find_mod(&name)?;
            activation::uninstall(&registry.roots()?, record, reporter)?;
            println!("Uninstalled {name}");
        }
        Command::Install { archives } => {
            let report = registry.install_archives(&archives, reporter)?;
            for record in &report.installed {
                println!("Installed {}", record.name);
            }
            for failure in &report.failures {
                eprintln!("Failed {}: {}", failure.input, failure.error);
            }
            if !report.is_success() {
                eprintln!(
                    "{} of {} archives could not be installed",
                    report.failures.len(),
                    archives.len()
                );
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::InstallDir { dir } => {
            for record in registry.install_directory(&dir, reporter)? {
                println!("Installed {}", record.name);
            }
        }
        Command::Backup { out, timeout_secs } => {
            let destination = out.unwrap_or_else(|| Utf8PathBuf::from(default_backup_name()));
            let community = registry.roots()?.community;
            let archive = registry.archive();
            let timeout = timeout_secs.map(Duration::from_secs);

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || rx.into_iter().for_each(print_status));

            let written = TaskRunner::run(timeout, move || {
                create_backup(&community, &destination, archive.as_ref(), &ChannelReporter(tx))
            })
            .await?;
            if printer.join().is_err() {
                warn!("Progress printer thread panicked");
            }
            println!("Backup written to {written}");
        }
        Command::SetPackages { .. } => {}
    }

    Ok(ExitCode::SUCCESS)
}
