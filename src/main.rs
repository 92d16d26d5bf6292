use anyhow::Result;
use bowersync::commands;
use bowersync::config::Config;
use bowersync::runtime::RealRuntime;
use bowersync::sync::SyncStatus;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// bowersync - keep bower_components and bower.json in agreement
///
/// Lists installed Bower packages, reports packages that are declared but
/// missing or installed but not declared, and reconciles either side.
///
/// Examples:
///   bowersync status              # Exit 1 when out of sync
///   bowersync sync                # Prune, then install what bower.json declares
///   bowersync sync --to-manifest  # Rewrite bower.json from installed packages
#[derive(Parser, Debug)]
#[command(author, version = env!("BOWERSYNC_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project root (defaults to the current directory)
    #[arg(long = "cwd", short = 'C', value_name = "PATH", global = true)]
    pub cwd: Option<PathBuf>,

    /// Bower executable (also via BOWERSYNC_BOWER)
    #[arg(
        long = "bower",
        env = "BOWERSYNC_BOWER",
        value_name = "PROGRAM",
        default_value = "bower",
        global = true
    )]
    pub bower: String,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// List installed and declared packages
    List(ListArgs),

    /// Report missing and untracked packages
    Status,

    /// Reconcile installed packages with bower.json
    Sync(SyncArgs),

    /// Install packages and declare them in bower.json
    Install(InstallArgs),

    /// Uninstall packages and remove them from bower.json
    Uninstall(UninstallArgs),

    /// Update an installed package
    Update(PackageArgs),

    /// Show registry information about a package
    Info(PackageArgs),

    /// Create bower.json from the installed packages
    Init,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Do not look up newer versions
    #[arg(long)]
    pub offline: bool,
}

#[derive(clap::Args, Debug)]
pub struct SyncArgs {
    /// Update bower.json from the installed packages instead
    #[arg(long = "to-manifest")]
    pub to_manifest: bool,
}

#[derive(clap::Args, Debug)]
pub struct InstallArgs {
    /// Packages as "name" or "name#range"
    #[arg(value_name = "NAME[#RANGE]", required = true)]
    pub packages: Vec<String>,

    /// Declare as development dependencies
    #[arg(long = "save-dev", short = 'D')]
    pub save_dev: bool,
}

#[derive(clap::Args, Debug)]
pub struct UninstallArgs {
    #[arg(value_name = "NAME", required = true)]
    pub packages: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct PackageArgs {
    #[arg(value_name = "NAME")]
    pub name: String,
}

fn exit_code(status: SyncStatus) -> ExitCode {
    ExitCode::from(status.code() as u8)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let config = Config::new(RealRuntime, cli.cwd, Some(cli.bower))?;

    match cli.command {
        Commands::List(args) => commands::list(config, args.offline).await?,
        Commands::Status => return Ok(exit_code(commands::status(config).await?)),
        Commands::Sync(args) => {
            return Ok(exit_code(commands::sync(config, args.to_manifest).await?));
        }
        Commands::Install(args) => {
            commands::install(config, &args.packages, args.save_dev).await?
        }
        Commands::Uninstall(args) => commands::uninstall(config, &args.packages).await?,
        Commands::Update(args) => commands::update(config, &args.name).await?,
        Commands::Info(args) => commands::info(config, &args.name).await?,
        Commands::Init => commands::init(config).await?,
    }
    Ok(ExitCode::SUCCESS)
}
