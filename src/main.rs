use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use xnd::commands;

/// xnd - a small package manager for JavaScript projects
///
/// Resolves packages against an npm-compatible registry and records them in
/// the project's node_modules directory and package.json.
///
/// If the XND_TOKEN environment variable is set, it is sent to the registry
/// as a bearer token.
///
/// Examples:
///   xnd install left-pad --save   # Install and record left-pad
///   xnd install                   # Install everything listed in package.json
#[derive(Parser, Debug)]
#[command(author, version = env!("XND_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project directory (defaults to the current directory; also via XND_DIR)
    #[arg(
        long = "dir",
        short = 'C',
        env = "XND_DIR",
        value_name = "PATH",
        global = true
    )]
    pub project_root: Option<PathBuf>,

    /// Registry URL (defaults to https://registry.npmjs.org; also via XND_REGISTRY)
    #[arg(long = "registry", env = "XND_REGISTRY", value_name = "URL", global = true)]
    pub registry_url: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Install packages, or every dependency in package.json when none are given
    #[command(visible_alias = "i")]
    Install(InstallArgs),

    /// Remove an installed package
    #[command(visible_alias = "un")]
    Uninstall(PackageArgs),

    /// List installed packages and declared dependencies
    #[command(visible_alias = "ls")]
    List,

    /// Create a package.json in the project directory
    Init(InitArgs),

    /// Scaffold a new package directory
    #[command(visible_alias = "c")]
    Create(PackageArgs),

    /// Show where an installed package lives
    #[command(visible_alias = "e")]
    Edit(PackageArgs),

    /// Log in
    Login,

    /// Log out
    Logout,

    /// Show the current logged in user
    Whoami,

    /// Publish the project's package
    Publish,

    /// Set the tier for a user
    SetTier(SetTierArgs),
}

#[derive(clap::Args, Debug)]
pub struct InstallArgs {
    /// Package names to install
    #[arg(value_name = "PACKAGE")]
    pub names: Vec<String>,

    /// Record installed packages in package.json dependencies
    #[arg(short = 'S', long)]
    pub save: bool,
}

#[derive(clap::Args, Debug)]
pub struct PackageArgs {
    #[arg(value_name = "PACKAGE")]
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Accept every default without prompting
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct SetTierArgs {
    pub username: String,

    /// One of: user, package-maker, moderator, creator
    pub tier: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = xnd::runtime::RealRuntime;

    match cli.command {
        Commands::Install(args) => {
            commands::install(
                runtime,
                args.names,
                args.save,
                cli.project_root,
                cli.registry_url,
            )
            .await?
        }
        Commands::Uninstall(args) => commands::uninstall(runtime, &args.name, cli.project_root)?,
        Commands::List => commands::list(runtime, cli.project_root)?,
        Commands::Init(args) => commands::init(runtime, cli.project_root, args.yes)?,
        Commands::Create(args) => commands::create(runtime, &args.name, cli.project_root)?,
        Commands::Edit(args) => commands::edit(runtime, &args.name, cli.project_root)?,
        Commands::Login => commands::login(runtime)?,
        Commands::Logout => commands::logout(runtime)?,
        Commands::Whoami => commands::whoami(runtime)?,
        Commands::Publish => commands::publish(runtime, cli.project_root)?,
        Commands::SetTier(args) => commands::set_tier(runtime, &args.username, &args.tier)?,
    }
    Ok(())
}
