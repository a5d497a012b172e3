//! permset - role permission set administration
//!
//! Command-line host for the library: `boot` runs the bootstrap sequencer;
//! role / permission set writes go through the repository so the post-save
//! sync runs exactly as it would inside an application.

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use permset_core::bootstrap::{Bootstrap, BootstrapOutcome};
use permset_core::capability::PermissionSetResolver;
use permset_core::config::{PermsetConfig, CONFIG_FILE};
use permset_core::registry::RoleConfiguration;
use permset_core::role::{RoleForm, RoleRepository, SaveOutcome};
use permset_core::store::{FileStore, PermissionSetId, RoleStore};
use permset_core::logging;

#[derive(Parser)]
#[command(name = "permset")]
#[command(version)]
#[command(about = "Role permission sets", long_about = None)]
struct Cli {
    /// Path to permset.yaml
    #[arg(long, short = 'c', global = true, default_value = CONFIG_FILE)]
    config: PathBuf,
    /// Enable verbose logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bootstrap sequence and print the resulting registry
    Boot {
        /// Arguments the host process was started with
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Database management
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Manage roles
    Role {
        #[command(subcommand)]
        command: RoleCommands,
    },
    /// Manage permission set references
    Set {
        #[command(subcommand)]
        command: SetCommands,
    },
}

#[derive(Subcommand)]
enum DbCommands {
    /// Create the data directory and any missing tables
    Migrate,
}

#[derive(Subcommand)]
enum RoleCommands {
    /// List every role
    List,
    /// List roles other than admin and user
    NonBase,
    /// Show a role's permission sets and registered grants
    Show { name: String },
    /// Create a role
    Create {
        name: String,
        /// Permission set reference name (repeatable)
        #[arg(long = "set")]
        sets: Vec<String>,
    },
    /// Update a role
    Update {
        name: String,
        /// New name
        #[arg(long)]
        rename: Option<String>,
        /// Replace permission sets with these (repeatable)
        #[arg(long = "set")]
        sets: Vec<String>,
        /// Remove every permission set
        #[arg(long, conflicts_with = "sets")]
        clear_sets: bool,
    },
    /// Delete a role and its associations
    Delete { name: String },
}

#[derive(Subcommand)]
enum SetCommands {
    /// List permission set references
    List,
    /// List identifiers the resolver knows
    Catalog,
    /// Create a permission set reference
    Create {
        name: String,
        /// Identifier to resolve (e.g. OrderManagement)
        #[arg(long)]
        set: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a permission set reference
    Delete { name: String },
}

type Repo = RoleRepository<FileStore, RoleConfiguration>;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = PermsetConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    match cli.command {
        Commands::Boot { args } => handle_boot(&config, args)?,
        Commands::Db { command: DbCommands::Migrate } => handle_migrate(&config)?,
        Commands::Role { command } => handle_role(&config, command)?,
        Commands::Set { command } => handle_set(&config, command)?,
    }

    Ok(())
}

fn handle_boot(config: &PermsetConfig, args: Vec<String>) -> anyhow::Result<()> {
    let env = config.environment(args);
    let mut bootstrap = Bootstrap::new(config.extension_loader()?);
    let mut resolver = PermissionSetResolver::with_builtin_catalog();
    let mut registry = RoleConfiguration::new();

    let outcome = bootstrap
        .run(&env, &config.connector(), &mut resolver, &mut registry)
        .context("bootstrap failed")?;

    println!("{} {}", "Environment:".bold(), env.mode);
    if let Some(report) = bootstrap.last_load() {
        println!(
            "{} {} loaded, {} skipped",
            "Extensions:".bold(),
            report.loaded.len(),
            report.skipped.len()
        );
    }

    match &outcome {
        BootstrapOutcome::Synced { roles } => {
            println!("{} {} role(s)", "Synced".green().bold(), roles.len());
        }
        BootstrapOutcome::SchemaNotReady(message) => {
            println!("{} schema not ready: {}", "Skipped".yellow().bold(), message);
        }
        other => println!("{} {:?}", "Skipped".yellow().bold(), other),
    }

    print_registry(&registry);
    Ok(())
}

fn handle_migrate(config: &PermsetConfig) -> anyhow::Result<()> {
    let path = database_path(config)?;
    let store = FileStore::create(&path)?;
    let created = store.migrate()?;

    if created.is_empty() {
        println!("Database at {} is up to date", path.display());
    } else {
        for table in created {
            println!("{} {}", "created".green(), table);
        }
    }
    Ok(())
}

fn handle_role(config: &PermsetConfig, command: RoleCommands) -> anyhow::Result<()> {
    let mut repo = open_repository(config)?;

    match command {
        RoleCommands::List => {
            for role in repo.roles()? {
                let marker = if role.is_base() { " (base)".dimmed().to_string() } else { String::new() };
                println!("{:>4}  {}{}", role.id, role.name, marker);
            }
        }
        RoleCommands::NonBase => {
            for role in repo.non_base_roles()? {
                println!("{:>4}  {}", role.id, role.name);
            }
        }
        RoleCommands::Show { name } => {
            let role = find_role(&repo, &name)?;
            println!("{} {} (id {})", "Role:".bold(), role.name, role.id);
            for set in repo.permission_sets_for(&role)? {
                match repo.resolver().resolve(&set.set) {
                    Ok(handle) => {
                        println!("  - {} [{}]", set.name, set.set.cyan());
                        for grant in handle.grants() {
                            println!("      {}", grant);
                        }
                    }
                    Err(_) => {
                        println!("  - {} [{}] {}", set.name, set.set.red(), "unresolved".red());
                    }
                }
            }
        }
        RoleCommands::Create { name, sets } => {
            let ids = permission_set_ids(&repo, &sets)?;
            let form = RoleForm::create(name).permission_sets(ids);
            report_save(&repo.save(form)?, &repo)?;
        }
        RoleCommands::Update { name, rename, sets, clear_sets } => {
            let role = find_role(&repo, &name)?;
            let mut form = RoleForm::update(&role);
            if let Some(new_name) = rename {
                form = form.name(new_name);
            }
            if clear_sets {
                form = form.permission_sets(Vec::new());
            } else if !sets.is_empty() {
                form = form.permission_sets(permission_set_ids(&repo, &sets)?);
            }
            report_save(&repo.save(form)?, &repo)?;
        }
        RoleCommands::Delete { name } => {
            let role = find_role(&repo, &name)?;
            repo.destroy(role.id)?;
            println!("{} {}", "deleted".red(), role.name);
        }
    }

    Ok(())
}

fn handle_set(config: &PermsetConfig, command: SetCommands) -> anyhow::Result<()> {
    let mut repo = open_repository(config)?;

    match command {
        SetCommands::List => {
            for set in repo.permission_sets()? {
                let status = if repo.resolver().is_registered(&set.set) {
                    "ok".green()
                } else {
                    "unresolved".red()
                };
                println!("{:>4}  {:<28} {:<28} {}", set.id, set.name, set.set, status);
            }
        }
        SetCommands::Catalog => {
            for id in repo.resolver().identifiers() {
                let handle = repo.resolver().resolve(&id)?;
                println!(
                    "{:<28} {:>3} grant(s)  {}",
                    id,
                    handle.grants().len(),
                    handle.description().unwrap_or_default().dimmed()
                );
            }
        }
        SetCommands::Create { name, set, description } => {
            if !repo.resolver().is_registered(&set) {
                eprintln!(
                    "{} '{}' does not resolve yet; roles carrying it will fail to sync",
                    "warning:".yellow().bold(),
                    set
                );
            }
            let created = repo.create_permission_set(&name, &set, description.as_deref())?;
            println!("{} {} (id {})", "created".green(), created.name, created.id);
        }
        SetCommands::Delete { name } => {
            let set = repo
                .store()
                .find_permission_set_by_name(&name)?
                .ok_or_else(|| anyhow!("permission set '{}' not found", name))?;
            repo.destroy_permission_set(set.id)?;
            println!("{} {}", "deleted".red(), set.name);
        }
    }

    Ok(())
}

fn database_path(config: &PermsetConfig) -> anyhow::Result<PathBuf> {
    config.spec.database.path.clone().ok_or_else(|| {
        anyhow!("no database configured (set spec.database.path or PERMSET_DATABASE)")
    })
}

/// Open the store with a resolver that knows the catalog and extensions
///
/// No resync here: a role carrying an unresolvable set must stay
/// repairable. `boot` is the full resync.
fn open_repository(config: &PermsetConfig) -> anyhow::Result<Repo> {
    let store = FileStore::open(database_path(config)?)?;

    let mut resolver = PermissionSetResolver::with_builtin_catalog();
    config
        .extension_loader()?
        .load(&mut resolver)
        .context("loading extensions")?;

    Ok(RoleRepository::new(store, resolver, RoleConfiguration::new()))
}

fn find_role(repo: &Repo, name: &str) -> anyhow::Result<permset_core::Role> {
    repo.find_role_by_name(name)?
        .ok_or_else(|| anyhow!("role '{}' not found", name))
}

fn permission_set_ids(repo: &Repo, names: &[String]) -> anyhow::Result<Vec<PermissionSetId>> {
    names
        .iter()
        .map(|name| {
            repo.store()
                .find_permission_set_by_name(name)?
                .map(|s| s.id)
                .ok_or_else(|| anyhow!("permission set '{}' not found", name))
        })
        .collect()
}

fn report_save(outcome: &SaveOutcome, repo: &Repo) -> anyhow::Result<()> {
    match outcome {
        SaveOutcome::Saved(role) => {
            let ids = repo.registry().identifiers_for(&role.name).unwrap_or_default();
            println!("{} {} -> [{}]", "saved".green(), role.name, ids.join(", "));
            Ok(())
        }
        SaveOutcome::Rejected(errors) => {
            for message in errors.full_messages() {
                eprintln!("{} {}", "invalid:".red().bold(), message);
            }
            bail!("role not saved")
        }
    }
}

fn print_registry(registry: &RoleConfiguration) {
    if registry.is_empty() {
        println!("{}", "Registry is empty".dimmed());
        return;
    }

    println!("{}", "Registry:".bold());
    for name in registry.role_names() {
        let ids = registry.identifiers_for(name).unwrap_or_default();
        println!("  {:<20} {}", name, ids.join(", "));
    }
}
