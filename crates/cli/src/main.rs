//! mirador — operational CLI for the BI pack configuration.
//!
//! Loads the persisted pack collection, runs one operation against it and
//! persists the result where the operation mutates state.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use mirador_core::config::load_dotenv;
use mirador_packs::{rename_host, PackRepository};
use mirador_store::ConfigStore;

/// BI pack configuration tool — validation, lookups and renames.
#[derive(Parser, Debug)]
#[command(name = "mirador", version, about)]
struct Cli {
    /// Base directory for the persisted BI configuration.
    #[arg(long, env = "MIRADOR_VAR_DIR", default_value = "data/bi")]
    var_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the configuration and check the rule graph for cycles.
    Validate,
    /// List packs with their rule and aggregation counts.
    List,
    /// Show reference counts for a rule.
    Refs { rule_id: String },
    /// List aggregation group names and paths.
    Groups,
    /// Delete a rule if nothing references it.
    DeleteRule { rule_id: String },
    /// Rename a rule ID and update every reference to it.
    RenameRule { old_id: String, new_id: String },
    /// Rename a host in all rule and aggregation patterns.
    RenameHost { old_name: String, new_name: String },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    load_dotenv();
    let cli = Cli::parse();

    let store = ConfigStore::new(&cli.var_dir)
        .with_context(|| format!("failed to open BI store in {}", cli.var_dir.display()))?;
    let mut repo = PackRepository::new(store);

    match cli.command {
        Command::Validate => {
            repo.load_config()?;
            repo.generate_config().context("rule graph is invalid")?;
            println!(
                "OK: {} packs, {} rules, {} aggregations ({} enabled)",
                repo.get_packs().len(),
                repo.get_all_rules().len(),
                repo.get_all_aggregations().len(),
                repo.get_num_enabled_aggregations(),
            );
        }
        Command::List => {
            repo.load_config()?;
            for pack in repo.get_packs().values() {
                println!(
                    "{:<20} {:<30} rules: {:>3}  aggregations: {:>3}{}",
                    pack.id,
                    pack.title,
                    pack.num_rules(),
                    pack.num_aggregations(),
                    if pack.public { "" } else { " (restricted)" },
                );
            }
        }
        Command::Refs { rule_id } => {
            repo.load_config()?;
            repo.get_rule_mandatory(&rule_id)?;
            let refs = repo.count_rule_references(&rule_id)?;
            println!(
                "{}: used by {} aggregation(s), {} rule(s) directly; deepest use at level {}",
                rule_id, refs.aggr_refs, refs.rule_refs, refs.level
            );
        }
        Command::Groups => {
            repo.load_config()?;
            for (value, _) in repo.get_aggregation_group_choices() {
                println!("{value}");
            }
        }
        Command::DeleteRule { rule_id } => {
            repo.load_config()?;
            repo.delete_rule(&rule_id)?;
            repo.save_config()?;
            println!("deleted rule {rule_id}");
        }
        Command::RenameRule { old_id, new_id } => {
            repo.load_config()?;
            repo.get_rule_mandatory(&old_id)?;
            repo.rename_rule_id(&old_id, &new_id);
            repo.save_config()?;
            println!("renamed rule {old_id} -> {new_id}");
        }
        Command::RenameHost { old_name, new_name } => {
            let renamed = rename_host(&mut repo, &old_name, &new_name)?;
            println!("renamed host in {renamed} node(s)");
        }
    }

    Ok(())
}
