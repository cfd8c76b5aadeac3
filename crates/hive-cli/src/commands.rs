use anyhow::{anyhow, bail, Context};
use colored::Colorize;
use hive_key::{ReadKey, WriteKey};
use hive_store::{FileKeyStore, KeyStore};
use hive_types::AccessRights;
use tracing::{debug, info};

use crate::cli::*;
use crate::config::HiveConfig;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => HiveConfig::load(path)?,
        None => HiveConfig::default(),
    };
    if let Some(store) = &cli.store {
        config.store = store.clone();
    }
    let store = FileKeyStore::load(&config.store, config.file.clone())
        .with_context(|| format!("opening store {}", config.store.display()))?;
    debug!(store = %config.store.display(), sync_mode = ?config.file.sync_mode, "store ready");

    match cli.command {
        Command::Mkdir(args) => cmd_mkdir(&store, args),
        Command::Get(args) => cmd_get(&store, &config, &cli.format, args),
        Command::Set(args) => cmd_set(&store, &config, args),
        Command::Lock(args) => cmd_lock(&store, args),
    }
}

fn cmd_mkdir(store: &FileKeyStore, args: MkdirArgs) -> anyhow::Result<()> {
    store.create_node(store.root(), &args.path)?;
    info!(path = %args.path, "node created");
    println!("{} {}", "created".green(), args.path.bold());
    Ok(())
}

fn cmd_get(
    store: &FileKeyStore,
    config: &HiveConfig,
    format: &OutputFormat,
    args: GetArgs,
) -> anyhow::Result<()> {
    let key = ReadKey::open_with_config(store, store.root(), &args.path, config.accessor.clone())?;
    let value = key.get_raw(&args.name).ok_or_else(|| {
        anyhow!(
            "no value {} under {} (status {})",
            args.name,
            args.path,
            key.last_status()
        )
    })?;
    debug!(
        path = %args.path,
        name = %args.name,
        kind = %value.kind,
        len = value.data.len(),
        "value read"
    );
    match format {
        OutputFormat::Text => println!("{}", value.render()),
        OutputFormat::Json => {
            let out = serde_json::json!({
                "path": args.path,
                "name": args.name,
                "kind": value.kind.to_string(),
                "value": value.render(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

fn cmd_set(store: &FileKeyStore, config: &HiveConfig, args: SetArgs) -> anyhow::Result<()> {
    let key = WriteKey::open_with_config(store, store.root(), &args.path, config.accessor.clone())?;
    let ok = match args.kind {
        SetKind::U32 => key.set_value(&args.name, single(&args.values)?.parse::<u32>()?),
        SetKind::U64 => key.set_value(&args.name, single(&args.values)?.parse::<u64>()?),
        SetKind::Text => key.set_string(&args.name, single(&args.values)?),
        SetKind::MultiText => key.set_multi_string(&args.name, &args.values),
    };
    if !ok {
        bail!(
            "failed to write {} under {} (status {})",
            args.name,
            args.path,
            key.last_status()
        );
    }
    info!(path = %args.path, name = %args.name, kind = ?args.kind, "value written");
    println!("{} {}\\{}", "set".green(), args.path.bold(), args.name);
    Ok(())
}

fn cmd_lock(store: &FileKeyStore, args: LockArgs) -> anyhow::Result<()> {
    let ceiling = match args.level {
        LockLevel::Read => Some(AccessRights::Read),
        LockLevel::Write => Some(AccessRights::Write),
        LockLevel::ReadWrite => Some(AccessRights::ReadWrite),
        LockLevel::None => None,
    };
    store.set_permissions(&args.path, ceiling)?;
    info!(path = %args.path, ceiling = ?ceiling, "permissions changed");
    match ceiling {
        Some(rights) => println!("{} {} to {}", "limited".yellow(), args.path.bold(), rights),
        None => println!("{} {}", "unlocked".green(), args.path.bold()),
    }
    Ok(())
}

fn single(values: &[String]) -> anyhow::Result<&str> {
    match values {
        [one] => Ok(one),
        _ => bail!("expected exactly one value, got {}", values.len()),
    }
}
