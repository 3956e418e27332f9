//! Thin command-line driver for the stored-procedure runtime.

mod cli;
mod users;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use proc_runtime::{
    ArgsPort, DirectorySearch, EffectiveUser, FunctionDef, Runtime, RuntimeConfig, UserId,
};

use cli::{Args, SubCmd};
use users::{PermissiveUsers, UnrestrictedPrivileges};

pub fn run() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    initialize_logging();

    let config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file '{}'", path.display()))?;
            RuntimeConfig::from_toml_str(&text)
                .with_context(|| format!("parsing config file '{}'", path.display()))?
        }
        None => RuntimeConfig::default(),
    };

    let runtime = Runtime::new(
        Box::new(DirectorySearch::new(&args.search_dir)),
        Box::new(UnrestrictedPrivileges),
        Box::new(PermissiveUsers),
        config,
    );

    match args.cmd {
        SubCmd::Define {
            name,
            owner,
            setuid,
        } => {
            runtime.define_function(FunctionDef {
                name: name.clone(),
                owner: UserId(owner),
                setuid,
            });
            println!("defined '{name}'");
        }
        SubCmd::Call { name, args, as_user } => {
            let values: Vec<serde_json::Value> =
                serde_json::from_str(&args).context("parsing --args as a JSON array")?;
            let port = ArgsPort::from_values(&values)?;

            EffectiveUser::clear();
            EffectiveUser::set(proc_runtime::Credentials {
                user: UserId(as_user),
                universal_access: proc_runtime::AccessBitmap::empty(),
            });
            let task = proc_runtime::TaskContext::new();
            let result = runtime.call(&task, &name, &port);
            EffectiveUser::clear();

            match result {
                Ok(ret) => println!("{}", serde_json::Value::Array(ret.values().to_vec())),
                Err(err) => anyhow::bail!(err),
            }
        }
        SubCmd::Reload { package } => {
            runtime.reload(&package)?;
            println!("reloaded '{package}'");
        }
        SubCmd::Inspect => {
            println!("modules: {}", runtime.module_cache().len());
            println!("symbols: {}", runtime.symbol_cache().len());
        }
    }

    runtime.shutdown();
    Ok(())
}

/// Prefer `$RUST_LOG`, default to `warn` otherwise, matching
/// `wasmer-cli`'s `initialize_logging`.
fn initialize_logging() {
    let fmt_layer = fmt::layer().with_target(true).with_writer(std::io::stderr);
    let filter_layer = EnvFilter::builder()
        .with_default_directive(tracing::level_filters::LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
