use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Drive the stored-procedure runtime from the command line: load a
/// package, call a function, or inspect cache state. Stands in for the
/// "scripting-host glue, CLI, REPL" that the core itself has no
/// opinion about — not a full language front-end.
#[derive(Parser, Debug)]
#[command(about, version)]
pub struct Args {
    /// Directory searched for `<package>.<so|dylib|dll>` files.
    #[arg(long, default_value = ".")]
    pub search_dir: PathBuf,

    /// Optional TOML file with a `[journal]` table (`max_size`, `max_len`).
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: SubCmd,
}

#[derive(Subcommand, Debug)]
pub enum SubCmd {
    /// Register a function definition; its symbol resolves lazily on
    /// first call.
    Define {
        /// Dotted `pkg.sub.fn` name.
        name: String,
        /// Owning user id.
        #[arg(long, default_value_t = 0)]
        owner: u32,
        /// Run the function as its owner regardless of caller.
        #[arg(long)]
        setuid: bool,
    },
    /// Call a registered function.
    Call {
        /// Dotted `pkg.sub.fn` name.
        name: String,
        /// Arguments as a JSON array, e.g. `[1,2]`.
        #[arg(long, default_value = "[]")]
        args: String,
        /// Effective caller user id.
        #[arg(long, default_value_t = 0)]
        as_user: u32,
    },
    /// Force an unconditional reload of a package, bypassing the file
    /// attribute check `load_or_get` would otherwise make.
    Reload {
        package: String,
    },
    /// Print module and symbol cache occupancy.
    Inspect,
}
