use std::env::Args;
use std::io;
use std::path::{Path, PathBuf};

use metro::config::{self, NetworkConfig};
use metro::log::{log, LogLevel};
use metro::metro::MetroSystem;

macro_rules! def_tools{
    {
        $(tool $tool:ident $(alias $($else:ident)+)?;)*
    } => {
        $(pub mod $tool;)*

        pub fn find_tool(x: &str) -> io::Result<fn(&str, Args)->io::Result<()>>{
            match x{
                $(::core::stringify!($tool) $($(| ::core::stringify!($else))+)? => Ok($tool::main),)*
                x => Err(io::Error::new(io::ErrorKind::InvalidInput, format!("No such subcommand {}", x)))
            }
        }

        pub fn print_subcommands(){
            println!("Available Subcommands:");
            $(println!("\t{}", ::core::stringify!($tool));)*
        }

        pub fn print_help(prg_name: &str, tool_name: &str, help_cb: fn()){
            println!("Usage: {} {} [OPTIONS]", prg_name, tool_name);
            help_cb()
        }

        pub fn help_subcommands<T>() -> io::Result<T>{
            Err(io::Error::new(io::ErrorKind::InvalidInput, {
                use core::fmt::Write;
                let mut st = String::new();

                let _ = writeln!(st, "Subcommands:");
                $(let _ = writeln!(st, "\t{}", ::core::stringify!($tool));)*

                st
            }))
        }
    }
}

def_tools! {
    tool menu alias ui;
    tool describe;
    tool validate;
}

pub fn print_version() {
    println!(
        "metro v{} ({})",
        env!("METRO_VERSION"),
        env!("METRO_BUILD_PROFILE")
    );
}

/// Options shared by every subcommand.
pub fn print_common_options() {
    println!("\t--network <path>: Network description to load (default: {})", default_network_display());
    println!("\t--help: Prints this message and exits");
    println!("\t--version: Prints version information and exits");
}

fn default_network_display() -> String {
    NetworkConfig::default_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| String::from("<none>"))
}

/// Splits `--flag=value` into the flag and its inline value.
pub fn split_flag(arg: String) -> (String, Option<String>) {
    match arg.split_once('=') {
        Some((flag, val)) if flag.starts_with("--") => (flag.to_string(), Some(val.to_string())),
        _ => (arg, None),
    }
}

pub fn require_arg<I: Iterator<Item = String>>(
    flag: &str,
    args: &mut I,
    explicit: Option<String>,
) -> io::Result<String> {
    explicit.or_else(|| args.next()).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} requires an argument", flag),
        )
    })
}

pub fn reject_arg(flag: &str, explicit: Option<String>) -> io::Result<()> {
    match explicit {
        Some(_) => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} does not accept an argument", flag),
        )),
        None => Ok(()),
    }
}

pub fn config_error(e: config::Error) -> io::Error {
    match e {
        config::Error::Io { path, source } => io::Error::new(
            source.kind(),
            format!("{}: {}", path.display(), source),
        ),
        e => io::Error::new(io::ErrorKind::InvalidData, e),
    }
}

/// Loads the network at `path`, or the default network when `path` is `None`.
pub fn load_network(path: Option<&Path>) -> io::Result<MetroSystem> {
    let config = match path {
        Some(path) => NetworkConfig::load(path),
        None => NetworkConfig::load_default(),
    }
    .map_err(config_error)?;

    let system = config.to_system().map_err(|e| {
        io::Error::new(io::ErrorKind::InvalidData, config::Error::Metro(e))
    })?;
    log!(LogLevel::Verbose, "loaded {} line(s)", system.len());
    Ok(system)
}

/// Writes `system` to `path`, or to the default location, creating parent
/// directories as needed.
pub fn save_network(system: &MetroSystem, path: Option<PathBuf>) -> io::Result<PathBuf> {
    let path = match path {
        Some(path) => path,
        None => NetworkConfig::default_path()
            .ok_or_else(|| config_error(config::Error::NoConfigDir))?,
    };

    let text = NetworkConfig::from_system(system)
        .to_toml_string()
        .map_err(config_error)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(&path, text)?;
    log!(LogLevel::Info, "saved network to {}", path.display());
    Ok(path)
}

/// Renders `system` as a TOML network description.
pub fn network_toml(system: &MetroSystem) -> io::Result<String> {
    NetworkConfig::from_system(system)
        .to_toml_string()
        .map_err(config_error)
}
