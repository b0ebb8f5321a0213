use std::env::Args;
use std::io;
use std::path::PathBuf;

fn help_subcommands() {
    println!("Prints every line of a metro network and its stations, lines in name order");
    println!("Options:");
    super::print_common_options();
    println!("\t--toml: Prints the network as a TOML description instead");
}

pub fn main(prg_name: &str, args: Args) -> io::Result<()> {
    let mut network = None::<PathBuf>;
    let mut toml = false;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let (flag, explicit) = super::split_flag(arg);
        match &*flag {
            "--help" => {
                super::print_help(prg_name, "describe", help_subcommands);
                return Ok(());
            }
            "--version" => {
                super::print_version();
                return Ok(());
            }
            "--network" => {
                network = Some(super::require_arg("--network", &mut args, explicit)?.into());
            }
            "--toml" => {
                super::reject_arg("--toml", explicit)?;
                toml = true;
            }
            x => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("Unrecognized option {}", x),
                ))
            }
        }
    }

    let system = super::load_network(network.as_deref())?;

    if toml {
        print!("{}", super::network_toml(&system)?);
    } else {
        print!("{}", system.description());
    }

    Ok(())
}
