use std::env::Args;
use std::io;
use std::path::PathBuf;

fn help_subcommands() {
    println!("Removes transfers that point at missing lines or stations");
    println!("Options:");
    super::print_common_options();
    println!("\t--toml: Prints the pruned network as a TOML description");
    println!("\t--save: Writes the pruned network back to where it was loaded from");
}

pub fn main(prg_name: &str, args: Args) -> io::Result<()> {
    let mut network = None::<PathBuf>;
    let mut toml = false;
    let mut save = false;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let (flag, explicit) = super::split_flag(arg);
        match &*flag {
            "--help" => {
                super::print_help(prg_name, "validate", help_subcommands);
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
            "--save" => {
                super::reject_arg("--save", explicit)?;
                save = true;
            }
            x => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("Unrecognized option {}", x),
                ))
            }
        }
    }

    let mut system = super::load_network(network.as_deref())?;
    let pruned = system.validate();
    eprintln!("{} connection(s) removed", pruned);

    if toml {
        print!("{}", super::network_toml(&system)?);
    }

    if save && pruned > 0 {
        let path = super::save_network(&system, network)?;
        eprintln!("Saved network to {}", path.display());
    }

    Ok(())
}
