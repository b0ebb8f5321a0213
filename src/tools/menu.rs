use std::env::Args;
use std::io;
use std::path::PathBuf;

use metro::ui::Menu;

fn help_subcommands() {
    println!("Edits a metro network through an interactive menu on standard input");
    println!("Options:");
    super::print_common_options();
    println!("\t--save: Writes the network back to where it was loaded from on exit");
}

pub fn main(prg_name: &str, args: Args) -> io::Result<()> {
    let mut network = None::<PathBuf>;
    let mut save = false;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let (flag, explicit) = super::split_flag(arg);
        match &*flag {
            "--help" => {
                super::print_help(prg_name, "menu", help_subcommands);
                return Ok(());
            }
            "--version" => {
                super::print_version();
                return Ok(());
            }
            "--network" => {
                network = Some(super::require_arg("--network", &mut args, explicit)?.into());
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

    {
        let stdin = io::stdin();
        let stdout = io::stdout();
        Menu::new(&mut system, stdin.lock(), stdout.lock()).run()?;
    }

    if save {
        let path = super::save_network(&system, network)?;
        eprintln!("Saved network to {}", path.display());
    }

    Ok(())
}
