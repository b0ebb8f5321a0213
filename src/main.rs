use std::env::Args;
use std::io;

mod tools;

fn main() {
    let mut args = std::env::args();

    let prg_name = args.next().unwrap_or_else(|| String::from("metro"));

    metro::log::init_from_env();

    match real_main(&prg_name, args) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("{}: {}", prg_name, e);

            std::process::exit(1);
        }
    }
}

fn real_main(prg_name: &str, mut args: Args) -> io::Result<()> {
    let subcommand = args
        .next()
        .ok_or_else(|| ())
        .or_else(|_| tools::help_subcommands())?;

    match &*subcommand {
        "--help" => {
            println!("Usage: {} <subcommand> [SUBCOMMAND ARGS...]", prg_name);
            println!("Metro network editor backed by an insertion-ordered lookup table");
            tools::print_subcommands();
            return Ok(());
        }
        "--version" => {
            tools::print_version();
            return Ok(());
        }
        _ => {}
    }

    let subcommand_entry = tools::find_tool(&subcommand)?;

    subcommand_entry(prg_name, args)
}
