use std::path::PathBuf;

use anyhow::Result;
use clap::{Arg, ArgAction, Command};

use healthmon::commands;

fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .value_name("FILE")
        .help("Path to a TOML configuration file")
        .value_parser(clap::value_parser!(PathBuf))
}

fn cli() -> Command {
    Command::new("healthmon")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Host and process health monitor with a web dashboard")
        .disable_version_flag(true)
        .arg(
            Arg::new("version")
                .short('v')
                .short_alias('V')
                .long("version")
                .help("Print version information")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("serve")
                .about("Collect continuously and serve the health API and dashboard")
                .arg(config_arg())
                .arg(
                    Arg::new("bind")
                        .short('b')
                        .long("bind")
                        .value_name("ADDR")
                        .help("Address to listen on (default 127.0.0.1:3000)"),
                )
                .arg(
                    Arg::new("interval")
                        .short('i')
                        .long("interval")
                        .value_name("MS")
                        .help("Collection interval in milliseconds (default 4000)")
                        .value_parser(clap::value_parser!(u64).range(1..)),
                )
                .arg(
                    Arg::new("log-dir")
                        .long("log-dir")
                        .value_name("DIR")
                        .help("Directory for health and critical-alert logs")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("no-log")
                        .long("no-log")
                        .help("Do not write health logs")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("snapshot")
                .about("Collect one sample and print it as JSON")
                .arg(config_arg())
                .arg(
                    Arg::new("pretty")
                        .short('p')
                        .long("pretty")
                        .help("Pretty-print the JSON output")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("status")
                .about("Collect one sample and print the health report")
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("export")
                .about("Collect one sample and write a JSON health export")
                .arg(config_arg())
                .arg(
                    Arg::new("log-dir")
                        .long("log-dir")
                        .value_name("DIR")
                        .help("Directory to write the export into")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .value_name("FILE")
                        .help("File name (default health-export-<millis>.json)"),
                ),
        )
        .subcommand(Command::new("version").about("Shows version information"))
}

fn main() -> Result<()> {
    healthmon::init_logging();

    let matches = cli().get_matches();

    if matches.get_flag("version") {
        return commands::version();
    }

    match matches.subcommand() {
        Some(("serve", sub_matches)) => commands::serve(sub_matches),
        Some(("snapshot", sub_matches)) => commands::snapshot(sub_matches),
        Some(("status", sub_matches)) => commands::status(sub_matches),
        Some(("export", sub_matches)) => commands::export(sub_matches),
        Some(("version", _)) => commands::version(),
        _ => {
            println!("Use 'healthmon --help' for more information.");
            Ok(())
        }
    }
}
