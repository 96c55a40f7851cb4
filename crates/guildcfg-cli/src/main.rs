use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use guildcfg_cli::{commands, Roster};
use guildcfg_core::TenantId;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn blob_arg() -> Arg {
    Arg::new("blob")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Stored configuration blob (JSON)")
}

fn roster_arg() -> Arg {
    Arg::new("roster")
        .long("roster")
        .value_parser(value_parser!(PathBuf))
        .help("YAML roster of roles, channels, members, modules and commands")
}

fn cli() -> Command {
    Command::new("guildcfg")
        .version(guildcfg_core::VERSION)
        .about("Inspect, edit and migrate stored tenant configuration")
        .subcommand_required(true)
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .default_value("warn")
                .help("Log filter when RUST_LOG is not set"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(Command::new("summary").about("List every category and option"))
        .subcommand(
            Command::new("get")
                .about("Show a category, an option or one key of an option")
                .arg(blob_arg())
                .arg(Arg::new("path").help("Category, Category.Option or Category.Option.Key"))
                .arg(Arg::new("key").help("Key of a map option"))
                .arg(roster_arg()),
        )
        .subcommand(
            Command::new("set")
                .about("Set an option and save the blob")
                .arg(blob_arg())
                .arg(Arg::new("path").required(true).help("Option path"))
                .arg(
                    Arg::new("values")
                        .num_args(0..)
                        .allow_hyphen_values(true)
                        .help("New value followed by any extra arguments"),
                )
                .arg(roster_arg()),
        )
        .subcommand(
            Command::new("migrate")
                .about("Upgrade a blob to the current schema without live side effects")
                .arg(blob_arg())
                .arg(
                    Arg::new("tenant")
                        .long("tenant")
                        .default_value("0")
                        .help("Tenant id used in logs"),
                )
                .arg(
                    Arg::new("write")
                        .long("write")
                        .action(ArgAction::SetTrue)
                        .help("Replace the blob with the migrated configuration"),
                )
                .arg(roster_arg()),
        )
}

fn init_tracing(matches: &ArgMatches) {
    let level = matches
        .get_one::<String>("log-level")
        .map_or("warn", String::as_str);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);
    if matches.get_flag("json-logs") {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

fn blob(args: &ArgMatches) -> PathBuf {
    args.get_one::<PathBuf>("blob").cloned().unwrap_or_default()
}

fn roster(args: &ArgMatches) -> Result<Roster> {
    Roster::load(args.get_one::<PathBuf>("roster").map(PathBuf::as_path))
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(&matches);

    match matches.subcommand() {
        Some(("summary", _)) => print_lines(&commands::summary()),
        Some(("get", args)) => {
            let path = args.get_one::<String>("path").map(String::as_str);
            let key = args.get_one::<String>("key").map(String::as_str);
            print_lines(&commands::get(&blob(args), &roster(args)?, path, key)?);
        }
        Some(("set", args)) => {
            let path = args.get_one::<String>("path").map_or("", String::as_str);
            let values: Vec<String> = args
                .get_many::<String>("values")
                .map(|v| v.cloned().collect())
                .unwrap_or_default();
            let outcome = commands::set(&blob(args), &roster(args)?, path, &values)?;
            println!("{}", outcome.message);
            if !outcome.success {
                std::process::exit(1);
            }
        }
        Some(("migrate", args)) => {
            let tenant = TenantId::new(args.get_one::<String>("tenant").map_or("0", String::as_str));
            let report =
                commands::migrate(&blob(args), &roster(args)?, &tenant, args.get_flag("write")).await?;
            print_lines(&report.to_lines());
        }
        _ => unreachable!("subcommand is required"),
    }
    Ok(())
}
