use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use wsync_cli::{
    catalog, init_tracing, load_config, load_definitions, load_flags, render_report, sync,
    validate, SyncArgs, VERSION,
};
use wsync_metadata::WorkspaceId;
use wsync_sync::SyncConfig;

fn path_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_parser(value_parser!(PathBuf))
        .help(help)
}

fn flag_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).action(ArgAction::SetTrue).help(help)
}

fn cli() -> Command {
    Command::new("wsync")
        .version(VERSION)
        .about("Reconcile workspace metadata with the standard objects")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("sync")
                .about("Synchronize one workspace of a snapshot file")
                .arg(path_arg("state", "JSON repository snapshot").required(true))
                .arg(
                    Arg::new("workspace")
                        .long("workspace")
                        .required(true)
                        .value_parser(value_parser!(WorkspaceId))
                        .help("Workspace id"),
                )
                .arg(path_arg("flags", "JSON feature flags"))
                .arg(path_arg("definitions", "YAML standard catalog"))
                .arg(path_arg("config", "TOML configuration"))
                .arg(flag_arg("dry-run", "Compute the plan without writing"))
                .arg(flag_arg("field-migrations", "Emit column entries for existing tables"))
                .arg(flag_arg("json", "Output as JSON")),
        )
        .subcommand(
            Command::new("catalog")
                .about("Print the standard objects for a flag set")
                .arg(path_arg("flags", "JSON feature flags"))
                .arg(path_arg("definitions", "YAML standard catalog"))
                .arg(flag_arg("json", "Output as JSON")),
        )
        .subcommand(
            Command::new("validate")
                .about("Check a YAML standard catalog")
                .arg(path_arg("definitions", "YAML standard catalog").required(true)),
        )
}

fn sync_args(args: &ArgMatches) -> Result<SyncArgs> {
    let mut config = load_config(args.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    if args.get_flag("dry-run") {
        config = config.with_dry_run(true);
    }
    if args.get_flag("field-migrations") {
        config = config.with_field_migrations(true);
    }
    Ok(SyncArgs {
        state: args
            .get_one::<PathBuf>("state")
            .cloned()
            .context("--state is required")?,
        workspace_id: args
            .get_one::<WorkspaceId>("workspace")
            .copied()
            .context("--workspace is required")?,
        flags: args.get_one::<PathBuf>("flags").cloned(),
        definitions: args.get_one::<PathBuf>("definitions").cloned(),
        config,
        json: args.get_flag("json"),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("sync", args)) => {
            let args = sync_args(args)?;
            init_tracing(&args.config)?;
            let report = sync(&args).await?;
            println!("{}", render_report(&report, args.json)?);
        }
        Some(("catalog", args)) => {
            init_tracing(&SyncConfig::default())?;
            let definitions =
                load_definitions(args.get_one::<PathBuf>("definitions").map(PathBuf::as_path))?;
            let flags = load_flags(args.get_one::<PathBuf>("flags").map(PathBuf::as_path))?;
            print!("{}", catalog(&definitions, &flags, args.get_flag("json"))?);
        }
        Some(("validate", args)) => {
            let path = args
                .get_one::<PathBuf>("definitions")
                .context("--definitions is required")?;
            println!("{}", validate(path)?);
        }
        _ => {}
    }
    Ok(())
}
