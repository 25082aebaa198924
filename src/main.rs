use clap::Parser;
use page_engine::cli::commands::{cmd_bindings, cmd_fetch, cmd_parse, cmd_validate};
use page_engine::cli::config::{load_config, resolve_permissions, Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config_file.as_deref());

    // Resolve permission tokens: CLI > config file
    let permissions = resolve_permissions(cli.permissions.as_deref(), &config);

    match cli.command {
        Commands::Validate {
            config: config_path,
            format,
        } => {
            let valid = cmd_validate(&config_path, &format, cli.verbose)?;
            if !valid {
                std::process::exit(1);
            }
        }
        Commands::Parse {
            config: config_path,
            load,
            format,
        } => {
            let ok = cmd_parse(
                &config_path,
                &permissions,
                load,
                &format,
                &config,
                cli.verbose,
            )?;
            if !ok {
                std::process::exit(1);
            }
        }
        Commands::Bindings {
            config: config_path,
        } => {
            cmd_bindings(&config_path)?;
        }
        Commands::Fetch {
            page_code,
            endpoint,
        } => {
            let ok = cmd_fetch(
                &page_code,
                endpoint.as_deref(),
                &permissions,
                &config,
                cli.verbose,
            )?;
            if !ok {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
