use anyhow::Context;
use clap::Parser;
use sc_report::{cli::CommonArgs, connect, report::write_report, users::fetch_users, Config};

#[derive(Parser, Debug)]
#[command(name = "list_users", version, about = "List SecurityCenter user accounts")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long, default_value = "Users", help = "XML element name for each row")]
    element: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.common.init_logging();
    log::info!("sc_report {}", env!("CARGO_PKG_VERSION"));
    let result = run(&cli);
    match &result {
        Ok(()) => log::info!("report complete"),
        Err(e) => log::error!("exiting due to an error: {e:#}"),
    }
    result
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = Config::load(&cli.common.config).context("loading config")?;
    let sc = connect(&config).context("failed to connect to SecurityCenter")?;
    let users = fetch_users(&sc).context("failed to get list of users");
    sc.logout();
    let users = users?;
    if users.is_empty() {
        log::info!("no users found");
        return Ok(());
    }
    let path = write_report(
        &config.report_dir()?,
        cli.common.stem("list_users"),
        &users,
        cli.common.format(),
        &cli.element,
    )?;
    log::info!("{} user(s) written to {}", users.len(), path.display());
    Ok(())
}
