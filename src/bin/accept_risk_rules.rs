use anyhow::Context;
use clap::Parser;
use sc_report::{
    cli::CommonArgs,
    connect,
    reconcile::{fetch_rules, reconcile},
    report::write_report,
    Config, ReportOptions, SecurityCenter,
};

#[derive(Parser, Debug)]
#[command(
    name = "accept_risk_rules",
    version,
    about = "Check which SecurityCenter accept risk rules still suppress a live finding"
)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long, help = "Skip the per-plugin severity lookup")]
    no_severity: bool,
    #[arg(long, help = "Leave the repository name out of the report")]
    no_repo_name: bool,
    #[arg(long, default_value = "AcceptRiskRules", help = "XML element name for each row")]
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
    let result = report(cli, &config, &sc);
    sc.logout();
    result
}

fn report(cli: &Cli, config: &Config, sc: &SecurityCenter) -> anyhow::Result<()> {
    let rules = fetch_rules(sc).context("failed to get accept risk rules")?;
    if rules.is_empty() {
        log::info!("no accept risk rules found");
        return Ok(());
    }
    log::info!("{} accept risk rule(s) found", rules.len());
    let options = ReportOptions {
        include_severity: !cli.no_severity,
        include_repository_name: !cli.no_repo_name,
    };
    let records = reconcile(&rules, sc, &options).context("failed to reconcile rules")?;
    let path = write_report(
        &config.report_dir()?,
        cli.common.stem("accept_risk_rules"),
        &records,
        cli.common.format(),
        &cli.element,
    )?;
    log::info!("{} row(s) written to {}", records.len(), path.display());
    Ok(())
}
