mod commands;
mod terminal;

use commands::{CommandLine, Commands, discover, scan};
use probr_common::config::{Config, ScanLimits};
use probr_common::signal::AbortSignal;
use terminal::{input, logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();
    let cfg: Config = commands.config();

    logging::init_logging(cfg.quiet);
    print::banner(cfg.no_banner, cfg.quiet);

    let abort = AbortSignal::new();
    input::watch_ctrl_c(abort.clone());

    let result = match &commands.command {
        Commands::Scan(args) => {
            let limits: ScanLimits = commands.limits(&args.probe)?;
            scan::scan(args, &cfg, &limits, &abort).await
        }
        Commands::Discover(args) => {
            let limits: ScanLimits = commands.limits(&args.probe)?;
            discover::discover(args, &cfg, &limits, &abort).await
        }
    };

    if cfg.quiet == 0 {
        print::end_of_program();
    }
    result
}
