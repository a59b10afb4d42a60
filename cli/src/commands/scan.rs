use colored::*;
use tracing::warn;

use probr_common::config::{Config, ScanLimits};
use probr_common::network::ports::{self, PortSet};
use probr_common::network::report::ScanReport;
use probr_common::network::target::{self, Target};
use probr_common::signal::AbortSignal;
use probr_common::success;
use probr_core::scanner::{ScanOutcome, ScanRequest, ScanSummary, Scanner};

use crate::commands::ScanArgs;
use crate::mprint;
use crate::terminal::format::{self, Detail};
use crate::terminal::input::InputHandle;
use crate::terminal::{colors, print, spinner};

pub async fn scan(
    args: &ScanArgs,
    cfg: &Config,
    limits: &ScanLimits,
    abort: &AbortSignal,
) -> anyhow::Result<()> {
    let targets: Vec<Target> = target::parse_targets(&args.targets.join(" "));
    let port_set: PortSet = ports::parse_ports(&args.ports);

    let request = ScanRequest::new(targets, args.ports.as_str())
        .with_limits(limits)
        .confirmed(args.yes);

    print::header("starting scanner", cfg.quiet);
    if cfg.quiet == 0 {
        print::aligned_line("Targets", request.targets.len().to_string());
        print::aligned_line("Ports", port_set.len().to_string());
        print::aligned_line("Timeout", format::secs(limits.timeout));
        print::aligned_line("Parallel", limits.max_concurrency.to_string());
        print::authorized_use_notice();
    }

    let progress = spinner::Progress::start(request.targets.len() * port_set.len(), "open");
    let mut scanner = Scanner::new(limits).with_progress(progress.callback());

    let outcome: ScanOutcome = {
        let _input = InputHandle::start(abort.clone(), cfg.disable_input);
        let _entered = progress.enter();
        scanner.run_scan(request, abort).await?
    };

    match outcome {
        ScanOutcome::ConfirmationRequired {
            port_count,
            threshold,
        } => {
            confirmation_notice(port_count, threshold);
            Ok(())
        }
        ScanOutcome::Completed(summary) => {
            scan_ends(&summary, cfg);
            Ok(())
        }
    }
}

fn confirmation_notice(port_count: usize, threshold: usize) {
    warn!(
        "Refusing to probe {} ports per host without confirmation (threshold {})",
        port_count.to_string().bold(),
        threshold
    );
    warn!("Re-run with --yes to scan anyway, or narrow the range with -p");
}

fn scan_ends(summary: &ScanSummary, cfg: &Config) {
    if summary.aborted {
        warn!("Scan was aborted, results are partial");
    }

    if cfg.quiet > 0 {
        mprint!();
    }

    print::header("scan results", cfg.quiet);
    print_reports(&summary.reports, cfg);
    print_summary(summary, cfg);
}

fn print_reports(reports: &[ScanReport], cfg: &Config) {
    for (idx, report) in reports.iter().enumerate() {
        match cfg.quiet {
            0 | 1 => print_report_tree(report, idx),
            _ => print_report_line(report),
        }
        if !print::is_compact(cfg.quiet) && idx + 1 != reports.len() {
            mprint!();
        }
    }
}

fn print_report_tree(report: &ScanReport, idx: usize) {
    print::tree_head(idx, report.target.name());

    let mut details: Vec<Detail> = Vec::new();
    if let Some(addr) = report.target.addr() {
        details.push(format::ip_to_detail(addr));
    }
    details.push(format::ports_to_detail(&report.open_ports));
    details.push(("Probes".to_string(), report.probe_count.to_string().normal()));
    details.push(format::duration_to_detail(report.elapsed));
    if let Some(error) = &report.error {
        details.push(format::error_to_detail(error));
    }

    print::as_tree_one_level(&details);
}

fn print_report_line(report: &ScanReport) {
    if report.open_ports.is_empty() {
        return;
    }
    let (_, ports) = format::ports_to_detail(&report.open_ports);
    mprint!(&format!("{} {}", report.target.name().color(colors::PRIMARY), ports));
}

fn print_summary(summary: &ScanSummary, cfg: &Config) {
    let open: ColoredString = format!("{} open ports", summary.open_port_count()).bold().green();
    let hosts: ColoredString = format!("{} targets", summary.reports.len()).bold();
    let total_time: ColoredString = format::secs(summary.elapsed).bold().yellow();
    let output: String = format!("Scan Complete: {open} across {hosts} in {total_time}")
        .color(colors::TEXT_DEFAULT)
        .to_string();

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output);
        }
        _ => success!("{}", output),
    }

    if summary.failed_count() > 0 {
        warn!("{} target(s) could not be scanned completely", summary.failed_count());
    }
}
