use colored::Colorize;

use tidysweep::utils::{display_path, format_size};
use tidysweep::{CleanReport, ScanSnapshot, SkipReason};

pub fn print_banner() {
    println!(
        "{}",
        format!("tidysweep v{}", env!("CARGO_PKG_VERSION"))
            .bold()
            .cyan()
    );
    println!();
}

pub fn print_progress(msg: &str) {
    eprintln!("  {}", msg.dimmed());
}

pub fn print_snapshot(snapshot: &ScanSnapshot) {
    for total in snapshot.by_category() {
        println!("{}", format!("=== {} ===", total.category).bold().white());
        for item in snapshot.items.iter().filter(|i| i.category == total.category) {
            println!(
                "  {}  {}",
                display_path(&item.path).dimmed(),
                format_size(item.size_bytes).yellow()
            );
        }
        println!(
            "  {} {}",
            format!("{} total:", total.category).bold(),
            format_size(total.bytes).green()
        );
        println!();
    }
}

pub fn print_summary(snapshot: &ScanSnapshot, disk: Option<tidysweep::disk_info::DiskInfo>) {
    println!("{}", "=== Summary ===".bold().white());
    for total in snapshot.by_category() {
        println!(
            "  {:<30} {}",
            format!("{} ({} items)", total.category, total.items),
            format_size(total.bytes).green()
        );
    }
    println!("  {}", "─".repeat(45).dimmed());
    println!(
        "  {:<30} {}",
        "Total reclaimable:".bold(),
        format_size(snapshot.total_bytes()).green().bold()
    );

    let score = snapshot.health_score();
    let score_text = format!("{score}%");
    let score_text = match score {
        0..=40 => score_text.green(),
        41..=80 => score_text.yellow(),
        _ => score_text.red(),
    };
    println!("  {:<30} {}", "Junk meter:".bold(), score_text.bold());

    if let Some(info) = disk {
        println!(
            "  {:<30} {} free of {} ({:.1}% of used space reclaimable)",
            "Disk:".bold(),
            format_size(info.available),
            format_size(info.total),
            info.share_of_used(snapshot.total_bytes()) * 100.0
        );
    }
    if snapshot.cancelled {
        print_warning("scan was cancelled; results are incomplete");
    }
    println!();
}

pub fn print_warning(msg: &str) {
    println!("{} {}", "Warning:".red().bold(), msg.red());
}

pub fn print_info(msg: &str) {
    println!("{} {}", "Info:".cyan().bold(), msg);
}

pub fn print_dry_run_footer() {
    println!(
        "{}",
        "This was a dry run. Run `tidysweep clean --confirm` to delete."
            .yellow()
            .bold()
    );
}

pub fn print_no_confirm_warning() {
    println!(
        "{}",
        "No --confirm flag provided. Running as dry-run scan."
            .yellow()
            .bold()
    );
    println!();
}

pub fn print_clean_report(report: &CleanReport) {
    for (path, reason) in report.skipped() {
        let why = match reason {
            SkipReason::Whitelisted => "protected".to_string(),
            SkipReason::PermissionDenied => "in use".to_string(),
            SkipReason::Vanished => "already gone".to_string(),
            SkipReason::TrashFailed(e) | SkipReason::DeleteFailed(e) => e.clone(),
        };
        println!(
            "  {} {}  {}",
            "Skipped".red().bold(),
            display_path(path).dimmed(),
            why.red()
        );
    }
    println!(
        "{} {}",
        "Cleaned!".green().bold(),
        format!(
            "{} items, {} freed.",
            report.removed_count,
            format_size(report.removed_bytes)
        )
        .green()
    );
    if report.trash_emptied == Some(false) {
        print_warning("the trash could not be emptied");
    }
}
