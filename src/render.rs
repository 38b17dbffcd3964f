use crate::report::{format_bytes, round2, DiskSnapshot, Issue, LoadSnapshot, Report};
use std::fmt::Write;

const DASHBOARD_CSS: &str = include_str!("../assets/dashboard.css");

/// Plaintext status block: "All is Normal" on an empty issue list, otherwise
/// "Warning:" followed by one "- " line per issue in evaluation order.
pub fn render_plain(issues: &[Issue]) -> String {
    if issues.is_empty() {
        return "All is Normal\n".to_string();
    }

    let mut out = String::from("Warning:\n");
    for issue in issues {
        let _ = writeln!(out, "- {issue}");
    }
    out
}

/// HTML dashboard over an already collected and evaluated report. Pure with
/// respect to its inputs; never re-runs collection or evaluation.
pub fn render_html(report: &Report, issues: &[Issue], status_code: u16) -> String {
    let mut body = String::new();

    push_status_section(&mut body, report, issues);
    push_server_info_section(&mut body, report);
    push_uptime_section(&mut body, report);
    push_cpu_section(&mut body, report);
    push_memory_section(&mut body, report);
    push_disks_section(&mut body, report);
    push_database_section(&mut body, report);
    push_http_section(&mut body, status_code);

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n\
         <meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>Server Info</title>\n\
         <style>{DASHBOARD_CSS}</style>\n\
         </head>\n<body>\n<main>\n{body}</main>\n\
         <footer>screend {}</footer>\n</body>\n</html>\n",
        report.app_version
    )
}

fn push_status_section(out: &mut String, report: &Report, issues: &[Issue]) {
    out.push_str("<section aria-label=\"System Status\">\n<h2>Status</h2>\n");
    if issues.is_empty() {
        out.push_str(
            "<p class=\"info-item success\"><span class=\"info-label\">All is Normal</span></p>\n",
        );
    } else {
        out.push_str("<div class=\"info-grid\">\n");
        for issue in issues {
            let _ = writeln!(out, "<div class=\"warning\">{}</div>", escape(issue.text()));
        }
        out.push_str("</div>\n");
    }
    let _ = writeln!(
        out,
        "<p class=\"status-time\">Last checked: {}</p>",
        escape(&report.checked_at)
    );
    out.push_str("</section>\n");
}

fn push_server_info_section(out: &mut String, report: &Report) {
    out.push_str("<section aria-label=\"Server Information\">\n<h2>Server Info</h2>\n<div class=\"info-grid\">\n");
    info_item(out, "Version:", report.app_version);
    info_item(out, "Hostname:", report.host_name.as_deref().unwrap_or("unknown"));
    info_item(out, "OS:", report.os_version.as_deref().unwrap_or("unknown"));
    info_item(out, "Kernel:", report.kernel_version.as_deref().unwrap_or("unknown"));
    out.push_str("</div>\n</section>\n");
}

fn push_uptime_section(out: &mut String, report: &Report) {
    let uptime = &report.uptime;
    let _ = writeln!(
        out,
        "<section aria-label=\"System Uptime\">\n<h2>Uptime</h2>\n\
         <p class=\"info-item\"><span class=\"info-label\">Active Time:</span>\
         <span>{}d {}h {}m</span></p>\n</section>",
        uptime.days(),
        uptime.hours(),
        uptime.minutes()
    );
}

fn push_cpu_section(out: &mut String, report: &Report) {
    // Hosts without load averages get no CPU section at all.
    let Some(load) = &report.load else {
        return;
    };

    out.push_str("<section aria-label=\"CPU Usage\">\n<h2>CPU Usage</h2>\n<div class=\"info-grid\">\n");
    let windows = [
        ("1 min:", load.one),
        ("5 min:", load.five),
        ("15 min:", load.fifteen),
    ];
    for (label, value) in windows {
        let percent = round2(LoadSnapshot::percent(value, report.cpu_cores));
        info_item(out, label, &format!("{percent}%"));
        progress_bar(out, percent, 60.0, 80.0);
    }
    out.push_str("</div>\n</section>\n");
}

fn push_memory_section(out: &mut String, report: &Report) {
    let mem = &report.memory;
    out.push_str("<section aria-label=\"Memory Status\">\n<h2>Memory</h2>\n<div class=\"info-grid\">\n");
    info_item(out, "Total:", &format_bytes(mem.total_kb * 1024));
    info_item(out, "Used:", &format_bytes(mem.used_kb() * 1024));
    info_item(out, "Free:", &format_bytes(mem.available_kb * 1024));
    match mem.used_percent() {
        Some(percent) => {
            let percent = round2(percent);
            info_item(out, "Used Percent:", &format!("{percent}%"));
            progress_bar(out, percent, 60.0, 80.0);
        }
        None => info_item(out, "Used Percent:", "N/A"),
    }
    out.push_str("</div>\n</section>\n");
}

fn push_disks_section(out: &mut String, report: &Report) {
    out.push_str("<section aria-label=\"Disk Space\">\n<h2>Disk Usage</h2>\n<div class=\"info-grid\">\n");
    for disk in [&report.root_disk, &report.home_disk, &report.tmp_disk] {
        push_disk(out, disk);
    }
    out.push_str("</div>\n</section>\n");
}

fn push_disk(out: &mut String, disk: &DiskSnapshot) {
    let _ = writeln!(
        out,
        "<div class=\"info-item\"><span class=\"info-label\">{}:</span></div>",
        escape(&disk.path)
    );
    out.push_str("<div class=\"info-grid\" style=\"padding-left: 15px;\">\n");
    match disk.used_percent() {
        Some(percent) => {
            info_item(out, "Total:", &format_bytes(disk.total_bytes));
            info_item(out, "Used:", &format_bytes(disk.used_bytes()));
            info_item(out, "Free:", &format_bytes(disk.free_bytes));
            progress_bar(out, round2(percent), 80.0, 90.0);
        }
        None => info_item(out, "Total:", "N/A"),
    }
    out.push_str("</div>\n");
}

fn push_database_section(out: &mut String, report: &Report) {
    let db = &report.database;
    out.push_str("<section aria-label=\"MySQL Status\">\n<h2>MySQL Status</h2>\n<div class=\"info-grid\">\n");
    if db.connected {
        info_item(out, "Status:", "Connected");
        if let Some(version) = &db.server_version {
            info_item(out, "Version:", version);
        }
    } else {
        let _ = writeln!(
            out,
            "<div class=\"info-item\"><span class=\"info-label\">Status:</span>\
             <span class=\"alert\">Disconnected</span></div>"
        );
    }
    out.push_str("</div>\n</section>\n");
}

fn push_http_section(out: &mut String, status_code: u16) {
    let class = if status_code == 200 { "" } else { "alert" };
    let _ = writeln!(
        out,
        "<section aria-label=\"HTTP Status\">\n<h2>HTTP Status</h2>\n\
         <p class=\"info-item\"><span class=\"info-label\">Status Code:</span>\
         <span class=\"{class}\">{status_code}</span></p>\n</section>"
    );
}

fn info_item(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(
        out,
        "<div class=\"info-item\"><span class=\"info-label\">{}</span><span>{}</span></div>",
        escape(label),
        escape(value)
    );
}

/// Bounded-fill progress indicator: width is clamped to 100%, color shifts
/// at the warn/critical display thresholds.
fn progress_bar(out: &mut String, percent: f64, warn_at: f64, critical_at: f64) {
    let width = percent.clamp(0.0, 100.0);
    let class = if percent > critical_at {
        " critical"
    } else if percent > warn_at {
        " warning-fill"
    } else {
        ""
    };
    let _ = writeln!(
        out,
        "<div class=\"progress-bar\"><div class=\"progress-fill{class}\" style=\"width: {width}%\"></div></div>"
    );
}

fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
