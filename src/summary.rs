//! End-of-run summary table.

use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use stream_engine::RunReport;

/// Render one row per stream plus a totals row.
pub fn format_summary(report: &RunReport) -> String {
    let mut output = String::new();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "Stream", "Rows", "Commits", "Duration", "Rows/sec", "Ended by", "Status",
    ]);

    let mut wall_clock = 0.0f64;
    for stream in &report.streams {
        let secs = stream.elapsed.as_secs_f64();
        wall_clock = wall_clock.max(secs);

        let status_cell = if stream.succeeded() {
            Cell::new("OK").fg(Color::Green)
        } else {
            Cell::new("FAILED").fg(Color::Red)
        };

        table.add_row(vec![
            Cell::new(&stream.name),
            Cell::new(format_number(stream.rows_written)),
            Cell::new(format_number(stream.commits)),
            Cell::new(format_duration(secs)),
            Cell::new(format!("{:.1}", stream.rows_per_second())),
            Cell::new(stream.reason),
            status_cell,
        ]);
    }

    let aggregate = if wall_clock > 0.0 {
        report.total_rows() as f64 / wall_clock
    } else {
        0.0
    };
    let succeeded = report.streams.iter().filter(|s| s.succeeded()).count();
    table.add_row(vec![
        Cell::new("TOTAL").fg(Color::Cyan),
        Cell::new(format_number(report.total_rows())),
        Cell::new(format_number(report.total_commits())),
        Cell::new(format!("{}*", format_duration(wall_clock))),
        Cell::new(format!("{aggregate:.1}")),
        Cell::new(""),
        Cell::new(format!("{}/{}", succeeded, report.streams.len())),
    ]);

    output.push_str(&table.to_string());
    output.push_str("\n* Longest stream (streams run in parallel)\n");

    let failed: Vec<_> = report.failed().collect();
    if !failed.is_empty() {
        output.push_str("\nFailed streams:\n");
        for stream in failed {
            output.push_str(&format!(
                "  {}: {}\n",
                stream.name,
                stream.error.as_deref().unwrap_or("unknown error")
            ));
        }
    }

    output
}

fn format_duration(secs: f64) -> String {
    if secs < 60.0 {
        format!("{secs:.1}s")
    } else if secs < 3600.0 {
        let mins = (secs / 60.0).floor();
        format!("{}m {:02.0}s", mins as u64, secs - mins * 60.0)
    } else {
        let hours = (secs / 3600.0).floor();
        let mins = ((secs - hours * 3600.0) / 60.0).floor();
        format!("{}h {:02}m", hours as u64, mins as u64)
    }
}

/// Thousands separators.
fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}
