use chrono::{DateTime, TimeDelta, Utc};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ContentArrangement, Table, TableComponent,
    modifiers::UTF8_SOLID_INNER_BORDERS, presets::UTF8_FULL,
};
use rust_decimal::Decimal;

use crate::core::AgentStatus;
use crate::utils::EventTime;

pub(super) fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut result = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Token count with K/M suffixes and one decimal (e.g. `1.5K`, `2.3M`)
pub(crate) fn format_tokens(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// USD with four decimals, e.g. `$0.1234`
pub(crate) fn format_cost(cost: Decimal) -> String {
    format!("${:.4}", cost.round_dp(4))
}

/// Relative age such as `5s ago`, `10m ago`, `2h ago` or `3d ago`
pub(crate) fn format_time_ago(ts: EventTime, now: DateTime<Utc>) -> String {
    let secs = ts.elapsed_since(now).num_seconds().max(0);
    if secs < 60 {
        format!("{secs}s ago")
    } else if secs < 3_600 {
        format!("{}m ago", secs / 60)
    } else if secs < 86_400 {
        format!("{}h ago", secs / 3_600)
    } else {
        format!("{}d ago", secs / 86_400)
    }
}

/// Two most significant units: `5d 3h`, `2h 15m`, `45m 30s` or `12s`
pub(crate) fn format_duration(td: TimeDelta) -> String {
    let total = td.num_seconds().max(0);
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

pub(super) fn status_style(status: AgentStatus) -> (Option<Color>, bool) {
    match status {
        AgentStatus::Active => (Some(Color::Green), true),
        AgentStatus::WaitingForUser => (Some(Color::Yellow), true),
        AgentStatus::Idle => (Some(Color::Blue), false),
        AgentStatus::Stopped => (Some(Color::DarkGrey), false),
    }
}

pub(super) fn styled_cell(text: &str, color: Option<Color>, bold: bool) -> Cell {
    let mut cell = Cell::new(text);
    if let Some(c) = color {
        cell = cell.fg(c);
    }
    if bold {
        cell = cell.add_attribute(Attribute::Bold);
    }
    cell
}

pub(super) fn header_cell(text: &str, use_color: bool) -> Cell {
    let mut cell = Cell::new(text).add_attribute(Attribute::Bold);
    if use_color {
        cell = cell.fg(Color::Cyan);
    }
    cell
}

/// Replace the double-line header separator (╞═╪═╡) with single-line (├─┼─┤)
fn normalize_header_separator(table: &mut Table) {
    table.set_style(TableComponent::HeaderLines, '─');
    table.set_style(TableComponent::LeftHeaderIntersection, '├');
    table.set_style(TableComponent::MiddleHeaderIntersections, '┼');
    table.set_style(TableComponent::RightHeaderIntersection, '┤');
}

/// Create a table with the standard preset, inner borders, and normalized header separator.
pub(super) fn create_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    normalize_header_separator(&mut table);
    table
}

pub(super) fn right_cell(text: &str, color: Option<Color>, bold: bool) -> Cell {
    let mut cell = Cell::new(text).set_alignment(CellAlignment::Right);
    if let Some(c) = color {
        cell = cell.fg(c);
    }
    if bold {
        cell = cell.add_attribute(Attribute::Bold);
    }
    cell
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        "2026-10-18T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn format_number_with_commas() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn format_tokens_units() {
        assert_eq!(format_tokens(0), "0");
        assert_eq!(format_tokens(999), "999");
        assert_eq!(format_tokens(1_000), "1.0K");
        assert_eq!(format_tokens(1_500), "1.5K");
        assert_eq!(format_tokens(999_999), "1000.0K");
        assert_eq!(format_tokens(1_000_000), "1.0M");
        assert_eq!(format_tokens(2_345_678), "2.3M");
    }

    #[test]
    fn format_cost_four_places() {
        let d = |s: &str| s.parse::<Decimal>().unwrap();
        assert_eq!(format_cost(Decimal::ZERO), "$0.0000");
        assert_eq!(format_cost(d("0.123456")), "$0.1235");
        assert_eq!(format_cost(d("12.5")), "$12.5000");
    }

    #[test]
    fn format_time_ago_units() {
        let ago = |secs: i64| EventTime::from_utc(now() - TimeDelta::seconds(secs));
        assert_eq!(format_time_ago(ago(5), now()), "5s ago");
        assert_eq!(format_time_ago(ago(59), now()), "59s ago");
        assert_eq!(format_time_ago(ago(60), now()), "1m ago");
        assert_eq!(format_time_ago(ago(3_599), now()), "59m ago");
        assert_eq!(format_time_ago(ago(7_200), now()), "2h ago");
        assert_eq!(format_time_ago(ago(3 * 86_400 + 10), now()), "3d ago");
        assert_eq!(format_time_ago(ago(-30), now()), "0s ago");
    }

    #[test]
    fn format_duration_units() {
        assert_eq!(format_duration(TimeDelta::seconds(12)), "12s");
        assert_eq!(format_duration(TimeDelta::seconds(45 * 60 + 30)), "45m 30s");
        assert_eq!(format_duration(TimeDelta::seconds(2 * 3600 + 15 * 60)), "2h 15m");
        assert_eq!(format_duration(TimeDelta::days(5) + TimeDelta::hours(3)), "5d 3h");
        assert_eq!(format_duration(TimeDelta::seconds(-5)), "0s");
    }
}
