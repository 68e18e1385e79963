//! Plain-text output for the terminal. Every function returns the text so
//! tests can check it; `main` does the printing.

use std::fmt::Write;

use solar_core::{DashboardView, RegionTariffTable, SessionState};

use crate::app::{EstimateReport, MapReport};
use crate::utils::{format_currency, opt_decimal_display};

pub fn render_estimate(report: &EstimateReport) -> String {
    let s = &report.summary;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Estimate for {} (bill {}/month, roof {} sq ft){}",
        report.region,
        format_currency(report.input.monthly_bill_amount),
        report.input.available_roof_area,
        if report.clamped { " [clamped]" } else { "" }
    );
    let rows = [
        ("System size", format!("{} kW", s.system_size_kw)),
        ("Gross cost", format_currency(s.gross_system_cost)),
        ("Subsidy", format_currency(s.subsidy_amount)),
        ("Net cost", format_currency(s.net_cost)),
        ("Monthly savings", format_currency(s.monthly_savings)),
        ("Annual savings", format_currency(s.annual_savings)),
        ("Payback", format!("{} years", s.payback_period_years)),
        (
            "25-year return",
            opt_decimal_display(s.twenty_five_year_return_pct, "%"),
        ),
        ("Lifetime savings", format_currency(s.total_lifetime_savings)),
        ("Net lifetime", format_currency(s.net_lifetime_savings)),
        ("CO2 avoided", format!("{} t", s.co2_reduction_tons)),
    ];
    for (label, value) in rows {
        let _ = writeln!(out, "  {label:<18}{value}");
    }
    out
}

pub fn render_regions(tariffs: &RegionTariffTable) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<14}{:<16}{:>10}{:>14}", "ID", "Region", "₹/kWh", "Subsidy cap");
    for tariff in tariffs.iter() {
        let _ = writeln!(
            out,
            "{:<14}{:<16}{:>10}{:>14}",
            tariff.region_id,
            tariff.display_name,
            tariff.unit_rate,
            format_currency(tariff.base_subsidy_ceiling)
        );
    }
    out
}

pub fn render_map(report: &MapReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Solar potential by {}", report.mode);
    for marker in &report.markers {
        let _ = writeln!(
            out,
            "  {:<14}{:>9.1}  {:<10} {} r={:.1}",
            marker.city,
            marker.value,
            marker.band.label(),
            marker.color,
            marker.radius
        );
    }

    let summary = &report.summary;
    let _ = writeln!(
        out,
        "{} cities, average {:.1} kWh/m²/day, {} installations, best: {}",
        summary.city_count,
        summary.average_irradiance,
        summary.total_installations,
        summary.best_city.as_deref().unwrap_or("—")
    );
    out
}

pub fn render_dashboard(view: &DashboardView) -> String {
    let mut out = String::new();
    let stats = &view.stats;

    let _ = writeln!(out, "Signed in as {}", view.admin.email);
    let _ = writeln!(
        out,
        "Total {} | Today {} | This month {} | Last 7 days {} ({} /day)",
        stats.total, stats.today, stats.this_month, stats.last_seven_days, stats.average_per_day
    );

    if view.submissions.is_empty() {
        let _ = writeln!(out, "No contact submissions yet.");
        return out;
    }
    for submission in &view.submissions {
        let when = submission
            .submitted_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "—".to_string());
        let _ = writeln!(
            out,
            "- {when}  {} <{}> {}",
            submission.name, submission.email, submission.phone
        );
        if let Some(subject) = &submission.subject {
            let _ = writeln!(out, "    {subject}");
        }
        let _ = writeln!(out, "    {}", submission.message);
    }
    out
}

pub fn render_state(state: &SessionState) -> String {
    match state.identity() {
        Some(identity) => format!("{} as {}", state.label(), identity.email),
        None => state.label().to_string(),
    }
}
