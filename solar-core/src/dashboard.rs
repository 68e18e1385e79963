//! Admin dashboard: guarded fetch of contact submissions plus the summary
//! counters shown above the table.

use chrono::{DateTime, Datelike, Duration, TimeZone};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::calculations::common::round_dp;
use crate::models::{AdminIdentity, ContactSubmission};
use crate::services::ContactService;
use crate::session::{GateError, Guarded, RouteGuard, SessionGate};

const WEEK_DAYS: i64 = 7;

/// Submission counts relative to a reference instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionStats {
    pub total: usize,
    /// Same calendar day as `now`, in `now`'s time zone.
    pub today: usize,
    /// Same calendar month and year as `now`.
    pub this_month: usize,
    /// Strictly after `now - 7 days`.
    pub last_seven_days: usize,
    /// `last_seven_days / 7`, two decimals.
    pub average_per_day: Decimal,
}

impl SubmissionStats {
    /// Submissions without a usable timestamp count towards `total` only.
    pub fn compute<Tz: TimeZone>(submissions: &[ContactSubmission], now: &DateTime<Tz>) -> Self {
        let zone = now.timezone();
        let today = now.date_naive();
        let week_ago = now.clone() - Duration::days(WEEK_DAYS);

        let mut stats = Self {
            total: submissions.len(),
            today: 0,
            this_month: 0,
            last_seven_days: 0,
            average_per_day: Decimal::ZERO,
        };

        for submitted in submissions.iter().filter_map(|s| s.submitted_at) {
            let local = submitted.with_timezone(&zone);
            let day = local.date_naive();

            if day == today {
                stats.today += 1;
            }
            if day.year() == today.year() && day.month() == today.month() {
                stats.this_month += 1;
            }
            if local > week_ago {
                stats.last_seven_days += 1;
            }
        }

        stats.average_per_day = round_dp(
            Decimal::from(stats.last_seven_days) / Decimal::from(WEEK_DAYS),
            2,
        );
        stats
    }
}

/// Everything the dashboard renders for a signed-in admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub admin: AdminIdentity,
    pub submissions: Vec<ContactSubmission>,
    pub stats: SubmissionStats,
}

impl DashboardView {
    /// Consults the route guard, then fetches submissions with the current
    /// session.
    ///
    /// Loading and redirect decisions pass straight through without a
    /// network call.
    ///
    /// # Errors
    /// * [`GateError::SessionExpired`]: the backend rejected the session;
    ///   the gate is now unauthenticated.
    /// * [`GateError::FetchFailed`]: anything else went wrong; retrying
    ///   is reasonable.
    pub async fn build<Tz: TimeZone>(
        gate: &SessionGate,
        contacts: &dyn ContactService,
        now: &DateTime<Tz>,
    ) -> Result<Guarded<Self>, GateError> {
        let state = gate.state();
        let admin = match RouteGuard::render(&state, |session| session.identity.clone()) {
            Guarded::Rendered(admin) => admin,
            Guarded::Loading => return Ok(Guarded::Loading),
            Guarded::Redirect(path) => return Ok(Guarded::Redirect(path)),
        };

        let submissions = gate
            .run_privileged(|session| async move { contacts.list_submissions(&session).await })
            .await?;
        let stats = SubmissionStats::compute(&submissions, now);
        debug!(total = stats.total, today = stats.today, "dashboard loaded");

        Ok(Guarded::Rendered(Self {
            admin,
            submissions,
            stats,
        }))
    }
}
