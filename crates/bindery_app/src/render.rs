use bindery_core::{
    AnalyticsSnapshot, AppViewModel, ClientPreferences, JobAction, JobRowView, Notification,
    NotificationLevel,
};
use bindery_engine::ClientSettings;

pub fn notification_line(notification: &Notification) -> String {
    let tag = match notification.level {
        NotificationLevel::Info => "info",
        NotificationLevel::Success => "ok",
        NotificationLevel::Error => "error",
    };
    format!("[{tag}] {}", notification.text)
}

/// Job list with totals, newest first.
pub fn job_lines(view: &AppViewModel, client: &ClientSettings) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(name) = &view.display_name {
        lines.push(format!("Signed in as {name}"));
    }
    lines.push(format!(
        "{} job(s): {} completed, {} pending{}",
        view.stats.total,
        view.stats.completed,
        view.stats.pending,
        if view.auto_refresh {
            " (auto-refresh on)"
        } else {
            ""
        }
    ));
    if view.uploading || view.queued_batches > 0 {
        lines.push(format!("Uploading; {} batch(es) waiting", view.queued_batches));
    }

    if view.jobs.is_empty() {
        lines.push("No jobs yet.".to_string());
        return lines;
    }

    for row in &view.jobs {
        lines.push(row_line(row));
        if let Some(error) = &row.error {
            lines.push(format!("    error: {error}"));
        }
        if let Some(url) = &row.download_url {
            lines.push(format!("    download: {}", client.resolve(url)));
        }
        let actions = action_list(&row.actions);
        if !actions.is_empty() {
            lines.push(format!("    actions: {actions}"));
        }
    }
    lines
}

fn row_line(row: &JobRowView) -> String {
    format!(
        "{:<36}  {:<10}  {:>9}  {:<6} {:>7}  {}  {}",
        row.job_id,
        row.status.label(),
        row.size,
        row.page_size.as_str(),
        format_margin(row.margin_mm),
        row.created_at,
        row.filename
    )
}

fn action_list(actions: &[JobAction]) -> String {
    actions
        .iter()
        .map(|action| action.label())
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_margin(margin_mm: f64) -> String {
    if margin_mm.fract() == 0.0 {
        format!("{margin_mm:.0} mm")
    } else {
        format!("{margin_mm:.1} mm")
    }
}

pub fn preference_lines(prefs: &ClientPreferences) -> Vec<String> {
    vec![
        format!("page size:        {}", prefs.page_size.as_str()),
        format!("margin:           {}", format_margin(prefs.margin_mm)),
        format!("force regenerate: {}", prefs.force_regenerate),
        format!("locale:           {}", prefs.locale),
    ]
}

pub fn analytics_lines(analytics: Option<&AnalyticsSnapshot>) -> Vec<String> {
    let Some(analytics) = analytics else {
        return vec!["No analytics available.".to_string()];
    };
    let mut lines = vec![format!(
        "{} job(s): {} completed, {} failed, {} converted",
        analytics.total_jobs,
        analytics.completed_jobs,
        analytics.failed_jobs,
        bindery_core::format_size(Some(analytics.total_bytes))
    )];
    for day in &analytics.daily {
        lines.push(format!(
            "  {}  created {:>3}  completed {:>3}",
            day.date, day.created, day.completed
        ));
    }
    lines
}
