use serde::{Deserialize, Serialize};

use crate::job::{normalize_margin, PageSize, DEFAULT_MARGIN_MM};

pub const DEFAULT_LOCALE: &str = "zh-CN";

/// Aggregate counters from `GET /api/analytics`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsSnapshot {
    pub total_jobs: u64,
    pub completed_jobs: u64,
    pub failed_jobs: u64,
    pub total_bytes: u64,
    /// Seven days, oldest first.
    pub daily: Vec<DailyCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DailyCount {
    pub date: String,
    pub created: u64,
    pub completed: u64,
}

/// Process-wide client preferences, loaded at startup and saved on change.
///
/// This is a cache, not a contract with the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientPreferences {
    pub page_size: PageSize,
    pub margin_mm: f64,
    pub locale: String,
    pub force_regenerate: bool,
    pub analytics: Option<AnalyticsSnapshot>,
}

impl Default for ClientPreferences {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            margin_mm: DEFAULT_MARGIN_MM,
            locale: DEFAULT_LOCALE.to_string(),
            force_regenerate: false,
            analytics: None,
        }
    }
}

impl ClientPreferences {
    pub fn upload_settings(&self) -> UploadSettings {
        UploadSettings {
            page_size: self.page_size,
            margin_mm: normalize_margin(self.margin_mm),
            force: self.force_regenerate,
        }
    }
}

/// Per-request settings attached to every upload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UploadSettings {
    pub page_size: PageSize,
    pub margin_mm: f64,
    pub force: bool,
}

/// A partial preferences edit; `None` leaves the field untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PreferencesPatch {
    pub page_size: Option<PageSize>,
    pub margin_mm: Option<f64>,
    pub locale: Option<String>,
    pub force_regenerate: Option<bool>,
}

impl PreferencesPatch {
    pub fn is_empty(&self) -> bool {
        self.page_size.is_none()
            && self.margin_mm.is_none()
            && self.locale.is_none()
            && self.force_regenerate.is_none()
    }

    /// Apply onto `prefs`; returns whether anything changed.
    pub fn apply(self, prefs: &mut ClientPreferences) -> bool {
        let before = prefs.clone();
        if let Some(page_size) = self.page_size {
            prefs.page_size = page_size;
        }
        if let Some(margin) = self.margin_mm {
            prefs.margin_mm = normalize_margin(margin);
        }
        if let Some(locale) = self.locale.map(|l| l.trim().to_string()) {
            if !locale.is_empty() {
                prefs.locale = locale;
            }
        }
        if let Some(force) = self.force_regenerate {
            prefs.force_regenerate = force;
        }
        *prefs != before
    }
}
