use bindery_core::{
    update, AnalyticsSnapshot, AppState, ClientPreferences, DailyCount, Effect, Msg, PageSize,
    PreferencesPatch, SessionInfo,
};

fn init_logging() {
    bindery_logging::initialize_for_tests();
}

fn analytics() -> AnalyticsSnapshot {
    AnalyticsSnapshot {
        total_jobs: 12,
        completed_jobs: 10,
        failed_jobs: 1,
        total_bytes: 48_000_000,
        daily: vec![DailyCount {
            date: "2024-05-01".to_string(),
            created: 3,
            completed: 2,
        }],
    }
}

#[test]
fn restored_preferences_drive_upload_settings() {
    init_logging();
    let prefs = ClientPreferences {
        page_size: PageSize::Legal,
        margin_mm: 99.0,
        locale: "en".to_string(),
        force_regenerate: true,
        analytics: Some(analytics()),
    };
    let (state, effects) = update(AppState::new(), Msg::RestorePreferences(prefs));

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.settings.page_size, PageSize::Legal);
    assert_eq!(view.settings.margin_mm, 50.0);
    assert!(view.settings.force);
    assert_eq!(view.locale, "en");
    assert_eq!(view.analytics, Some(analytics()));
}

#[test]
fn preference_change_is_persisted() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::PreferencesChanged(PreferencesPatch {
            page_size: Some(PageSize::Letter),
            ..PreferencesPatch::default()
        }),
    );
    assert_eq!(
        effects,
        vec![Effect::PersistPreferences(state.preferences().clone())]
    );
    assert_eq!(state.preferences().page_size, PageSize::Letter);

    let (_state, effects) = update(
        state,
        Msg::PreferencesChanged(PreferencesPatch {
            page_size: Some(PageSize::Letter),
            ..PreferencesPatch::default()
        }),
    );
    assert!(effects.is_empty());
}

#[test]
fn fresh_analytics_replace_cache_and_are_persisted() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::AnalyticsRequested);
    assert_eq!(effects, vec![Effect::FetchAnalytics]);

    let (state, effects) = update(state, Msg::AnalyticsLoaded(Ok(analytics())));
    assert_eq!(state.preferences().analytics, Some(analytics()));
    assert!(matches!(effects.as_slice(), [Effect::PersistPreferences(_)]));
    assert!(state.is_settled());
}

#[test]
fn failed_analytics_keep_cached_snapshot() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::RestorePreferences(ClientPreferences {
            analytics: Some(analytics()),
            ..ClientPreferences::default()
        }),
    );
    let (state, _) = update(state, Msg::AnalyticsRequested);
    let (mut state, effects) = update(state, Msg::AnalyticsLoaded(Err("timeout".to_string())));

    assert!(effects.is_empty());
    assert_eq!(state.view().analytics, Some(analytics()));
    assert!(state.take_notifications()[0].text.contains("cached"));
}

#[test]
fn session_and_profile_update_display_name() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::SessionLoaded(Ok(SessionInfo {
            user_id: "u-1".to_string(),
            display_name: Some("Ada".to_string()),
        })),
    );
    assert_eq!(state.view().display_name.as_deref(), Some("Ada"));

    let (state, effects) = update(state, Msg::ProfileSaveRequested("  Grace  ".to_string()));
    assert_eq!(
        effects,
        vec![Effect::SaveProfile {
            display_name: "Grace".to_string()
        }]
    );
    let (state, _) = update(state, Msg::ProfileSaved(Ok(Some("Grace".to_string()))));
    assert_eq!(state.view().display_name.as_deref(), Some("Grace"));
    assert_eq!(state.session().map(|s| s.user_id.as_str()), Some("u-1"));
}
