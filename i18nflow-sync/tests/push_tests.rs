//! Key collection and push submission.

mod common;

use tempfile::TempDir;

use common::{config, put, FakeTransport};
use i18nflow_sync::{collect_keys, push, KeySource, PushOutcome, PushResponse, SyncError};

#[test]
fn scenario_namespaced_source_reads_default_locale_dir() {
    let root = TempDir::new().unwrap();
    put(
        root.path(),
        "src/locales/en/common.json",
        r#"{"welcome":"Hi"}"#,
    );
    put(
        root.path(),
        "src/locales/en/auth.json",
        r#"{"login":{"title":"Sign in"}}"#,
    );
    put(root.path(), "src/locales/fr/common.json", r#"{"welcome":"Salut"}"#);

    let collected = collect_keys(&config(), root.path(), &KeySource::Namespaced).unwrap();

    assert_eq!(collected.keys, vec!["auth.login.title", "common.welcome"]);
    assert_eq!(collected.defaults["common.welcome"], "Hi");
    assert!(collected.warnings.is_empty());
}

#[test]
fn missing_default_locale_dir_is_a_warning() {
    let root = TempDir::new().unwrap();
    let collected = collect_keys(&config(), root.path(), &KeySource::Namespaced).unwrap();
    assert!(collected.keys.is_empty());
    assert!(collected.warnings[0].contains("default locale directory not found"));
}

#[test]
fn locale_files_are_unioned_with_mapped_payload() {
    let root = TempDir::new().unwrap();
    put(root.path(), "src/locales/en.json", r#"{"nav":{"home":"Home"}}"#);
    put(
        root.path(),
        "src/locales/zh.json",
        r#"{"nav":{"home":"首页","about":"关于"}}"#,
    );
    let mut cfg = config();
    cfg.language_mapping.insert("zh".into(), "zh-CN".into());

    let collected = collect_keys(
        &cfg,
        root.path(),
        &KeySource::LocaleFiles {
            with_translations: true,
        },
    )
    .unwrap();

    assert_eq!(collected.keys, vec!["nav.about", "nav.home"]);
    assert_eq!(collected.defaults.len(), 1);
    assert_eq!(collected.defaults["nav.home"], "Home");
    let translations = collected.translations.unwrap();
    assert_eq!(translations["zh-CN"]["nav.about"], "关于");
    assert!(translations.contains_key("en"));
}

#[test]
fn malformed_locale_file_is_skipped_with_warning() {
    let root = TempDir::new().unwrap();
    put(root.path(), "src/locales/en.json", r#"{"a":{"b":"x"}}"#);
    put(root.path(), "src/locales/fr.json", "not json");

    let collected = collect_keys(
        &config(),
        root.path(),
        &KeySource::LocaleFiles {
            with_translations: false,
        },
    )
    .unwrap();

    assert_eq!(collected.keys, vec!["a.b"]);
    assert!(collected.translations.is_none());
    assert!(collected.warnings.iter().any(|w| w.contains("fr.json")));
}

#[test]
fn scan_source_collects_keys_and_defaults() {
    let root = TempDir::new().unwrap();
    put(
        root.path(),
        "src/app.ts",
        r#"t("nav.home"); t("nav.about", "About");"#,
    );

    let collected = collect_keys(
        &config(),
        root.path(),
        &KeySource::Scan {
            patterns: vec!["src/**/*.ts".into()],
        },
    )
    .unwrap();

    assert_eq!(collected.keys, vec!["nav.home", "nav.about"]);
    assert_eq!(collected.defaults.len(), 1);
    assert_eq!(collected.defaults["nav.about"], "About");
}

#[test]
fn scenario_dry_run_previews_without_network() {
    let root = TempDir::new().unwrap();
    let calls: String = (0..15).map(|i| format!("t('keys.k{i:02}');\n")).collect();
    put(root.path(), "src/many.js", &calls);
    let collected = collect_keys(
        &config(),
        root.path(),
        &KeySource::Scan {
            patterns: vec!["src/**/*.js".into()],
        },
    )
    .unwrap();
    let transport = FakeTransport::default();

    let report = push(&transport, &config(), collected, true).unwrap();

    let PushOutcome::DryRun(preview) = &report.outcome else {
        panic!("expected dry run, got {:?}", report.outcome);
    };
    assert_eq!(preview.shown.len(), 10);
    assert_eq!(preview.shown[0], "keys.k00");
    assert_eq!(preview.more_line().as_deref(), Some("... and 5 more"));
    assert_eq!(transport.calls(), 0);
}

#[test]
fn empty_key_set_short_circuits() {
    let root = TempDir::new().unwrap();
    let transport = FakeTransport::default();
    let collected = collect_keys(&config(), root.path(), &KeySource::Namespaced).unwrap();

    let report = push(&transport, &config(), collected, false).unwrap();

    assert_eq!(report.outcome, PushOutcome::Empty);
    assert!(report
        .warnings
        .iter()
        .any(|w| w.contains("no translation keys found")));
    assert_eq!(transport.calls(), 0);
}

#[test]
fn submit_sends_one_request_and_reports_verbatim() {
    let root = TempDir::new().unwrap();
    put(
        root.path(),
        "src/locales/en/common.json",
        r#"{"welcome":"Hi","bye":"Bye"}"#,
    );
    let transport = FakeTransport {
        response: PushResponse {
            added: vec!["common.welcome".into()],
            existed: vec![],
            failed: vec!["common.bye".into()],
        },
        ..FakeTransport::default()
    };
    let collected = collect_keys(&config(), root.path(), &KeySource::Namespaced).unwrap();

    let report = push(&transport, &config(), collected, false).unwrap();

    let pushes = transport.pushes.borrow();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].project_id, "7");
    assert_eq!(pushes[0].keys, vec!["common.bye", "common.welcome"]);
    assert_eq!(pushes[0].defaults["common.welcome"], "Hi");
    match report.outcome {
        PushOutcome::Submitted(response) => {
            assert_eq!(response.failed, vec!["common.bye"]);
            assert_eq!(response.added, vec!["common.welcome"]);
        }
        other => panic!("expected submission, got {other:?}"),
    }
}

#[test]
fn malformed_scanned_keys_are_dropped_before_submit() {
    let root = TempDir::new().unwrap();
    put(root.path(), "src/a.ts", r#"t("ok.key"); t("bad..key"); t(".x");"#);
    let transport = FakeTransport::default();
    let collected = collect_keys(
        &config(),
        root.path(),
        &KeySource::Scan {
            patterns: vec!["src/**/*.ts".into()],
        },
    )
    .unwrap();

    let report = push(&transport, &config(), collected, false).unwrap();

    assert_eq!(report.keys, vec!["ok.key"]);
    assert_eq!(transport.pushes.borrow()[0].keys, vec!["ok.key"]);
    assert_eq!(
        report
            .warnings
            .iter()
            .filter(|w| w.contains("malformed"))
            .count(),
        2
    );
}

#[test]
fn push_failure_surfaces_transport_error() {
    let root = TempDir::new().unwrap();
    put(root.path(), "src/locales/en.json", r#"{"a":{"b":"x"}}"#);
    let transport = FakeTransport::failing("timed out");
    let collected = collect_keys(
        &config(),
        root.path(),
        &KeySource::LocaleFiles {
            with_translations: false,
        },
    )
    .unwrap();

    let err = push(&transport, &config(), collected, false).unwrap_err();
    assert!(matches!(err, SyncError::Transport(_)));
}
