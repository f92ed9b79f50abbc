//! Integration tests for the extraction pipeline: config document through
//! template expansion, extraction against canned payloads and state diffing.

use serde_json::json;

use relwatch::runner::{diff_against_state, expand_event};
use relwatch::{process_event, AppConfig, StateStore, TemplateRegistry, VarMap};

const CONFIG_DOC: &str = r#"
cron_schedule: "0 8 * * *"
target:
  topic: releases
  base_url: https://ntfy.example.org
env:
  DONATION_ALERTS_SECRET: token-123
events:
  - id: some-repo
    template: gitea_release
    url: https://git.example.org/owner/repo
  - id: mystery
    template: does_not_exist
  - id: donations
    template: donationalerts_alerts
"#;

#[test]
fn gitea_source_end_to_end() {
    let config: AppConfig = serde_yaml::from_str(CONFIG_DOC).unwrap();
    let registry = TemplateRegistry::with_known_templates();

    let entry = expand_event(&registry, config.events[0].clone()).unwrap();
    assert_eq!(
        entry.url,
        "https://git.example.org/api/v1/repos/owner/repo/releases/latest"
    );

    // what the gitea "latest release" endpoint answers
    let payload = json!({
        "name": "v2.4.0",
        "body": "Bugfix release",
        "html_url": "https://git.example.org/owner/repo/releases/tag/v2.4.0"
    });

    let mut records = process_event(&entry, &payload, &config.env).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "some-repo");
    assert_eq!(records[0].revision, "v2.4.0");
    assert_eq!(
        records[0].title,
        "git.example.org: Release /owner/repo, v2.4.0"
    );
    assert_eq!(records[0].description, "Bugfix release");

    // previously seen an older release: notify fires
    let mut state = StateStore::ephemeral();
    state.set("some-repo", "v2.3.0");
    diff_against_state(&mut records, &state);

    assert_eq!(records[0].prev_revision, "v2.3.0");
    assert!(records[0].notify);

    // seen the same release: no notification
    state.set("some-repo", "v2.4.0");
    diff_against_state(&mut records, &state);
    assert!(!records[0].notify);
}

#[test]
fn donationalerts_source_end_to_end() {
    let config: AppConfig = serde_yaml::from_str(CONFIG_DOC).unwrap();
    let registry = TemplateRegistry::with_known_templates();

    let entry = expand_event(&registry, config.events[2].clone()).unwrap();
    assert_eq!(
        entry.headers.get("Authorization").unwrap(),
        "Bearer $DONATION_ALERTS_SECRET"
    );

    let payload = json!({
        "data": [
            {"id": 501, "message": "hello"},
            {"id": 502, "message": "great work"},
        ]
    });

    let mut records = process_event(&entry, &payload, &config.env).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, "donations//501");
    assert_eq!(records[1].id, "donations//502");

    // only the already-seen donation stays quiet
    let mut state = StateStore::ephemeral();
    state.set("donations//501", "501");
    diff_against_state(&mut records, &state);

    assert!(!records[0].notify);
    assert!(records[1].notify);
}

#[test]
fn unknown_template_skips_only_that_source() {
    let config: AppConfig = serde_yaml::from_str(CONFIG_DOC).unwrap();
    let registry = TemplateRegistry::with_known_templates();

    let mut expanded = Vec::new();
    let mut skipped = Vec::new();
    for entry in &config.events {
        match expand_event(&registry, entry.clone()) {
            Ok(entry) => expanded.push(entry.id),
            Err(_) => skipped.push(entry.id.clone()),
        }
    }

    assert_eq!(skipped, vec!["mystery"]);
    assert_eq!(expanded, vec!["some-repo", "donations"]);
}

#[test]
fn state_survives_reload_between_runs() {
    let dir = tempfile::tempdir().unwrap();

    let mut state = StateStore::load(dir.path()).unwrap();
    state.set("some-repo", "v2.4.0");
    state.save().unwrap();

    // next run sees the persisted revision
    let state = StateStore::load(dir.path()).unwrap();
    let mut records = {
        let mut entry = relwatch::EventSourceConfig::new("some-repo");
        entry.revision_path = "version".to_string();
        process_event(&entry, &json!({"version": "v2.4.0"}), &VarMap::new()).unwrap()
    };
    diff_against_state(&mut records, &state);

    assert!(!records[0].notify);
}

#[test]
fn headers_and_env_feed_variable_substitution() {
    let config: AppConfig = serde_yaml::from_str(CONFIG_DOC).unwrap();
    let registry = TemplateRegistry::with_known_templates();
    let entry = expand_event(&registry, config.events[2].clone()).unwrap();

    // the fetcher substitutes header values with env + ID
    let mut variables = config.env.clone();
    variables.insert("ID".to_string(), entry.id.clone());

    let resolved = relwatch::apply_vars(entry.headers.get("Authorization").unwrap(), &variables);
    assert_eq!(resolved, "Bearer token-123");
}
