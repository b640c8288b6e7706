use std::fs;
use std::path::PathBuf;

use context_store::{ContextStore, ContextStoreError, StoreConfig, V1_FILE_NAME, V2_FILE_NAME};
use serde_json::json;
use session_ctx::{CodecError, ContextDocument, LayeredDocument};
use tempfile::TempDir;

fn v1_value() -> serde_json::Value {
    json!({
        "v": "1.0",
        "project": "my-app",
        "created": "2025-01-15T10:30:00Z",
        "updated": "2025-01-15T11:00:00Z",
        "sessions": [{
            "id": "s1",
            "start": "2025-01-15T10:30:00Z",
            "end": null,
            "goal": "setup_auth",
            "state": "in_progress",
            "decisions": [{
                "id": "d1",
                "what": "jwt_tokens",
                "why": "stateless_simple",
                "alt": ["sessions", "oauth"],
                "impact": ["auth.ts", "middleware.ts"]
            }],
            "files": {
                "auth.ts": {
                    "action": "created",
                    "role": "jwt_logic",
                    "deps": ["jsonwebtoken"],
                    "status": "complete"
                }
            },
            "patterns": {"error_handling": "result_types"},
            "blockers": [],
            "next": ["add_refresh_tokens"],
            "kv": {"auth": "jwt"}
        }]
    })
}

fn repo_with_v1(value: &serde_json::Value) -> (TempDir, ContextStore) {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let text = serde_json::to_string_pretty(value).expect("v1 json should serialize");
    fs::write(dir.path().join(V1_FILE_NAME), text).expect("v1 file should be written");
    let store = ContextStore::new(dir.path());
    (dir, store)
}

#[test]
fn load_v1_reports_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let store = ContextStore::new(dir.path());

    let error = store.load_v1().expect_err("missing v1 file must fail");
    assert!(matches!(error, ContextStoreError::NotFound { .. }));
}

#[test]
fn load_v1_rejects_unknown_fields() {
    let mut value = v1_value();
    value["sessions"][0]["extra"] = json!(true);
    let (_dir, store) = repo_with_v1(&value);

    let error = store.load_v1().expect_err("unknown session field must fail");
    assert!(matches!(error, ContextStoreError::JsonParse { .. }));
}

#[test]
fn convert_v1_to_v2_writes_minified_layered_file() {
    let (dir, store) = repo_with_v1(&v1_value());

    let layered = store
        .convert_v1_to_v2(None)
        .expect("conversion should succeed");

    let written = fs::read_to_string(dir.path().join(V2_FILE_NAME)).expect("v2 file exists");
    assert!(!written.contains('\n'));
    assert!(!written.contains(": "));
    let parsed: LayeredDocument = serde_json::from_str(&written).expect("v2 file parses");
    assert_eq!(parsed, layered);
    assert_eq!(store.load_v2().expect("v2 loads"), layered);
}

#[test]
fn convert_v1_to_v2_leaves_source_untouched() {
    let (dir, store) = repo_with_v1(&v1_value());
    let before = fs::read(dir.path().join(V1_FILE_NAME)).expect("v1 readable");

    store
        .convert_v1_to_v2(Some(false))
        .expect("conversion should succeed");

    let after = fs::read(dir.path().join(V1_FILE_NAME)).expect("v1 readable");
    assert_eq!(before, after);
}

#[test]
fn convert_v1_to_v2_refuses_existing_output_without_overwrite() {
    let (dir, store) = repo_with_v1(&v1_value());
    let v2 = dir.path().join(V2_FILE_NAME);
    fs::write(&v2, "keep me").expect("existing v2 written");

    let error = store
        .convert_v1_to_v2(Some(false))
        .expect_err("existing v2 must not be replaced");
    assert!(matches!(error, ContextStoreError::OutputExists { .. }));
    assert_eq!(fs::read_to_string(&v2).expect("v2 readable"), "keep me");

    store
        .convert_v1_to_v2(Some(true))
        .expect("overwrite should replace the file");
    assert!(store.load_v2().is_ok());
}

#[test]
fn convert_v1_to_v2_surfaces_codec_errors_without_writing() {
    let mut value = v1_value();
    value["sessions"][0]["state"] = json!("archived");
    let (dir, store) = repo_with_v1(&value);

    let error = store
        .convert_v1_to_v2(Some(false))
        .expect_err("unknown state must fail");
    assert!(matches!(
        error,
        ContextStoreError::Codec {
            source: CodecError::UnknownEnumLabel { .. },
            ..
        }
    ));
    assert!(!dir.path().join(V2_FILE_NAME).exists());
}

#[test]
fn convert_v2_to_v1_writes_default_output_and_round_trips() {
    let (dir, store) = repo_with_v1(&v1_value());
    store.convert_v1_to_v2(Some(false)).expect("encode");

    let decoded = store
        .convert_v2_to_v1(None, Some(false))
        .expect("decode should succeed");

    let original: ContextDocument =
        serde_json::from_value(v1_value()).expect("fixture parses as v1");
    assert_eq!(decoded, original);

    let written = fs::read_to_string(dir.path().join(".session-ctx.v1-from-v2.json"))
        .expect("decoded output exists");
    let reparsed: ContextDocument = serde_json::from_str(&written).expect("output parses");
    assert_eq!(reparsed, original);
    assert!(written.contains("\n  \""));
}

#[test]
fn convert_v2_to_v1_refuses_to_overwrite_source() {
    let (dir, store) = repo_with_v1(&v1_value());
    store.convert_v1_to_v2(Some(false)).expect("encode");

    let source = dir.path().join(V1_FILE_NAME);
    let error = store
        .convert_v2_to_v1(Some(&source), Some(true))
        .expect_err("source must never be a decode target");
    assert!(matches!(
        error,
        ContextStoreError::WouldOverwriteSource { .. }
    ));

    let dotted: PathBuf = dir.path().join(".").join(V1_FILE_NAME);
    assert!(matches!(
        store.convert_v2_to_v1(Some(&dotted), Some(true)),
        Err(ContextStoreError::WouldOverwriteSource { .. })
    ));
}

#[test]
fn convert_v2_to_v1_rejects_unsupported_version() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    fs::write(
        dir.path().join(V2_FILE_NAME),
        r#"{"v":"9.0","meta":{"p":"x","c":0,"u":0},"strings":[]}"#,
    )
    .expect("v2 file written");
    let store = ContextStore::new(dir.path());

    let error = store
        .convert_v2_to_v1(None, Some(false))
        .expect_err("unknown version must fail");
    assert!(matches!(
        error,
        ContextStoreError::Codec {
            source: CodecError::UnsupportedVersion { .. },
            ..
        }
    ));
}

#[test]
fn save_v1_stamps_updated_in_canonical_form() {
    let (_dir, store) = repo_with_v1(&v1_value());
    let mut document = store.load_v1().expect("v1 loads");

    store.save_v1(&mut document).expect("save should succeed");

    assert_ne!(document.updated, "2025-01-15T11:00:00Z");
    assert_eq!(document.updated.len(), "2025-01-15T11:00:00Z".len());
    assert!(document.updated.ends_with('Z'));
    assert_eq!(store.load_v1().expect("reload"), document);
}

#[test]
fn sizes_report_only_existing_files() {
    let (_dir, store) = repo_with_v1(&v1_value());

    let before = store.sizes().expect("sizes");
    assert!(before.v1.is_some());
    assert!(before.v2.is_none());

    store.convert_v1_to_v2(Some(false)).expect("encode");
    let after = store.sizes().expect("sizes");
    let (v1, v2) = (after.v1.expect("v1 size"), after.v2.expect("v2 size"));
    assert!(v2 < v1);
}

#[test]
fn from_config_resolves_relative_dir() {
    let cwd = tempfile::tempdir().expect("tempdir should be created");
    let config = StoreConfig {
        dir: Some(PathBuf::from("ctx")),
        overwrite: false,
    };

    let store = ContextStore::from_config(cwd.path(), &config);
    assert_eq!(store.root(), cwd.path().join("ctx"));
    assert_eq!(store.v1_path(), cwd.path().join("ctx").join(V1_FILE_NAME));
}

#[test]
fn configured_overwrite_applies_when_conversion_leaves_it_unset() {
    let (dir, _) = repo_with_v1(&v1_value());
    let v2 = dir.path().join(V2_FILE_NAME);
    fs::write(&v2, "stale").expect("existing v2 written");

    let refusing = ContextStore::from_config(dir.path(), &StoreConfig::default());
    assert!(!refusing.overwrite());
    assert!(matches!(
        refusing.convert_v1_to_v2(None),
        Err(ContextStoreError::OutputExists { .. })
    ));

    let config = StoreConfig {
        dir: None,
        overwrite: true,
    };
    let store = ContextStore::from_config(dir.path(), &config);
    assert!(store.overwrite());
    let layered = store
        .convert_v1_to_v2(None)
        .expect("configured overwrite should replace the file");
    assert_eq!(store.load_v2().expect("v2 loads"), layered);

    assert!(matches!(
        store.convert_v1_to_v2(Some(false)),
        Err(ContextStoreError::OutputExists { .. })
    ));
}

#[test]
fn save_v1_replaces_the_file_without_leaving_temporaries() {
    let (dir, store) = repo_with_v1(&v1_value());
    let mut document = store.load_v1().expect("v1 loads");
    document.sessions[0].next.push("write_docs".to_string());

    store.save_v1(&mut document).expect("save should succeed");
    store.save_v1(&mut document).expect("second save should succeed");

    assert_eq!(store.load_v1().expect("reload"), document);
    let names: Vec<String> = fs::read_dir(dir.path())
        .expect("dir readable")
        .map(|entry| {
            entry
                .expect("entry readable")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    assert_eq!(names, vec![V1_FILE_NAME.to_string()]);
}

#[test]
fn refused_conversion_leaves_no_temporaries() {
    let (dir, store) = repo_with_v1(&v1_value());
    fs::write(dir.path().join(V2_FILE_NAME), "keep me").expect("existing v2 written");

    assert!(store.convert_v1_to_v2(Some(false)).is_err());
    assert_eq!(
        fs::read_dir(dir.path()).expect("dir readable").count(),
        2
    );
}
