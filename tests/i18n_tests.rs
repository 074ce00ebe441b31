//! Translator integration tests against locale tables on disk.

use std::fs;
use std::path::Path;

use neonest::i18n::{TextContent, Translator};
use neonest::ErrorKind;
use tempfile::TempDir;

fn write_table(dir: &Path, lang: &str, body: &str) {
    let lang_dir = dir.join(lang);
    fs::create_dir_all(&lang_dir).unwrap();
    fs::write(lang_dir.join("common.json"), body).unwrap();
}

fn locales() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_table(
        dir.path(),
        "en",
        r#"{
            "login": { "title": "Welcome back", "errorEmptyEmail": "Please enter your email" },
            "sleep": {
                "entriesCount_one": "{{count}} entry",
                "entriesCount_other": "{{count}} entries"
            },
            "faq": { "tips": ["Swaddle", "White noise"] }
        }"#,
    );
    write_table(dir.path(), "ta", r#"{ "login": { "title": "மீண்டும் வருக" } }"#);
    dir
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_load_dir_reads_every_present_language() {
    let dir = locales();
    let t = Translator::load_dir(dir.path(), "ta", "en").unwrap();

    assert_eq!(t.locale(), "ta");
    assert_eq!(t.t("login.title", &[]), "மீண்டும் வருக");
    // not translated to Tamil yet
    assert_eq!(t.t("login.errorEmptyEmail", &[]), "Please enter your email");
}

#[test]
fn test_missing_language_dir_is_skipped() {
    let dir = locales();
    let t = Translator::load_dir(dir.path(), "hi", "en").unwrap();
    assert_eq!(t.t("login.title", &[]), "Welcome back");
}

#[test]
fn test_missing_key_resolves_to_itself() {
    let dir = locales();
    let t = Translator::load_dir(dir.path(), "en", "en").unwrap();
    assert_eq!(t.t("resources.unknownKey", &[]), "resources.unknownKey");
    assert!(!t.has_key("resources.unknownKey"));
}

#[test]
fn test_empty_directory_resolves_keys_to_themselves() {
    let dir = TempDir::new().unwrap();
    let t = Translator::load_dir(dir.path(), "en", "en").unwrap();
    assert_eq!(t.t("login.title", &[]), "login.title");
}

#[test]
fn test_malformed_table_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    write_table(dir.path(), "en", "{ not json");

    let err = Translator::load_dir(dir.path(), "en", "en").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unknown);
    assert!(err.to_string().contains("Malformed locale table"));
}

// =============================================================================
// Lookup
// =============================================================================

#[test]
fn test_plurals_and_interpolation() {
    let dir = locales();
    let t = Translator::load_dir(dir.path(), "en", "en").unwrap();

    assert_eq!(t.t("sleep.entriesCount", &[("count", "1")]), "1 entry");
    assert_eq!(t.t("sleep.entriesCount", &[("count", "0")]), "0 entries");
}

#[test]
fn test_content_shapes_are_explicit() {
    let dir = locales();
    let t = Translator::load_dir(dir.path(), "en", "en").unwrap();

    assert_eq!(
        t.content("login.title"),
        Some(TextContent::Plain("Welcome back".to_string()))
    );
    assert_eq!(
        t.content("faq.tips").map(TextContent::into_list),
        Some(vec!["Swaddle".to_string(), "White noise".to_string()])
    );
    assert!(matches!(t.content("login"), Some(TextContent::Structured(_))));
    // structured content never leaks into display text
    assert_eq!(t.t("login", &[]), "login");
}

#[test]
fn test_switching_language_at_runtime() {
    let dir = locales();
    let mut t = Translator::load_dir(dir.path(), "en", "en").unwrap();
    assert_eq!(t.t("login.title", &[]), "Welcome back");

    t.set_locale("ta").unwrap();
    assert_eq!(t.t("login.title", &[]), "மீண்டும் வருக");

    assert!(t.set_locale("xx").is_err());
    assert_eq!(t.locale(), "ta");
}

#[test]
fn test_shipped_english_table_covers_form_messages() {
    let table: serde_json::Value =
        serde_json::from_str(neonest::cli::init::ENGLISH_TABLE).unwrap();
    let t = Translator::default().with_table("en", table);

    for key in [
        "login.errorEmptyEmail",
        "login.errorInvalidEmail",
        "login.errorShortPassword",
        "login.errorFormInvalid",
        "signup.errorEmailExists",
        "sleep.nap",
        "sleep.night",
        "neochatbot.oops_something_wrong",
    ] {
        assert!(t.has_key(key), "missing {}", key);
    }
}
