//! ConsoleConfig file + environment loading.
//!
//! Environment variables are process-wide, so every env-dependent check
//! lives in this single test.

use bakery_client::{ConsoleConfig, FileTokenStore, TokenStore};
use bakery_core::{GuardPolicy, StalePolicy};

#[test]
fn test_file_then_env_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("console.toml");
    std::fs::write(
        &path,
        r#"
        [api]
        base_url = "https://bakery.example/api"
        timeout_secs = 12

        [store]
        stale_policy = "latest_issued_wins"
        "#,
    )
    .unwrap();

    let config = ConsoleConfig::load(Some(path.clone())).unwrap();
    assert_eq!(config.api.base_url, "https://bakery.example/api");
    assert_eq!(config.api.timeout_secs, 12);
    assert_eq!(config.stale_policy(), StalePolicy::LatestIssuedWins);
    assert_eq!(config.guard_policy(), GuardPolicy::FailClosed);

    let token_path = dir.path().join("tok");
    std::env::set_var("BAKERY_API_URL", "http://10.0.0.5:8080/api");
    std::env::set_var("BAKERY_GUARD_POLICY", "optimistic");
    std::env::set_var("BAKERY_TOKEN_PATH", &token_path);
    std::env::set_var("BAKERY_TIMEOUT_SECS", "not-a-number");

    let config = ConsoleConfig::load(Some(path.clone())).unwrap();
    assert_eq!(config.api.base_url, "http://10.0.0.5:8080/api");
    assert_eq!(config.guard_policy(), GuardPolicy::Optimistic);
    assert_eq!(config.api.timeout_secs, 12);
    assert_eq!(config.session.token_path.as_deref(), Some(token_path.as_path()));

    let store = FileTokenStore::from_config(config.session.token_path.as_deref()).unwrap();
    store.save("persisted").unwrap();
    assert_eq!(std::fs::read_to_string(&token_path).unwrap(), "persisted");

    std::env::set_var("BAKERY_API_URL", "ws://wrong");
    assert!(ConsoleConfig::load(Some(path.clone())).is_err());
    let fallback = ConsoleConfig::load_or_default(Some(path));
    assert_eq!(fallback.api.base_url, "http://localhost:5000/api");

    for var in [
        "BAKERY_API_URL",
        "BAKERY_GUARD_POLICY",
        "BAKERY_TOKEN_PATH",
        "BAKERY_TIMEOUT_SECS",
    ] {
        std::env::remove_var(var);
    }
}

#[test]
fn test_malformed_toml_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("console.toml");
    std::fs::write(&path, "[api\nbase_url = ").unwrap();
    assert!(ConsoleConfig::load(Some(path)).is_err());
}
