use clap::Parser;
use serial_test::serial;
use std::io::Write;
use std::path::PathBuf;
use telegramable::cli::Cli;
use telegramable::NotifierConfig;
use tempfile::NamedTempFile;

const ENV_KEYS: &[&str] = &[
    "TELEGRAM_BOT_TOKEN",
    "TELEGRAM_USER_ID",
    "APP_NAME",
    "TELEGRAMABLE_TRACE_DEPTH",
    "TELEGRAMABLE_ENABLED",
];

fn clear_env() {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}

/// A helper function to run a test with a temporary config file.
fn with_config_file<F>(toml_content: &str, test_fn: F)
where
    F: FnOnce(PathBuf),
{
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", toml_content).unwrap();
    let path = file.path().to_path_buf();
    test_fn(path);
}

#[test]
#[serial]
fn test_load_full_valid_config() {
    clear_env();
    let toml_content = r#"
        enabled = false
        exceptions_only = ["ErrorException"]
        exceptions_except = ["QueryException", "ModelNotFound"]
        trace = false
        trace_depth = 7
        bot_token = "123:ABC"
        user_id = 987654
        app_name = "Shop"
        timeout_seconds = 3
        api_base_url = "http://localhost:8081"
    "#;

    with_config_file(toml_content, |path| {
        let config = NotifierConfig::load(Some(&path)).unwrap();

        assert!(!config.enabled);
        assert_eq!(config.exceptions_only, vec!["ErrorException"]);
        assert_eq!(
            config.exceptions_except,
            vec!["QueryException", "ModelNotFound"]
        );
        assert!(!config.include_trace);
        assert_eq!(config.trace_depth, 7);
        assert_eq!(config.bot_token, "123:ABC");
        assert_eq!(config.chat_id, "987654");
        assert_eq!(config.app_name, "Shop");
        assert_eq!(config.timeout_seconds, 3);
        assert_eq!(config.api_base_url, "http://localhost:8081");
    });
}

#[test]
#[serial]
fn test_load_partial_config_uses_defaults() {
    clear_env();
    let toml_content = r#"
        user_id = "-100200300"
    "#;

    with_config_file(toml_content, |path| {
        let config = NotifierConfig::load(Some(&path)).unwrap();

        // Values from file
        assert_eq!(config.chat_id, "-100200300");

        // Values from Default
        assert!(config.enabled);
        assert!(config.include_trace);
        assert_eq!(config.trace_depth, 3);
        assert!(config.exceptions_only.is_empty());
        assert!(config.exceptions_except.is_empty());
        assert_eq!(config.app_name, "Telegramable");
        assert_eq!(config.api_base_url, "https://api.telegram.org");
        assert!(config.bot_token.is_empty());
    });
}

#[test]
#[serial]
fn test_telegram_env_overrides_file() {
    clear_env();
    let toml_content = r#"
        bot_token = "from-file"
        user_id = "1"
        app_name = "FromFile"
    "#;

    with_config_file(toml_content, |path| {
        std::env::set_var("TELEGRAM_BOT_TOKEN", "from-env");
        std::env::set_var("TELEGRAM_USER_ID", "-42");
        std::env::set_var("APP_NAME", "FromEnv");

        let config = NotifierConfig::load(Some(&path));
        clear_env();
        let config = config.unwrap();

        assert_eq!(config.bot_token, "from-env");
        assert_eq!(config.chat_id, "-42");
        assert_eq!(config.app_name, "FromEnv");
    });
}

#[test]
#[serial]
fn test_prefixed_env_overrides_any_key() {
    clear_env();
    with_config_file("trace_depth = 2\n", |path| {
        std::env::set_var("TELEGRAMABLE_TRACE_DEPTH", "9");
        std::env::set_var("TELEGRAMABLE_ENABLED", "false");

        let config = NotifierConfig::load(Some(&path));
        clear_env();
        let config = config.unwrap();

        assert_eq!(config.trace_depth, 9);
        assert!(!config.enabled);
    });
}

#[test]
#[serial]
fn test_cli_overrides_win() {
    clear_env();
    with_config_file("app_name = \"FromFile\"\nuser_id = \"1\"\n", |path| {
        std::env::set_var("APP_NAME", "FromEnv");
        let cli = Cli::try_parse_from([
            "telegramable",
            "--config",
            path.to_str().unwrap(),
            "--app-name",
            "FromCli",
            "--chat-id",
            "77",
            "check",
        ])
        .unwrap();

        let config = NotifierConfig::load_with(cli.config.as_deref(), cli.clone());
        clear_env();
        let config = config.unwrap();

        assert_eq!(config.app_name, "FromCli");
        assert_eq!(config.chat_id, "77");
    });
}

#[test]
#[serial]
fn test_invalid_value_type() {
    clear_env();
    with_config_file("trace_depth = \"three\"\n", |path| {
        let config_result = NotifierConfig::load(Some(&path));
        assert!(config_result.is_err());
        let error_string = config_result.unwrap_err().to_string();
        assert!(error_string.contains("trace_depth"), "{}", error_string);
    });
}

#[test]
#[serial]
fn test_negative_trace_depth_is_rejected() {
    clear_env();
    with_config_file("trace_depth = -1\n", |path| {
        assert!(NotifierConfig::load(Some(&path)).is_err());
    });
}

#[test]
fn test_non_existent_config_file() {
    let non_existent_path = PathBuf::from("/path/to/non/existent/telegramable.toml");
    let config_result = NotifierConfig::load(Some(&non_existent_path));
    assert!(config_result.is_err());
    let error_string = config_result.unwrap_err().to_string();
    assert!(error_string.contains("Config file not found at specified path"));
}
