use clap::Parser;

use super::*;

#[test]
fn defaults_resolve_without_any_input() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.port(), DEFAULT_PORT);
    assert_eq!(settings.server.graceful_shutdown, Duration::from_secs(30));
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
    assert!(settings.database.url.is_none());
    assert!(settings.cache.enabled);
    assert!(settings.api.keys.is_empty());
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn blank_database_url_selects_the_memory_store() {
    let mut raw = RawSettings::default();
    raw.database.url = Some("   ".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.database.url.is_none());
}

#[test]
fn zero_port_is_rejected() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(0);

    let err = Settings::from_raw(raw).expect_err("invalid settings");
    assert!(matches!(err, LoadError::Invalid { key: "server.port", .. }));
}

#[test]
fn api_key_with_unknown_scope_is_rejected() {
    let mut raw = RawSettings::default();
    raw.api.keys.push(RawApiKey {
        name: Some("ops".into()),
        token: Some("secret".into()),
        scopes: vec!["author_read".into(), "admin".into()],
    });

    let err = Settings::from_raw(raw).expect_err("invalid settings");
    assert!(matches!(err, LoadError::Invalid { key: "api.keys.scopes", .. }));
}

#[test]
fn api_key_without_scopes_is_rejected() {
    let mut raw = RawSettings::default();
    raw.api.keys.push(RawApiKey {
        name: Some("ops".into()),
        token: Some("secret".into()),
        scopes: Vec::new(),
    });

    let err = Settings::from_raw(raw).expect_err("invalid settings");
    assert!(matches!(err, LoadError::Invalid { key: "api.keys.scopes", .. }));
}

#[test]
fn api_keys_resolve_named_scopes() {
    let mut raw = RawSettings::default();
    raw.api.keys.push(RawApiKey {
        name: Some("editor".into()),
        token: Some("secret".into()),
        scopes: vec!["book_read".into(), "book_write".into()],
    });

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(
        settings.api.keys[0].scopes,
        vec![ApiScope::BookRead, ApiScope::BookWrite]
    );
}

#[test]
fn relative_base_url_is_rejected() {
    let mut raw = RawSettings::default();
    raw.api.public_base_url = Some("not a url".to_string());

    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "scaffale",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--database-url",
        "postgres://override",
        "--cache-enabled",
        "false",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(
                serve.overrides.database_url.as_deref(),
                Some("postgres://override")
            );
            assert_eq!(serve.overrides.cache_enabled, Some(false));
        }
    }
}
