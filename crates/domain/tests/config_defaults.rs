use ob_domain::config::{AuthMode, Config, ProviderKind};

#[test]
fn default_host_is_localhost() {
    let config = Config::default();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 4000);
}

#[test]
fn default_cors_allows_only_localhost() {
    let config = Config::default();
    assert!(config
        .server
        .cors
        .allowed_origins
        .contains(&"http://localhost:*".to_string()));
    assert!(config
        .server
        .cors
        .allowed_origins
        .contains(&"http://127.0.0.1:*".to_string()));
}

#[test]
fn empty_file_parses_to_defaults() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config.auth.mode, AuthMode::Supabase);
    assert_eq!(config.database.path_env, "ORBIT_DATABASE_PATH");
    assert_eq!(config.messaging.default_timezone, "UTC");
    assert_eq!(config.messaging.low_energy_threshold, 30);
    assert_eq!(config.llm.assistant_role, "openai/gpt-4o-mini");
    assert!(config.llm.providers.is_empty());
    assert_eq!(config.observability.service_name, "orbit");
}

#[test]
fn full_file_parses() {
    let toml_str = r#"
[server]
host = "0.0.0.0"
port = 8080

[server.cors]
allowed_origins = ["https://orbit.example"]

[database]
path = "/var/lib/orbit/orbit.db"

[auth]
mode = "supabase"
url = "https://project.supabase.co"

[llm]
assistant_role = "openai/gpt-4o-mini"

[[llm.providers]]
id = "openai"
kind = "openai_compat"
base_url = "https://api.openai.com/v1"
auth = { header = "Authorization", prefix = "Bearer ", env = "OPENAI_API_KEY" }

[messaging]
default_timezone = "Europe/Berlin"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.cors.allowed_origins, vec!["https://orbit.example"]);
    assert_eq!(
        config.auth.url.as_deref(),
        Some("https://project.supabase.co")
    );
    assert_eq!(config.llm.providers[0].kind, ProviderKind::OpenaiCompat);
    assert_eq!(config.messaging.default_timezone, "Europe/Berlin");
}

#[test]
fn unknown_auth_mode_is_rejected() {
    let toml_str = r#"
[auth]
mode = "magic"
"#;
    assert!(toml::from_str::<Config>(toml_str).is_err());
}
