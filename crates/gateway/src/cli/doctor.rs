use std::time::Duration;

use ob_domain::config::{AuthMode, Config, ConfigSeverity};
use ob_providers::ProviderRegistry;
use ob_store::Store;

/// Run all diagnostic checks and print a summary.
///
/// Returns `Ok(true)` when every check passes, `Ok(false)` when at least
/// one check failed.
pub async fn run(config: &Config, config_path: &str) -> anyhow::Result<bool> {
    println!("orbit doctor");
    println!("============\n");

    let mut all_passed = true;

    // 1. Config file
    check_config_file(config_path, &mut all_passed);

    // 2. Config validation
    check_config_validation(config, &mut all_passed);

    // 3. Database
    check_database(config, &mut all_passed);

    // 4. Auth provider
    check_auth(config, &mut all_passed).await;

    // 5. LLM providers
    check_llm_providers(config, &mut all_passed);

    // Summary
    println!();
    if all_passed {
        println!("All checks passed.");
    } else {
        println!("Some checks failed. Review the output above.");
    }

    Ok(all_passed)
}

// ── Individual checks ─────────────────────────────────────────────────

fn check_config_file(config_path: &str, all_passed: &mut bool) {
    let exists = std::path::Path::new(config_path).exists();
    print_check(
        "Config file exists",
        exists,
        if exists {
            config_path.to_owned()
        } else {
            format!("{config_path} not found (using defaults)")
        },
    );
    if !exists {
        *all_passed = false;
    }
}

fn check_config_validation(config: &Config, all_passed: &mut bool) {
    let issues = config.validate();
    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();

    if issues.is_empty() {
        print_check("Config validation", true, "no issues".into());
    } else {
        print_check(
            "Config validation",
            error_count == 0,
            format!("{} issue(s) ({} error(s))", issues.len(), error_count),
        );
        for issue in &issues {
            println!("      {issue}");
        }
        if error_count > 0 {
            *all_passed = false;
        }
    }
}

fn check_database(config: &Config, all_passed: &mut bool) {
    let Some(path) = config.database.resolve_path() else {
        print_check("Database", false, "no path configured".into());
        *all_passed = false;
        return;
    };

    let result = Store::open(&path).and_then(|store| store.ping());
    let ok = result.is_ok();
    let detail = match result {
        Ok(()) => format!("{} (open)", path.display()),
        Err(e) => format!("{} ({e})", path.display()),
    };
    print_check("Database", ok, detail);

    if !ok {
        *all_passed = false;
    }
}

async fn check_auth(config: &Config, all_passed: &mut bool) {
    let auth = &config.auth;
    let (ok, detail) = match auth.mode {
        AuthMode::Static => {
            let ok = auth.resolve_static_token().is_some();
            let detail = if ok {
                format!("static token for user '{}'", auth.static_user_id)
            } else {
                format!("${} is not set", auth.static_token_env)
            };
            (ok, detail)
        }
        AuthMode::Supabase => match auth.url.as_deref() {
            None | Some("") => (false, "no auth url configured".into()),
            Some(url) => {
                let health = format!("{}/auth/v1/health", url.trim_end_matches('/'));
                let key = auth.resolve_service_key().unwrap_or_default();
                let reachable = match reqwest::Client::builder()
                    .timeout(Duration::from_millis(auth.timeout_ms))
                    .build()
                {
                    Ok(client) => client
                        .get(&health)
                        .header("apikey", key)
                        .send()
                        .await
                        .is_ok(),
                    Err(_) => false,
                };
                let detail = if reachable {
                    url.to_owned()
                } else {
                    format!("{url} (unreachable)")
                };
                (reachable, detail)
            }
        },
    };

    print_check("Auth provider", ok, detail);

    if !ok {
        *all_passed = false;
    }
}

fn check_llm_providers(config: &Config, all_passed: &mut bool) {
    let registry = ProviderRegistry::from_config(&config.llm);
    let ready = registry.list_providers();
    let failed = registry.init_errors();

    // No providers at all is allowed: the assistant serves fallbacks.
    let ok = failed.is_empty();
    let detail = if config.llm.providers.is_empty() {
        "none configured (assistant offline)".to_owned()
    } else {
        format!("{} ready, {} failed", ready.len(), failed.len())
    };
    print_check("LLM providers", ok, detail);
    for (id, err) in failed {
        println!("      {id}: {err}");
    }

    if !ok {
        *all_passed = false;
    }
}

// ── Formatting helper ─────────────────────────────────────────────────

fn print_check(name: &str, passed: bool, detail: String) {
    let status = if passed { "PASS" } else { "FAIL" };
    println!("  [{status}] {name}: {detail}");
}
