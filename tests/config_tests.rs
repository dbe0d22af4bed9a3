use std::collections::HashMap;
use std::time::Duration;

use engine_gateway::config::GatewayConfig;

fn load(vars: &[(&str, &str)]) -> Result<GatewayConfig, String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    GatewayConfig::from_lookup(|name| vars.get(name).cloned())
}

#[test]
fn defaults_apply_when_only_the_engine_is_named() {
    let config = load(&[("ENGINE_GATEWAY_ENGINE_ADDR", "127.0.0.1:9999")]).unwrap();

    assert_eq!(config.engine_addr, "127.0.0.1:9999");
    assert_eq!(config.socket_addr_string(), "0.0.0.0:8080");
    assert_eq!(config.connect_timeout, Duration::from_secs(5));
    assert_eq!(config.max_body_bytes, 1024 * 1024);
    assert_eq!(config.log_filter, "info");
}

#[test]
fn engine_address_is_required() {
    let err = load(&[("ENGINE_GATEWAY_PORT", "9000")]).unwrap_err();
    assert!(err.contains("ENGINE_GATEWAY_ENGINE_ADDR"), "{err}");
}

#[test]
fn zero_limits_are_rejected() {
    for name in ["ENGINE_GATEWAY_MAX_BODY_BYTES", "ENGINE_GATEWAY_CONNECT_TIMEOUT_SECS"] {
        let err = load(&[("ENGINE_GATEWAY_ENGINE_ADDR", "e:1"), (name, "0")]).unwrap_err();
        assert_eq!(err, format!("{name} must be a positive integer"));
    }
}

#[test]
fn non_numeric_limits_are_rejected() {
    let err = load(&[
        ("ENGINE_GATEWAY_ENGINE_ADDR", "e:1"),
        ("ENGINE_GATEWAY_MAX_BODY_BYTES", "-1"),
    ])
    .unwrap_err();
    assert_eq!(err, "ENGINE_GATEWAY_MAX_BODY_BYTES must be a positive integer");
}

#[test]
fn largest_body_limit_is_accepted() {
    let max = usize::MAX.to_string();
    let config = load(&[
        ("ENGINE_GATEWAY_ENGINE_ADDR", "e:1"),
        ("ENGINE_GATEWAY_MAX_BODY_BYTES", max.as_str()),
    ])
    .unwrap();
    assert_eq!(config.max_body_bytes, usize::MAX);
}
