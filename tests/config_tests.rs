//! Configuration and rule loading tests

use route_acl::access_control::{Acl, RequestView, RuleTable};
use route_acl::config::{AclSettings, LogFormat, load_config, load_config_from_str};
use route_acl::error::ConfigError;
use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;

const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

const FULL_CONFIG: &str = r#"
[acl]
rules_path = "rules.json"
role_key = "account"
default_role = "guest"

[server]
host = "0.0.0.0"
port = 9000

[logging]
level = "debug"
format = "json"
"#;

fn write_temp(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_full_config() {
    let config = load_config_from_str(FULL_CONFIG).unwrap();

    let acl = config.acl.unwrap();
    assert_eq!(acl.rules_path.as_deref(), Some("rules.json"));
    assert_eq!(acl.role_key, "account");
    assert_eq!(acl.default_role.as_deref(), Some("guest"));

    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 9000);

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_load_config_from_file() {
    let file = write_temp(".toml", FULL_CONFIG);
    let config = load_config(file.path().to_str()).unwrap();
    assert_eq!(config.acl.unwrap().role_key, "account");
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    let file = write_temp(".toml", FULL_CONFIG);

    // SAFETY: serialized with other env-mutating tests
    unsafe {
        std::env::set_var("ROUTE_ACL_ACL__DEFAULT_ROLE", "visitor");
    }
    let config = load_config(file.path().to_str());
    unsafe {
        std::env::remove_var("ROUTE_ACL_ACL__DEFAULT_ROLE");
    }

    let acl = config.unwrap().acl.unwrap();
    assert_eq!(acl.default_role.as_deref(), Some("visitor"));
    assert_eq!(acl.role_key, "account");
}

#[test]
fn test_acl_loads_json_rules() {
    let acl = Acl::new(&AclSettings::new(format!("{}/rules.json", FIXTURES))).unwrap();

    assert_eq!(acl.table().role_count(), 4);
    assert_eq!(
        acl.table().role_names(),
        vec!["admin", "guest", "nobody", "user"]
    );
    assert!(acl.rules_path().is_some());
    assert_eq!(acl.role_key(), "user");
    assert!(acl.default_role().is_none());
}

#[test]
fn test_acl_loads_toml_rules() {
    let acl = Acl::new(&AclSettings::new(format!("{}/rules.toml", FIXTURES))).unwrap();

    let mut request = RequestView::new("GET", "/test/test2").with_role("user");
    assert!(acl.authorize(&mut request).is_allowed());
}

#[test]
fn test_acl_requires_rules_path() {
    let err = Acl::new(&AclSettings::default()).unwrap_err();
    assert!(matches!(err, ConfigError::Missing { .. }));
}

#[test]
fn test_acl_rejects_role_key_outside_header_syntax() {
    let settings = AclSettings {
        role_key: "my user".to_string(),
        ..AclSettings::new(format!("{}/rules.json", FIXTURES))
    };

    let err = Acl::new(&settings).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }));
}

#[test]
fn test_unreadable_rules_file() {
    let err = Acl::new(&AclSettings::new("wrong/path")).unwrap_err();
    assert!(matches!(err, ConfigError::Load(_)));
    assert!(err.to_string().contains("Could not read rules file"));
}

#[test]
fn test_broken_rules_file() {
    let err = Acl::new(&AclSettings::new(format!("{}/broken-rules.json", FIXTURES))).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }));
    assert!(
        err.to_string()
            .contains("Invalid rule file given. Make sure the file is a proper JSON")
    );
}

#[test]
fn test_rule_missing_action() {
    let file = write_temp(
        ".json",
        r#"{ "user": [ { "route": "/test", "methods": ["GET"] } ] }"#,
    );

    let err = RuleTable::from_path(file.path()).unwrap_err();
    assert!(err.to_string().contains("action"));
}

#[test]
fn test_document_must_map_roles_to_lists() {
    let file = write_temp(".json", r#"{ "user": { "route": "/test" } }"#);
    assert!(RuleTable::from_path(file.path()).is_err());

    let file = write_temp(".json", r#"[ { "route": "/test" } ]"#);
    assert!(RuleTable::from_path(file.path()).is_err());
}

#[test]
fn test_methods_must_be_wildcard_or_list() {
    let file = write_temp(
        ".json",
        r#"{ "user": [ { "route": "/test", "methods": "GET", "action": "allow" } ] }"#,
    );
    assert!(RuleTable::from_path(file.path()).is_err());
}
