//! Configuration loader with layered sources
//!
//! Loads configuration from multiple sources with the following precedence
//! (highest to lowest):
//! 1. Environment variables (ROUTE_ACL_*)
//! 2. Configuration file (TOML)
//! 3. Default values

use crate::config::types::AppConfig;
use crate::error::ConfigError;
use config::{Config, Environment, File, FileFormat};
use std::path::Path;

/// Default configuration file paths to check (in order)
const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "route-acl.toml",
    ".route-acl.toml",
    "~/.config/route-acl/config.toml",
    "/etc/route-acl/config.toml",
];

/// Prefix for environment overrides, e.g. ROUTE_ACL_ACL__DEFAULT_ROLE
const ENV_PREFIX: &str = "ROUTE_ACL";

/// Load configuration from a TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from_str(toml_str, FileFormat::Toml))
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Load configuration from files and environment
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        // Explicit path provided - must exist
        if !Path::new(path).exists() {
            return Err(ConfigError::Load(format!(
                "Configuration file not found: {}",
                path
            )));
        }
        builder = builder.add_source(File::new(path, FileFormat::Toml));
    } else {
        // First existing default path wins
        for path in DEFAULT_CONFIG_PATHS {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                builder = builder.add_source(File::new(&expanded, FileFormat::Toml));
                break;
            }
        }
    }

    // Double underscore (__) maps to nested keys (acl.rules_path)
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Validate configuration values
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    let Some(acl) = &config.acl else {
        return Err(ConfigError::Missing {
            field: "acl (Please supply a configuration object)".to_string(),
        });
    };

    if acl.rules_path.as_deref().is_none_or(str::is_empty) {
        return Err(ConfigError::Missing {
            field: "acl.rules_path (Please supply the route to the ACL Rules)".to_string(),
        });
    }

    acl.validate_role_key()?;

    if config.server.port == 0 {
        return Err(ConfigError::Invalid {
            message: "server.port must be greater than 0".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::AclSettings;

    #[test]
    fn test_load_config_from_str_basic() {
        let toml = r#"
[acl]
rules_path = "rules.json"
default_role = "guest"

[server]
port = 8080
"#;

        let config = load_config_from_str(toml).unwrap();
        let acl = config.acl.unwrap();
        assert_eq!(acl.rules_path.as_deref(), Some("rules.json"));
        assert_eq!(acl.role_key, "user");
        assert_eq!(acl.default_role.as_deref(), Some("guest"));
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_missing_acl_section() {
        let err = load_config_from_str("[server]\nport = 8080\n").unwrap_err();
        assert!(err.to_string().contains("Please supply a configuration object"));
    }

    #[test]
    fn test_missing_rules_path() {
        let err = load_config_from_str("[acl]\ndefault_role = \"guest\"\n").unwrap_err();
        assert!(err.to_string().contains("Please supply the route to the ACL Rules"));
    }

    #[test]
    fn test_empty_role_key() {
        let config = AppConfig {
            acl: Some(AclSettings {
                role_key: " ".to_string(),
                ..AclSettings::new("rules.json")
            }),
            ..Default::default()
        };

        assert!(matches!(
            validate_config(&config).unwrap_err(),
            ConfigError::Invalid { .. }
        ));
    }

    #[test]
    fn test_role_key_must_form_header_name() {
        let config = AppConfig {
            acl: Some(AclSettings {
                role_key: "my user".to_string(),
                ..AclSettings::new("rules.json")
            }),
            ..Default::default()
        };

        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("x-my user-role"));

        let config = AppConfig {
            acl: Some(AclSettings {
                role_key: "Account".to_string(),
                ..AclSettings::new("rules.json")
            }),
            ..Default::default()
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_port() {
        let toml = r#"
[acl]
rules_path = "rules.json"

[server]
port = 0
"#;

        assert!(load_config_from_str(toml).is_err());
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let err = load_config(Some("definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }
}
