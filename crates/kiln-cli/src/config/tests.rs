#[cfg(test)]
mod tests {
    use crate::cli::StartArgs;
    use crate::config::loading::camel_case;
    use crate::config::*;
    use serial_test::serial;
    use std::fs;
    use std::net::{IpAddr, Ipv4Addr};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("dist")).unwrap();
        dir
    }

    #[test]
    fn test_serialization_uses_camel_case() {
        let json_val = serde_json::to_value(KilnConfig::default()).unwrap();
        assert!(json_val.get("portStart").is_some());
        assert!(json_val.get("debounceMs").is_some());
        assert!(json_val.get("port_start").is_none());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result: Result<KilnConfig, _> = serde_json::from_str(r#"{"portStart": 1, "bogus": 2}"#);
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_defaults_without_file() {
        let dir = project();
        let config = KilnConfig::load_from(&StartArgs::default(), false, dir.path()).unwrap();

        assert_eq!(config.root, dir.path().join("dist"));
        assert_eq!(config.ports(), 8080..=9000);
        assert_eq!(config.host, "127.0.0.1");
        assert!(!config.quiet);
        config.validate().unwrap();
    }

    #[test]
    #[serial]
    fn test_file_then_cli_priority() {
        let dir = project();
        fs::create_dir(dir.path().join("public")).unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{ "root": "public", "portStart": 3000, "portEnd": 3100, "debounceMs": 50 }"#,
        )
        .unwrap();

        let from_file = KilnConfig::load_from(&StartArgs::default(), false, dir.path()).unwrap();
        assert_eq!(from_file.root, dir.path().join("public"));
        assert_eq!(from_file.ports(), 3000..=3100);
        assert_eq!(from_file.debounce_ms, 50);

        let args = StartArgs {
            root: Some(PathBuf::from("dist")),
            port: Some(4000),
            ..StartArgs::default()
        };
        let config = KilnConfig::load_from(&args, true, dir.path()).unwrap();
        assert_eq!(config.root, dir.path().join("dist"));
        assert_eq!(config.ports(), 4000..=3100);
        assert!(config.quiet);
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let dir = project();
        fs::write(dir.path().join(CONFIG_FILE), r#"{ "portStart": 3000 }"#).unwrap();

        unsafe { std::env::set_var("KILN_PORT_START", "5000") };
        let config = KilnConfig::load_from(&StartArgs::default(), false, dir.path());
        unsafe { std::env::remove_var("KILN_PORT_START") };

        assert_eq!(config.unwrap().port_start, 5000);
    }

    #[test]
    #[serial]
    fn test_explicit_config_must_exist() {
        let dir = project();
        let args = StartArgs {
            config: Some(PathBuf::from("missing.json")),
            ..StartArgs::default()
        };

        let err = KilnConfig::load_from(&args, false, dir.path()).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    #[serial]
    fn test_invalid_json_reports_configuration_error() {
        let dir = project();
        fs::write(dir.path().join(CONFIG_FILE), r#"{ "portStart": "eighty" }"#).unwrap();

        let err = KilnConfig::load_from(&StartArgs::default(), false, dir.path()).unwrap_err();
        assert!(err.to_string().contains("configuration"));
    }

    #[test]
    fn test_validation() {
        let dir = project();
        let base = KilnConfig {
            root: dir.path().join("dist"),
            ..KilnConfig::default()
        };
        base.validate().unwrap();

        assert!(KilnConfig {
            root: dir.path().join("nope"),
            ..base.clone()
        }
        .validate()
        .is_err());

        assert!(KilnConfig {
            host: "not an ip".to_string(),
            ..base.clone()
        }
        .validate()
        .is_err());

        assert!(KilnConfig {
            port_start: 0,
            port_end: 10,
            ..base.clone()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_host_addr() {
        let config = KilnConfig {
            host: "localhost".to_string(),
            ..KilnConfig::default()
        };
        assert_eq!(config.host_addr().unwrap(), IpAddr::V4(Ipv4Addr::LOCALHOST));

        let config = KilnConfig {
            host: "0.0.0.0".to_string(),
            ..KilnConfig::default()
        };
        assert_eq!(config.host_addr().unwrap(), IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("port_start"), "portStart");
        assert_eq!(camel_case("watch_ignore"), "watchIgnore");
        assert_eq!(camel_case("root"), "root");
    }
}
