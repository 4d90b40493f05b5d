// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tests for publication configuration.

#[cfg(test)]
mod tests {
    use crate::config::{PublishConfig, ZoneSelection};
    use crate::constants::{DEFAULT_CLAIM_TTL_SECS, DNS_PORT};
    use crate::errors::PublishError;
    use hickory_client::rr::Name;
    use std::io::Write;
    use std::path::PathBuf;
    use std::str::FromStr;
    use std::time::Duration;

    #[test]
    fn test_defaults_without_update() {
        let settings = PublishConfig::default().settings().unwrap();

        assert!(!settings.update_enabled());
        assert_eq!(settings.ttl, DEFAULT_CLAIM_TTL_SECS);
        assert_eq!(settings.ttl, 3600);
        assert_eq!(settings.port, DNS_PORT);
        assert_eq!(settings.timeout, Duration::from_secs(5));
        assert!(settings.server.is_none());
    }

    #[test]
    fn test_zone_and_label_strip_count_ignored_without_update() {
        let config = PublishConfig {
            zone: Some("example.com".to_string()),
            label_strip_count: Some(2),
            ..Default::default()
        };

        assert!(config.settings().unwrap().zone_selection.is_none());
    }

    #[test]
    fn test_update_with_explicit_zone() {
        let config = PublishConfig {
            update: true,
            zone: Some("asn.example".to_string()),
            ..Default::default()
        };

        let settings = config.settings().unwrap();

        assert_eq!(
            settings.zone_selection,
            Some(ZoneSelection::Explicit(Name::from_str("asn.example.").unwrap()))
        );
    }

    #[test]
    fn test_update_with_label_strip_count() {
        let config = PublishConfig {
            update: true,
            label_strip_count: Some(3),
            ..Default::default()
        };

        assert_eq!(
            config.settings().unwrap().zone_selection,
            Some(ZoneSelection::StripLabels(3))
        );
    }

    #[test]
    fn test_update_with_both_zone_and_label_strip_count_is_rejected() {
        let config = PublishConfig {
            update: true,
            zone: Some("example.com".to_string()),
            label_strip_count: Some(1),
            ..Default::default()
        };

        let err = config.settings().unwrap_err();

        assert!(matches!(err, PublishError::Configuration { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_update_with_neither_zone_nor_label_strip_count_is_rejected() {
        let config = PublishConfig {
            update: true,
            ..Default::default()
        };

        assert!(matches!(
            config.settings().unwrap_err(),
            PublishError::Configuration { .. }
        ));
    }

    #[test]
    fn test_root_zone_is_rejected() {
        let config = PublishConfig {
            update: true,
            zone: Some(".".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            config.settings().unwrap_err(),
            PublishError::Configuration { .. }
        ));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let config = PublishConfig {
            timeout_secs: Some(0),
            ..Default::default()
        };

        assert!(matches!(
            config.settings().unwrap_err(),
            PublishError::Configuration { .. }
        ));
    }

    #[test]
    fn test_merge_prefers_overrides() {
        let file = PublishConfig {
            update: true,
            zone: Some("file.example".to_string()),
            ttl: Some(60),
            server: Some("ns1.file.example".to_string()),
            ..Default::default()
        };
        let cli = PublishConfig {
            ttl: Some(120),
            port: Some(5353),
            ..Default::default()
        };

        let merged = file.merge(cli);

        assert!(merged.update);
        assert_eq!(merged.zone.as_deref(), Some("file.example"));
        assert_eq!(merged.ttl, Some(120));
        assert_eq!(merged.port, Some(5353));
        assert_eq!(merged.server.as_deref(), Some("ns1.file.example"));
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "update: true\nlabelStripCount: 3\nttl: 600\nserver: ns1.example.com\n\
             port: 5353\ntsigKeyFile: /etc/bind/diem.key\ntimeoutSecs: 2"
        )
        .unwrap();

        let config = PublishConfig::from_yaml_file(file.path()).unwrap();

        assert_eq!(
            config,
            PublishConfig {
                update: true,
                zone: None,
                label_strip_count: Some(3),
                ttl: Some(600),
                server: Some("ns1.example.com".to_string()),
                port: Some(5353),
                tsig_key_file: Some(PathBuf::from("/etc/bind/diem.key")),
                timeout_secs: Some(2),
            }
        );
    }

    #[test]
    fn test_from_yaml_file_rejects_unknown_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "update: true\nsubzoneLabels: 3").unwrap();

        let err = PublishConfig::from_yaml_file(file.path()).unwrap_err();

        assert!(matches!(err, PublishError::Configuration { .. }));
    }
}
