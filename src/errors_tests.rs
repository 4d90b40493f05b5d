// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for publication error types.

#[cfg(test)]
mod tests {
    use crate::errors::PublishError;
    use hickory_client::op::ResponseCode;

    #[test]
    fn test_invalid_target_error_message() {
        let error = PublishError::invalid_target(
            "dns:_diem.42.asn.example?CLASS=IN;TYPE=A",
            "expected TYPE=TXT, found TYPE=A",
        );

        assert_eq!(
            error.to_string(),
            "Invalid target 'dns:_diem.42.asn.example?CLASS=IN;TYPE=A': expected TYPE=TXT, found TYPE=A"
        );
        assert_eq!(error.kind(), "InvalidTargetError");
    }

    #[test]
    fn test_resolution_error_names_zone() {
        let error = PublishError::Resolution {
            zone: "asn.example.".to_string(),
            reason: "no SOA record".to_string(),
        };

        assert!(error.to_string().contains("asn.example."));
        assert_eq!(error.kind(), "ResolutionError");
    }

    #[test]
    fn test_protocol_error_carries_response_code() {
        let error = PublishError::Protocol {
            zone: "example.com.".to_string(),
            server: "192.0.2.1:53".to_string(),
            code: ResponseCode::Refused,
        };

        assert!(matches!(
            error,
            PublishError::Protocol {
                code: ResponseCode::Refused,
                ..
            }
        ));
        assert!(error.to_string().contains("192.0.2.1:53"));
        assert!(error.to_string().contains("rejected"));
        assert_eq!(error.kind(), "ProtocolError");
    }

    #[test]
    fn test_only_configuration_errors_are_fatal() {
        assert!(PublishError::configuration("both zone and labelStripCount set").is_fatal());

        let per_record = [
            PublishError::decoding("bad json"),
            PublishError::invalid_target("dns:x", "bad"),
            PublishError::Resolution {
                zone: "example.com.".to_string(),
                reason: "timeout".to_string(),
            },
            PublishError::Transport {
                server: "192.0.2.1:53".to_string(),
                reason: "connection refused".to_string(),
            },
            PublishError::Protocol {
                zone: "example.com.".to_string(),
                server: "192.0.2.1:53".to_string(),
                code: ResponseCode::NotAuth,
            },
        ];
        for error in per_record {
            assert!(!error.is_fatal(), "{error} should not be fatal");
        }
    }

    #[test]
    fn test_serde_json_error_converts_to_decoding() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error: PublishError = json_err.into();

        assert_eq!(error.kind(), "DecodingError");
    }

    #[test]
    fn test_in_zone_attributes_resolution_errors_only() {
        let error = PublishError::Resolution {
            zone: String::new(),
            reason: "address lookup for ns1.example.com. failed".to_string(),
        }
        .in_zone("example.com.");

        assert_eq!(
            error,
            PublishError::Resolution {
                zone: "example.com.".to_string(),
                reason: "address lookup for ns1.example.com. failed".to_string(),
            }
        );

        let other = PublishError::decoding("bad json");
        assert_eq!(other.clone().in_zone("example.com."), other);
    }
}
