//! Core types for portal-info

use serde::Serialize;

/// Installer type reported when the configured value is blank.
pub const DEFAULT_INSTALLER_TYPE: &str = "inno";

/// Release metadata served to the portal client.
///
/// Values are normalized once at startup; see [`normalize_installer_type`],
/// [`normalize_sha256`] and [`parse_mandatory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseInfo {
    pub version: String,
    pub release_date: String,
    pub changelog: String,
    pub installer_type: String,
    pub sha256: String,
    pub mandatory: bool,
    pub min_supported: String,
}

/// Body of a successful `GET /api/portal-info`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PortalInfo {
    pub version: String,
    pub release_date: String,
    pub changelog: String,
    pub installer_url: String,
    pub installer_type: String,
    pub sha256: String,
    pub mandatory: bool,
    pub min_supported: String,
}

impl PortalInfo {
    pub fn new(release: &ReleaseInfo, installer_url: String) -> Self {
        Self {
            version: release.version.clone(),
            release_date: release.release_date.clone(),
            changelog: release.changelog.clone(),
            installer_url,
            installer_type: release.installer_type.clone(),
            sha256: release.sha256.clone(),
            mandatory: release.mandatory,
            min_supported: release.min_supported.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy",
            message: "API is running",
        }
    }
}

/// `{error, message}` envelope shared by every error response.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: &'static str,
}

impl ErrorBody {
    pub fn unauthorized() -> Self {
        Self {
            error: "Unauthorized",
            message: "API key is required and must be valid",
        }
    }

    pub fn not_found() -> Self {
        Self {
            error: "Not Found",
            message: "Endpoint not found",
        }
    }

    pub fn internal() -> Self {
        Self {
            error: "Internal Server Error",
            message: "Something went wrong",
        }
    }
}

/// `"true"` in any letter case is true; every other value, including an
/// absent one, is false.
pub fn parse_mandatory(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

/// Trimmed and lower-cased, falling back to [`DEFAULT_INSTALLER_TYPE`].
pub fn normalize_installer_type(value: Option<&str>) -> String {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v.to_lowercase(),
        None => DEFAULT_INSTALLER_TYPE.to_string(),
    }
}

/// Trimmed and upper-cased hex digest.
pub fn normalize_sha256(value: Option<&str>) -> String {
    value.unwrap_or_default().trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release() -> ReleaseInfo {
        ReleaseInfo {
            version: "2.4.1".into(),
            release_date: "2024-05-01".into(),
            changelog: "Bug fixes".into(),
            installer_type: "inno".into(),
            sha256: "ABCDEF".into(),
            mandatory: true,
            min_supported: "2.0.0".into(),
        }
    }

    #[test]
    fn mandatory_accepts_true_in_any_case() {
        assert!(parse_mandatory(Some("true")));
        assert!(parse_mandatory(Some("TRUE")));
        assert!(parse_mandatory(Some("True")));
    }

    #[test]
    fn mandatory_rejects_everything_else() {
        assert!(!parse_mandatory(None));
        assert!(!parse_mandatory(Some("")));
        assert!(!parse_mandatory(Some("false")));
        assert!(!parse_mandatory(Some("1")));
        assert!(!parse_mandatory(Some("yes")));
    }

    #[test]
    fn installer_type_is_lowercased_with_default() {
        assert_eq!(normalize_installer_type(Some(" MSI ")), "msi");
        assert_eq!(normalize_installer_type(Some("   ")), "inno");
        assert_eq!(normalize_installer_type(None), "inno");
    }

    #[test]
    fn sha256_is_trimmed_and_uppercased() {
        assert_eq!(normalize_sha256(Some(" deadbeef ")), "DEADBEEF");
        assert_eq!(normalize_sha256(None), "");
    }

    #[test]
    fn portal_info_serializes_with_camel_case_fields() {
        let info = PortalInfo::new(&release(), "https://cdn.example.com/app.exe".into());
        let value = serde_json::to_value(&info).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "version": "2.4.1",
                "releaseDate": "2024-05-01",
                "changelog": "Bug fixes",
                "installerUrl": "https://cdn.example.com/app.exe",
                "installerType": "inno",
                "sha256": "ABCDEF",
                "mandatory": true,
                "minSupported": "2.0.0"
            })
        );
    }
}
