//! Mock session and profile types.

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Id given to every mock login.
pub const MOCK_USER_ID: &str = "user123";

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct UserAccount {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl UserAccount {
    /// Mock account for an email; the display name is its local part.
    pub fn mock(email: &str) -> Self {
        let email = email.trim();
        let name = email
            .split('@')
            .next()
            .filter(|local| !local.is_empty())
            .map(String::from);
        Self {
            id: MOCK_USER_ID.to_string(),
            email: email.to_string(),
            name,
        }
    }

    /// Name to greet the user with.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

/// Career summary and target institution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct ProfileData {
    #[serde(default)]
    pub career_summary: String,
    /// Professional engineering institution applied through
    #[serde(rename = "targetPEI", default)]
    pub target_pei: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_account() {
        let user = UserAccount::mock(" jo.bloggs@example.com ");
        assert_eq!(user.id, MOCK_USER_ID);
        assert_eq!(user.email, "jo.bloggs@example.com");
        assert_eq!(user.display_name(), "jo.bloggs");
    }

    #[test]
    fn test_profile_wire_names() {
        let profile = ProfileData {
            career_summary: "Ten years in rail signalling".to_string(),
            target_pei: "IET".to_string(),
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["careerSummary"], "Ten years in rail signalling");
        assert_eq!(json["targetPEI"], "IET");
    }
}
