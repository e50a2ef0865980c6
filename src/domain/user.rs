use serde::{Deserialize, Serialize};

/// Minimum password length accepted by sign-up, and the threshold above
/// which sign-in lets any password through.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Registered user. The password is kept in plain text; this is a demo
/// credential store, not a security boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_email: String,
    pub user_name: String,
}

/// Name shown on the dashboard greeting: everything before the `@`.
pub fn display_name(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_strips_domain() {
        assert_eq!(display_name("alice@example.com"), "alice");
    }

    #[test]
    fn test_display_name_without_at_sign() {
        assert_eq!(display_name("User"), "User");
    }

    #[test]
    fn test_account_serializes_camel_case() {
        let account = Account {
            email: "a@b.com".to_string(),
            password: "secret1".to_string(),
            name: "A".to_string(),
            phone: "123".to_string(),
        };
        let value = serde_json::to_value(&account).unwrap();
        assert_eq!(value["email"], "a@b.com");
        assert_eq!(value["phone"], "123");
    }

    #[test]
    fn test_sign_up_request_accepts_confirm_password_key() {
        let req: SignUpRequest = serde_json::from_value(serde_json::json!({
            "name": "Ann",
            "email": "ann@example.com",
            "phone": "555",
            "password": "secret1",
            "confirmPassword": "secret1"
        }))
        .unwrap();
        assert_eq!(req.confirm_password, "secret1");
    }
}
