//! Dashboard data types
//!
//! Records and payloads as the dashboard API serves them. Field names follow
//! the API's camelCase on the wire.

use crate::collection::{string_or_number, Record};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Status given to a drafted user when none is chosen
pub const DEFAULT_USER_STATUS: &str = "active";

/// A platform user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub status: String,
    /// As sent by the API; RFC 3339 or a bare `YYYY-MM-DD`
    #[serde(default)]
    pub join_date: Option<String>,
}

impl User {
    /// `active` users get the completed badge, everything else pending
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }

    /// Calendar day the user joined, if the API date is readable
    pub fn joined_on(&self) -> Option<NaiveDate> {
        let raw = self.join_date.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.date_naive())
            .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
            .ok()
    }
}

/// Fields a user fills in the "Add New User" form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDraft {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub status: String,
}

impl Record for User {
    const COLLECTION: &'static str = "users";
    type Draft = UserDraft;

    fn id(&self) -> &str {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str()]
    }

    fn discriminator(&self) -> &str {
        &self.status
    }

    fn from_draft(draft: UserDraft, id: String, now: DateTime<Utc>) -> Self {
        let status = if draft.status.trim().is_empty() {
            DEFAULT_USER_STATUS.to_string()
        } else {
            draft.status
        };
        Self {
            id,
            name: draft.name,
            email: draft.email,
            status,
            join_date: Some(now.to_rfc3339()),
        }
    }
}

/// A catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub sales: u64,
}

/// Fields for the "Add Product" form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub price: f64,
}

impl Record for Product {
    const COLLECTION: &'static str = "products";
    type Draft = ProductDraft;

    fn id(&self) -> &str {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.category.as_str()]
    }

    fn discriminator(&self) -> &str {
        &self.category
    }

    fn from_draft(draft: ProductDraft, id: String, _now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            category: draft.category,
            price: draft.price,
            sales: 0,
        }
    }
}

/// One day of traffic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsPoint {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub conversions: u64,
}

/// Headline numbers for the overview stat cards
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub active_users: u64,
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub growth: f64,
}

/// Response of `GET /api/dashboard`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardPayload {
    #[serde(default)]
    pub overview: Overview,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub analytics: Vec<AnalyticsPoint>,
}

/// Body of `POST /api/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response of `POST /api/login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, deserialize_with = "optional_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// The signed-in user kept next to the token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Option<String>,
    pub email: Option<String>,
}

fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapped(#[serde(deserialize_with = "string_or_number")] String);

    Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(id)| id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_from_api() {
        let user: User = serde_json::from_value(json!({
            "id": 3,
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "status": "active",
            "joinDate": "2024-03-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(user.id, "3");
        assert!(user.is_active());
        assert_eq!(user.joined_on(), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(user.search_fields(), vec!["Ada Lovelace", "ada@example.com"]);
    }

    #[test]
    fn test_user_draft_defaults() {
        let now = Utc::now();
        let user = User::from_draft(
            UserDraft {
                name: "Gamma".to_string(),
                ..Default::default()
            },
            "abc".to_string(),
            now,
        );
        assert_eq!(user.status, DEFAULT_USER_STATUS);
        assert_eq!(user.joined_on(), Some(now.date_naive()));
    }

    #[test]
    fn test_joined_on_accepts_bare_dates() {
        let mut user: User = serde_json::from_value(json!({
            "id": "1", "name": "A", "joinDate": "2023-11-26"
        }))
        .unwrap();
        assert_eq!(user.joined_on(), NaiveDate::from_ymd_opt(2023, 11, 26));

        user.join_date = Some("last tuesday".to_string());
        assert!(user.joined_on().is_none());
    }

    #[test]
    fn test_product_draft_starts_without_sales() {
        let product = Product::from_draft(
            ProductDraft {
                name: "Pro Plan".to_string(),
                category: "subscription".to_string(),
                price: 29.0,
            },
            "p1".to_string(),
            Utc::now(),
        );
        assert_eq!(product.sales, 0);
        assert_eq!(product.discriminator(), "subscription");
    }

    #[test]
    fn test_dashboard_payload_tolerates_missing_sections() {
        let payload: DashboardPayload = serde_json::from_value(json!({
            "overview": {"totalUsers": 1200, "activeUsers": 800, "revenue": 45200.0, "growth": 12.5}
        }))
        .unwrap();
        assert_eq!(payload.overview.total_users, 1200);
        assert!(payload.users.is_empty());
        assert!(payload.analytics.is_empty());
    }

    #[test]
    fn test_login_response_numeric_id() {
        let response: LoginResponse =
            serde_json::from_value(json!({"token": "t", "id": 4, "email": "a@b.c"})).unwrap();
        assert_eq!(response.id.as_deref(), Some("4"));

        let response: LoginResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.token.is_none());
        assert!(response.id.is_none());
    }
}
