//! # Display Claims
//!
//! Reads the dashboard's session token so the UI can show who is signed in
//! and with which role.
//!
//! ## Trust Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Backend API ── issues & verifies JWT ──► real authorization           │
//! │                                                                         │
//! │  THIS MODULE ── reads payload only ──────► "Signed in as Priya (Admin)"│
//! │                                                                         │
//! │  The signature is NOT checked and expiry is NOT enforced here.         │
//! │  Nothing in this workspace grants or denies access based on these      │
//! │  values.                                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

use crate::error::ClaimsError;

// =============================================================================
// Role
// =============================================================================

/// Staff role as carried in the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Admin,
    Manager,
    Staff,
    /// Any role the dashboard does not know about, kept verbatim.
    Other(String),
}

impl Role {
    /// Parses a role name case-insensitively.
    pub fn parse(raw: &str) -> Role {
        match raw.trim().to_lowercase().as_str() {
            "admin" | "administrator" | "owner" => Role::Admin,
            "manager" => Role::Manager,
            "staff" | "cashier" | "employee" => Role::Staff,
            _ => Role::Other(raw.trim().to_string()),
        }
    }

    /// Machine name, as serialized.
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Staff => "staff",
            Role::Other(raw) => raw,
        }
    }

    /// Human label for the header badge.
    pub fn display_label(&self) -> &str {
        match self {
            Role::Admin => "Administrator",
            Role::Manager => "Manager",
            Role::Staff => "Staff",
            Role::Other(raw) => raw,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_label())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// =============================================================================
// Display Claims
// =============================================================================

/// The subset of a session token the dashboard displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayClaims {
    pub subject: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl DisplayClaims {
    /// Best available name: name, then email, then subject.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .or(self.subject.as_deref())
            .unwrap_or("Unknown user")
    }

    /// Whether the token's `exp` has passed. Cosmetic: used to prompt a
    /// re-login banner, never to block anything.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| exp <= now).unwrap_or(false)
    }
}

/// Token payload as issued by the backend. Field names vary between
/// backend versions, hence the aliases.
#[derive(Debug, Deserialize)]
struct RawClaims {
    #[serde(default)]
    sub: Option<Value>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default, rename = "_id")]
    mongo_id: Option<Value>,
    #[serde(default, alias = "userId")]
    user_id: Option<Value>,
    #[serde(default, alias = "username")]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    exp: Option<Value>,
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_to_timestamp(value: Value) -> Option<DateTime<Utc>> {
    let secs = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?,
        _ => return None,
    };
    Utc.timestamp_opt(secs, 0).single()
}

impl From<RawClaims> for DisplayClaims {
    fn from(raw: RawClaims) -> Self {
        let subject = [raw.sub, raw.id, raw.mongo_id, raw.user_id]
            .into_iter()
            .flatten()
            .find_map(value_to_string);

        DisplayClaims {
            subject,
            name: raw.name.filter(|s| !s.trim().is_empty()),
            email: raw.email.filter(|s| !s.trim().is_empty()),
            role: raw
                .role
                .filter(|s| !s.trim().is_empty())
                .map(|r| Role::parse(&r)),
            expires_at: raw.exp.and_then(value_to_timestamp),
        }
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Decodes the payload of a session token for display.
///
/// Accepts a bare token or an `Authorization` header value (`Bearer …`).
/// The signature is not verified and `exp` is not enforced.
///
/// ## Example
/// ```rust
/// use saree_core::claims::decode_display_claims;
///
/// assert!(decode_display_claims("").is_err());
/// assert!(decode_display_claims("not-a-jwt").is_err());
/// ```
pub fn decode_display_claims(token: &str) -> Result<DisplayClaims, ClaimsError> {
    let token = token.trim();
    let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();
    if token.is_empty() {
        return Err(ClaimsError::Empty);
    }

    let header = decode_header(token).map_err(|e| ClaimsError::Malformed(e.to_string()))?;

    let mut validation = Validation::new(header.alg);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<RawClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| ClaimsError::Malformed(e.to_string()))?;

    Ok(data.claims.into())
}

// =============================================================================
// Unit Tests
// =============================================================================
