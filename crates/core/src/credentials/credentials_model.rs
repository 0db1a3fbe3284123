use chrono::{DateTime, Utc};

/// The single Upstox access credential the gateway authenticates with.
///
/// Instances are created by a credential store on `put` and never mutated
/// afterwards. Tokens are redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub id: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Credential {
    /// Whether the credential can no longer be used at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("expires_at", &self.expires_at)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Credential data as issued by the provider, before the store stamps it.
#[derive(Clone, PartialEq, Eq)]
pub struct NewCredential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl NewCredential {
    /// Stamp the credential with a fresh id and the given creation time.
    pub fn into_credential(self, created_at: DateTime<Utc>) -> Credential {
        Credential {
            id: uuid::Uuid::new_v4().to_string(),
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: self.expires_at,
            created_at,
        }
    }
}

impl std::fmt::Debug for NewCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewCredential")
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn debug_output_redacts_tokens() {
        let credential = NewCredential {
            access_token: "eyJ0eXAiOiJKV1Qi".to_string(),
            refresh_token: Some("refresh-secret".to_string()),
            expires_at: Utc::now(),
        }
        .into_credential(Utc::now());

        let rendered = format!("{:?}", credential);
        assert!(!rendered.contains("eyJ0eXAiOiJKV1Qi"));
        assert!(!rendered.contains("refresh-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let now = Utc::now();
        let credential = NewCredential {
            access_token: "token".to_string(),
            refresh_token: None,
            expires_at: now,
        }
        .into_credential(now - Duration::hours(1));

        assert!(credential.is_expired_at(now));
        assert!(!credential.is_expired_at(now - Duration::seconds(1)));
    }
}
