use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Learner,
    Teacher,
    Admin,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Learner => write!(f, "learner"),
            UserRole::Teacher => write!(f, "teacher"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "learner" => Ok(UserRole::Learner),
            "teacher" => Ok(UserRole::Teacher),
            "admin" => Ok(UserRole::Admin),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
}

impl Claims {
    pub fn new(user_id: Uuid, role: UserRole, duration_secs: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user_id,
            role,
            iat: now,
            exp: now + duration_secs,
            jti: Uuid::now_v7(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// The authenticated caller, as established by the `AuthUser` extractor.
///
/// `id` is the auth-provider identity (what bookings store as
/// `teacher_auth_id` / `learner_auth_id`), not a row id in the teachers or
/// learners tables.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: UserRole,
    pub token_id: Uuid,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            role: claims.role,
            token_id: claims.jti,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_claims_carry_the_caller_and_a_fresh_token_id() {
        let user_id = Uuid::now_v7();
        let claims = Claims::new(user_id, UserRole::Teacher, 3600);

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, UserRole::Teacher);
        assert_eq!(claims.exp, claims.iat + 3600);
        assert_ne!(claims.jti, user_id);
    }

    #[test]
    fn expiry_follows_the_exp_timestamp() {
        let live = Claims::new(Uuid::now_v7(), UserRole::Learner, 3600);
        assert!(!live.is_expired());

        let stale = Claims::new(Uuid::now_v7(), UserRole::Learner, -3600);
        assert!(stale.is_expired());
    }

    #[test]
    fn auth_user_maps_sub_and_jti() {
        let claims = Claims::new(Uuid::now_v7(), UserRole::Admin, 60);
        let user = AuthUser::from(claims.clone());

        assert_eq!(user.id, claims.sub);
        assert_eq!(user.role, UserRole::Admin);
        assert_eq!(user.token_id, claims.jti);
    }
}
