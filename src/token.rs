use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bearer tokens expire seven days after they are issued.
pub const TOKEN_TTL_DAYS: i64 = 7;

/// Claims carried by a bearer token: the subject user id and the
/// expiry timestamp.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
	pub sub: Uuid,
	pub exp: i64,
}

/// Issues a signed bearer token for the user.
pub fn issue(secret: &str, user_id: Uuid) -> Result<String, jsonwebtoken::errors::Error> {
	let claims = Claims {
		sub: user_id,
		exp: (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
	};

	jsonwebtoken::encode(
		&Header::default(),
		&claims,
		&EncodingKey::from_secret(secret.as_bytes()),
	)
}

/// Verifies a bearer token's signature and expiry, returning its claims.
pub fn verify(secret: &str, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
	jsonwebtoken::decode::<Claims>(
		token,
		&DecodingKey::from_secret(secret.as_bytes()),
		&Validation::default(),
	)
	.map(|data| data.claims)
}

#[cfg(test)]
mod test {
	use chrono::{Duration, Utc};
	use jsonwebtoken::errors::ErrorKind;
	use uuid::Uuid;

	use super::{issue, verify, Claims};

	const SECRET: &str = "test-secret";

	#[test]
	fn test_roundtrip() {
		let user_id = Uuid::new_v4();
		let token = issue(SECRET, user_id).unwrap();
		let claims = verify(SECRET, &token).unwrap();

		assert_eq!(claims.sub, user_id);
		assert!(claims.exp > Utc::now().timestamp());
	}

	#[test]
	fn test_rejects_wrong_secret() {
		let token = issue(SECRET, Uuid::new_v4()).unwrap();
		let error = verify("other-secret", &token).unwrap_err();

		assert!(matches!(error.kind(), ErrorKind::InvalidSignature));
	}

	#[test]
	fn test_rejects_expired() {
		let claims = Claims {
			sub: Uuid::new_v4(),
			// Past the decoder's default leeway.
			exp: (Utc::now() - Duration::minutes(5)).timestamp(),
		};

		let token = jsonwebtoken::encode(
			&jsonwebtoken::Header::default(),
			&claims,
			&jsonwebtoken::EncodingKey::from_secret(SECRET.as_bytes()),
		)
		.unwrap();

		let error = verify(SECRET, &token).unwrap_err();

		assert!(matches!(error.kind(), ErrorKind::ExpiredSignature));
	}

	#[test]
	fn test_rejects_garbage() {
		assert!(verify(SECRET, "not-a-token").is_err());
	}
}
