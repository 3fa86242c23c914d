use serde::Deserialize;

use crate::config;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("identity provider request failed: {0}")]
	Http(#[from] reqwest::Error),
}

/// The subset of the provider profile this application stores.
#[derive(Debug, Deserialize)]
pub struct Profile {
	pub id: String,
	pub email: String,
	pub name: String,
	pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
	access_token: String,
}

/// Builds the consent-screen URL the client is redirected to.
pub fn authorize_url(google: &config::Google) -> String {
	reqwest::Url::parse_with_params(
		AUTHORIZE_URL,
		[
			("client_id", google.client_id.as_str()),
			("redirect_uri", google.callback_url.as_str()),
			("response_type", "code"),
			("scope", "openid email profile"),
		],
	)
	.expect("authorize url must parse")
	.into()
}

/// Exchanges an authorization code for the user's profile.
pub async fn fetch_profile(
	http: &reqwest::Client,
	google: &config::Google,
	code: &str,
) -> Result<Profile, Error> {
	let token = http
		.post(TOKEN_URL)
		.form(&[
			("client_id", google.client_id.as_str()),
			("client_secret", google.client_secret.as_str()),
			("redirect_uri", google.callback_url.as_str()),
			("grant_type", "authorization_code"),
			("code", code),
		])
		.send()
		.await?
		.error_for_status()?
		.json::<TokenResponse>()
		.await?;

	Ok(http
		.get(USERINFO_URL)
		.bearer_auth(token.access_token)
		.send()
		.await?
		.error_for_status()?
		.json()
		.await?)
}

#[cfg(test)]
mod test {
	use crate::config;

	#[test]
	fn test_authorize_url_carries_client_and_redirect() {
		let url = super::authorize_url(&config::Google {
			client_id: "client".into(),
			client_secret: "secret".into(),
			callback_url: "http://localhost:3000/auth/google/callback".into(),
		});

		assert!(url.starts_with(super::AUTHORIZE_URL));
		assert!(url.contains("client_id=client"));
		assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fgoogle%2Fcallback"));
		assert!(url.contains("scope=openid+email+profile"));
		// The secret is never part of the redirect.
		assert!(!url.contains("secret"));
	}
}
