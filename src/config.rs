use std::env;

/// Runtime configuration, read once from the environment at startup.
///
/// A missing required variable is fatal: the process terminates before
/// binding the listener.
#[derive(Debug, Clone)]
pub struct Config {
	pub port: u16,
	pub database_url: String,
	pub jwt_secret: String,
	/// Origin the client is served from; used for CORS and the OAuth
	/// redirects back into the single-page app.
	pub frontend_url: String,
	pub google: Google,
	pub images: Images,
}

/// OAuth client registration with the identity provider.
#[derive(Debug, Clone)]
pub struct Google {
	pub client_id: String,
	pub client_secret: String,
	pub callback_url: String,
}

/// Credentials for the external image hosting service.
#[derive(Debug, Clone)]
pub struct Images {
	pub cloud_name: String,
	pub api_key: String,
	pub api_secret: String,
	pub folder: String,
}

impl Config {
	pub fn from_env() -> Self {
		Self {
			port: env::var("PORT").map_or(3000, |port| port.parse().expect("PORT must be a number")),
			database_url: require("DATABASE_URL"),
			jwt_secret: require("JWT_SECRET"),
			frontend_url: env::var("FRONTEND_URL")
				.unwrap_or_else(|_| "http://localhost:3000".into()),
			google: Google {
				client_id: require("GOOGLE_CLIENT_ID"),
				client_secret: require("GOOGLE_CLIENT_SECRET"),
				callback_url: require("GOOGLE_CALLBACK_URL"),
			},
			images: Images {
				cloud_name: require("CLOUDINARY_CLOUD_NAME"),
				api_key: require("CLOUDINARY_API_KEY"),
				api_secret: require("CLOUDINARY_API_SECRET"),
				folder: env::var("CLOUDINARY_FOLDER").unwrap_or_else(|_| "blog-app".into()),
			},
		}
	}
}

fn require(key: &str) -> String {
	env::var(key).unwrap_or_else(|_| panic!("{key} must be set"))
}
