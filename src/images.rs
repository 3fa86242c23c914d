use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config;

/// Images wider or taller than this are scaled down by the service.
const TRANSFORMATION: &str = "c_limit,h_800,q_auto:good,w_1200";

/// Client for the external image hosting service (Cloudinary's upload
/// API). Uploads accept raw bytes and return a stable delivery URL;
/// deletion is by the public id returned at upload time.
#[derive(Debug, Clone)]
pub struct ImageService {
	http: reqwest::Client,
	config: config::Images,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("image service request failed: {0}")]
	Http(#[from] reqwest::Error),
	#[error("image service rejected the request: {0}")]
	Upstream(reqwest::StatusCode),
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UploadedImage {
	#[serde(rename(deserialize = "secure_url"))]
	pub url: String,
	pub public_id: String,
}

impl ImageService {
	pub fn new(http: reqwest::Client, config: config::Images) -> Self {
		Self { http, config }
	}

	/// Uploads one image, returning its delivery URL and public id.
	pub async fn upload(&self, data: Vec<u8>, filename: &str) -> Result<UploadedImage, Error> {
		let timestamp = chrono::Utc::now().timestamp().to_string();
		let signature = self.sign(&[
			("folder", &self.config.folder),
			("timestamp", &timestamp),
			("transformation", TRANSFORMATION),
		]);

		let form = reqwest::multipart::Form::new()
			.text("api_key", self.config.api_key.clone())
			.text("timestamp", timestamp)
			.text("folder", self.config.folder.clone())
			.text("transformation", TRANSFORMATION)
			.text("signature", signature)
			.text("signature_algorithm", "sha256")
			.part(
				"file",
				reqwest::multipart::Part::bytes(data).file_name(filename.to_owned()),
			);

		let response = self
			.http
			.post(format!(
				"https://api.cloudinary.com/v1_1/{}/image/upload",
				self.config.cloud_name
			))
			.multipart(form)
			.send()
			.await?;

		if !response.status().is_success() {
			return Err(Error::Upstream(response.status()));
		}

		Ok(response.json().await?)
	}

	/// Deletes a previously uploaded image by its public id.
	pub async fn delete(&self, public_id: &str) -> Result<(), Error> {
		let timestamp = chrono::Utc::now().timestamp().to_string();
		let signature = self.sign(&[("public_id", public_id), ("timestamp", &timestamp)]);

		let response = self
			.http
			.post(format!(
				"https://api.cloudinary.com/v1_1/{}/image/destroy",
				self.config.cloud_name
			))
			.form(&[
				("public_id", public_id),
				("api_key", &self.config.api_key),
				("timestamp", &timestamp),
				("signature", &signature),
				("signature_algorithm", "sha256"),
			])
			.send()
			.await?;

		if !response.status().is_success() {
			return Err(Error::Upstream(response.status()));
		}

		Ok(())
	}

	/// Signs request parameters: `key=value` pairs in key order joined
	/// by `&`, followed by the API secret, hashed and hex-encoded.
	fn sign(&self, params: &[(&str, &str)]) -> String {
		let mut params = params.to_vec();
		params.sort_unstable();

		let serialized = params
			.iter()
			.map(|(key, value)| format!("{key}={value}"))
			.collect::<Vec<_>>()
			.join("&");

		let mut hasher = Sha256::new();
		hasher.update(serialized);
		hasher.update(&self.config.api_secret);
		hex::encode(hasher.finalize())
	}
}

#[cfg(test)]
mod test {
	use crate::config;

	use super::ImageService;

	fn service() -> ImageService {
		ImageService::new(
			reqwest::Client::new(),
			config::Images {
				cloud_name: "demo".into(),
				api_key: "key".into(),
				api_secret: "secret".into(),
				folder: "blog-app".into(),
			},
		)
	}

	#[test]
	fn test_signature_is_deterministic() {
		let service = service();

		let first = service.sign(&[("timestamp", "1700000000"), ("public_id", "blog-app/a")]);
		let second = service.sign(&[("public_id", "blog-app/a"), ("timestamp", "1700000000")]);

		// Parameter order must not affect the signature.
		assert_eq!(first, second);
		assert_eq!(first.len(), 64);
		assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
	}

	#[test]
	fn test_signature_depends_on_parameters() {
		let service = service();

		let first = service.sign(&[("timestamp", "1700000000")]);
		let second = service.sign(&[("timestamp", "1700000001")]);

		assert_ne!(first, second);
	}
}
