use std::borrow::Cow;

use aide::{
	openapi::{SecurityScheme, Tag},
	transform::TransformOpenApi,
};

use crate::{error, extract::Json};

pub const SECURITY_SCHEME_BEARER: &str = "Bearer Token";

pub mod tag {
	pub const AUTH: &str = "Auth";
	pub const BLOG: &str = "Blog";
	pub const USER: &str = "User";
	pub const UPLOAD: &str = "Upload";
}

pub fn docs(api: TransformOpenApi) -> TransformOpenApi {
	api.title("Quill Open API")
		.summary("A blog publishing API")
		.description(include_str!("../README.md"))
		.tag(Tag {
			name: tag::AUTH.into(),
			description: Some("Sign-in and identity".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::BLOG.into(),
			description: Some("Blog management".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::USER.into(),
			description: Some("User profiles".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::UPLOAD.into(),
			description: Some("Image hosting".into()),
			..Default::default()
		})
		.security_scheme(
			SECURITY_SCHEME_BEARER,
			SecurityScheme::Http {
				scheme: "bearer".into(),
				bearer_format: Some("JWT".into()),
				description: Some("A signed token obtained from the sign-in flow".into()),
				extensions: Default::default(),
			},
		)
		.default_response_with::<Json<error::Message>, _>(|res| {
			res.example(error::Message {
				content: "error message".into(),
				field: Some("optional field".into()),
				details: Some(Cow::Owned({
					let mut map = error::Map::new();
					map.insert("key".into(), serde_json::json!("value"));
					map
				})),
			})
		})
}
