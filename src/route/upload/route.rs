use aide::transform::TransformOperation;
use axum::extract::{Path, State};
use serde_json::json;

use crate::{
	extract::{Auth, Json, Multipart},
	images::{ImageService, UploadedImage},
	openapi::tag,
};

use super::{Error, RouteError, MAX_FILES, MAX_FILE_BYTES};

/// One image pulled out of a multipart body.
struct File {
	name: String,
	data: Vec<u8>,
}

async fn read_file(field: axum::extract::multipart::Field<'_>) -> Result<File, Error> {
	if !field
		.content_type()
		.is_some_and(|mime| mime.starts_with("image/"))
	{
		return Err(Error::NotAnImage);
	}

	let name = field.file_name().unwrap_or("image").to_owned();
	let data = field.bytes().await?;

	if data.len() > MAX_FILE_BYTES {
		return Err(Error::TooLarge);
	}

	Ok(File {
		name,
		data: data.to_vec(),
	})
}

pub fn upload_image_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Upload image")
		.description(
			"Uploads a single `image` multipart part to the hosting service, \
			returning its delivery URL and public id.",
		)
		.tag(tag::UPLOAD)
}

/// Uploads a single image and returns its delivery URL and public id.
pub async fn upload_image(
	State(images): State<ImageService>,
	_auth: Auth,
	Multipart(mut multipart): Multipart,
) -> Result<Json<UploadedImage>, RouteError> {
	let mut file = None;

	while let Some(field) = multipart.next_field().await.map_err(Error::Multipart)? {
		if field.name() == Some("image") {
			file = Some(read_file(field).await?);
			break;
		}
	}

	let file = file.ok_or(Error::NoFile)?;
	let image = images
		.upload(file.data, &file.name)
		.await
		.map_err(log_service_error)?;

	Ok(Json(image))
}

pub fn upload_images_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Upload images")
		.description("Uploads up to five `images` multipart parts in one request.")
		.tag(tag::UPLOAD)
}

/// Uploads up to [`MAX_FILES`] images in one request.
pub async fn upload_images(
	State(images): State<ImageService>,
	_auth: Auth,
	Multipart(mut multipart): Multipart,
) -> Result<Json<serde_json::Value>, RouteError> {
	let mut files = Vec::new();

	while let Some(field) = multipart.next_field().await.map_err(Error::Multipart)? {
		if field.name() != Some("images") {
			continue;
		}

		if files.len() == MAX_FILES {
			return Err(Error::TooMany.into());
		}

		files.push(read_file(field).await?);
	}

	if files.is_empty() {
		return Err(Error::NoFile.into());
	}

	let mut uploaded = Vec::with_capacity(files.len());

	for file in files {
		uploaded.push(
			images
				.upload(file.data, &file.name)
				.await
				.map_err(log_service_error)?,
		);
	}

	Ok(Json(json!({ "images": uploaded })))
}

pub fn delete_image_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Delete image")
		.description("Deletes an image from the hosting service by its public id.")
		.tag(tag::UPLOAD)
}

/// Deletes an image from the hosting service by its public id.
pub async fn delete_image(
	State(images): State<ImageService>,
	_auth: Auth,
	Path(public_id): Path<String>,
) -> Result<Json<serde_json::Value>, RouteError> {
	images.delete(&public_id).await.map_err(log_service_error)?;

	Ok(Json(json!({ "message": "Image deleted successfully" })))
}

fn log_service_error(error: crate::images::Error) -> Error {
	tracing::error!(%error, "image service call failed");
	Error::Service(error)
}
