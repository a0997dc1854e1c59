//! Amazon S3 (and S3-compatible) storage backend
//!
//! Credentials and region come from the standard AWS environment chain.
//! Retry behavior is whatever the SDK's default retry config provides.
//!
//! Bodies are sent in parts of [`PART_SIZE`] bytes, so a file task never
//! holds more than one part in memory. Smaller objects use a single PUT,
//! larger ones a multipart upload. A multipart upload interrupted by
//! cancellation is left for the bucket's lifecycle rules to clean up.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use aws_sdk_s3::Client as S3Client;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

use super::{FileSyncContext, ObjectBody, StorageClient, StorageError, StorageResult};

/// Size of one upload part; shorter objects go up with a single PUT
pub const PART_SIZE: usize = 8 * 1024 * 1024;

/// S3 bucket client
#[derive(Debug, Clone)]
pub struct S3Storage {
	client: S3Client,
	bucket: String,
}

impl S3Storage {
	/// Create a client for `bucket` using the default AWS configuration
	pub async fn new(bucket: &str) -> StorageResult<Self> {
		let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
		Ok(Self { client: S3Client::new(&config), bucket: bucket.to_string() })
	}
}

#[async_trait]
impl StorageClient for S3Storage {
	fn location(&self) -> String {
		format!("s3://{}", self.bucket)
	}

	async fn exists(&self, key: &str) -> StorageResult<bool> {
		match self.client.head_object().bucket(&self.bucket).key(key).send().await {
			Ok(_) => Ok(true),
			Err(e) => {
				let service_error = e.into_service_error();
				if service_error.is_not_found() {
					Ok(false)
				} else {
					Err(StorageError::Backend { message: service_error.to_string() })
				}
			}
		}
	}

	async fn upload(
		&self,
		key: &str,
		mut body: ObjectBody,
		context: &FileSyncContext,
	) -> StorageResult<()> {
		let first = read_part(&mut body).await?;
		let size = if first.len() < PART_SIZE {
			let size = first.len();
			self.client
				.put_object()
				.bucket(&self.bucket)
				.key(key)
				.body(ByteStream::from(first))
				.set_cache_control(context.cache_control.clone())
				.set_content_type(context.content_type.clone())
				.send()
				.await
				.map_err(|e| StorageError::Backend { message: e.into_service_error().to_string() })?;
			size
		} else {
			self.upload_multipart(key, &mut body, first, context).await?
		};

		debug!("Put {} bytes to s3://{}/{}", size, self.bucket, key);
		Ok(())
	}
}

impl S3Storage {
	async fn upload_multipart(
		&self,
		key: &str,
		body: &mut ObjectBody,
		first: Vec<u8>,
		context: &FileSyncContext,
	) -> StorageResult<usize> {
		let created = self
			.client
			.create_multipart_upload()
			.bucket(&self.bucket)
			.key(key)
			.set_cache_control(context.cache_control.clone())
			.set_content_type(context.content_type.clone())
			.send()
			.await
			.map_err(|e| StorageError::Backend { message: e.into_service_error().to_string() })?;
		let upload_id = created
			.upload_id()
			.ok_or_else(|| StorageError::Backend { message: format!("no upload id returned for {}", key) })?
			.to_string();

		match self.upload_parts(key, &upload_id, body, first).await {
			Ok((parts, size)) => {
				let completed = CompletedMultipartUpload::builder().set_parts(Some(parts)).build();
				self.client
					.complete_multipart_upload()
					.bucket(&self.bucket)
					.key(key)
					.upload_id(&upload_id)
					.multipart_upload(completed)
					.send()
					.await
					.map_err(|e| StorageError::Backend { message: e.into_service_error().to_string() })?;
				Ok(size)
			}
			Err(err) => {
				let aborted = self
					.client
					.abort_multipart_upload()
					.bucket(&self.bucket)
					.key(key)
					.upload_id(&upload_id)
					.send()
					.await;
				if let Err(e) = aborted {
					warn!("Failed to abort multipart upload of {}: {}", key, e.into_service_error());
				}
				Err(err)
			}
		}
	}

	async fn upload_parts(
		&self,
		key: &str,
		upload_id: &str,
		body: &mut ObjectBody,
		first: Vec<u8>,
	) -> StorageResult<(Vec<CompletedPart>, usize)> {
		let mut parts = Vec::new();
		let mut size = 0;
		let mut part_number = 1;
		let mut chunk = first;

		while !chunk.is_empty() {
			size += chunk.len();
			let last = chunk.len() < PART_SIZE;
			let output = self
				.client
				.upload_part()
				.bucket(&self.bucket)
				.key(key)
				.upload_id(upload_id)
				.part_number(part_number)
				.body(ByteStream::from(chunk))
				.send()
				.await
				.map_err(|e| StorageError::Backend { message: e.into_service_error().to_string() })?;
			parts.push(
				CompletedPart::builder()
					.set_e_tag(output.e_tag().map(str::to_string))
					.part_number(part_number)
					.build(),
			);
			if last {
				break;
			}
			part_number += 1;
			chunk = read_part(body).await?;
		}
		Ok((parts, size))
	}
}

/// Read up to [`PART_SIZE`] bytes; a short read means the body is exhausted
async fn read_part(body: &mut ObjectBody) -> std::io::Result<Vec<u8>> {
	let mut part = Vec::new();
	AsyncReadExt::take(&mut *body, PART_SIZE as u64).read_to_end(&mut part).await?;
	Ok(part)
}


// vim: ts=4
