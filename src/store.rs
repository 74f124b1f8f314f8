use crate::config::{Mode, StoreConfig};
use crate::err::{self, Error};
use crate::files::TestFile;
use crate::progress::ProgressObserver;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use futures::TryStreamExt;
use futures_stopwatch::try_stopwatch;
use http_body::Frame;
use http_body_util::StreamBody;
use snafu::futures::TryFutureExt as _;
use snafu::ResultExt;
use std::{path::Path, sync::Arc, time::Duration};
use tokio_util::codec::{BytesCodec, FramedRead};
use tracing::{debug, info};

/// The object store under test.
///
/// `put` must report every chunk it sends through `progress`. It may do so from several threads
/// at once. It returns how long the transfer itself took: opening the file and preparing the
/// request happen before the stopwatch starts.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(
        &self,
        mode: Mode,
        bucket: &str,
        key: &str,
        path: &Path,
        progress: Arc<ProgressObserver>,
    ) -> Result<Duration, Error>;

    async fn delete(&self, mode: Mode, bucket: &str, key: &str) -> Result<(), Error>;
}

/// Amazon S3 through the regular endpoint and through Transfer Acceleration.
#[derive(Clone, Debug)]
pub struct S3Store {
    normal: Client,
    accelerated: Client,
}

impl S3Store {
    pub async fn new(cfg: &StoreConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &cfg.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(url) = &cfg.endpoint_url {
            loader = loader.endpoint_url(url.clone());
        }
        if let (Some(id), Some(secret)) = (&cfg.access_key_id, &cfg.secret_access_key) {
            loader = loader.credentials_provider(Credentials::new(
                id.clone(),
                secret.clone(),
                None,
                None,
                "upload-speed",
            ));
        }
        let sdk_config = loader.load().await;

        // Custom endpoints (minio, ...) generally do not resolve virtual-hosted buckets
        let path_style = cfg.endpoint_url.is_some();
        let normal = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(path_style)
            .build();
        let accelerated = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(path_style)
            .accelerate(true)
            .build();
        Self {
            normal: Client::from_conf(normal),
            accelerated: Client::from_conf(accelerated),
        }
    }

    fn client(&self, mode: Mode) -> &Client {
        match mode {
            Mode::Normal => &self.normal,
            Mode::Accelerated => &self.accelerated,
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(
        &self,
        mode: Mode,
        bucket: &str,
        key: &str,
        path: &Path,
        progress: Arc<ProgressObserver>,
    ) -> Result<Duration, Error> {
        let file = tokio::fs::File::open(path).await.with_context(|| err::Io {
            description: path.display().to_string(),
        })?;
        let len = file
            .metadata()
            .await
            .with_context(|| err::Io {
                description: path.display().to_string(),
            })?
            .len();

        // Every chunk is counted as it is handed over to the SDK
        let stream = FramedRead::new(file, BytesCodec::new())
            .map_ok(bytes::BytesMut::freeze)
            .map_ok(move |chunk| {
                progress.record(chunk.len() as u64);
                Frame::data(chunk)
            });

        let request = self
            .client(mode)
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_length(len as i64)
            .body(ByteStream::from_body_1_x(StreamBody::new(stream)));

        let (_, elapsed) =
            try_stopwatch(request.send().context(err::PutObject { bucket, key, mode })).await?;
        Ok(elapsed)
    }

    async fn delete(&self, mode: Mode, bucket: &str, key: &str) -> Result<(), Error> {
        self.client(mode)
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .context(err::DeleteObject { bucket, key, mode })
            .await
            .map(drop)
    }
}

/// Upload `file` to `bucket` under its key and return how long the upload took.
///
/// A fresh [`ProgressObserver`] is bound to the file for this one call. The duration is the one
/// measured by [`ObjectStore::put`], which excludes opening the file.
pub async fn timed_upload<S>(
    store: &S,
    bucket: &str,
    file: &TestFile,
    mode: Mode,
    show_progress: bool,
) -> Result<Duration, Error>
where
    S: ObjectStore + ?Sized,
{
    let progress = Arc::new(ProgressObserver::for_file(&file.path, show_progress)?);
    info!(%mode, bucket, key = %file.key, bytes = progress.total(), "Uploading");

    let elapsed = store
        .put(mode, bucket, &file.key, &file.path, progress.clone())
        .await?;

    debug!(
        %mode,
        key = %file.key,
        sent = progress.seen(),
        elapsed_ms = elapsed.as_millis() as u64,
        "Upload complete"
    );
    Ok(elapsed)
}
