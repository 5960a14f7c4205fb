use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_RANGE, RANGE};
use textsnap_core::languages::is_tesseract_language;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use crate::error::DownloadError;

pub const TESSDATA_BEST_URL: &str = "https://raw.githubusercontent.com/tesseract-ocr/tessdata_best/main/";
const TRAINEDDATA_EXT: &str = "traineddata";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub downloaded: u64,
    pub total: Option<u64>,
}

impl Progress {
    pub fn percent(&self) -> Option<u8> {
        match self.total {
            Some(total) if total > 0 => Some((self.downloaded.min(total) * 100 / total) as u8),
            _ => None,
        }
    }
}

/// Fetches `<code>.traineddata` files into the tessdata directory.
///
/// Partial downloads live next to the target as `<file>.tmp` and are resumed
/// with a `Range` request on the next attempt.
pub struct TessdataDownloader {
    client: reqwest::Client,
    base_url: String,
    directory: PathBuf,
}

impl TessdataDownloader {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: TESSDATA_BEST_URL.to_string(),
            directory: directory.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }

    pub fn destination(&self, code: &str) -> PathBuf {
        self.directory.join(format!("{code}.{TRAINEDDATA_EXT}"))
    }

    fn temp_path(&self, code: &str) -> PathBuf {
        self.directory.join(format!("{code}.{TRAINEDDATA_EXT}.tmp"))
    }

    pub async fn download(
        &self,
        code: &str,
        cancel: &CancellationToken,
        mut on_progress: impl FnMut(Progress),
    ) -> Result<PathBuf, DownloadError> {
        if !is_tesseract_language(code) {
            return Err(DownloadError::UnknownLanguage(code.to_string()));
        }

        fs::create_dir_all(&self.directory).await?;
        let destination = self.destination(code);
        let temp = self.temp_path(code);

        let mut resume_from = match fs::metadata(&temp).await {
            Ok(meta) => meta.len(),
            Err(_) => 0,
        };

        let url = format!("{}{code}.{TRAINEDDATA_EXT}", self.base_url);
        let response = loop {
            tracing::info!(
                "Downloading '{code}' language from {url} (resuming at {resume_from} bytes)"
            );
            let mut request = self.client.get(&url);
            if resume_from > 0 {
                request = request.header(RANGE, format!("bytes={resume_from}-"));
            }

            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(DownloadError::Cancelled),
                response = request.send() => response?,
            };

            if response.status() != StatusCode::RANGE_NOT_SATISFIABLE || resume_from == 0 {
                break response;
            }

            // Nothing left past the temp file's length, if it is the whole file
            if unsatisfied_range_length(&response) == Some(resume_from) {
                finish(&temp, &destination).await?;
                on_progress(Progress {
                    downloaded: resume_from,
                    total: Some(resume_from),
                });
                return Ok(destination);
            }

            tracing::warn!(
                "Partial file '{}' does not match the remote file, starting over",
                temp.display()
            );
            fs::remove_file(&temp).await?;
            resume_from = 0;
        };

        let (append, mut downloaded) = match response.status() {
            StatusCode::PARTIAL_CONTENT => (true, resume_from),
            StatusCode::OK => (false, 0),
            status => return Err(DownloadError::Status(status.as_u16())),
        };

        let total = response.content_length().map(|remaining| remaining + downloaded);
        tracing::info!(
            "Destination: {} - Downloaded: {downloaded} - Total: {total:?}",
            temp.display()
        );

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(&temp)
            .await?;

        let mut stream = response.bytes_stream();
        loop {
            let chunk = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    file.flush().await?;
                    tracing::warn!("Download of '{code}' cancelled at {downloaded} bytes");
                    return Err(DownloadError::Cancelled);
                }
                chunk = stream.next() => chunk,
            };

            let Some(chunk) = chunk else {
                break;
            };
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
            on_progress(Progress { downloaded, total });
        }

        file.flush().await?;
        drop(file);

        finish(&temp, &destination).await?;
        tracing::info!("Downloading '{code}' language completed");
        Ok(destination)
    }
}

/// Complete length from a `Content-Range: bytes */<length>` header.
fn unsatisfied_range_length(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get(CONTENT_RANGE)?
        .to_str()
        .ok()?
        .strip_prefix("bytes */")?
        .trim()
        .parse()
        .ok()
}

async fn finish(temp: &Path, destination: &Path) -> Result<(), DownloadError> {
    fs::rename(temp, destination).await?;
    tracing::info!(
        "The file '{}' has been renamed to '{}'",
        temp.display(),
        destination.display()
    );
    Ok(())
}

/// Language codes with a `.traineddata` file in `directory`, sorted.
pub fn installed_languages(directory: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(directory) else {
        return Vec::new();
    };

    let mut codes: Vec<String> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == TRAINEDDATA_EXT))
        .filter_map(|path| path.file_stem().map(|stem| stem.to_string_lossy().into_owned()))
        .collect();
    codes.sort();
    codes
}
