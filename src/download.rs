use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::error::ExamplesError;

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct DownloadProgress {
    pub label: String,
    pub downloaded: u64,
    /// `Content-Length`, when the server sent one.
    pub total: Option<u64>,
}

pub trait ProgressSink {
    fn progress(&self, event: &DownloadProgress);
    fn finish(&self, _event: &DownloadProgress) {}
}

/// Discards progress events.
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn progress(&self, _event: &DownloadProgress) {}
}

/// Progress bar on stderr.
pub struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr_with_hz(4));
        bar.set_style(
            ProgressStyle::with_template(
                "{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
        );
        Self::with_bar(bar)
    }

    pub fn with_bar(bar: ProgressBar) -> Self {
        Self { bar }
    }

    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ConsoleProgress {
    fn progress(&self, event: &DownloadProgress) {
        if self.bar.message() != event.label {
            self.bar.set_message(event.label.clone());
        }
        if let Some(total) = event.total
            && self.bar.length() != Some(total)
        {
            self.bar.set_length(total);
        }
        self.bar.set_position(event.downloaded);
    }

    fn finish(&self, event: &DownloadProgress) {
        self.progress(event);
        self.bar.finish();
    }
}

pub trait DatasetClient: Send + Sync {
    /// Streams `url` into `destination`, returning the number of bytes written.
    fn download(
        &self,
        url: &str,
        destination: &Path,
        label: &str,
        sink: &dyn ProgressSink,
    ) -> Result<u64, ExamplesError>;
}

#[derive(Clone)]
pub struct HttpDatasetClient {
    client: Client,
}

impl HttpDatasetClient {
    pub fn new(timeout: Duration) -> Result<Self, ExamplesError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("mdc-examples/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| ExamplesError::Http(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| ExamplesError::Http(err.to_string()))?;
        Ok(Self { client })
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, ExamplesError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "download request failed".to_string());
        Err(ExamplesError::HttpStatus { status, message })
    }

    fn send_with_retries(&self, url: &str) -> Result<reqwest::blocking::Response, ExamplesError> {
        const MAX_RETRIES: usize = 3;
        const BASE_DELAY_MS: u64 = 200;
        let mut attempt = 0usize;
        loop {
            match self.client.get(url).send() {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if attempt < MAX_RETRIES && is_retryable_status(status) {
                        debug!("{url} returned {status}, retrying");
                        thread::sleep(Duration::from_millis(BASE_DELAY_MS * (attempt as u64 + 1)));
                        attempt += 1;
                        continue;
                    }
                    return Ok(resp);
                }
                Err(err) => {
                    if attempt < MAX_RETRIES && is_retryable_error(&err) {
                        debug!("{url} failed ({err}), retrying");
                        thread::sleep(Duration::from_millis(BASE_DELAY_MS * (attempt as u64 + 1)));
                        attempt += 1;
                        continue;
                    }
                    return Err(ExamplesError::Http(err.to_string()));
                }
            }
        }
    }
}

impl DatasetClient for HttpDatasetClient {
    fn download(
        &self,
        url: &str,
        destination: &Path,
        label: &str,
        sink: &dyn ProgressSink,
    ) -> Result<u64, ExamplesError> {
        let response = self.send_with_retries(url)?;
        let mut response = Self::handle_status(response)?;
        let total = response.content_length();
        let mut file = File::create(destination)
            .map_err(|err| ExamplesError::Filesystem(err.to_string()))?;
        copy_with_progress(&mut response, &mut file, label, total, sink)
    }
}

pub fn copy_with_progress(
    reader: &mut dyn Read,
    writer: &mut dyn Write,
    label: &str,
    total: Option<u64>,
    sink: &dyn ProgressSink,
) -> Result<u64, ExamplesError> {
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut event = DownloadProgress {
        label: label.to_string(),
        downloaded: 0,
        total,
    };
    loop {
        let read = reader
            .read(&mut buffer)
            .map_err(|err| ExamplesError::Http(err.to_string()))?;
        if read == 0 {
            break;
        }
        writer
            .write_all(&buffer[..read])
            .map_err(|err| ExamplesError::Filesystem(err.to_string()))?;
        event.downloaded += read as u64;
        sink.progress(&event);
    }
    writer
        .flush()
        .map_err(|err| ExamplesError::Filesystem(err.to_string()))?;
    sink.finish(&event);
    Ok(event.downloaded)
}

fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io::Cursor;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        seen: RefCell<Vec<u64>>,
        finished: RefCell<Option<u64>>,
    }

    impl ProgressSink for Recorder {
        fn progress(&self, event: &DownloadProgress) {
            self.seen.borrow_mut().push(event.downloaded);
        }

        fn finish(&self, event: &DownloadProgress) {
            *self.finished.borrow_mut() = Some(event.downloaded);
        }
    }

    #[test]
    fn progress_reaches_total() {
        let payload = vec![7u8; CHUNK_SIZE * 2 + 10];
        let mut reader = Cursor::new(payload.clone());
        let mut out = Vec::new();
        let sink = Recorder::default();

        let written = copy_with_progress(
            &mut reader,
            &mut out,
            "x.zip",
            Some(payload.len() as u64),
            &sink,
        )
        .unwrap();

        assert_eq!(written, payload.len() as u64);
        assert_eq!(out, payload);
        assert_eq!(*sink.seen.borrow().last().unwrap(), payload.len() as u64);
        assert_eq!(*sink.finished.borrow(), Some(payload.len() as u64));
    }

    #[test]
    fn console_progress_drives_bar() {
        let sink = ConsoleProgress::with_bar(ProgressBar::hidden());
        let payload = vec![1u8; CHUNK_SIZE + 5];
        let mut reader = Cursor::new(payload.clone());
        let mut out = Vec::new();

        copy_with_progress(
            &mut reader,
            &mut out,
            "Downloading x.zip",
            Some(payload.len() as u64),
            &sink,
        )
        .unwrap();

        let bar = sink.bar();
        assert_eq!(bar.length(), Some(payload.len() as u64));
        assert_eq!(bar.position(), payload.len() as u64);
        assert_eq!(bar.message(), "Downloading x.zip");
        assert!(bar.is_finished());
    }

    #[test]
    fn retryable_statuses() {
        assert!(is_retryable_status(503));
        assert!(!is_retryable_status(404));
    }
}
