use std::path::PathBuf;

use async_trait::async_trait;
use pagegrab_core::BatchItem;

use crate::batch::BatchAction;
use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::filename::sanitize_page_filename;
use crate::persist::AtomicFileWriter;
use crate::types::ActionError;

/// Fetch-and-save: GET the page with the long-download profile and store
/// its decoded body as text under the downloads directory.
pub struct DownloadAction {
    writer: AtomicFileWriter,
    extension: String,
    fetcher: Box<dyn Fetcher>,
}

impl DownloadAction {
    pub fn new(output_dir: PathBuf, extension: impl Into<String>) -> Self {
        Self::with_fetcher(
            output_dir,
            extension,
            Box::new(ReqwestFetcher::new(FetchSettings::download())),
        )
    }

    pub fn with_fetcher(
        output_dir: PathBuf,
        extension: impl Into<String>,
        fetcher: Box<dyn Fetcher>,
    ) -> Self {
        Self {
            writer: AtomicFileWriter::new(output_dir),
            extension: extension.into(),
            fetcher,
        }
    }
}

#[async_trait]
impl BatchAction for DownloadAction {
    fn describe(&self) -> &str {
        "download"
    }

    async fn run(&self, item: &BatchItem) -> Result<PathBuf, ActionError> {
        let url = item
            .resolved_url
            .as_deref()
            .ok_or(ActionError::MissingTarget)?;

        let page = self.fetcher.fetch(url).await.map_err(ActionError::Fetch)?;
        let filename = sanitize_page_filename(url, &self.extension);
        let path = self
            .writer
            .write(&filename, page.body.as_bytes())
            .map_err(|err| ActionError::Persist(err.to_string()))?;
        Ok(path)
    }
}
