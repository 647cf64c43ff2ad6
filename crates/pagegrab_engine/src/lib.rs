//! Pagegrab engine: IO pipeline and batch execution.
mod batch;
mod capture;
mod decode;
mod download;
mod extract;
mod fetch;
mod filename;
mod handle;
mod persist;
mod store;
mod types;

pub use batch::{BatchAction, BatchRunner, ChannelProgressSink, ProgressSink, SummaryTarget};
pub use capture::{CaptureAction, CaptureConfig};
pub use decode::{decode_body, DecodeError, DecodedBody};
pub use download::DownloadAction;
pub use extract::{collect_anchors, extract_links, extract_to_file, ExtractError};
pub use fetch::{FetchSettings, FetchedPage, Fetcher, ReqwestFetcher, BROWSER_USER_AGENT};
pub use filename::sanitize_page_filename;
pub use handle::{BatchHandle, BatchPlan, RunMode, DOWNLOAD_DIR, SCREENSHOT_DIR};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use store::{load_links, save_links, StoreError};
pub use types::{
    ActionError, BatchEvent, BatchResult, CaptureError, CaptureFailureKind, FetchError,
    FetchFailureKind, StreamEvent, StreamKind,
};
