//! Async runtime pieces for folio: the submission controller, the HTTP
//! transport it drives, and the scroll-driven lazy gallery.

pub mod config;
pub mod controller;
pub mod error;
pub mod fetcher;
pub mod gallery;
pub mod transport;

pub use config::FolioConfig;
pub use controller::{ControllerOptions, SubmissionController};
pub use error::{ClientError, Result, TransportError};
pub use fetcher::{HttpFetcher, ResourceFetcher};
pub use gallery::{Gallery, GalleryManifest, ImageStatus, LoadReport};
pub use transport::{FormBody, HttpTransport, Transport};

pub use reqwest::Url;
