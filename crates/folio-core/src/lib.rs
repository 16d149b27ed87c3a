//! Core state machines for the folio portfolio site.
//!
//! Two independent per-instance machines: a viewport-gated lazy resource
//! loader and the contact form's submission phases. Both are plain data
//! driven by the host; nothing here performs I/O or owns a runtime.

pub mod constants;
pub mod error;
pub mod form;
pub mod geometry;
pub mod loader;
pub mod submission;
pub mod watch;

pub use constants::{
    DEFAULT_ENDPOINT, DEFAULT_ROOT_MARGIN, DEFAULT_THRESHOLD, NETWORK_ERROR_MESSAGE,
    REJECTED_MESSAGE, SUCCESS_DWELL_SECS, SUCCESS_MESSAGE,
};
pub use error::{FolioError, Result};
pub use form::{ContactForm, Field};
pub use geometry::{Rect, RootMargin, intersection_ratio};
pub use loader::{LazyLoader, LoaderState, LoadingHint, RenderPlan, ResourceRequest};
pub use submission::{
    Banner, EndpointResponse, FormView, Phase, SubmissionState, SubmitOutcome, Tone,
};
pub use watch::{BoundingBoxWatch, IntersectionEntry, ProximityWatch, WatchOptions};
