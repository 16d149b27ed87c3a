/// Default distance added to every side of the viewport before testing proximity.
pub const DEFAULT_ROOT_MARGIN: &str = "200px";
pub const DEFAULT_ROOT_MARGIN_PX: f64 = 200.0;

/// Default minimum overlap fraction that activates a lazy resource.
pub const DEFAULT_THRESHOLD: f64 = 0.01;

/// How long a successful submission stays on screen before returning to idle.
pub const SUCCESS_DWELL_SECS: u64 = 5;

/// Default contact endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.web3forms.com/submit";

/// Form field carrying the endpoint's access key.
pub const ACCESS_KEY_FIELD: &str = "access_key";

pub const SUCCESS_MESSAGE: &str = "Thank you! Your message has been sent successfully.";
pub const REJECTED_MESSAGE: &str = "Something went wrong. Please try again.";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";

pub const SEND_LABEL: &str = "Send Message";
pub const SENDING_LABEL: &str = "Sending...";

/// Comparison tolerance for geometry ratios.
pub const EPSILON: f64 = 1e-9;
