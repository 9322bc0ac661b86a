pub mod dom;
pub mod error;
pub mod fetch;
pub mod page;
pub mod renderer;

pub use dom::{Document, NodeId, normalize_text};
pub use error::ScanError;
pub use fetch::{FetchOutcome, Fetcher, HttpFetcher};
pub use page::RenderedPage;
pub use renderer::{HttpRenderer, Navigation, Renderer, build_client};
