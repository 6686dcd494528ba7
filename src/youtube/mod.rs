pub mod client;
pub mod duration;
pub mod query;
pub mod samples;

#[cfg(test)]
pub use client::{MockVideoSource, SearchHit, VideoDetails};
pub use client::{search_with_details, FetchedVideo, SearchRequest, VideoSource, YoutubeClient};
pub use query::{build_search_query, has_usable_keywords};
