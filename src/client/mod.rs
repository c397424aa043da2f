//! Typed SDK over the HTTP API, for sibling services and integration
//! tests. All calls go through [`http::ApiClient`], which handles the
//! response envelope and identity headers.

pub mod auctions;
pub mod http;
pub mod riplimit;

pub use auctions::{AuctionsClient, ListAuctions, ListBids};
pub use http::{ApiClient, ClientError, ClientPage, ClientResult};
pub use riplimit::RipLimitClient;
