//! Testing utilities for tracewire
//!
//! [`LocalServer`] stands in for an RPC transport: every call made through a
//! [`LocalClient`] runs the handler on its own tokio task, with the metadata
//! side-channel passed as an explicit [`CallContext`](tracewire_core::CallContext).
//!
//! ```rust
//! use tracewire_core::EchoService;
//! use tracewire_testing::{metadata, LocalServer};
//!
//! # #[tokio::main] async fn main() {
//! let server = LocalServer::new(EchoService);
//! let resp = server
//!     .client()
//!     .hello_with_metadata("hi", metadata! { "x-req-id" => "abc" })
//!     .await
//!     .unwrap();
//! assert_eq!(resp.metadata["x-req-id"], "abc");
//! # }
//! ```

pub mod server;

pub use server::{LocalClient, LocalServer, RecordedCall};
pub use tracewire_core::MetadataBundle;

/// Build a [`MetadataBundle`]; repeated keys accumulate values in order.
///
/// ```rust
/// use tracewire_testing::metadata;
///
/// let md = metadata! { "x-req-id" => "abc", "x-req-id" => "def" };
/// assert_eq!(md.get_all("x-req-id"), ["abc", "def"]);
/// ```
#[macro_export]
macro_rules! metadata {
    () => {
        $crate::MetadataBundle::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut bundle = $crate::MetadataBundle::new();
        $( bundle.append($key, $value); )+
        bundle
    }};
}
