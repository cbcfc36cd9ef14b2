//! Session cookies and per-request signing

pub mod session;
pub mod signature;

pub use session::SessionArtifacts;
pub use signature::{
    order_page_path, AuthHeaders, PageRequestContext, RequestId, SignatureDeriver,
};
