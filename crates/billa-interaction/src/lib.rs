//! HTTP clients for the external AI collaborators.
//!
//! Each client implements one of the collaborator traits from `billa-core`:
//!
//! - [`ScanApiClient`]: receipt photo → line items (`POST /scan`, multipart)
//! - [`SplitApiClient`]: receipt + instruction → split text (`POST /split`)
//! - [`RevisionApiClient`]: conversational revision (`POST /chat_modify`)

mod http;
pub mod revision_api_client;
pub mod scan_api_client;
pub mod split_api_client;

pub use revision_api_client::RevisionApiClient;
pub use scan_api_client::ScanApiClient;
pub use split_api_client::SplitApiClient;
