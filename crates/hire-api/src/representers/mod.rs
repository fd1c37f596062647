//! Response representers
//!
//! Turn store documents and search results into the JSON the API returns.

mod document;
mod envelope;

pub use document::{bson_to_json, document_to_json};
pub use envelope::Envelope;
