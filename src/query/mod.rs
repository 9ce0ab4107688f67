pub mod request;
pub mod extractor;

pub use request::QueryRequest;
pub use extractor::{
    StorageReference, WritePayload, extract_write_payload, resolve_reference_at, validate_file_name,
    validate_shape,
};
