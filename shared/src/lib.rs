//! Wire models shared by the community hub client and its admin tooling.
//!
//! Everything here is plain data: the comment and resource records as the
//! REST API returns them, the response envelope, pagination metadata, and the
//! caller-side validation rules applied before anything is submitted.

pub mod comment;
pub mod contact;
pub mod envelope;
pub mod pagination;
pub mod resources;
pub mod validation;

pub use comment::{Comment, CommentPatch, CommentQuery, NewComment, ParentFilter};
pub use envelope::{normalize_payload_ids, normalize_record_id, ApiEnvelope, FieldError};
pub use pagination::Pagination;
pub use resources::{
    ContactMessage, ContactSubmission, Event, GalleryImage, ListQuery, Organizer, Registration,
    RegistrationStatus, Resource,
};
pub use validation::ValidationErrors;
