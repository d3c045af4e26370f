mod address;
mod email_status;
mod new_submission;
mod payload;
mod submission_type;

pub use address::Address;
pub use email_status::EmailStatus;
pub use new_submission::{NewSubmission, SubmissionDetails};
pub use payload::{Normalized, SubmissionPayload, ValidationError};
pub use submission_type::SubmissionType;
