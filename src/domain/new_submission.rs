use super::{Address, SubmissionType};

/// A validated submission, ready to be persisted.
///
/// `details` carries exactly the fields that belong to the submission
/// kind, so a purchase can never carry download fields and vice versa.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub details: SubmissionDetails,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionDetails {
    Purchase {
        quantity: i32,
        address: Address,
        delivery_notes: Option<String>,
    },
    Download {
        contribution: Option<f64>,
        payment_method: Option<String>,
    },
}

impl NewSubmission {
    pub fn kind(&self) -> SubmissionType {
        match self.details {
            SubmissionDetails::Purchase { .. } => SubmissionType::Purchase,
            SubmissionDetails::Download { .. } => SubmissionType::Download,
        }
    }

    /// The PIX key is displayed on the thank-you page for downloads only.
    pub fn pix_key_shown(&self) -> bool {
        self.kind() == SubmissionType::Download
    }
}
