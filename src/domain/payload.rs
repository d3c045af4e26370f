use super::{Address, NewSubmission, SubmissionDetails, SubmissionType};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Hidden form field that legitimate users never fill. A non-empty
/// value flags automated traffic.
const HONEYPOT_FIELD: &str = "company";

/// Raw form post as it arrives over the wire. Both form variants post
/// to the same endpoint, so the shape is a free-form map and the same
/// logical field may arrive under two different keys.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct SubmissionPayload(HashMap<String, Value>);

#[derive(Debug)]
pub enum Normalized {
    Submission(NewSubmission),
    /// The honeypot field was filled. The caller must acknowledge the
    /// request as if it succeeded, without persisting or notifying.
    Decoy,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid submission type")]
    InvalidType,
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),
}

impl SubmissionPayload {
    /// Validates and reshapes the raw map into a canonical submission.
    pub fn normalize(&self) -> Result<Normalized, ValidationError> {
        if self.honeypot_tripped() {
            return Ok(Normalized::Decoy);
        }

        let kind = self
            .text(&["type"])
            .and_then(|t| SubmissionType::try_from(t).ok())
            .ok_or(ValidationError::InvalidType)?;

        let name = self.required("name", &["name", "d-name"])?;
        let email = self.required("email", &["email", "d-email"])?;
        let phone = self.text(&["phone"]);

        let details = match kind {
            SubmissionType::Purchase => self.purchase_details()?,
            SubmissionType::Download => self.download_details(),
        };

        Ok(Normalized::Submission(NewSubmission {
            name,
            email,
            phone,
            details,
        }))
    }

    // The six required fields are checked in a fixed order, so the
    // first missing one is the one reported back.
    fn purchase_details(&self) -> Result<SubmissionDetails, ValidationError> {
        let postal_code = self.required("postal_code", &["postal_code"])?;
        let address_line1 = self.required("address_line1", &["address_line1"])?;
        let district = self.required("district", &["district"])?;
        let city = self.required("city", &["city"])?;
        let state = self.required("state", &["state"])?;
        let country = self.required("country", &["country"])?;

        Ok(SubmissionDetails::Purchase {
            quantity: self.quantity(),
            address: Address {
                postal_code,
                address_line1,
                address_line2: self.text(&["address_line2"]),
                district,
                city,
                state,
                country,
            },
            delivery_notes: self.text(&["delivery_notes"]),
        })
    }

    fn download_details(&self) -> SubmissionDetails {
        SubmissionDetails::Download {
            contribution: self.number(&["d-contrib", "contribution"]),
            payment_method: self.text(&["d-payment_method", "payment_method"]),
        }
    }

    /// Number of copies ordered. Anything absent, non-numeric or
    /// non-positive falls back to a single copy.
    fn quantity(&self) -> i32 {
        self.number(&["quantity"])
            .map(|q| q.trunc() as i32)
            .filter(|q| *q > 0)
            .unwrap_or(1)
    }

    fn honeypot_tripped(&self) -> bool {
        match self.0.get(HONEYPOT_FIELD) {
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(_) => true,
            None => false,
        }
    }

    /// First non-empty value among the candidate keys, trimmed.
    /// Numbers are accepted where forms post them unquoted.
    fn text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| match self.0.get(*key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }

    fn number(&self, keys: &[&str]) -> Option<f64> {
        keys.iter().find_map(|key| match self.0.get(*key) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }

    fn required(
        &self,
        field: &'static str,
        keys: &[&str],
    ) -> Result<String, ValidationError> {
        self.text(keys)
            .ok_or(ValidationError::MissingRequiredField(field))
    }
}
