/// Lifecycle of the confirmation email attached to a submission.
///
/// A row is inserted as `Pending` and moves exactly once to either
/// `Sent` or `Failed` after the delivery attempt resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailStatus {
    Pending,
    Sent,
    Failed,
}

impl AsRef<str> for EmailStatus {
    fn as_ref(&self) -> &'static str {
        match self {
            EmailStatus::Pending => "pending",
            EmailStatus::Sent => "sent",
            EmailStatus::Failed => "failed",
        }
    }
}

impl TryFrom<String> for EmailStatus {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_ref() {
            "pending" => Ok(EmailStatus::Pending),
            "sent" => Ok(EmailStatus::Sent),
            "failed" => Ok(EmailStatus::Failed),
            other => Err(format!("`{other}` is not a valid variant of EmailStatus")),
        }
    }
}
