#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionType {
    Purchase,
    Download,
}

impl AsRef<str> for SubmissionType {
    fn as_ref(&self) -> &'static str {
        match self {
            SubmissionType::Purchase => "purchase",
            SubmissionType::Download => "download",
        }
    }
}

impl TryFrom<String> for SubmissionType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "purchase" => Ok(SubmissionType::Purchase),
            "download" => Ok(SubmissionType::Download),
            other => Err(format!(
                "`{other}` is not a valid variant of SubmissionType",
            )),
        }
    }
}
