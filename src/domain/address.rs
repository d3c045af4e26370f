/// Shipping address attached to a purchase submission.
///
/// Every field except `address_line2` is required by the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub postal_code: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub district: String,
    pub city: String,
    pub state: String,
    pub country: String,
}
