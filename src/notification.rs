use crate::{
    configuration::PaymentSettings,
    domain::{NewSubmission, SubmissionDetails},
};

const BOOK_TITLE: &str = "Treuss - A Energia Precede a Matéria";

/// Confirmation email for one submission, rendered both ways so the
/// provider can deliver a multipart message.
pub struct EmailContent {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Builds the confirmation email matching the submission kind.
pub fn content_for(submission: &NewSubmission, payment: &PaymentSettings) -> EmailContent {
    match &submission.details {
        SubmissionDetails::Purchase { quantity, .. } => {
            purchase_content(&submission.name, *quantity, payment)
        }
        SubmissionDetails::Download { .. } => download_content(&submission.name, payment),
    }
}

fn purchase_content(name: &str, quantity: i32, payment: &PaymentSettings) -> EmailContent {
    let total = quantity as f64 * payment.unit_price;
    let amount = format!("{total:.2}");
    let pix = payment.pix_code();

    // A broken QR render downgrades to the plain-text key rather than
    // losing the payment instructions altogether.
    let payment_block = match pix.qr_data_uri(&amount) {
        Ok(data_uri) => format!(
            "<p>Scan the QR code below with your banking app to pay:</p>\
             <p><img src=\"{data_uri}\" alt=\"PIX payment QR code\" width=\"240\" height=\"240\"></p>\
             <p>Or use the PIX key directly: <strong>{}</strong></p>",
            pix.key()
        ),
        Err(e) => {
            tracing::warn!(
                error.cause_chain = ?e,
                error.message = %e,
                "Failed to render the PIX QR code. Falling back to the plain key."
            );
            format!("<p>PIX key for payment: <strong>{}</strong></p>", pix.key())
        }
    };

    let html = format!(
        "<h1>Hello, {name}!</h1>\
         <p>Thank you for purchasing <strong>{BOOK_TITLE}</strong>.</p>\
         <p>Your order has been registered.</p>\
         <p><strong>Order summary:</strong></p>\
         <ul>\
         <li>Quantity: {quantity} copy(ies)</li>\
         <li>Total: R$ {amount}</li>\
         </ul>\
         {payment_block}\
         <p>Best regards,<br>The Treuss team</p>"
    );

    let text = format!(
        "Hello, {name}!\n\n\
         Thank you for purchasing {BOOK_TITLE}.\n\
         Your order has been registered.\n\n\
         Order summary:\n\
         - Quantity: {quantity} copy(ies)\n\
         - Total: R$ {amount}\n\n\
         PIX key for payment: {}\n\n\
         Best regards,\n\
         The Treuss team",
        pix.key()
    );

    EmailContent {
        subject: "Purchase confirmation - Treuss".into(),
        html,
        text,
    }
}

fn download_content(name: &str, payment: &PaymentSettings) -> EmailContent {
    let html = format!(
        "<h1>Hello, {name}!</h1>\
         <p>Thank you for downloading the <strong>{BOOK_TITLE}</strong> eBook.</p>\
         <p>Click the link below to download it:</p>\
         <p><a href=\"{url}\">Download the eBook</a></p>\
         <p>PIX key for contributions: <strong>{key}</strong></p>\
         <p>Best regards,<br>The Treuss team</p>",
        url = payment.download_url,
        key = payment.pix_key,
    );

    let text = format!(
        "Hello, {name}!\n\n\
         Thank you for downloading the {BOOK_TITLE} eBook.\n\
         Download it here: {url}\n\n\
         PIX key for contributions: {key}\n\n\
         Best regards,\n\
         The Treuss team",
        url = payment.download_url,
        key = payment.pix_key,
    );

    EmailContent {
        subject: "eBook download - Treuss".into(),
        html,
        text,
    }
}
