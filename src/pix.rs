use base64::{engine::general_purpose::STANDARD, Engine};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Luma};
use qrcode::QrCode;

// EMV MPM field caps for merchant name and city.
const MAX_MERCHANT_NAME: usize = 25;
const MAX_MERCHANT_CITY: usize = 15;

/// Static PIX recipient data. Combined with an amount it renders the
/// "BR Code" text payload that banking apps scan as a QR code.
#[derive(Debug, Clone)]
pub struct PixCode {
    key: String,
    merchant_name: String,
    merchant_city: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PixError {
    #[error("failed to encode payload as a QR code")]
    Qr(#[from] qrcode::types::QrError),
    #[error("failed to render the QR code as PNG")]
    Png(#[from] image::ImageError),
}

impl PixCode {
    pub fn new(key: String, merchant_name: String, merchant_city: String) -> Self {
        Self {
            key,
            merchant_name,
            merchant_city,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// EMV merchant-presented-mode payload for a fixed `amount`, which
    /// must already be formatted with two decimal places.
    pub fn payload(&self, amount: &str) -> String {
        let account_info = format!(
            "{}{}",
            field("00", "br.gov.bcb.pix"),
            field("01", &self.key)
        );

        let mut payload = String::new();
        payload.push_str(&field("00", "01"));
        payload.push_str(&field("26", &account_info));
        payload.push_str(&field("52", "0000"));
        payload.push_str(&field("53", "986"));
        payload.push_str(&field("54", amount));
        payload.push_str(&field("58", "BR"));
        payload.push_str(&field("59", truncate(&self.merchant_name, MAX_MERCHANT_NAME)));
        payload.push_str(&field("60", truncate(&self.merchant_city, MAX_MERCHANT_CITY)));
        payload.push_str(&field("62", &field("05", "***")));
        payload.push_str("6304");

        let crc = crc16_ccitt(payload.as_bytes());
        payload.push_str(&format!("{crc:04X}"));
        payload
    }

    /// Renders the payload for `amount` as a PNG image of a QR code.
    pub fn qr_png(&self, amount: &str) -> Result<Vec<u8>, PixError> {
        let code = QrCode::new(self.payload(amount).as_bytes())?;
        let image = code
            .render::<Luma<u8>>()
            .min_dimensions(240, 240)
            .build();

        let mut png = Vec::new();
        PngEncoder::new(&mut png).write_image(
            &image,
            image.width(),
            image.height(),
            ExtendedColorType::L8,
        )?;

        Ok(png)
    }

    /// Same image as [`qr_png`](Self::qr_png), as a `data:` URI ready
    /// to be embedded in an HTML `img` tag.
    pub fn qr_data_uri(&self, amount: &str) -> Result<String, PixError> {
        let png = self.qr_png(amount)?;
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
    }
}

/// One `id` + two-digit length + value segment.
fn field(id: &str, value: &str) -> String {
    format!("{id}{:02}{value}", value.len())
}

fn truncate(value: &str, max_len: usize) -> &str {
    match value.char_indices().nth(max_len) {
        Some((index, _)) => &value[..index],
        None => value,
    }
}

/// CRC16/CCITT-FALSE, the checksum the BR Code format requires.
fn crc16_ccitt(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for byte in data {
        crc ^= (*byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}
