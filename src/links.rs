//! Link builders
//!
//! Payment links are plain strings; upload and download links embed a token
//! or a stored file name under the configured public base URL.

/// Build a UPI payment URI.
///
/// `service` is the app the user picked; it is informational only and not
/// encoded in the link. `upi_id` and `note` are inserted verbatim.
pub fn payment_link(service: &str, upi_id: &str, amount: f64, note: &str) -> String {
    tracing::debug!(service, "building payment link");
    let mut link = format!("upi://pay?pa={upi_id}&am={amount:.2}&cu=INR");
    if !note.is_empty() {
        link.push_str("&tn=");
        link.push_str(note);
    }
    link
}

/// Builds the public URLs handed out to users
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    base_url: String,
}

impl LinkBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn upload(&self, token: &str) -> String {
        format!("{}/upload?token={token}", self.base_url)
    }

    pub fn lens_upload(&self, token: &str) -> String {
        format!("{}/lens_upload?token={token}", self.base_url)
    }

    pub fn download(&self, file_name: &str) -> String {
        format!("{}/download/{file_name}", self.base_url)
    }

    pub fn lens_download(&self, file_name: &str) -> String {
        format!("{}/lens_download/{file_name}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_link_without_note() {
        let link = payment_link("PhonePe", "user@upi", 100.5, "");
        assert_eq!(link, "upi://pay?pa=user@upi&am=100.50&cu=INR");
    }

    #[test]
    fn test_payment_link_with_note() {
        let link = payment_link("GooglePay", "shop@okaxis", 42.0, "Lunch payment");
        assert_eq!(
            link,
            "upi://pay?pa=shop@okaxis&am=42.00&cu=INR&tn=Lunch payment"
        );
    }

    #[test]
    fn test_payment_link_rounds_to_two_places() {
        let link = payment_link("BHIM", "a@b", 9.999, "");
        assert!(link.contains("am=10.00"));
    }

    #[test]
    fn test_link_builder_trims_trailing_slash() {
        let links = LinkBuilder::new("http://localhost:8086/");
        assert_eq!(
            links.upload("abc"),
            "http://localhost:8086/upload?token=abc"
        );
        assert_eq!(
            links.lens_upload("abc"),
            "http://localhost:8086/lens_upload?token=abc"
        );
        assert_eq!(
            links.download("x.pdf"),
            "http://localhost:8086/download/x.pdf"
        );
        assert_eq!(
            links.lens_download("x.txt"),
            "http://localhost:8086/lens_download/x.txt"
        );
    }
}
