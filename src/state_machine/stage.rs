//! Dialog stage types

use serde::{Deserialize, Serialize};

/// UPI apps offered when a user enters the payment-link flow, in menu order
pub const UPI_APPS: [&str; 4] = ["GooglePay", "PhonePe", "Paytm", "BHIM"];

/// Which conversion a file-conversion upload is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Plain text in, PDF out
    ToPdf,
    /// PDF in, plain text out
    ToText,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::ToPdf => "to_pdf",
            Direction::ToText => "to_text",
        }
    }

    /// Lowercase extensions (with leading dot) accepted for upload
    pub fn accepted_extensions(self) -> &'static [&'static str] {
        match self {
            Direction::ToPdf => &[".txt"],
            Direction::ToText => &[".pdf"],
        }
    }

    /// Extension of the converted file
    pub fn output_extension(self) -> &'static str {
        match self {
            Direction::ToPdf => ".pdf",
            Direction::ToText => ".txt",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a user currently is in the dialog.
///
/// Each stage carries only what the next answer needs, so an app choice can
/// never be pending without the list it indexes into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    /// Top-level service menu
    #[default]
    Menu,

    /// Waiting for the user to pick a UPI app by number
    UpiServiceAskApp { apps: Vec<String> },

    /// Waiting for `<upi_id>;<amount>[;<note>]`
    UpiAskDetails { service: String },

    /// Waiting for "1" (to PDF) or "2" (to text)
    FileConvAskDirection,

    /// Upload link handed out; conversion happens on the upload endpoint
    FileConvProvideLink { direction: Direction },

    /// Waiting for "1" to issue a lens upload link
    LensAskGenerateLink,

    /// Lens upload link handed out
    LensUploadLinkGenerated,
}

/// Owned copy of [`UPI_APPS`]
pub fn upi_apps() -> Vec<String> {
    UPI_APPS.iter().map(ToString::to_string).collect()
}

impl Stage {
    /// Stage entered when the user chooses the UPI service
    #[allow(dead_code)] // Used in tests
    pub fn upi_app_choice() -> Self {
        Stage::UpiServiceAskApp { apps: upi_apps() }
    }

    /// Stable snake_case name, used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Menu => "menu",
            Stage::UpiServiceAskApp { .. } => "upi_service_ask_app",
            Stage::UpiAskDetails { .. } => "upi_ask_details",
            Stage::FileConvAskDirection => "file_conv_ask_direction",
            Stage::FileConvProvideLink { .. } => "file_conv_provide_link",
            Stage::LensAskGenerateLink => "lens_ask_generate_link",
            Stage::LensUploadLinkGenerated => "lens_upload_link_generated",
        }
    }
}
