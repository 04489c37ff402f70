//! User-facing replies and their text

use super::Direction;

pub const MAIN_MENU: &str = "Welcome to the MCP Server! Please select a service by replying with the option number:\n\
1. Generate UPI Payment Link\n\
2. Convert Text/Doc to PDF or PDF to Text/Doc\n\
3. Google Lens Image Search";

/// Why an answer was rejected; the user stays on the same stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidInput {
    MenuChoice,
    UpiAppOutOfRange,
    UpiAppNotNumber,
    PaymentDetailsFormat,
    PaymentAmount,
    DirectionChoice,
    LensChoice,
}

impl InvalidInput {
    pub fn message(self) -> &'static str {
        match self {
            InvalidInput::MenuChoice => "Invalid input. Please select either 1, 2 or 3.",
            InvalidInput::UpiAppOutOfRange => {
                "Invalid choice. Please pick a valid number from the list."
            }
            InvalidInput::UpiAppNotNumber => {
                "Please enter a valid number corresponding to a UPI app."
            }
            InvalidInput::PaymentDetailsFormat => {
                "Invalid format. Please provide in <recipient_upi_id>;<amount>;<optional_note> format."
            }
            InvalidInput::PaymentAmount => "Please enter a valid numeric amount.",
            InvalidInput::DirectionChoice => {
                "Invalid input. Please type '1' or '2' to specify the conversion direction."
            }
            InvalidInput::LensChoice => "Invalid input. Please type '1' to generate an upload link.",
        }
    }
}

/// What to tell the user after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Menu,
    UpiAppList { apps: Vec<String> },
    UpiDetailsPrompt { service: String },
    PaymentLink { link: String },
    DirectionPrompt,
    /// Needs the link issued by `Effect::IssueUploadLink`
    FileUploadLink { direction: Direction },
    LensPrompt,
    /// Needs the link issued by `Effect::IssueLensUploadLink`
    LensUploadLink,
    Processing,
    WaitingForPhoto,
    Invalid(InvalidInput),
    /// Stored state was unusable and has been reset
    Recovered,
    /// An effect failed; the user stays where they were
    LinkUnavailable,
}

impl Reply {
    /// Render the reply text. `upload_link` is the link produced by the
    /// transition's effect, if it had one.
    pub fn render(&self, upload_link: Option<&str>) -> String {
        let upload_link = upload_link.unwrap_or_default();
        match self {
            Reply::Menu => MAIN_MENU.to_string(),
            Reply::UpiAppList { apps } => {
                let numbered: Vec<String> = apps
                    .iter()
                    .enumerate()
                    .map(|(i, app)| format!("{}. {app}", i + 1))
                    .collect();
                format!(
                    "You chose UPI Payment Link Generator.\n\
                     Please select a UPI app by typing its number:\n{}",
                    numbered.join("\n")
                )
            }
            Reply::UpiDetailsPrompt { service } => format!(
                "You selected {service}.\n\
                 Please provide payment details in the format:\n\
                 <recipient_upi_id>;<amount>;<optional_note>\n\
                 Example: user@upi;100.50;Lunch payment"
            ),
            Reply::PaymentLink { link } => format!(
                "UPI Payment Link generated:\n{link}\n\nReturning to main menu:\n{MAIN_MENU}"
            ),
            Reply::DirectionPrompt => "You chose Text/Doc <> PDF Conversion.\n\
                 Please type '1' to convert Text/Doc to PDF or '2' for PDF to Text/Doc."
                .to_string(),
            Reply::FileUploadLink { direction } => {
                let what = match direction {
                    Direction::ToPdf => "text/doc file",
                    Direction::ToText => "PDF file",
                };
                format!(
                    "Please upload your {what} here:\n{upload_link}\n\
                     After upload and conversion, you will receive a download link here."
                )
            }
            Reply::LensPrompt => "You chose Google Lens Image Search.\n\
                 Type '1' to generate a temporary upload link to upload your photo."
                .to_string(),
            Reply::LensUploadLink => format!(
                "Here is your temporary upload link:\n{upload_link}\n\
                 Please upload your photo here from your gallery.\n\
                 After upload, Google Lens results will be processed and you will receive them here."
            ),
            Reply::Processing => {
                "Processing your file. You will get the download link here soon.".to_string()
            }
            Reply::WaitingForPhoto => "Waiting for your photo upload and Google Lens processing. \
                 You will receive results here soon."
                .to_string(),
            Reply::Invalid(reason) => reason.message().to_string(),
            Reply::Recovered => format!("Something went wrong. Returning to main menu.\n{MAIN_MENU}"),
            Reply::LinkUnavailable => {
                "Sorry, an upload link could not be created right now. Please try again.".to_string()
            }
        }
    }
}
