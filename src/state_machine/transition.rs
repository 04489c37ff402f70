//! Pure stage transition function
//!
//! Given the same stage and event it always produces the same result, with
//! no I/O. Token issuance is requested through effects.

use super::stage::upi_apps;
use super::{Direction, Effect, Event, InvalidInput, Reply, Stage};
use crate::links::payment_link;

/// Plain-text message that returns to the menu from any stage
const MENU_TRIGGER: &str = "send me the menu";

/// Result of a stage transition
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub new_stage: Stage,
    pub reply: Reply,
    pub effects: Vec<Effect>,
}

impl Transition {
    pub fn new(stage: Stage, reply: Reply) -> Self {
        Self {
            new_stage: stage,
            reply,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Stay on the current stage and explain what was wrong
    fn reject(stage: &Stage, reason: InvalidInput) -> Self {
        Self::new(stage.clone(), Reply::Invalid(reason))
    }
}

/// Parsed `<upi_id>;<amount>[;<note>]` answer
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentDetails {
    pub upi_id: String,
    pub amount: f64,
    pub note: String,
}

/// Parse payment details. Fields are separated by `;` and trimmed; parts
/// after the note are ignored.
pub fn parse_payment_details(text: &str) -> Result<PaymentDetails, InvalidInput> {
    let parts: Vec<&str> = text.split(';').map(str::trim).collect();
    if parts.len() < 2 || parts[0].is_empty() {
        return Err(InvalidInput::PaymentDetailsFormat);
    }

    let amount: f64 = parts[1]
        .parse()
        .map_err(|_| InvalidInput::PaymentAmount)?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(InvalidInput::PaymentAmount);
    }

    Ok(PaymentDetails {
        upi_id: parts[0].to_string(),
        // folds -0 into 0
        amount: amount.abs(),
        note: parts.get(2).map(ToString::to_string).unwrap_or_default(),
    })
}

/// Pure transition function
pub fn transition(stage: &Stage, event: Event) -> Transition {
    let text = match event {
        Event::Reset => return Transition::new(Stage::Menu, Reply::Menu),
        Event::UserMessage { text } => text,
    };
    let input = text.trim();

    if input.eq_ignore_ascii_case(MENU_TRIGGER) {
        return Transition::new(Stage::Menu, Reply::Menu);
    }

    match stage {
        // ============================================================
        // Main menu
        // ============================================================
        Stage::Menu => match input {
            "1" => {
                let apps = upi_apps();
                Transition::new(
                    Stage::UpiServiceAskApp { apps: apps.clone() },
                    Reply::UpiAppList { apps },
                )
            }
            "2" => Transition::new(Stage::FileConvAskDirection, Reply::DirectionPrompt),
            "3" => Transition::new(Stage::LensAskGenerateLink, Reply::LensPrompt),
            _ => Transition::reject(stage, InvalidInput::MenuChoice),
        },

        // ============================================================
        // UPI payment link
        // ============================================================
        Stage::UpiServiceAskApp { apps } => match input.parse::<i64>() {
            Ok(choice) => match usize::try_from(choice)
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|idx| apps.get(idx))
            {
                Some(service) => Transition::new(
                    Stage::UpiAskDetails {
                        service: service.clone(),
                    },
                    Reply::UpiDetailsPrompt {
                        service: service.clone(),
                    },
                ),
                None => Transition::reject(stage, InvalidInput::UpiAppOutOfRange),
            },
            Err(_) => Transition::reject(stage, InvalidInput::UpiAppNotNumber),
        },

        Stage::UpiAskDetails { service } => match parse_payment_details(&text) {
            Ok(details) => {
                let link = payment_link(service, &details.upi_id, details.amount, &details.note);
                Transition::new(Stage::Menu, Reply::PaymentLink { link })
            }
            Err(reason) => Transition::reject(stage, reason),
        },

        // ============================================================
        // File conversion
        // ============================================================
        Stage::FileConvAskDirection => {
            let direction = match input {
                "1" => Direction::ToPdf,
                "2" => Direction::ToText,
                _ => return Transition::reject(stage, InvalidInput::DirectionChoice),
            };
            Transition::new(
                Stage::FileConvProvideLink { direction },
                Reply::FileUploadLink { direction },
            )
            .with_effect(Effect::IssueUploadLink { direction })
        }

        Stage::FileConvProvideLink { .. } => Transition::new(stage.clone(), Reply::Processing),

        // ============================================================
        // Image search
        // ============================================================
        Stage::LensAskGenerateLink => {
            if input == "1" {
                Transition::new(Stage::LensUploadLinkGenerated, Reply::LensUploadLink)
                    .with_effect(Effect::IssueLensUploadLink)
            } else {
                Transition::reject(stage, InvalidInput::LensChoice)
            }
        }

        Stage::LensUploadLinkGenerated => Transition::new(stage.clone(), Reply::WaitingForPhoto),
    }
}
