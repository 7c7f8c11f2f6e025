/*!
 * Interpretation of provider responses into unit statuses.
 *
 * Every stage runs the same rules, in order: primary text, then candidate
 * texts, then block feedback. A missing response or a failed call is turned
 * into a failed unit rather than an error, so one bad file never stops a run.
 */

use log::error;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ProviderError;
use crate::pipeline::units::UnitStatus;
use crate::providers::{GenerationResponse, TaskKind};

/// First fenced code block, with an optional language tag
static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:[a-zA-Z0-9_+#-]+)?\n(.*?)\n```").expect("Invalid fenced block regex")
});

/// Status plus the text to store for a unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreted {
    pub status: UnitStatus,
    pub text: String,
}

impl Interpreted {
    fn new(status: UnitStatus, text: String) -> Self {
        Self { status, text }
    }
}

/// Map the outcome of a provider call onto a unit status and text
pub fn interpret(
    outcome: Result<Option<GenerationResponse>, ProviderError>,
    task: TaskKind,
    subject: &str,
) -> Interpreted {
    let description = format!("{} for File: {}", task.label(), subject);

    let interpreted = match outcome {
        Err(e) => Interpreted::new(
            UnitStatus::Exception { message: e.to_string() },
            format!("Exception during {}: {}", description, e),
        ),
        Ok(None) => Interpreted::new(
            UnitStatus::Error {
                detail: "null response".to_string(),
            },
            format!(
                "The service did not return a response object (null response) for {}.",
                description
            ),
        ),
        Ok(Some(response)) => interpret_response(response, &description),
    };

    if interpreted.status.is_failure() {
        error!("{} ({}): {}", description, interpreted.status, interpreted.text);
    }
    interpreted
}

fn interpret_response(response: GenerationResponse, description: &str) -> Interpreted {
    if let Some(text) = response.text.filter(|t| !t.is_empty()) {
        return Interpreted::new(UnitStatus::Ok, text);
    }

    if !response.candidates.is_empty() {
        let texts: Vec<String> = response
            .candidates
            .into_iter()
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .filter(|t| !t.is_empty())
            .collect();

        return if texts.is_empty() {
            Interpreted::new(
                UnitStatus::Error {
                    detail: "candidates without text".to_string(),
                },
                format!(
                    "The service returned candidates but no text content for {}.",
                    description
                ),
            )
        } else {
            Interpreted::new(UnitStatus::OkWithCaveats, texts.join(" "))
        };
    }

    if let Some(feedback) = response.prompt_feedback {
        let reason = feedback.block_reason.unwrap_or_else(|| "unspecified".to_string());
        let mut text = format!(
            "Prompt or response for {} was blocked by safety. Reason: {}",
            description, reason
        );
        if !feedback.safety_ratings.is_empty() {
            let ratings: Vec<String> = feedback
                .safety_ratings
                .iter()
                .map(|r| format!("{}: {}", r.category, r.probability))
                .collect();
            text.push_str(" | Ratings: ");
            text.push_str(&ratings.join(", "));
        }
        return Interpreted::new(UnitStatus::Blocked { reason }, text);
    }

    Interpreted::new(
        UnitStatus::Error {
            detail: "unexpected response".to_string(),
        },
        format!("The service returned an unexpected response for {}.", description),
    )
}

/// Inner content of the first fenced code block, trimmed; otherwise the whole response trimmed
pub fn extract_code(response: &str) -> String {
    match FENCED_BLOCK.captures(response).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str().trim().to_string(),
        None => response.trim().to_string(),
    }
}
