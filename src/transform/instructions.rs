//! Instruction builder for note transforms
//!
//! Turns a [`TransformOptions`] value into the system instruction and user
//! turn sent to the inference service. Every option contributes exactly one
//! fragment: a positive one when enabled, an explicit negative one when
//! disabled. Models tend to perform an action they were not asked to skip,
//! so leaving a disabled option unmentioned is not the same as disabling it.

use crate::types::{TransformOption, TransformOptions};
use serde_json::json;

/// Fixed behavioral preamble
const PREAMBLE: &str = "You are a careful study assistant that transforms a user's notes.\n\
Rules:\n\
- Work only with the information in the notes. Do NOT invent facts, sources, dates, or figures.\n\
- If the notes are unclear, keep the original wording rather than guessing.\n\
- Respond with a single JSON object and nothing else: no prose, no markdown code fences.";

/// Whether a fragment asks for or forbids its transformation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

/// The instruction emitted for one option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionFragment {
    pub option: TransformOption,
    pub polarity: Polarity,
    pub text: &'static str,
}

/// Complete prompt for one transform call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformPrompt {
    /// Preamble, per-option fragments and output contract
    pub system: String,
    /// User turn embedding the original note text
    pub user: String,
}

fn fragment_text(option: TransformOption, polarity: Polarity) -> &'static str {
    match (option, polarity) {
        (TransformOption::AutoFormat, Polarity::Positive) => {
            "FORMAT: Reformat the notes into clean, well-organized text. Use headings, \
             bullet points and short paragraphs where they help, fix obvious typos, and \
             keep every piece of information. Put the result in \"formattedText\" as HTML \
             using only <h3>, <p>, <ul>, <ol>, <li>, <strong> and <em> tags."
        }
        (TransformOption::AutoFormat, Polarity::Negative) => {
            "FORMAT: Do NOT reformat, restructure or reword the notes. Put the original \
             text, unchanged, in \"formattedText\"."
        }
        (TransformOption::HighlightKeyTerms, Polarity::Positive) => {
            "KEY TERMS: Identify the 3 to 10 most important terms or short phrases. Copy \
             each exactly as it appears in \"formattedText\" and list them in \"highlights\". \
             Do not wrap or mark them inside the text."
        }
        (TransformOption::HighlightKeyTerms, Polarity::Negative) => {
            "KEY TERMS: Do NOT identify or highlight key terms. \"highlights\" must be an \
             empty list."
        }
        (TransformOption::Comments, Polarity::Positive) => {
            "COMMENTS: Write 2 to 5 short comments that help the reader study these notes: \
             gaps, connections between ideas, or questions worth checking. Put them in \
             \"comments\"."
        }
        (TransformOption::Comments, Polarity::Negative) => {
            "COMMENTS: Do NOT write any comments, summaries or feedback. \"comments\" must \
             be an empty list."
        }
    }
}

/// One fragment per option, in [`TransformOption::ALL`] order
pub fn fragments(options: &TransformOptions) -> Vec<InstructionFragment> {
    TransformOption::ALL
        .iter()
        .map(|&option| {
            let polarity = if options.get(option) {
                Polarity::Positive
            } else {
                Polarity::Negative
            };
            InstructionFragment {
                option,
                polarity,
                text: fragment_text(option, polarity),
            }
        })
        .collect()
}

/// Example of the expected output object.
///
/// List fields of disabled options are shown as empty lists so the model is
/// anchored to the exact shape it must return.
pub fn output_schema(options: &TransformOptions) -> serde_json::Value {
    let highlights = if options.highlight_key_terms {
        json!(["term one", "term two"])
    } else {
        json!([])
    };
    let comments = if options.comments {
        json!(["comment one", "comment two"])
    } else {
        json!([])
    };

    json!({
        "formattedText": "string",
        "highlights": highlights,
        "comments": comments,
    })
}

/// Build the prompt for a transform. Pure function of its inputs.
pub fn build_transform_prompt(text: &str, options: &TransformOptions) -> TransformPrompt {
    let mut system = String::from(PREAMBLE);
    system.push_str("\n\nTasks:\n");
    for fragment in fragments(options) {
        system.push_str("- ");
        system.push_str(fragment.text);
        system.push('\n');
    }

    let schema = serde_json::to_string_pretty(&output_schema(options))
        .unwrap_or_else(|_| output_schema(options).to_string());
    system.push_str("\nReturn exactly this JSON shape:\n");
    system.push_str(&schema);

    let user = format!("Notes:\n<<<\n{}\n>>>", text);

    TransformPrompt { system, user }
}

/// Build the prompt for a single-term definition
pub fn build_definition_prompt(term: &str, context: &str) -> TransformPrompt {
    let system = if context.trim().is_empty() {
        "You define terms for students. Give a concise academic definition in 1 to 3 \
         sentences. Use plain language and avoid unexplained jargon. Reply with the \
         definition text only."
            .to_string()
    } else {
        "You define terms for students. Using the provided context, explain what the \
         term means as it is used there, in 1 to 3 sentences. Stay grounded in the \
         context, use plain language and avoid unexplained jargon. Reply with the \
         definition text only."
            .to_string()
    };

    let user = if context.trim().is_empty() {
        format!("Term: {}", term)
    } else {
        format!("Term: {}\n\nContext:\n<<<\n{}\n>>>", term, context)
    };

    TransformPrompt { system, user }
}
