//! services/cli/src/adapters/generation_llm.rs
//!
//! This module contains the adapter for the generation collaborator.
//! It implements the `GenerationService` port from the `core` crate.

const SUMMARY_SYSTEM_PROMPT: &str = "You are an assistant preparing material for a teacher. \
Summarize the provided document in a few short paragraphs, keeping the key facts and the \
overall structure of the original. Output the summary only, with no preamble.";

const QUIZ_SYSTEM_PROMPT: &str = r#"You are an assistant generating a multiple-choice quiz from a document.

Produce EXACTLY the requested number of questions. Each question has four options labelled A) to D), one of them correct.

Output format, with nothing before or after:

1. <question text>
A) <option>
B) <option>
C) <option>
D) <option>

... further questions ...

### Answer Key
1: <correct option letter>
2: <correct option letter>
... one line per question ...

The `### Answer Key` heading line must appear exactly once, after the last question."#;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;

use classdocs_core::domain::GeneratedQuiz;
use classdocs_core::ports::{GenerationService, PortError, PortResult};

/// The heading the quiz prompt demands between questions and key. The
/// artifact is split here; its absence means the collaborator failed.
const ANSWER_KEY_MARKER: &str = "### Answer Key";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `GenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiGenerationAdapter {
    client: Client<OpenAIConfig>,
    summary_model: String,
    quiz_model: String,
}

impl OpenAiGenerationAdapter {
    /// Creates a new `OpenAiGenerationAdapter`.
    pub fn new(client: Client<OpenAIConfig>, summary_model: String, quiz_model: String) -> Self {
        Self {
            client,
            summary_model,
            quiz_model,
        }
    }

    async fn complete(&self, model: &str, system: &str, user: String) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| PortError::GenerationFailed(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user)
                .build()
                .map_err(|e| PortError::GenerationFailed(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::GenerationFailed(e.to_string()))?;

        // Call the API and manually map the error if it occurs; collaborator
        // failures are surfaced to the caller, never retried here.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::GenerationFailed(e.to_string()))?;

        // Extract the text content from the first choice in the response.
        if let Some(choice) = response.choices.into_iter().next() {
            if let Some(content) = choice.message.content {
                Ok(content)
            } else {
                Err(PortError::GenerationFailed(
                    "LLM response contained no text content".to_string(),
                ))
            }
        } else {
            Err(PortError::GenerationFailed(
                "LLM returned no choices in its response".to_string(),
            ))
        }
    }
}

/// Splits a generated artifact into quiz text and answer-key text at the
/// `### Answer Key` heading.
fn split_quiz_artifact(artifact: &str) -> PortResult<GeneratedQuiz> {
    let marker_start = artifact.find(ANSWER_KEY_MARKER).ok_or_else(|| {
        PortError::GenerationFailed(format!(
            "generated quiz is missing the '{ANSWER_KEY_MARKER}' section"
        ))
    })?;

    let quiz_text = artifact[..marker_start].trim().to_string();
    let answer_key_text = artifact[marker_start..].trim().to_string();

    if quiz_text.is_empty() {
        return Err(PortError::GenerationFailed(
            "generated quiz has no questions before the answer key".to_string(),
        ));
    }

    Ok(GeneratedQuiz {
        quiz_text,
        answer_key_text,
    })
}

//=========================================================================================
// `GenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl GenerationService for OpenAiGenerationAdapter {
    /// Produces a prose summary of the document text.
    async fn summarize(&self, document_text: &str) -> PortResult<String> {
        let user = format!("Summarize this for a teacher:\n\n{document_text}");
        self.complete(&self.summary_model, SUMMARY_SYSTEM_PROMPT, user)
            .await
    }

    /// Produces a quiz/answer-key pair for the document text.
    async fn generate_quiz(
        &self,
        document_text: &str,
        question_count: u32,
    ) -> PortResult<GeneratedQuiz> {
        let user = format!(
            "Create {question_count} quiz questions based on the following content:\n\n\
             {document_text}"
        );
        let artifact = self
            .complete(&self.quiz_model, QUIZ_SYSTEM_PROMPT, user)
            .await?;
        split_quiz_artifact(&artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_artifact_at_answer_key_heading() {
        let artifact = "1. What color is the sky?\nA) Red\nB) Blue\nC) Green\nD) Black\n\n\
                        ### Answer Key\n1: B\n";
        let generated = split_quiz_artifact(artifact).unwrap();
        assert!(generated.quiz_text.starts_with("1. What color"));
        assert!(!generated.quiz_text.contains("Answer Key"));
        assert!(generated.answer_key_text.starts_with("### Answer Key"));
        assert!(generated.answer_key_text.contains("1: B"));
    }

    #[test]
    fn missing_marker_is_a_generation_failure() {
        let err = split_quiz_artifact("1. Question\nA) x\n").unwrap_err();
        assert!(matches!(err, PortError::GenerationFailed(_)));
    }

    #[test]
    fn artifact_without_questions_is_rejected() {
        let err = split_quiz_artifact("### Answer Key\n1: A\n").unwrap_err();
        assert!(matches!(err, PortError::GenerationFailed(_)));
    }
}
