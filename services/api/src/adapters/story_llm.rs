//! services/api/src/adapters/story_llm.rs
//!
//! This module contains the adapter for the kids' story and question LLM.
//! It implements the `StoryGenerationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use kids_learning_core::{
    domain::AgeGroup,
    ports::{GeneratedStory, PortError, PortResult, StoryGenerationService},
};

const STORY_INSTRUCTIONS: &str = "You write short, gentle stories for children. \
Use simple words suited to the reader's age, keep the story under 300 words, and never include \
anything scary, violent, or unkind. The first line of your reply is the story title on its own, \
with no quotes. The story follows on the next lines.";

const ANSWER_INSTRUCTIONS: &str = "You answer questions from curious children. \
Reply in two to four short, friendly sentences a child can understand. If the question is not \
appropriate for a child, kindly suggest asking a grown-up instead.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `StoryGenerationService` using an OpenAI chat model.
#[derive(Clone)]
pub struct OpenAiStoryAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiStoryAdapter {
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    async fn complete(&self, system: &str, user: String, max_tokens: u32) -> PortResult<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(max_tokens)
            .temperature(0.8)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Network(e.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| PortError::Unexpected("The model returned no content".to_string()))
    }
}

/// Splits a completion into its title line and the story body.
fn split_story(raw: &str) -> GeneratedStory {
    let mut lines = raw.lines();
    let title = lines
        .next()
        .map(|l| l.trim().trim_matches('"').trim_start_matches('#').trim().to_string())
        .unwrap_or_default();
    let text = lines.collect::<Vec<_>>().join("\n").trim().to_string();
    if text.is_empty() {
        return GeneratedStory {
            title: "A Little Story".to_string(),
            text: title,
        };
    }
    GeneratedStory { title, text }
}

fn reader_age(age_group: AgeGroup) -> &'static str {
    match age_group {
        AgeGroup::Ages3To5 => "3 to 5",
        AgeGroup::Ages6To8 => "6 to 8",
        AgeGroup::Ages9To12 => "9 to 12",
    }
}

//=========================================================================================
// `StoryGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl StoryGenerationService for OpenAiStoryAdapter {
    async fn generate_story(
        &self,
        prompt: &str,
        age_group: AgeGroup,
    ) -> PortResult<GeneratedStory> {
        let user = format!(
            "The reader is {} years old. Write a story about: {}",
            reader_age(age_group),
            prompt
        );
        let raw = self.complete(STORY_INSTRUCTIONS, user, 600).await?;
        Ok(split_story(&raw))
    }

    async fn answer_question(&self, question: &str, context: Option<&str>) -> PortResult<String> {
        let user = match context {
            Some(context) => format!("CONTEXT:\n---\n{}\n---\n\nQUESTION:\n{}", context, question),
            None => format!("QUESTION:\n{}", question),
        };
        self.complete(ANSWER_INSTRUCTIONS, user, 200).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_becomes_the_title() {
        let story = split_story("\"The Brave Snail\"\nOnce there was a snail.\nThe end.");
        assert_eq!(story.title, "The Brave Snail");
        assert_eq!(story.text, "Once there was a snail.\nThe end.");
    }

    #[test]
    fn single_line_reply_is_kept_as_text() {
        let story = split_story("Once there was a snail.");
        assert_eq!(story.text, "Once there was a snail.");
        assert_eq!(story.title, "A Little Story");
    }
}
