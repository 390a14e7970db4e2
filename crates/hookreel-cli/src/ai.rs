//! Language model calls: the ideas prompt (structured JSON) and the comment
//! story prompt (free text), plus the Gemini client that serves both.

use hookreel_core::{HookreelError, HookreelResult, ModelConfig};
use reqwest::blocking::Client;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;

/// Anything that turns a prompt into text.
pub trait ModelClient {
    fn generate(&self, prompt: &str) -> HookreelResult<String>;
}

/// Gemini `generateContent` over blocking HTTP.
pub struct GeminiClient {
    client: Client,
    config: ModelConfig,
    api_key: String,
}

impl GeminiClient {
    /// Build a client, reading the API key from the environment variable
    /// named in the config.
    pub fn from_config(config: &ModelConfig) -> HookreelResult<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            HookreelError::Config(format!(
                "{} is not set (needed for Gemini requests)",
                config.api_key_env
            ))
        })?;
        Ok(Self::with_api_key(config.clone(), api_key))
    }

    pub fn with_api_key(config: ModelConfig, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            config,
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

impl ModelClient for GeminiClient {
    fn generate(&self, prompt: &str) -> HookreelResult<String> {
        let body = json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{"text": prompt}]
                }
            ]
        });

        tracing::debug!("POST {} ({} prompt chars)", self.endpoint(), prompt.len());
        let res = self
            .client
            .post(self.endpoint())
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .map_err(|e| HookreelError::model(format!("Gemini request failed: {}", e)))?;

        let status = res.status();
        let text = res
            .text()
            .map_err(|e| HookreelError::model(format!("failed to read Gemini response: {}", e)))?;
        if !status.is_success() {
            return Err(HookreelError::model_with_raw(
                format!("Gemini generateContent failed: {}", status),
                text,
            ));
        }

        let raw: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
            HookreelError::model_with_raw(format!("Gemini response is not JSON: {}", e), &text)
        })?;
        raw.pointer("/candidates/0/content/parts/0/text")
            .and_then(|t| t.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                HookreelError::model_with_raw(
                    "unexpected Gemini response shape (missing candidates[0].content.parts[0].text)",
                    text,
                )
            })
    }
}

/// What the ideas prompt produces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoContent {
    /// Two-line hook drawn on the video.
    #[serde(default)]
    pub on_screen_text: String,
    /// Prompt to paste into an image generator for the background.
    #[serde(default)]
    pub image_prompt: String,
    #[serde(default)]
    pub description: String,
    /// Comma-separated tags.
    #[serde(default, deserialize_with = "tags_as_string")]
    pub tags: String,
}

/// Models sometimes answer with a JSON array instead of the requested
/// comma-separated string.
fn tags_as_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Tags {
        Joined(String),
        List(Vec<String>),
    }

    Ok(match Tags::deserialize(deserializer)? {
        Tags::Joined(s) => s,
        Tags::List(items) => items.join(", "),
    })
}

pub fn ideas_prompt(topic: &str) -> String {
    format!(
        concat!(
            "You are an expert in creating viral YouTube Shorts content. ",
            "Based on \"{}\", generate a JSON object with:\n",
            "1. on_screen_text: an intriguing two-line hook. The first line is a mysterious ",
            "statement. The second line MUST tell the viewer to read the comments for the ",
            "full story.\n",
            "2. image_prompt: a detailed, cinematic prompt for an AI image generator.\n",
            "3. description: a YouTube description with 3-5 relevant hashtags.\n",
            "4. tags: a comma-separated string of 10 or more relevant YouTube tags.\n",
            "Provide ONLY the JSON object."
        ),
        topic
    )
}

pub fn story_prompt(topic: &str, on_screen_text: &str) -> String {
    format!(
        concat!(
            "Context: a YouTube Short about \"{}\" was published with the on-screen text: \"{}\".\n\n",
            "Persona: you are a researcher who explains mysterious topics with the authority ",
            "of a history professor and the pull of a seasoned investigator. You build a case ",
            "point by point. You are not a hyperactive vlogger.\n\n",
            "Task: write the pinned comment that reveals the full story.\n\n",
            "Rules:\n",
            "1. The body MUST be a numbered list (1., 2., 3., ...). Each point is one piece of ",
            "evidence. This rule matters most.\n",
            "2. Open with a short, intriguing hook paragraph before the list.\n",
            "3. No filler phrases such as \"Get this:\" or \"The crazy part is...\". Authority ",
            "comes from the facts.\n",
            "4. Close with a paragraph that leaves the reader thinking.\n\n",
            "Shape of a good answer:\n",
            "<hook paragraph>\n",
            "<one line leading into the evidence>\n",
            "1. <evidence>\n",
            "2. <evidence>\n",
            "3. <evidence>\n",
            "<closing paragraph>\n\n",
            "A bad answer has no numbered list, presents no specific evidence and leans on ",
            "forced conversational phrases."
        ),
        topic, on_screen_text
    )
}

/// Remove markdown code fences models like to wrap JSON in.
fn strip_code_fences(raw: &str) -> String {
    raw.trim()
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Parse the ideas response. The raw text is kept on failure.
pub fn parse_video_content(raw: &str) -> HookreelResult<VideoContent> {
    let cleaned = strip_code_fences(raw);
    serde_json::from_str(&cleaned).map_err(|e| {
        HookreelError::model_with_raw(format!("model output is not the expected JSON: {}", e), raw)
    })
}

/// Ask the model for hook text, image prompt, description and tags.
pub fn generate_content(client: &dyn ModelClient, topic: &str) -> HookreelResult<VideoContent> {
    let raw = client.generate(&ideas_prompt(topic))?;
    let content = parse_video_content(&raw)?;
    tracing::info!("generated ideas for '{}'", topic);
    Ok(content)
}

/// Ask the model for the pinned comment that pays off the hook.
pub fn generate_comment_story(
    client: &dyn ModelClient,
    topic: &str,
    on_screen_text: &str,
) -> HookreelResult<String> {
    let raw = client.generate(&story_prompt(topic, on_screen_text))?;
    let story = raw.trim();
    if story.is_empty() {
        return Err(HookreelError::model_with_raw("model returned an empty story", raw));
    }
    tracing::info!("generated comment story for '{}' ({} chars)", topic, story.len());
    Ok(story.to_string())
}
