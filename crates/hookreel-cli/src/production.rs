//! One short in progress: topic, generated ideas, the caption as the operator
//! edited it, the comment story, and finally the encoded video.

use std::path::Path;

use hookreel_core::{HookreelError, HookreelResult};
use hookreel_encode::{FfmpegEncoder, VideoArtifact};
use hookreel_render::FrameComposer;

use crate::ai::{self, ModelClient, VideoContent};

#[derive(Debug, Clone)]
pub struct Production {
    topic: String,
    content: Option<VideoContent>,
    caption: Option<String>,
    story: Option<String>,
    video: Option<VideoArtifact>,
}

impl Production {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            content: None,
            caption: None,
            story: None,
            video: None,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn content(&self) -> Option<&VideoContent> {
        self.content.as_ref()
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn story(&self) -> Option<&str> {
        self.story.as_deref()
    }

    pub fn video(&self) -> Option<&VideoArtifact> {
        self.video.as_ref()
    }

    /// Generate fresh ideas. Any earlier story is dropped since it was written
    /// for the old hook; on failure the production holds no content at all.
    pub fn generate_ideas(&mut self, client: &dyn ModelClient) -> HookreelResult<&VideoContent> {
        self.story = None;
        self.content = None;
        self.caption = None;

        let content = ai::generate_content(client, &self.topic)?;
        self.caption = Some(content.on_screen_text.clone());
        Ok(self.content.insert(content))
    }

    /// Replace the caption, e.g. after the operator edited the generated hook.
    pub fn set_caption(&mut self, caption: impl Into<String>) {
        self.caption = Some(caption.into());
    }

    /// Write the comment story for the current caption. A failed call
    /// leaves no story behind, not even one written for an earlier caption.
    pub fn generate_story(&mut self, client: &dyn ModelClient) -> HookreelResult<&str> {
        self.story = None;
        let caption = self.caption.as_deref().ok_or_else(|| {
            HookreelError::InvalidArgument("no caption yet: generate ideas or set one".to_string())
        })?;
        let story = ai::generate_comment_story(client, &self.topic, caption)?;
        Ok(self.story.insert(story).as_str())
    }

    /// Compose the caption and `watermark` over `background` and encode the
    /// result to `output`. Any earlier artifact is forgotten first.
    pub fn create_video(
        &mut self,
        composer: &FrameComposer,
        encoder: &FfmpegEncoder,
        background: &Path,
        watermark: &str,
        duration_secs: f64,
        output: &Path,
    ) -> HookreelResult<&VideoArtifact> {
        self.video = None;
        let caption = self.caption.as_deref().ok_or_else(|| {
            HookreelError::InvalidArgument("no caption yet: generate ideas or set one".to_string())
        })?;
        let composed = composer.compose_file(background, caption, watermark)?;
        let artifact = encoder.encode(&composed.frame, duration_secs, output)?;
        Ok(self.video.insert(artifact))
    }
}
