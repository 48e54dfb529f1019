//! Conversation history and the bounded-image projection sent to the model.

use visor_providers::{Content, ContentBlock, Turn};

use crate::prompts::SCREENSHOT_OMITTED_MARKER;

/// The ordered conversation transcript.
///
/// Append-only during a run; owned exclusively by one [`Agent`]. An
/// optional system prompt occupies the first slot and survives
/// [`reset`](Self::reset).
///
/// [`Agent`]: crate::Agent
#[derive(Debug, Clone)]
pub struct Transcript {
    turns: Vec<Turn>,
    system_prompt: Option<String>,
}

impl Transcript {
    pub fn new(system_prompt: Option<&str>) -> Self {
        let system_prompt = system_prompt
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        let mut turns = Vec::new();
        if let Some(prompt) = &system_prompt {
            turns.push(Turn::system(prompt.clone()));
        }
        Self {
            turns,
            system_prompt,
        }
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Truncate back to the system prompt (or to nothing)
    pub fn reset(&mut self) {
        self.turns.clear();
        if let Some(prompt) = &self.system_prompt {
            self.turns.push(Turn::system(prompt.clone()));
        }
    }

    /// Project the transcript for the next request, keeping at most
    /// `max_images` image-bearing turns (the most recent ones).
    ///
    /// Pure and read-only: the stored transcript is never modified.
    /// Older image turns are reduced to their text prefixed with a fixed
    /// marker, or dropped entirely when no text remains.
    pub fn compact(&self, max_images: usize) -> Vec<Turn> {
        let image_indices: Vec<usize> = self
            .turns
            .iter()
            .enumerate()
            .filter(|(_, turn)| turn.has_image())
            .map(|(i, _)| i)
            .collect();

        if image_indices.len() <= max_images {
            return self.turns.clone();
        }

        let cutoff = image_indices.len() - max_images;
        let to_strip: std::collections::HashSet<usize> =
            image_indices[..cutoff].iter().copied().collect();

        let mut projected = Vec::with_capacity(self.turns.len());
        for (i, turn) in self.turns.iter().enumerate() {
            if !to_strip.contains(&i) {
                projected.push(turn.clone());
                continue;
            }

            let text_parts: Vec<&str> = match &turn.content {
                Some(Content::Blocks(blocks)) => blocks
                    .iter()
                    .filter_map(|block| match block {
                        ContentBlock::Text { text } => Some(text.as_str()),
                        ContentBlock::ImageUrl { .. } => None,
                    })
                    .collect(),
                _ => Vec::new(),
            };

            // No remaining text: the turn disappears from the projection
            if text_parts.is_empty() {
                continue;
            }

            projected.push(Turn {
                role: turn.role,
                content: Some(Content::Text(format!(
                    "{} {}",
                    SCREENSHOT_OMITTED_MARKER,
                    text_parts.join(" ")
                ))),
                tool_call_id: None,
                tool_calls: Vec::new(),
            });
        }

        projected
    }
}
