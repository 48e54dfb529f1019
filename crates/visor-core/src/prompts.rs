//! Fixed strings used by the orchestration loop.

/// Prefix replacing an image that was dropped from the outbound history
pub const SCREENSHOT_OMITTED_MARKER: &str = "[screenshot omitted]";

/// Appended to a tool turn whose outcome carries an image; the image
/// itself follows as a separate user turn
pub const SCREENSHOT_PENDING_NOTE: &str =
    " A screenshot was captured and is attached in the next message.";

/// Text of the user turn that delivers a post-action screenshot
pub const SCREENSHOT_FOLLOWUP_PROMPT: &str =
    "Here is the screenshot taken after that action. Decide the next step based on it:";

/// Final reply when the iteration budget runs out before a plain-text answer
pub const MAX_ITERATIONS_REPLY: &str =
    "Reached the maximum number of iterations without a final reply.";
