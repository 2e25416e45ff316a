/// Convenience result type used across Glowreel.
pub type GlowreelResult<T> = Result<T, GlowreelError>;

/// Top-level error taxonomy for a generation run.
///
/// Per-record asset problems never appear here: a record whose media cannot be
/// decoded falls back to the synthesized placeholder. Everything in this enum
/// aborts the whole run.
#[derive(thiserror::Error, Debug)]
pub enum GlowreelError {
    /// No records were supplied to the generator.
    #[error("no input records supplied")]
    InputEmpty,

    /// The output container or video track could not be created.
    #[error("encoder setup failed: {0}")]
    EncoderSetup(String),

    /// The writer ended in a failed state, or refused a frame mid-run.
    #[error("encoder write failed: {0}")]
    EncoderWrite(String),

    /// A frame's pixel buffer could not be allocated.
    ///
    /// Skipping a frame would desynchronize timestamps, so this is fatal.
    #[error("pixel buffer allocation failed: {0}")]
    BufferAlloc(String),

    /// The run was aborted through its cancellation token.
    #[error("generation canceled")]
    Canceled,

    /// Invalid caller-provided data or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GlowreelError {
    /// Build a [`GlowreelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`GlowreelError::EncoderSetup`] value.
    pub fn encoder_setup(msg: impl Into<String>) -> Self {
        Self::EncoderSetup(msg.into())
    }

    /// Build a [`GlowreelError::EncoderWrite`] value.
    pub fn encoder_write(msg: impl Into<String>) -> Self {
        Self::EncoderWrite(msg.into())
    }

    /// Build a [`GlowreelError::BufferAlloc`] value.
    pub fn buffer_alloc(msg: impl Into<String>) -> Self {
        Self::BufferAlloc(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_prefixed_by_kind() {
        assert_eq!(
            GlowreelError::encoder_setup("no track").to_string(),
            "encoder setup failed: no track"
        );
        assert_eq!(
            GlowreelError::InputEmpty.to_string(),
            "no input records supplied"
        );
    }

    #[test]
    fn anyhow_wraps_transparently() {
        let e: GlowreelError = anyhow::anyhow!("disk full").into();
        assert_eq!(e.to_string(), "disk full");
    }
}
