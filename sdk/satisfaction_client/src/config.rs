/// Seconds in one day of signature validity.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Client-side knobs for the decryption protocol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Validity window requested for new decryption signatures.
    pub signature_duration_days: u32,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self {
            signature_duration_days: 365,
        }
    }

    pub fn with_signature_duration_days(mut self, days: u32) -> Self {
        self.signature_duration_days = days;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}
