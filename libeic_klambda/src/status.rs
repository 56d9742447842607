/// Progress heartbeat sent from a running converter to the thread driving it
/// (typically the CLI progress bar).
#[derive(Debug, Clone, Default)]
pub struct ConverterStatus {
    pub progress: f32,
    pub events_processed: u64,
}

impl ConverterStatus {
    pub fn new(progress: f32, events_processed: u64) -> Self {
        Self {
            progress,
            events_processed,
        }
    }
}
