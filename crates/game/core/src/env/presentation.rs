/// Receives everything the core wants shown to the player.
///
/// Implementations must not call back into the core.
pub trait PresentationSink: Send + Sync {
    /// Shows one line of event text with a color hint such as `"gold"`.
    fn display_message(&self, text: &str, color: &str);

    fn update_health_display(&self, current: i32, max: i32);

    fn update_memoria_display(&self, current: i32, total: i32, is_gain: bool);
}
