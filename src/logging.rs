//! Mirror engine log records into the console output.
//!
//! Install through [`LogPlugin::custom_layer`](bevy::log::LogPlugin::custom_layer):
//!
//! ```ignore
//! App::new().add_plugins(DefaultPlugins.set(LogPlugin {
//!     custom_layer: bevy_console_lang::custom_log_layer,
//!     ..default()
//! }));
//! ```

use bevy::log::{BoxedLayer, Level};
use bevy::prelude::*;
use std::sync::mpsc;
use tracing::Subscriber;
use tracing_subscriber::field::Visit;
use tracing_subscriber::Layer;

use crate::core::{ConsoleOutputEvent, ConsoleOutputLevel};

/// Log layer factory for [`LogPlugin::custom_layer`](bevy::log::LogPlugin::custom_layer).
pub fn custom_log_layer(app: &mut App) -> Option<BoxedLayer> {
    Some(Box::new(create_custom_log_layer(app)))
}

fn create_custom_log_layer(app: &mut App) -> LogCaptureLayer {
    let (sender, receiver) = mpsc::channel();
    app.add_message::<ConsoleOutputEvent>();
    app.insert_non_send_resource(CapturedLogEvents(receiver));
    app.add_systems(PostUpdate, transfer_log_events);

    LogCaptureLayer { sender }
}

/// Console output level for a log level.
pub fn output_level(level: Level) -> ConsoleOutputLevel {
    match level {
        Level::ERROR => ConsoleOutputLevel::Error,
        Level::WARN => ConsoleOutputLevel::Warn,
        Level::INFO => ConsoleOutputLevel::Info,
        _ => ConsoleOutputLevel::Debug,
    }
}

/// Sends captured records as [`ConsoleOutputEvent`]s.
fn transfer_log_events(
    receiver: NonSend<CapturedLogEvents>,
    mut output_events: MessageWriter<ConsoleOutputEvent>,
) {
    for event in receiver.0.try_iter() {
        output_events.write(event);
    }
}

/// Records waiting for [`transfer_log_events`].
struct CapturedLogEvents(mpsc::Receiver<ConsoleOutputEvent>);

/// A [`Layer`] that forwards log records to [`CapturedLogEvents`].
struct LogCaptureLayer {
    sender: mpsc::Sender<ConsoleOutputEvent>,
}

impl<S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>> Layer<S>
    for LogCaptureLayer
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let metadata = event.metadata();
        // The console's own diagnostics already reach the output.
        if metadata.target().starts_with(env!("CARGO_CRATE_NAME")) {
            return;
        }

        let mut message = None;
        event.record(&mut LogEventVisitor(&mut message));
        if let Some(message) = message {
            let _ = self
                .sender
                .send(ConsoleOutputEvent::new(output_level(*metadata.level()), message));
        }
    }
}

/// A [`Visit`]or that extracts the `message` field.
struct LogEventVisitor<'a>(&'a mut Option<String>);

impl Visit for LogEventVisitor<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.0 = Some(format!("{value:?}"));
        }
    }
}
