//! Minimal headless console example.
//!
//! Demonstrates using bevy_console_lang programmatically without any UI.
//! Useful for testing or custom UI implementations.
//!
//! Run with: `cargo run --example minimal --no-default-features`

use bevy::prelude::*;
use bevy_console_lang::prelude::*;
use bevy_console_lang::Command;

fn main() {
    App::new()
        .add_plugins(MinimalPlugins)
        .insert_resource(ConsoleConfig::default().run_autoexec_on_startup(false))
        .add_plugins(ConsolePlugin)
        .add_systems(Startup, setup)
        .add_systems(Update, process_outputs)
        .add_systems(Update, send_test_commands.run_if(run_once))
        .run();
}

fn setup(mut console: Console) {
    // Register a simple variable
    if let Err(err) = console.add_command(Command::variable(
        ConVar::new("sv_gravity", 800.0f32).description("World gravity"),
    )) {
        error!("{}", err);
    }

    // Register a command
    let greet = Command::new("Greet", |ctx, args| {
        let name = args.first().map(Argument::value).unwrap_or("World");
        ctx.print(format!("Hello, {}!", name));
        Ok(Argument::none())
    })
    .help("Greet someone")
    .usage("Greet(name)");
    if let Err(err) = console.add_command(greet) {
        error!("{}", err);
    }

    println!("Console initialized. Registered: sv_gravity, Greet");
}

/// Send some test commands programmatically.
fn send_test_commands(mut events: MessageWriter<ConsoleInputEvent>) {
    println!("\n--- Sending test commands ---");

    // Query a variable
    events.write(ConsoleInputEvent::new("sv_gravity"));

    // Set a variable from an expression
    events.write(ConsoleInputEvent::new("sv_gravity (800 + 200) / 2"));

    // Run a command with a string literal
    events.write(ConsoleInputEvent::new("Greet(\"Developer\")"));

    // Multiple statements with semicolons
    events.write(ConsoleInputEvent::new("echo First; echo Second; find sv"));
}

/// Process and print console output events.
fn process_outputs(mut events: MessageReader<ConsoleOutputEvent>) {
    for event in events.read() {
        let prefix = match event.level {
            ConsoleOutputLevel::Debug => "[DEBUG]",
            ConsoleOutputLevel::Info => "[INFO]",
            ConsoleOutputLevel::Warn => "[WARN]",
            ConsoleOutputLevel::Error => "[ERROR]",
            ConsoleOutputLevel::Command => "[$]",
            ConsoleOutputLevel::Result => "[>]",
        };
        println!("{} {}", prefix, event.message);
    }
}
