//! Terminal console example.
//!
//! Demonstrates using bevy_console_lang with stdin/stdout for headless
//! applications like dedicated servers.
//!
//! Run with: `cargo run --example dedicated_server --features terminal`
//!
//! Statements:
//! - `help` - List available commands
//! - `sv_gravity` - Query the gravity value
//! - `sv_gravity 1000` - Set gravity to 1000
//! - `watch sv_maxplayers 16` - Set a value and keep it in autoexec.cfg
//! - `status` - Show server status
//! - `quit` - Exit the application

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bevy::prelude::*;
use bevy_console_lang::prelude::*;
use bevy_console_lang::Command;

#[derive(Resource, Clone, Default)]
struct QuitRequested(Arc<AtomicBool>);

fn main() {
    println!("=== Dedicated Server Console ===");
    println!("Type statements and press Enter. Type 'quit' to exit.");
    println!();

    App::new()
        .add_plugins(MinimalPlugins)
        .add_plugins(ConsolePlugin)
        .init_resource::<QuitRequested>()
        .add_systems(Startup, setup)
        .add_systems(Update, exit_on_quit)
        .run();
}

fn setup(mut console: Console, quit: Res<QuitRequested>) {
    let hostname = ConVar::new("sv_hostname", "My Server".to_string()).description("Server name");
    let maxplayers = ConVar::new("sv_maxplayers", 32i32)
        .description("Maximum number of players")
        .min(1)
        .max(64);
    let gravity = ConVar::new("sv_gravity", 800.0f32).description("World gravity");
    let (h, m, g) = (hostname.handle(), maxplayers.handle(), gravity.handle());

    let commands = [
        Command::variable(hostname),
        Command::variable(maxplayers),
        Command::variable(gravity),
        Command::new("status", move |ctx, _args| {
            let hostname = h.read().map(|v| v.clone()).unwrap_or_default();
            let maxplayers = m.read().map(|v| *v).unwrap_or_default();
            let gravity = g.read().map(|v| *v).unwrap_or_default();

            ctx.print("=== Status ===");
            ctx.print(format!("Hostname: {}", hostname));
            ctx.print(format!("Max Players: {}", maxplayers));
            ctx.print(format!("Gravity: {}", gravity));
            Ok(Argument::none())
        })
        .help("Show server status"),
        Command::new("say", |ctx, args| {
            ctx.print(format!("[SERVER] {}", args.first().map(Argument::value).unwrap_or_default()));
            Ok(Argument::none())
        })
        .help("Broadcast a message")
        .force_string_arguments(ForceStringArguments::All),
    ];
    for command in commands {
        if let Err(err) = console.add_command(command) {
            error!("{}", err);
        }
    }

    let flag = quit.0.clone();
    let quit = Command::new("quit", move |ctx, _args| {
        flag.store(true, Ordering::Relaxed);
        ctx.print("Shutting down");
        Ok(Argument::none())
    })
    .help("Exit the application");
    if let Err(err) = console.add_command(quit) {
        error!("{}", err);
    }
}

fn exit_on_quit(quit: Res<QuitRequested>, mut exit: MessageWriter<AppExit>) {
    if quit.0.load(Ordering::Relaxed) {
        exit.write(AppExit::Success);
    }
}
