//! Evaluate expressions without a Bevy app.
//!
//! The registry can be used on its own: register commands and variables,
//! then execute statements and inspect the returned arguments.
//!
//! Run with: `cargo run --example calculator --no-default-features`

use bevy_console_lang::core::{Argument, Command, ConVar, ConsoleRegistry, ConsoleResult};

fn main() -> ConsoleResult<()> {
    let mut registry = ConsoleRegistry::new();

    let scale = ConVar::new("scale", 2i32).description("Multiplier used by Scale()");
    let scale_handle = scale.handle();
    registry.add_command(Command::variable(scale))?;

    registry.add_command(
        Command::new("Scale", move |_ctx, args| {
            let value = args.first().map(Argument::as_f64).transpose()?.unwrap_or(0.0);
            let factor = *scale_handle.read().unwrap_or_else(std::sync::PoisonError::into_inner);
            Ok(Argument::from(value * f64::from(factor)))
        })
        .help("Multiply by the scale variable")
        .usage("Scale(value)"),
    )?;

    registry.add_command(
        Command::new("Concat", |_ctx, args| {
            Ok(Argument::from(args.iter().map(Argument::value).collect::<String>()))
        })
        .help("Join all arguments"),
    )?;

    for statement in [
        "scale",
        "Scale(1 + 2 * 3)",
        "scale 10",
        "Scale((1 + 2) * 3)",
        "Concat(\"a\" + \"b\", 1 + 1, TRUE)",
        "Scale(1 / 0)",
        "Missing(1)",
    ] {
        let result = registry.execute(statement);
        if result.is_error() {
            println!("{:<36} !! {}", statement, result);
        } else {
            println!("{:<36} => {} ({})", statement, result, result.ty());
        }
    }

    println!("\nCompletions for 'Sc': {:?}", registry.matches("Sc"));
    Ok(())
}
