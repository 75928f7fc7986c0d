use openslot::core::log::{self, Level};
use openslot::Table;
use std::env;

fn main() -> openslot::Result<()> {
    if let Some(level) = env::var("OPENSLOT_LOG")
        .ok()
        .and_then(|level| Level::try_from(level.as_str()).ok())
    {
        if let Err(e) = log::init(level, log::LOG_FILE_PATH) {
            eprintln!("Failed to open {}: {e}", log::LOG_FILE_PATH);
        }
    }

    let mut table = Table::<&str, &str>::new();
    println!("{table}");

    table.set("Hello", "World")?;
    table.set("Lettuce", "orange")?;
    println!("{table}");

    for key in &table {
        println!("{key} {}", table.get(key)?);
    }

    if table.contains("Lettuce") {
        println!("Thanks!");
    }

    table.set("Hello", "WORLD!")?;
    println!("{table}");

    Ok(())
}
