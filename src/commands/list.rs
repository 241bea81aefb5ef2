//! List commands implementation

/// List all buses compiled into this build
pub fn list_buses() {
    let buses = framcart_host::available_buses();
    if buses.is_empty() {
        println!("No buses available (recompile with features)");
        return;
    }

    println!("Available buses:");
    println!();
    for bus in buses {
        println!("  {:<10} - {}", bus.name, bus.description);
        if !bus.aliases.is_empty() {
            println!("  {:<10}   aliases: {}", "", bus.aliases.join(", "));
        }
    }
}
