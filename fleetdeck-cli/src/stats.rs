use colored::Colorize;
use fleetdeck_lib::{Error, Session};

use crate::status_label;

pub fn handle(session: &Session) -> Result<(), Error> {
    let stats = session.stats();

    println!("{}", session.profile().greeting().bold());
    println!();
    println!("Total vehicles   {}", stats.total);
    println!("Active           {}", stats.active_count.to_string().green());
    println!(
        "In maintenance   {}",
        stats.maintenance_count.to_string().red()
    );
    println!("Idle             {}", stats.idle_count.to_string().yellow());
    println!("Average fuel     {}%", stats.average_fuel);

    let recent = session.recent_activity();
    if !recent.is_empty() {
        println!();
        println!("{}", "Recent activity".bold());
        for vehicle in recent {
            println!(
                "  {}  {}  {}",
                vehicle.name,
                vehicle.location.dimmed(),
                status_label(vehicle.status)
            );
        }
    }

    Ok(())
}
