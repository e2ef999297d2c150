use chrono::Local;
use clap::{Args, Subcommand};
use colored::Colorize;
use fleetdeck_lib::{
    Error, Session,
    components::vehicle_editor::Message,
    repository::entities::{FuelBand, Vehicle, VehicleId, VehicleStatus},
};

use crate::status_label;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List vehicles
    List,
    /// Show a vehicle in detail
    Show { id: String },
    /// Add a new vehicle
    Add(Fields),
    /// Edit an existing vehicle
    Edit {
        id: String,
        #[command(flatten)]
        fields: Fields,
    },
}

/// Field values as typed. Numbers are interpreted according to the configured policy.
#[derive(Args, Debug, Clone, Default)]
pub struct Fields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    plate: Option<String>,
    #[arg(long)]
    model: Option<String>,
    #[arg(long, value_enum)]
    status: Option<VehicleStatus>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    fuel: Option<String>,
    #[arg(long)]
    mileage: Option<String>,
    /// Date of the last maintenance, as YYYY-MM-DD
    #[arg(long)]
    last_maintenance: Option<String>,
}

impl Fields {
    fn into_messages(self) -> Vec<Message> {
        [
            self.name.map(Message::NameInput),
            self.plate.map(Message::LicensePlateInput),
            self.model.map(Message::ModelInput),
            self.status.map(Message::StatusSelected),
            self.location.map(Message::LocationInput),
            self.fuel.map(Message::FuelLevelInput),
            self.mileage.map(Message::MileageInput),
            self.last_maintenance.map(Message::LastMaintenanceInput),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

pub async fn handle(session: &mut Session, cmd: Command) -> Result<(), Error> {
    match cmd {
        Command::List => {
            for vehicle in session.vehicles() {
                println!(
                    "{}  {}  {}  {}  {}",
                    vehicle.id.to_string().dimmed(),
                    vehicle.name,
                    vehicle.license_plate,
                    status_label(vehicle.status),
                    fuel(vehicle)
                );
            }
        }
        Command::Show { id } => {
            let id = VehicleId::from(id);
            session.view_vehicle(&id)?;
            if let Some(vehicle) = session.selected_vehicle() {
                print_detail(vehicle);
            }
        }
        Command::Add(fields) => {
            session.begin_add_vehicle()?;
            let vehicle = apply(session, fields).await?;
            println!("Added {} ({})", vehicle.name.bold(), vehicle.id);
        }
        Command::Edit { id, fields } => {
            session.begin_edit_vehicle(&VehicleId::from(id))?;
            let vehicle = apply(session, fields).await?;
            println!("Updated {}", vehicle.name.bold());
        }
    }

    Ok(())
}

async fn apply(session: &mut Session, fields: Fields) -> Result<Vehicle, Error> {
    for message in fields.into_messages() {
        session.edit_vehicle(message).await?;
    }
    session.commit_vehicle().await
}

fn fuel(vehicle: &Vehicle) -> colored::ColoredString {
    let text = format!("{}%", vehicle.fuel_level);
    match vehicle.fuel_band() {
        FuelBand::Good => text.green(),
        FuelBand::Warning => text.yellow(),
        FuelBand::Low => text.red(),
    }
}

fn print_detail(vehicle: &Vehicle) {
    println!("{}", vehicle.name.bold());
    println!("{} {}", vehicle.model, vehicle.license_plate.dimmed());
    println!();
    println!("Status             {}", status_label(vehicle.status));
    println!("Location           {}", vehicle.location);
    println!("Fuel level         {}", fuel(vehicle));
    println!("Mileage            {} km", vehicle.mileage);
    println!("Last maintenance   {}", vehicle.last_maintenance);
    if let Some(next) = Vehicle::next_service(Local::now().date_naive()) {
        println!("Next service       {next}");
    }
}
