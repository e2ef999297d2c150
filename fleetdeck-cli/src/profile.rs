use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use colored::Colorize;
use fleetdeck_lib::{Session, components::profile_editor::Message};

use crate::error::{Error, Result};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show your profile
    Show,
    /// Edit your profile
    Edit(Fields),
    /// Set your avatar from an image file
    Avatar {
        path: PathBuf,
        /// MIME type of the image, guessed from the file extension if omitted
        #[arg(long)]
        content_type: Option<String>,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct Fields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    position: Option<String>,
    #[arg(long)]
    address: Option<String>,
}

impl Fields {
    fn into_messages(self) -> Vec<Message> {
        [
            self.name.map(Message::NameInput),
            self.email.map(Message::EmailInput),
            self.phone.map(Message::PhoneInput),
            self.company.map(Message::CompanyInput),
            self.position.map(Message::PositionInput),
            self.address.map(Message::AddressInput),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

pub async fn handle(session: &mut Session, cmd: Command) -> Result<()> {
    match cmd {
        Command::Show => print_profile(session),
        Command::Edit(fields) => {
            session.begin_profile_edit()?;
            for message in fields.into_messages() {
                session.edit_profile(message).await?;
            }
            session.commit_profile().await?;
            println!("Profile updated");
        }
        Command::Avatar { path, content_type } => {
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|source| Error::Read {
                    path: path.clone(),
                    source,
                })?;
            let content_type = content_type.unwrap_or_else(|| guess_content_type(&path).into());

            session.begin_profile_edit()?;
            session.attach_avatar(bytes, &content_type)?;
            session.commit_profile().await?;
            println!("Avatar updated");
        }
    }

    Ok(())
}

fn print_profile(session: &Session) {
    let profile = session.profile();
    let fields = &profile.fields;

    println!("{} {}", profile.initials().bold(), fields.name.bold());
    for (label, value) in [
        ("Email", &fields.email),
        ("Phone", &fields.phone),
        ("Company", &fields.company),
        ("Position", &fields.position),
        ("Address", &fields.address),
    ] {
        if !value.is_empty() {
            println!("{label:<10} {value}");
        }
    }
    match fields.avatar_ref.as_deref() {
        Some(avatar) if avatar.starts_with("data:") => println!("{:<10} inline image", "Avatar"),
        Some(avatar) => println!("{:<10} {avatar}", "Avatar"),
        None => {}
    }
}

fn guess_content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type(Path::new("me.PNG")), "image/png");
        assert_eq!(guess_content_type(Path::new("me.jpeg")), "image/jpeg");
        assert_eq!(
            guess_content_type(Path::new("notes.txt")),
            "application/octet-stream"
        );
    }
}
