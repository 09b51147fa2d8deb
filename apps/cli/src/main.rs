use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use client_core::{
    auth::RegistrationForm, load_settings, ApiClient, FileSessionStore, GalleryEvent,
    GalleryOrderingController, MediaSource, PhotoSlot, SessionContext, UploadOutcome,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod media;

use media::{FileMediaSource, NoMediaSource};

#[derive(Parser, Debug)]
#[command(name = "profile-cli", about = "Account and profile gallery client")]
struct Args {
    /// Overrides the configured API base URL.
    #[arg(long)]
    api_base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Exchanges a Google ID token for a session.
    GoogleLogin {
        #[arg(long)]
        id_token: String,
    },
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        /// Birth date as YYYY-MM-DD.
        #[arg(long)]
        birth_date: chrono::NaiveDate,
        #[arg(long)]
        agree_to_terms: bool,
    },
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    ResetPassword {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        token: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    Logout,
    Whoami,
    Profile,
    #[command(subcommand)]
    Photos(PhotosCommand),
}

#[derive(Subcommand, Debug)]
enum PhotosCommand {
    List,
    Upload {
        #[arg(long)]
        slot: usize,
        file: PathBuf,
    },
    Remove {
        #[arg(long)]
        slot: usize,
    },
    /// New order as current slot numbers, e.g. `2 0 1`.
    Reorder {
        #[arg(required = true)]
        order: Vec<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = args.api_base_url {
        settings.api_base_url = url;
    }
    let session = Arc::new(
        SessionContext::load(FileSessionStore::new(settings.session_path.clone())).await,
    );
    let client = Arc::new(ApiClient::new(&settings, session.clone()).context("build api client")?);

    match args.command {
        Command::Login { email, password } => {
            let user = client.login(&email, &password).await?;
            println!("Signed in as {} <{}>", user.full_name, user.email);
        }
        Command::GoogleLogin { id_token } => {
            let user = client.login_with_google(&id_token).await?;
            println!("Signed in with Google as {} <{}>", user.full_name, user.email);
        }
        Command::Register {
            name,
            email,
            password,
            confirm_password,
            birth_date,
            agree_to_terms,
        } => {
            use chrono::Datelike;
            client
                .register(RegistrationForm {
                    name,
                    email,
                    password,
                    confirm_password,
                    agreed_to_terms: agree_to_terms,
                    birth_year: birth_date.year(),
                    birth_month: birth_date.month(),
                    birth_day: birth_date.day(),
                })
                .await?;
            println!("Account created; sign in with `login`.");
        }
        Command::ForgotPassword { email } => {
            client.forgot_password(&email).await?;
            println!("Check your email for a link to reset your password.");
        }
        Command::ResetPassword {
            user_id,
            token,
            password,
            confirm_password,
        } => {
            client
                .reset_password(&user_id, &token, &password, &confirm_password)
                .await?;
            println!("Your password has been changed.");
        }
        Command::Logout => {
            session.logout().await?;
            println!("Signed out.");
        }
        Command::Whoami => match session.current_user().await {
            Some(user) => println!("{} <{}> id={}", user.full_name, user.email, user.id),
            None => println!("Not signed in."),
        },
        Command::Profile => {
            let profile = client.fetch_profile().await?;
            println!("{}", profile.full_name);
            if let Some(age) = profile.age_on(Utc::now().date_naive()) {
                println!("age: {age}");
            }
            for url in profile.profile_pictures.unwrap_or_default() {
                println!("  {url}");
            }
        }
        Command::Photos(command) => run_photos(client, command).await?,
    }

    Ok(())
}

async fn run_photos(client: Arc<ApiClient>, command: PhotosCommand) -> Result<()> {
    let media: Arc<dyn MediaSource> = match &command {
        PhotosCommand::Upload { file, .. } => Arc::new(FileMediaSource::new(file.clone())),
        _ => Arc::new(NoMediaSource),
    };
    let controller = GalleryOrderingController::new(client, media);
    let mut events = controller.subscribe_events();
    controller
        .hydrate()
        .await
        .context("load profile pictures")?;

    match command {
        PhotosCommand::List => {}
        PhotosCommand::Upload { slot, .. } => match controller.pick_and_upload(slot).await? {
            UploadOutcome::Uploaded(url) => println!("Uploaded {url}"),
            UploadOutcome::Cancelled => println!("Nothing to upload."),
        },
        PhotosCommand::Remove { slot } => {
            if !controller.remove(slot).await? {
                println!("Slot {slot} is already empty.");
            }
        }
        PhotosCommand::Reorder { order } => {
            let sync = controller.reorder_by_indexes(&order).await?;
            sync.await.context("order sync task")??;
        }
    }

    while let Ok(event) = events.try_recv() {
        if let GalleryEvent::Alert(alert) = event {
            warn!("{:?} {:?}: {}", alert.kind, alert.operation, alert.message);
        }
    }

    for (index, slot) in controller.slots().await.as_slice().iter().enumerate() {
        match slot {
            PhotoSlot::Occupied(url) => println!("{index}: {url}"),
            PhotoSlot::Empty => println!("{index}: -"),
        }
    }
    Ok(())
}
