//! Account commands.

use clap::{Args, Subcommand};
use shopnow_core::Email;
use shopnow_storefront::error::AppError;
use shopnow_storefront::models::ProfileDetails;
use shopnow_storefront::services::auth::{AuthError, FederatedCredential};
use shopnow_storefront::state::AppState;

use crate::render;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Create an account and sign in
    Signup {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        #[command(flatten)]
        details: DetailsArgs,
    },
    /// Sign in with email and password
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Sign in with a Google account
    Google {
        /// Google ID token
        #[arg(long, conflicts_with_all = ["email", "name"])]
        id_token: Option<String>,

        /// Email for an unsigned token (emulator and offline backends)
        #[arg(long, required_unless_present = "id_token")]
        email: Option<String>,

        /// Display name for an unsigned token
        #[arg(long)]
        name: Option<String>,
    },
    /// Sign out
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Show the stored profile
    Profile,
    /// Replace the stored profile; omitted fields are cleared
    UpdateProfile {
        #[command(flatten)]
        details: DetailsArgs,
    },
}

#[derive(Args)]
pub struct DetailsArgs {
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    address: Option<String>,

    #[arg(long)]
    city: Option<String>,

    #[arg(long)]
    phone: Option<String>,
}

impl From<DetailsArgs> for ProfileDetails {
    fn from(args: DetailsArgs) -> Self {
        Self {
            name: args.name,
            address: args.address,
            city: args.city,
            phone: args.phone,
        }
    }
}

pub async fn run(state: &AppState, action: AuthAction) -> Result<(), AppError> {
    let auth = state.auth();

    match action {
        AuthAction::Signup {
            email,
            password,
            details,
        } => {
            let identity = auth.sign_up(&email, &password, details.into()).await?;
            render::notice(&format!("Welcome, {}", identity.email));
        }
        AuthAction::Login { email, password } => {
            let identity = auth.sign_in(&email, &password).await?;
            render::notice(&format!("Signed in as {}", identity.email));
        }
        AuthAction::Google {
            id_token,
            email,
            name,
        } => {
            let credential = match (id_token, email) {
                (Some(token), _) => FederatedCredential::google(token),
                (None, Some(email)) => {
                    let email = Email::parse(&email).map_err(AuthError::from)?;
                    FederatedCredential::unsigned(&email, name.as_deref())
                }
                (None, None) => {
                    return Err(AppError::BadRequest(
                        "either --id-token or --email is required".to_string(),
                    ));
                }
            };
            let identity = auth.sign_in_federated(&credential).await?;
            render::notice(&format!("Signed in as {}", identity.email));
        }
        AuthAction::Logout => {
            auth.sign_out();
            render::notice("Signed out");
        }
        AuthAction::Whoami => match auth.current_identity() {
            Some(identity) => {
                let name = identity.display_name.as_deref().unwrap_or("-");
                render::notice(&format!("{} ({name}) uid={}", identity.email, identity.uid));
            }
            None => render::notice("Not signed in"),
        },
        AuthAction::Profile => match auth.profile().await? {
            Some(profile) => render::profile(&profile),
            None => render::notice("No profile stored for this account"),
        },
        AuthAction::UpdateProfile { details } => {
            let profile = auth.update_profile(details.into()).await?;
            render::profile(&profile);
        }
    }

    Ok(())
}
