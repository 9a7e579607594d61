//! Account commands.
//!
//! # Usage
//!
//! ```bash
//! bazaar auth login -e user@demo.com -p password123
//! bazaar auth register -e asha@example.com -p secret1 -n "Asha" --phone 9876500000
//! bazaar auth verify 123456
//! bazaar auth resend
//! bazaar auth whoami
//! bazaar auth logout
//! ```
//!
//! With `BAZAAR_OTP_MODE=issued` the code is written to the log instead of
//! any six digits being accepted.

use clap::Subcommand;

use bazaar_core::validation::RegistrationForm;
use bazaar_store::AppState;
use bazaar_store::models::session::SessionPhase;
use bazaar_store::services::auth::AuthError;

use super::{CommandError, describe_account};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Create an account; a code is sent to the phone number
    Register {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// Repeat of the password
        #[arg(long)]
        confirm_password: Option<String>,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Ten-digit mobile number
        #[arg(long)]
        phone: String,
    },
    /// Confirm the pending registration with its code
    Verify {
        /// Six-digit code
        code: String,
    },
    /// Send the pending registration a new code
    Resend,
    /// Sign out
    Logout,
    /// Show the session
    Whoami,
}

/// Run an account command.
///
/// # Errors
///
/// Returns `CommandError` if the operation fails.
#[allow(clippy::print_stdout)]
pub async fn run(state: &AppState, action: AuthAction) -> Result<(), CommandError> {
    let mut session = state.session_store()?;

    match action {
        AuthAction::Login { email, password } => {
            let user = session.login(&email, &password).await?;
            println!("Signed in as {}", describe_account(&user));
        }
        AuthAction::Register {
            email,
            password,
            confirm_password,
            name,
            phone,
        } => {
            // Catch a mistyped confirmation before anything is sent.
            if let Some(confirmation) = confirm_password.as_deref() {
                RegistrationForm {
                    email: &email,
                    password: &password,
                    name: &name,
                    phone: &phone,
                    confirm_password: Some(confirmation),
                }
                .validate()
                .map_err(AuthError::Validation)?;
            }
            let challenge = session.register(&email, &password, &name, &phone).await?;
            println!(
                "OTP sent to {}. Run `bazaar auth verify <code>` to finish.",
                challenge.masked_phone
            );
        }
        AuthAction::Verify { code } => {
            let user = session.verify_otp(&code).await?;
            println!("Phone verified. Signed in as {}", describe_account(&user));
        }
        AuthAction::Resend => {
            session.resend_otp().await;
            match session.pending().and_then(|p| p.account.phone.as_ref()) {
                Some(phone) => println!("A new OTP was sent to {}.", phone.masked()),
                None => println!("No registration is waiting for an OTP."),
            }
        }
        AuthAction::Logout => {
            session.logout();
            println!("Signed out.");
        }
        AuthAction::Whoami => match session.phase() {
            SessionPhase::Anonymous => println!("Not signed in."),
            SessionPhase::PendingVerification => {
                if let Some(pending) = session.pending() {
                    println!(
                        "Registration for {} is waiting for its OTP (sent {}).",
                        pending.account.email,
                        pending.otp_sent_at.format("%Y-%m-%d %H:%M UTC")
                    );
                }
            }
            SessionPhase::Authenticated => {
                if let Some(user) = session.current_user() {
                    println!("{}", describe_account(user));
                }
            }
        },
    }
    Ok(())
}
