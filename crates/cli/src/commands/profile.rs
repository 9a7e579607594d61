//! Profile commands.
//!
//! # Usage
//!
//! ```bash
//! bazaar profile show
//! bazaar profile update --name "Asha Rao" --city Pune --pincode 411001
//! bazaar profile update --phone ""        # remove the phone number
//! ```

use chrono::NaiveDate;
use clap::Subcommand;

use bazaar_core::Gender;
use bazaar_store::AppState;
use bazaar_store::models::user::{AddressInput, ProfileUpdate, UserAccount};
use bazaar_store::services::auth::AuthError;

use super::{CommandError, describe_account};

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Show the signed-in account
    Show,
    /// Change account fields; omitted flags are left as they are
    Update {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        /// Ten-digit mobile number; empty to remove
        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        street: Option<String>,

        #[arg(long)]
        city: Option<String>,

        #[arg(long)]
        state: Option<String>,

        #[arg(long)]
        pincode: Option<String>,

        /// Date of birth, YYYY-MM-DD
        #[arg(long)]
        date_of_birth: Option<NaiveDate>,

        /// male, female, other or prefer_not_to_say
        #[arg(long)]
        gender: Option<Gender>,
    },
}

/// Run a profile command.
///
/// # Errors
///
/// Returns `CommandError` if nobody is signed in or the update is rejected.
#[allow(clippy::print_stdout)]
pub async fn run(state: &AppState, action: ProfileAction) -> Result<(), CommandError> {
    let mut session = state.session_store()?;

    match action {
        ProfileAction::Show => {
            let user = session.current_user().ok_or(AuthError::NotAuthenticated)?;
            print_profile(user);
        }
        ProfileAction::Update {
            name,
            email,
            phone,
            street,
            city,
            state: region,
            pincode,
            date_of_birth,
            gender,
        } => {
            let address_flags = [&street, &city, &region, &pincode];
            let address = if address_flags.iter().any(|f| f.is_some()) {
                // Unset parts keep their current value.
                let current = session.current_user().and_then(|u| u.address.as_ref());
                Some(AddressInput {
                    street: street
                        .or_else(|| current.map(|a| a.street.clone()))
                        .unwrap_or_default(),
                    city: city
                        .or_else(|| current.map(|a| a.city.clone()))
                        .unwrap_or_default(),
                    state: region
                        .or_else(|| current.map(|a| a.state.clone()))
                        .unwrap_or_default(),
                    pincode: pincode
                        .or_else(|| current.map(|a| a.pincode.as_str().to_owned()))
                        .unwrap_or_default(),
                })
            } else {
                None
            };

            let update = ProfileUpdate {
                name,
                email,
                phone,
                address,
                date_of_birth,
                gender,
            };
            if update.is_empty() {
                return Err(CommandError::NothingToUpdate);
            }
            let user = session.update_profile(update).await?;
            println!("Profile updated.");
            print_profile(&user);
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_profile(user: &UserAccount) {
    println!("{}", describe_account(user));
    if let Some(address) = &user.address {
        println!(
            "  {}, {}, {} {}",
            address.street, address.city, address.state, address.pincode.as_str()
        );
    }
    if let Some(date_of_birth) = user.date_of_birth {
        println!("  Born {date_of_birth}");
    }
    if let Some(gender) = user.gender {
        println!("  {gender}");
    }
    println!("  Member since {}", user.created_at.format("%B %Y"));
}
