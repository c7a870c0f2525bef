//! Line-oriented menu loops over the catalog.
//!
//! All authorization-sensitive catalog calls are reached only from the
//! menu matching the session's role; validation failures are printed
//! and the loop continues, while store failures abort the program.

use std::{
    io::{self, Write as _},
    str::FromStr,
};

use anyhow::Result;
use realty_core::{Catalog, CatalogError, JsonFileStore, Listing, ListingUpdate, Session};

type AppCatalog = Catalog<JsonFileStore>;

/// Top-level menu loop. Returns when the user chooses to exit.
pub fn run(mut catalog: AppCatalog) -> Result<()> {
    loop {
        println!("\n--- Main menu ---");
        println!("1. Register");
        println!("2. Log in");
        println!("3. Exit");

        match prompt("Choose an option: ")?.as_str() {
            "1" => register(&mut catalog)?,
            "2" => {
                let username = prompt("Username: ")?;
                let password = prompt("Password: ")?;
                if let Some(session) = report(catalog.login(&username, &password))? {
                    println!("Welcome, {}!", session.username);
                    if session.is_admin {
                        admin_menu(&mut catalog, &session)?;
                    } else {
                        user_menu(&mut catalog, &session)?;
                    }
                }
            }
            "3" => {
                println!("Goodbye.");
                return Ok(());
            }
            _ => println!("Invalid choice, please try again."),
        }
    }
}

fn register(catalog: &mut AppCatalog) -> Result<()> {
    let username = prompt("Username: ")?;
    let password = prompt("Password: ")?;
    let is_admin = prompt_yes_no("Administrator? (1 - yes / 2 - no): ")?;
    if report(catalog.register(&username, &password, is_admin))?.is_some() {
        println!("Registration successful.");
    }
    Ok(())
}

fn user_menu(catalog: &mut AppCatalog, session: &Session) -> Result<()> {
    loop {
        println!("\n--- User menu ---");
        println!("1. View listings");
        println!("2. Filter listings");
        println!("3. Add to cart");
        println!("4. View cart");
        println!("5. Checkout");
        println!("6. View purchase history");
        println!("7. Change password");
        println!("8. Log out");

        match prompt("Choose an option: ")?.as_str() {
            "1" => print_listings(catalog.listings()),
            "2" => {
                let max_price = prompt_optional("Maximum price (empty to skip): ")?;
                let min_rooms = prompt_optional("Minimum rooms (empty to skip): ")?;
                let matched = catalog.filter_listings(max_price, min_rooms);
                if matched.is_empty() {
                    println!("No listings match.");
                }
                for listing in matched {
                    println!("{}", listing.display_line());
                }
            }
            "3" => {
                let title = prompt("Title of the listing to add: ")?;
                if report(catalog.add_to_cart(session, &title))?.is_some() {
                    println!("{title} added to the cart.");
                }
            }
            "4" => {
                if let Some(cart) = report(catalog.cart(session))? {
                    print_listings(cart);
                }
            }
            "5" => {
                if let Some(purchased) = report(catalog.checkout(session))? {
                    println!("Purchase of {purchased} listing(s) completed. Thank you!");
                }
            }
            "6" => {
                if let Some(history) = report(catalog.purchase_history(session))? {
                    print_listings(history);
                }
            }
            "7" => {
                let new_password = prompt("New password: ")?;
                if report(catalog.change_password(session, &new_password))?.is_some() {
                    println!("Password updated.");
                }
            }
            "8" => return Ok(()),
            _ => println!("Invalid choice, please try again."),
        }
    }
}

fn admin_menu(catalog: &mut AppCatalog, session: &Session) -> Result<()> {
    loop {
        println!("\n--- Admin menu ---");
        println!("1. Add listing");
        println!("2. Remove listing");
        println!("3. Update listing");
        println!("4. View accounts");
        println!("5. Manage accounts");
        println!("6. Log out");

        match prompt("Choose an option: ")?.as_str() {
            "1" => {
                let title = prompt("Title: ")?;
                let rooms = prompt_parse("Rooms: ")?;
                let price = prompt_parse("Price: ")?;
                let walk_time = prompt_parse("Walk time to metro (minutes): ")?;
                let has_repair = prompt_yes_no("Renovated? (1 - yes / 2 - no): ")?;
                let listing = Listing::new(title, rooms, price, walk_time, has_repair);
                if report(catalog.add_listing(session, listing))?.is_some() {
                    println!("Listing added.");
                }
            }
            "2" => {
                let title = prompt("Title of the listing to remove: ")?;
                if report(catalog.remove_listing(session, &title))?.is_some() {
                    println!("Listing removed.");
                }
            }
            "3" => {
                let title = prompt("Title of the listing to update: ")?;
                let update = ListingUpdate {
                    rooms: prompt_optional("New rooms (empty to skip): ")?,
                    price: prompt_optional("New price (empty to skip): ")?,
                    walk_time_to_metro: prompt_optional(
                        "New walk time to metro (empty to skip): ",
                    )?,
                    has_repair: prompt_optional_yes_no(
                        "Renovated? (1 - yes / 2 - no, empty to skip): ",
                    )?,
                };
                if report(catalog.update_listing(&title, &update))?.is_some() {
                    println!("Listing updated.");
                }
            }
            "4" => {
                for account in catalog.accounts() {
                    println!(
                        "{} — {}",
                        account.username,
                        if account.is_admin {
                            "administrator"
                        } else {
                            "user"
                        }
                    );
                }
            }
            "5" => manage_accounts(catalog)?,
            "6" => return Ok(()),
            _ => println!("Invalid choice, please try again."),
        }
    }
}

fn manage_accounts(catalog: &mut AppCatalog) -> Result<()> {
    loop {
        println!("\n--- Account management ---");
        println!("1. Add account");
        println!("2. Remove account");
        println!("3. Reset password");
        println!("4. Back");

        match prompt("Choose an option: ")?.as_str() {
            "1" => register(catalog)?,
            "2" => {
                let username = prompt("Username to remove: ")?;
                if report(catalog.remove_account(&username))?.is_some() {
                    println!("Account removed.");
                }
            }
            "3" => {
                let username = prompt("Username to update: ")?;
                let new_password = prompt("New password: ")?;
                if report(catalog.set_password(&username, &new_password))?.is_some() {
                    println!("Password reset.");
                }
            }
            "4" => return Ok(()),
            _ => println!("Invalid choice, please try again."),
        }
    }
}

fn print_listings(listings: &[Listing]) {
    if listings.is_empty() {
        println!("Nothing to show.");
        return;
    }
    for listing in listings {
        println!("{}", listing.display_line());
    }
}

/// Print validation failures and keep going; propagate store and
/// hashing failures, which the menu cannot recover from.
fn report<T>(result: Result<T, CatalogError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err @ (CatalogError::Store(_) | CatalogError::Auth(_))) => Err(err.into()),
        Err(err) => {
            println!("{err}");
            Ok(None)
        }
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn prompt_parse<T: FromStr>(label: &str) -> Result<T> {
    loop {
        let input = prompt(label)?;
        match input.parse() {
            Ok(value) => return Ok(value),
            Err(_) => println!("Could not read that, please try again."),
        }
    }
}

fn prompt_optional<T: FromStr>(label: &str) -> Result<Option<T>> {
    loop {
        let input = prompt(label)?;
        if input.is_empty() {
            return Ok(None);
        }
        match input.parse() {
            Ok(value) => return Ok(Some(value)),
            Err(_) => println!("Could not read that, please try again."),
        }
    }
}

fn prompt_yes_no(label: &str) -> Result<bool> {
    loop {
        match prompt(label)?.as_str() {
            "1" => return Ok(true),
            "2" => return Ok(false),
            _ => println!("Please answer 1 or 2."),
        }
    }
}

fn prompt_optional_yes_no(label: &str) -> Result<Option<bool>> {
    loop {
        match prompt(label)?.as_str() {
            "" => return Ok(None),
            "1" => return Ok(Some(true)),
            "2" => return Ok(Some(false)),
            _ => println!("Please answer 1, 2, or leave empty."),
        }
    }
}
