//! Shared domain models.

use serde::{Deserialize, Serialize};

/// A single property offered in the catalog.
///
/// The `title` doubles as the listing's identity: the catalog rejects
/// a second listing with the same title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Human-readable title, unique within the catalog.
    pub title: String,
    /// Number of rooms.
    pub rooms: u32,
    /// Asking price.
    pub price: f64,
    /// Walking distance to the nearest metro station, in minutes.
    pub walk_time_to_metro: u32,
    /// Whether the property has been renovated.
    pub has_repair: bool,
}

impl Listing {
    /// Construct a listing from its five fields.
    pub fn new(
        title: impl Into<String>,
        rooms: u32,
        price: f64,
        walk_time_to_metro: u32,
        has_repair: bool,
    ) -> Self {
        Self {
            title: title.into(),
            rooms,
            price,
            walk_time_to_metro,
            has_repair,
        }
    }

    /// One-line label used by the console front end.
    pub fn display_line(&self) -> String {
        format!(
            "{} — {} room(s), {} ₽, {} min to metro, {}",
            self.title,
            self.rooms,
            self.price,
            self.walk_time_to_metro,
            if self.has_repair {
                "renovated"
            } else {
                "no renovation"
            }
        )
    }
}

/// Partial update applied to an existing listing.
///
/// Present fields overwrite the stored value; absent fields leave it
/// untouched. The title itself is the lookup key and never changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingUpdate {
    /// New room count, if any.
    pub rooms: Option<u32>,
    /// New price, if any.
    pub price: Option<f64>,
    /// New walk time to metro, if any.
    pub walk_time_to_metro: Option<u32>,
    /// New renovation flag, if any.
    pub has_repair: Option<bool>,
}

impl ListingUpdate {
    /// Apply the present fields onto `listing`.
    pub fn apply(&self, listing: &mut Listing) {
        if let Some(rooms) = self.rooms {
            listing.rooms = rooms;
        }
        if let Some(price) = self.price {
            listing.price = price;
        }
        if let Some(walk_time) = self.walk_time_to_metro {
            listing.walk_time_to_metro = walk_time;
        }
        if let Some(has_repair) = self.has_repair {
            listing.has_repair = has_repair;
        }
    }
}

/// A registered user or administrator.
///
/// The cart and purchase history store owned listing snapshots, so a
/// later edit or removal of the catalog listing does not rewrite what
/// the user already put in the cart or bought.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Login name, unique across all accounts.
    pub username: String,
    /// Salted Argon2id hash in PHC string format. Never a plaintext password.
    pub password_hash: String,
    /// Whether the account may manage listings and other accounts.
    #[serde(default)]
    pub is_admin: bool,
    /// Listings bought so far, in checkout order.
    #[serde(default)]
    pub purchase_history: Vec<Listing>,
    /// Listings queued for checkout, in insertion order.
    #[serde(default)]
    pub cart: Vec<Listing>,
}

impl Account {
    /// Construct an account with an already-hashed password and empty lists.
    pub fn new(username: impl Into<String>, password_hash: String, is_admin: bool) -> Self {
        Self {
            username: username.into(),
            password_hash,
            is_admin,
            purchase_history: Vec::new(),
            cart: Vec::new(),
        }
    }

    /// Public projection of the account, without password material.
    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            username: self.username.clone(),
            is_admin: self.is_admin,
        }
    }
}

/// What account enumeration exposes: name and role, nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    /// Login name.
    pub username: String,
    /// Administrator flag.
    pub is_admin: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_update_only_touches_present_fields() {
        let mut listing = Listing::new("Loft", 2, 48_000.0, 7, false);
        let update = ListingUpdate {
            price: Some(52_000.0),
            has_repair: Some(true),
            ..ListingUpdate::default()
        };
        update.apply(&mut listing);

        assert_eq!(listing.rooms, 2);
        assert_eq!(listing.price, 52_000.0);
        assert_eq!(listing.walk_time_to_metro, 7);
        assert!(listing.has_repair);
    }

    #[test]
    fn empty_update_is_a_no_op() {
        let mut listing = Listing::new("Loft", 2, 48_000.0, 7, false);
        let before = listing.clone();
        ListingUpdate::default().apply(&mut listing);
        assert_eq!(listing, before);
    }

    #[test]
    fn summary_never_carries_password_material() {
        let account = Account::new("alice", "$argon2id$fake".to_string(), true);
        let summary = account.summary();
        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("argon2"));
        assert_eq!(summary.username, "alice");
        assert!(summary.is_admin);
    }
}
