//! The catalog aggregate: listings, accounts, and their persistence.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    auth::{self, AuthError},
    models::{Account, AccountSummary, Listing, ListingUpdate},
    session::Session,
    store::{CatalogStore, StoreError},
};

/// Failure of a catalog operation.
///
/// Validation variants leave the catalog unmutated; `Store` wraps a
/// persistence failure and propagates it to the caller.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Registration attempted with a username that already exists.
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),
    /// Login with an unknown username or a wrong password.
    #[error("invalid username or password")]
    InvalidCredentials,
    /// Listing management attempted without an admin session.
    #[error("not authorized to manage listings")]
    NotAuthorized,
    /// A listing with this title already exists.
    #[error("a listing titled '{0}' already exists")]
    DuplicateTitle(String),
    /// No listing carries this title.
    #[error("no listing titled '{0}'")]
    ListingNotFound(String),
    /// No account carries this username.
    #[error("no account named '{0}'")]
    AccountNotFound(String),
    /// Checkout attempted with nothing in the cart.
    #[error("the cart is empty")]
    EmptyCart,
    /// Password hashing failed.
    #[error(transparent)]
    Auth(#[from] AuthError),
    /// The backing store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Owns the listing and account collections and mediates every
/// mutation. The sole writer to the persistence port: each mutating
/// operation that passes validation flushes both collections in full
/// before returning.
pub struct Catalog<S: CatalogStore> {
    listings: Vec<Listing>,
    accounts: Vec<Account>,
    store: S,
}

impl<S: CatalogStore> Catalog<S> {
    /// Load both collections from the store, seeding either one that
    /// does not exist yet with sample data. Any other store failure
    /// propagates.
    pub fn load_or_seed(store: S) -> Result<Self, CatalogError> {
        let listings = match store.load_listings()? {
            Some(listings) => listings,
            None => {
                warn!("listings store not found, seeding sample listings");
                seed_listings()
            }
        };
        let accounts = match store.load_accounts()? {
            Some(accounts) => accounts,
            None => {
                warn!("accounts store not found, seeding default accounts");
                seed_accounts()?
            }
        };
        info!(
            listings = listings.len(),
            accounts = accounts.len(),
            "catalog loaded"
        );
        Ok(Self {
            listings,
            accounts,
            store,
        })
    }

    /// Re-serialize both collections to the store in full.
    pub fn persist(&self) -> Result<(), CatalogError> {
        self.store.save_listings(&self.listings)?;
        self.store.save_accounts(&self.accounts)?;
        debug!("catalog persisted");
        Ok(())
    }

    /// Register a new account. Fails without mutation when the
    /// username is already taken.
    pub fn register(
        &mut self,
        username: &str,
        password: &str,
        is_admin: bool,
    ) -> Result<(), CatalogError> {
        if self.accounts.iter().any(|a| a.username == username) {
            return Err(CatalogError::UsernameTaken(username.to_string()));
        }
        let hash = auth::hash_password(password)?;
        self.accounts.push(Account::new(username, hash, is_admin));
        self.persist()?;
        info!(username, is_admin, "account registered");
        Ok(())
    }

    /// Authenticate and hand out a session context. The username match
    /// is exact and case-sensitive; no lockout or rate limiting.
    pub fn login(&self, username: &str, password: &str) -> Result<Session, CatalogError> {
        let account = self
            .accounts
            .iter()
            .find(|a| a.username == username)
            .ok_or(CatalogError::InvalidCredentials)?;
        if !auth::verify_password(password, &account.password_hash) {
            return Err(CatalogError::InvalidCredentials);
        }
        info!(username, "login succeeded");
        Ok(Session::for_account(account))
    }

    /// Append a new listing. Requires an admin session; rejects a
    /// duplicate title.
    pub fn add_listing(&mut self, session: &Session, listing: Listing) -> Result<(), CatalogError> {
        if !session.is_admin {
            return Err(CatalogError::NotAuthorized);
        }
        if self.listings.iter().any(|l| l.title == listing.title) {
            return Err(CatalogError::DuplicateTitle(listing.title));
        }
        info!(title = %listing.title, "listing added");
        self.listings.push(listing);
        self.persist()
    }

    /// Remove every listing with the given title. Requires an admin
    /// session. Removing a title that does not exist still counts as
    /// success and still persists; snapshots already in carts or
    /// purchase histories are left alone.
    pub fn remove_listing(&mut self, session: &Session, title: &str) -> Result<(), CatalogError> {
        if !session.is_admin {
            return Err(CatalogError::NotAuthorized);
        }
        self.listings.retain(|l| l.title != title);
        info!(title, "listing removed");
        self.persist()
    }

    /// Overwrite the fields present in `update` on the first listing
    /// with a matching title. Persists only when a match was found.
    pub fn update_listing(
        &mut self,
        title: &str,
        update: &ListingUpdate,
    ) -> Result<(), CatalogError> {
        let listing = self
            .listings
            .iter_mut()
            .find(|l| l.title == title)
            .ok_or_else(|| CatalogError::ListingNotFound(title.to_string()))?;
        update.apply(listing);
        info!(title, "listing updated");
        self.persist()
    }

    /// All listings in insertion order.
    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    /// Listings passing both predicates; an absent predicate imposes
    /// no constraint. Insertion order is preserved.
    pub fn filter_listings(&self, max_price: Option<f64>, min_rooms: Option<u32>) -> Vec<&Listing> {
        self.listings
            .iter()
            .filter(|l| max_price.is_none_or(|max| l.price <= max))
            .filter(|l| min_rooms.is_none_or(|min| l.rooms >= min))
            .collect()
    }

    /// Append a snapshot of the titled listing to the session user's
    /// cart. The same listing may be added more than once.
    pub fn add_to_cart(&mut self, session: &Session, title: &str) -> Result<(), CatalogError> {
        let listing = self
            .listings
            .iter()
            .find(|l| l.title == title)
            .ok_or_else(|| CatalogError::ListingNotFound(title.to_string()))?
            .clone();
        let account = account_mut(&mut self.accounts, &session.username)?;
        account.cart.push(listing);
        info!(username = %session.username, title, "added to cart");
        self.persist()
    }

    /// Move every cart entry to the purchase history, in cart order,
    /// and empty the cart. Fails without mutation when the cart is
    /// empty. Returns the number of listings purchased.
    pub fn checkout(&mut self, session: &Session) -> Result<usize, CatalogError> {
        let account = account_mut(&mut self.accounts, &session.username)?;
        if account.cart.is_empty() {
            return Err(CatalogError::EmptyCart);
        }
        let purchased = account.cart.len();
        let cart = std::mem::take(&mut account.cart);
        account.purchase_history.extend(cart);
        info!(username = %session.username, purchased, "checkout completed");
        self.persist()?;
        Ok(purchased)
    }

    /// The session user's cart, in insertion order.
    pub fn cart(&self, session: &Session) -> Result<&[Listing], CatalogError> {
        Ok(&self.account(&session.username)?.cart)
    }

    /// The session user's purchase history, in checkout order.
    pub fn purchase_history(&self, session: &Session) -> Result<&[Listing], CatalogError> {
        Ok(&self.account(&session.username)?.purchase_history)
    }

    /// Replace the session user's password with a fresh hash. No
    /// old-password check, matching the console flow where the user
    /// has just authenticated.
    pub fn change_password(
        &mut self,
        session: &Session,
        new_password: &str,
    ) -> Result<(), CatalogError> {
        let hash = auth::hash_password(new_password)?;
        let account = account_mut(&mut self.accounts, &session.username)?;
        account.password_hash = hash;
        info!(username = %session.username, "password changed");
        self.persist()
    }

    /// Every account as a name-and-role summary. Password material is
    /// never exposed.
    pub fn accounts(&self) -> Vec<AccountSummary> {
        self.accounts.iter().map(Account::summary).collect()
    }

    /// Remove every account with the given username. Admin console
    /// path; the caller's menu placement is the authorization gate.
    /// Removing an unknown username still persists.
    pub fn remove_account(&mut self, username: &str) -> Result<(), CatalogError> {
        self.accounts.retain(|a| a.username != username);
        info!(username, "account removed");
        self.persist()
    }

    /// Replace the named account's password with a fresh hash. Admin
    /// console path, gated by menu placement like [`Self::remove_account`].
    pub fn set_password(&mut self, username: &str, new_password: &str) -> Result<(), CatalogError> {
        let hash = auth::hash_password(new_password)?;
        let account = account_mut(&mut self.accounts, username)?;
        account.password_hash = hash;
        info!(username, "password reset");
        self.persist()
    }

    fn account(&self, username: &str) -> Result<&Account, CatalogError> {
        self.accounts
            .iter()
            .find(|a| a.username == username)
            .ok_or_else(|| CatalogError::AccountNotFound(username.to_string()))
    }
}

fn account_mut<'a>(
    accounts: &'a mut [Account],
    username: &str,
) -> Result<&'a mut Account, CatalogError> {
    accounts
        .iter_mut()
        .find(|a| a.username == username)
        .ok_or_else(|| CatalogError::AccountNotFound(username.to_string()))
}

fn seed_listings() -> Vec<Listing> {
    vec![
        Listing::new("One-room apartment", 1, 30_000.0, 10, true),
        Listing::new("Two-room apartment", 2, 50_000.0, 5, false),
        Listing::new("Three-room apartment", 3, 70_000.0, 15, true),
    ]
}

fn seed_accounts() -> Result<Vec<Account>, AuthError> {
    Ok(vec![
        Account::new("admin", auth::hash_password("admin123")?, true),
        Account::new("user", auth::hash_password("user123")?, false),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonFileStore;
    use tempfile::{tempdir, TempDir};

    fn seeded() -> (TempDir, Catalog<JsonFileStore>) {
        let dir = tempdir().unwrap();
        let catalog = Catalog::load_or_seed(JsonFileStore::new(dir.path())).unwrap();
        (dir, catalog)
    }

    fn admin_session(catalog: &Catalog<JsonFileStore>) -> Session {
        catalog.login("admin", "admin123").unwrap()
    }

    fn user_session(catalog: &Catalog<JsonFileStore>) -> Session {
        catalog.login("user", "user123").unwrap()
    }

    #[test]
    fn seeds_when_stores_are_absent() {
        let (_dir, catalog) = seeded();
        assert_eq!(catalog.listings().len(), 3);
        assert_eq!(catalog.accounts().len(), 2);
    }

    #[test]
    fn seeding_does_not_write_until_a_mutation() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let listings_path = store.listings_path();
        let _catalog = Catalog::load_or_seed(store).unwrap();
        assert!(!listings_path.exists());
    }

    #[test]
    fn duplicate_registration_fails_without_mutation() {
        let (_dir, mut catalog) = seeded();
        let before = catalog.accounts();

        let err = catalog.register("user", "other", false).unwrap_err();
        assert!(matches!(err, CatalogError::UsernameTaken(name) if name == "user"));
        assert_eq!(catalog.accounts(), before);
    }

    #[test]
    fn registration_persists_and_survives_reload() {
        let (dir, mut catalog) = seeded();
        catalog.register("carol", "s3cret", false).unwrap();

        let reloaded = Catalog::load_or_seed(JsonFileStore::new(dir.path())).unwrap();
        let session = reloaded.login("carol", "s3cret").unwrap();
        assert_eq!(session.username, "carol");
        assert!(!session.is_admin);
    }

    #[test]
    fn login_requires_exact_credentials() {
        let (_dir, catalog) = seeded();

        assert!(matches!(
            catalog.login("user", "wrong"),
            Err(CatalogError::InvalidCredentials)
        ));
        assert!(matches!(
            catalog.login("User", "user123"),
            Err(CatalogError::InvalidCredentials)
        ));

        let session = catalog.login("user", "user123").unwrap();
        assert!(!session.is_admin);
        let session = catalog.login("admin", "admin123").unwrap();
        assert!(session.is_admin);
    }

    #[test]
    fn listing_mutations_require_admin_and_touch_nothing_otherwise() {
        let (dir, mut catalog) = seeded();
        let session = user_session(&catalog);

        let err = catalog
            .add_listing(&session, Listing::new("Penthouse", 5, 200_000.0, 3, true))
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotAuthorized));
        let err = catalog
            .remove_listing(&session, "One-room apartment")
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotAuthorized));

        assert_eq!(catalog.listings().len(), 3);
        // Nothing was persisted either: the store files were never created.
        assert!(!JsonFileStore::new(dir.path()).listings_path().exists());
    }

    #[test]
    fn add_listing_rejects_duplicate_titles() {
        let (_dir, mut catalog) = seeded();
        let session = admin_session(&catalog);

        let err = catalog
            .add_listing(&session, Listing::new("One-room apartment", 1, 1.0, 1, false))
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateTitle(_)));
        assert_eq!(catalog.listings().len(), 3);
    }

    #[test]
    fn remove_listing_is_silent_about_missing_titles() {
        let (_dir, mut catalog) = seeded();
        let session = admin_session(&catalog);

        catalog.remove_listing(&session, "No such place").unwrap();
        assert_eq!(catalog.listings().len(), 3);

        catalog
            .remove_listing(&session, "Two-room apartment")
            .unwrap();
        assert_eq!(catalog.listings().len(), 2);
    }

    #[test]
    fn filter_applies_both_predicates_as_an_and() {
        let (_dir, catalog) = seeded();

        let matched = catalog.filter_listings(Some(50_000.0), Some(2));
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].title, "Two-room apartment");

        // Absent predicates impose no constraint.
        assert_eq!(catalog.filter_listings(None, None).len(), 3);
        assert_eq!(catalog.filter_listings(Some(50_000.0), None).len(), 2);
        assert_eq!(catalog.filter_listings(None, Some(3)).len(), 1);
    }

    #[test]
    fn update_listing_overwrites_only_present_fields() {
        let (_dir, mut catalog) = seeded();

        catalog
            .update_listing(
                "One-room apartment",
                &ListingUpdate {
                    price: Some(33_000.0),
                    ..ListingUpdate::default()
                },
            )
            .unwrap();

        let listing = &catalog.listings()[0];
        assert_eq!(listing.price, 33_000.0);
        assert_eq!(listing.rooms, 1);
        assert_eq!(listing.walk_time_to_metro, 10);
        assert!(listing.has_repair);
    }

    #[test]
    fn update_listing_missing_title_fails_without_persisting() {
        let (dir, mut catalog) = seeded();

        let err = catalog
            .update_listing("Nowhere", &ListingUpdate::default())
            .unwrap_err();
        assert!(matches!(err, CatalogError::ListingNotFound(_)));
        assert!(!JsonFileStore::new(dir.path()).listings_path().exists());
    }

    #[test]
    fn cart_allows_duplicates_and_unknown_titles_fail() {
        let (_dir, mut catalog) = seeded();
        let session = user_session(&catalog);

        catalog.add_to_cart(&session, "One-room apartment").unwrap();
        catalog.add_to_cart(&session, "One-room apartment").unwrap();
        assert_eq!(catalog.cart(&session).unwrap().len(), 2);

        let err = catalog.add_to_cart(&session, "Nowhere").unwrap_err();
        assert!(matches!(err, CatalogError::ListingNotFound(_)));
    }

    #[test]
    fn cart_holds_snapshots_unaffected_by_later_edits() {
        let (_dir, mut catalog) = seeded();
        let user = user_session(&catalog);
        let admin = admin_session(&catalog);

        catalog.add_to_cart(&user, "One-room apartment").unwrap();
        catalog
            .update_listing(
                "One-room apartment",
                &ListingUpdate {
                    price: Some(99_000.0),
                    ..ListingUpdate::default()
                },
            )
            .unwrap();
        catalog.remove_listing(&admin, "One-room apartment").unwrap();

        let cart = catalog.cart(&user).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].price, 30_000.0);
    }

    #[test]
    fn checkout_on_empty_cart_fails_without_mutation() {
        let (_dir, mut catalog) = seeded();
        let session = user_session(&catalog);

        let err = catalog.checkout(&session).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyCart));
        assert!(catalog.purchase_history(&session).unwrap().is_empty());
    }

    #[test]
    fn checkout_moves_cart_to_history_in_order() {
        let (_dir, mut catalog) = seeded();
        let session = user_session(&catalog);

        catalog.add_to_cart(&session, "Two-room apartment").unwrap();
        catalog.add_to_cart(&session, "One-room apartment").unwrap();

        let purchased = catalog.checkout(&session).unwrap();
        assert_eq!(purchased, 2);
        assert!(catalog.cart(&session).unwrap().is_empty());

        let history = catalog.purchase_history(&session).unwrap();
        assert_eq!(history[0].title, "Two-room apartment");
        assert_eq!(history[1].title, "One-room apartment");
    }

    #[test]
    fn cart_and_checkout_survive_a_reload() {
        let (dir, mut catalog) = seeded();
        let session = user_session(&catalog);

        catalog.add_to_cart(&session, "One-room apartment").unwrap();
        catalog.checkout(&session).unwrap();
        catalog.add_to_cart(&session, "Two-room apartment").unwrap();

        let reloaded = Catalog::load_or_seed(JsonFileStore::new(dir.path())).unwrap();
        let session = reloaded.login("user", "user123").unwrap();
        assert_eq!(reloaded.cart(&session).unwrap().len(), 1);
        assert_eq!(reloaded.purchase_history(&session).unwrap().len(), 1);
    }

    #[test]
    fn change_password_invalidates_the_old_credential() {
        let (_dir, mut catalog) = seeded();
        let session = user_session(&catalog);

        catalog.change_password(&session, "newpass").unwrap();
        assert!(matches!(
            catalog.login("user", "user123"),
            Err(CatalogError::InvalidCredentials)
        ));
        catalog.login("user", "newpass").unwrap();
    }

    #[test]
    fn account_summaries_hide_password_material() {
        let (_dir, catalog) = seeded();
        let summaries = catalog.accounts();
        assert_eq!(summaries.len(), 2);
        assert!(summaries.iter().any(|s| s.username == "admin" && s.is_admin));
        assert!(summaries.iter().any(|s| s.username == "user" && !s.is_admin));
    }

    #[test]
    fn account_management_paths_persist() {
        let (dir, mut catalog) = seeded();

        catalog.set_password("user", "reset123").unwrap();
        catalog.remove_account("admin").unwrap();

        let reloaded = Catalog::load_or_seed(JsonFileStore::new(dir.path())).unwrap();
        assert_eq!(reloaded.accounts().len(), 1);
        reloaded.login("user", "reset123").unwrap();
        assert!(matches!(
            reloaded.login("admin", "admin123"),
            Err(CatalogError::InvalidCredentials)
        ));
    }

    #[test]
    fn set_password_on_unknown_account_fails() {
        let (_dir, mut catalog) = seeded();
        let err = catalog.set_password("ghost", "x").unwrap_err();
        assert!(matches!(err, CatalogError::AccountNotFound(_)));
    }

    #[test]
    fn operations_on_a_stale_session_fail_cleanly() {
        let (_dir, mut catalog) = seeded();
        let session = user_session(&catalog);

        catalog.remove_account("user").unwrap();
        let err = catalog
            .add_to_cart(&session, "One-room apartment")
            .unwrap_err();
        assert!(matches!(err, CatalogError::AccountNotFound(_)));
    }

    #[test]
    fn persist_then_reload_round_trips_listings_by_value() {
        let (dir, mut catalog) = seeded();
        catalog.persist().unwrap();
        let before = catalog.listings().to_vec();

        let reloaded = Catalog::load_or_seed(JsonFileStore::new(dir.path())).unwrap();
        assert_eq!(reloaded.listings(), before.as_slice());
    }
}
