//! User directory keyed by matricola.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, warn};

use crate::ledger::LoanLedger;
use crate::models::User;

/// Replacement data applied by [`UserDirectory::modify`]. The matricola
/// names the user and never changes.
#[derive(Debug, Clone)]
pub struct UserPatch {
    /// Matricola of the user to update.
    pub matricola: String,
    /// New given name.
    pub first_name: String,
    /// New family name.
    pub last_name: String,
    /// New contact address.
    pub email: String,
    /// New blacklist state.
    pub blacklisted: bool,
}

/// The set of registered users, at most one per matricola, kept in
/// matricola order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserDirectory {
    #[serde(
        serialize_with = "serialize_users",
        deserialize_with = "deserialize_users"
    )]
    users: BTreeMap<String, User>,
}

impl UserDirectory {
    /// An empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether nobody is registered.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Register a user. A matricola already present keeps its existing
    /// record and the incoming one is dropped.
    pub fn insert(&mut self, user: User) -> bool {
        match self.users.entry(user.matricola().to_string()) {
            Entry::Occupied(_) => {
                debug!("dropping duplicate registration for matricola {}", user.matricola());
                false
            }
            Entry::Vacant(entry) => {
                entry.insert(user);
                true
            }
        }
    }

    /// Overwrite the personal data and blacklist state of the user the
    /// patch names. An unknown matricola is a quiet no-op.
    pub fn modify(&mut self, patch: &UserPatch) -> bool {
        let Some(user) = self.users.get_mut(&patch.matricola) else {
            debug!("ignoring update for unknown matricola {}", patch.matricola);
            return false;
        };
        user.set_first_name(patch.first_name.clone());
        user.set_last_name(patch.last_name.clone());
        user.set_email(patch.email.clone());
        user.set_blacklisted(patch.blacklisted);
        true
    }

    /// Remove the user whose matricola is written in `matricola_text`.
    ///
    /// Blank text and unknown matricolas are quiet no-ops. A user who still
    /// holds open loans in `ledger` is kept and the refusal is logged; the
    /// return value says whether a user was actually removed.
    pub fn delete(&mut self, matricola_text: &str, ledger: &LoanLedger) -> bool {
        let matricola = matricola_text.trim();
        if matricola.is_empty() {
            debug!("ignoring directory delete for blank matricola");
            return false;
        }
        if !self.users.contains_key(matricola) {
            debug!("ignoring directory delete for unknown matricola {matricola}");
            return false;
        }
        if ledger.has_active(matricola) {
            warn!("refusing to delete user {matricola}: active loans outstanding");
            return false;
        }
        self.users.remove(matricola);
        true
    }

    /// Find users matching every non-blank criterion.
    ///
    /// The matricola matches exactly, names by case-insensitive substring.
    /// All-blank criteria return the whole directory, in matricola order.
    pub fn search(&self, matricola: &str, last_name: &str, first_name: &str) -> Vec<&User> {
        let matricola = matricola.trim();
        let last_name = last_name.trim().to_lowercase();
        let first_name = first_name.trim().to_lowercase();
        self.users
            .values()
            .filter(|user| matricola.is_empty() || user.matricola() == matricola)
            .filter(|user| {
                last_name.is_empty() || user.last_name().to_lowercase().contains(&last_name)
            })
            .filter(|user| {
                first_name.is_empty() || user.first_name().to_lowercase().contains(&first_name)
            })
            .collect()
    }

    /// Set or clear the blacklist flag. An unknown matricola is a quiet
    /// no-op.
    pub fn set_blacklist(&mut self, matricola: &str, blacklisted: bool) -> bool {
        let Some(user) = self.users.get_mut(matricola) else {
            debug!("ignoring blacklist change for unknown matricola {matricola}");
            return false;
        };
        user.set_blacklisted(blacklisted);
        true
    }

    /// The user with this matricola, if registered.
    pub fn find(&self, matricola: &str) -> Option<&User> {
        self.users.get(matricola)
    }

    pub(crate) fn find_mut(&mut self, matricola: &str) -> Option<&mut User> {
        self.users.get_mut(matricola)
    }

    /// Walk the directory in matricola order.
    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }
}

fn serialize_users<S>(users: &BTreeMap<String, User>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(users.values())
}

fn deserialize_users<'de, D>(deserializer: D) -> Result<BTreeMap<String, User>, D::Error>
where
    D: Deserializer<'de>,
{
    let users = Vec::<User>::deserialize(deserializer)?;
    Ok(users
        .into_iter()
        .map(|user| (user.matricola().to_string(), user))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BookCatalog;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn directory_with_fixtures() -> UserDirectory {
        let mut directory = UserDirectory::new();
        directory.insert(User::new("VR111111", "Elena", "Greco", "elena@uni.it"));
        directory.insert(User::new("VR222222", "Raffaella", "Cerullo", "lila@uni.it"));
        directory
    }

    #[test]
    fn insert_keeps_the_first_record_for_a_matricola() {
        let mut directory = UserDirectory::new();
        assert!(directory.insert(User::new("VR111111", "Mario", "Rossi", "mario@uni.it")));
        assert!(!directory.insert(User::new("VR111111", "Luigi", "Verdi", "luigi@uni.it")));
        assert_eq!(directory.len(), 1);
        let user = directory.find("VR111111").expect("registered");
        assert_eq!(user.first_name(), "Mario");
    }

    #[test]
    fn modify_overwrites_personal_data_only_for_known_users() {
        let mut directory = directory_with_fixtures();
        let patch = UserPatch {
            matricola: "VR111111".to_string(),
            first_name: "Lenù".to_string(),
            last_name: "Greco".to_string(),
            email: "lenu@uni.it".to_string(),
            blacklisted: true,
        };
        assert!(directory.modify(&patch));
        let user = directory.find("VR111111").expect("registered");
        assert_eq!(user.first_name(), "Lenù");
        assert_eq!(user.email(), "lenu@uni.it");
        assert!(user.is_blacklisted());

        let missing = UserPatch {
            matricola: "VR999999".to_string(),
            first_name: "Nessuno".to_string(),
            last_name: "Nessuno".to_string(),
            email: "no@uni.it".to_string(),
            blacklisted: false,
        };
        assert!(!directory.modify(&missing));
        assert_eq!(directory.len(), 2);
    }

    #[test]
    fn delete_is_lenient_about_bad_input() {
        let mut directory = directory_with_fixtures();
        let ledger = LoanLedger::new();
        assert!(!directory.delete("", &ledger));
        assert!(!directory.delete("   ", &ledger));
        assert!(!directory.delete("VR999999", &ledger));
        assert_eq!(directory.len(), 2);

        assert!(directory.delete(" VR222222 ", &ledger));
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn delete_refuses_a_user_with_open_loans() {
        let mut catalog = BookCatalog::new();
        catalog
            .insert_or_merge(9788800000000, "L'amica geniale", Vec::new(), 2011, 1)
            .expect("insert fixture");
        let mut directory = directory_with_fixtures();
        let mut ledger = LoanLedger::new();
        ledger
            .register_loan(
                &mut catalog,
                &mut directory,
                "VR111111",
                9788800000000,
                date(2024, 3, 1),
                date(2024, 3, 31),
            )
            .expect("loan registered");

        assert!(!directory.delete("VR111111", &ledger));
        assert!(directory.find("VR111111").is_some());

        ledger.register_return(
            &mut catalog,
            &mut directory,
            "VR111111",
            9788800000000,
            date(2024, 3, 1),
            date(2024, 3, 15),
        );
        assert!(directory.delete("VR111111", &ledger));
        assert!(directory.find("VR111111").is_none());
    }

    #[test]
    fn search_combines_criteria_with_and() {
        let mut directory = directory_with_fixtures();
        directory.insert(User::new("VR333333", "Nino", "Sarratore", "nino@uni.it"));

        let by_matricola = directory.search("VR222222", "", "");
        assert_eq!(by_matricola.len(), 1);
        assert_eq!(by_matricola[0].first_name(), "Raffaella");

        // The matricola never matches by prefix.
        assert!(directory.search("VR2", "", "").is_empty());

        let by_surname = directory.search("", "RRAT", "");
        assert_eq!(by_surname.len(), 1);
        assert_eq!(by_surname[0].matricola(), "VR333333");

        let by_both = directory.search("", "greco", "elena");
        assert_eq!(by_both.len(), 1);
        assert!(directory.search("", "greco", "nino").is_empty());

        let all = directory.search(" ", "", "");
        assert_eq!(all.len(), 3);
        let matricolas: Vec<&str> = all.iter().map(|user| user.matricola()).collect();
        assert_eq!(matricolas, ["VR111111", "VR222222", "VR333333"]);
    }

    #[test]
    fn iter_walks_in_matricola_order() {
        let mut directory = UserDirectory::new();
        directory.insert(User::new("VR222222", "Raffaella", "Cerullo", "lila@uni.it"));
        directory.insert(User::new("VR111111", "Elena", "Greco", "elena@uni.it"));
        let matricolas: Vec<&str> = directory.iter().map(|user| user.matricola()).collect();
        assert_eq!(matricolas, ["VR111111", "VR222222"]);
    }

    #[test]
    fn set_blacklist_flips_the_flag_for_known_users() {
        let mut directory = directory_with_fixtures();
        assert!(directory.set_blacklist("VR111111", true));
        assert!(directory
            .find("VR111111")
            .expect("registered")
            .is_blacklisted());
        assert!(directory.set_blacklist("VR111111", false));
        assert!(!directory
            .find("VR111111")
            .expect("registered")
            .is_blacklisted());
        assert!(!directory.set_blacklist("VR999999", true));
    }

    #[test]
    fn serializes_as_a_sequence_and_reindexes_on_load() {
        let directory = directory_with_fixtures();
        let json = serde_json::to_string(&directory).expect("serialize");
        assert!(json.contains("\"users\":["));

        let reloaded: UserDirectory = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(reloaded.len(), 2);
        let user = reloaded.find("VR222222").expect("keyed by matricola again");
        assert_eq!(user.last_name(), "Cerullo");
    }
}
