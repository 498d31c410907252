//! Identity sampling: usernames, real names, emails and collection names.
//!
//! All identities come from fixed word pools so that a seeded RNG reproduces
//! the same roster. Username uniqueness across a run is a hard guarantee,
//! enforced by [`UsernameRegistry`].

use rand::Rng;
use std::collections::{HashMap, HashSet};

/// Fragments collided pairwise into usernames, and joined in threes into
/// collection names.
pub const USERNAME_FRAGMENTS: [&str; 63] = [
    "gretta", "goober", "great", "posom", "pyro", "fire", "stuck", "eater", "poop", "sparkles",
    "coder", "mario", "maker", "hAx0r", "eggbert", "john", "jeff", "jeremy", "troll", "toby",
    "fox", "black", "story", "sans", "papyrus", "rudy", "knight", "dess", "kris", "frisk", "soul",
    "tale", "master", "king", "pizza", "baker", "improv", "knife", "music", "liker", "haver",
    "love", "level", "gamer", "anime", "watcher", "afar", "door", "kicker", "gauge", "pasta",
    "hungry", "food", "plsplspls", "home", "under", "carol", "bruno", "mars", "uptown", "funk",
    "friday", "night",
];

pub const FIRST_NAMES: [&str; 61] = [
    "Gretta", "John", "Jeff", "Jeremy", "Toby", "Rudy", "Sans", "Kris", "Frisk", "Baker",
    "Noelle", "Bob", "Bill", "William", "Gayle", "Kai", "Quang", "Uday", "James", "Anthony",
    "Anna", "Brett", "Chris", "Carol", "Bella", "Carl", "Daren", "Darling", "Eddison", "Robert",
    "Rachel", "Truman", "Tiffany", "Pierre", "Pablo", "Paul", "Paula", "Odile", "Scarlette",
    "Victoria", "Victor", "Fred", "Human", "Harold", "Jessica", "Kye", "Larry", "Laura",
    "Xavier", "Carlos", "Mario", "Luigi", "Bowser", "Doug", "Norman", "Andrew", "Susie", "Milo",
    "Caroline", "Alexander", "Ronald",
];

pub const LAST_NAMES: [&str; 34] = [
    "Rogers", "Smith", "Baker", "Brown", "Eggbert", "Bowser", "Mario", "Jameson", "Jackson",
    "Gaster", "Sweet", "Miller", "Davis", "Kennedy", "Lincoln", "Trump", "Washington", "Lopez",
    "Clark", "King", "Hall", "Roberts", "Collins", "Cook", "Ward", "Watson", "Holmes", "Wood",
    "Gray", "Henderson", "Hamilton", "West", "McDonald", "Mars",
];

pub const EMAIL_DOMAINS: [&str; 7] = [
    "@gmail.com",
    "@hotmail.com",
    "@yahoo.com",
    "@mail.com",
    "@rit.edu",
    "@bbc.uk",
    "@gaylemail.com",
];

/// A fully sampled synthetic identity, ready to persist as a `user` row.
#[derive(Debug, Clone)]
pub struct Identity {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub display_name: String,
}

/// Run-scoped username bookkeeping.
///
/// Tracks a monotonic collision counter per base name, plus the set of every
/// name actually handed out. The counter disambiguates repeated base names;
/// the taken-set closes the gap where a suffixed name (say `fooBar1`) could
/// later be produced as somebody else's base name.
#[derive(Debug, Default)]
pub struct UsernameRegistry {
    suffixes: HashMap<String, u32>,
    taken: HashSet<String>,
}

impl UsernameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a unique final username for `base`.
    ///
    /// First claim of a base returns it verbatim. Later claims append the
    /// base's collision counter, bumping it until an unused name is found, so
    /// the counter is monotonic per base name across the whole run.
    pub fn claim(&mut self, base: &str) -> String {
        if self.taken.insert(base.to_string()) {
            self.suffixes.entry(base.to_string()).or_insert(0);
            return base.to_string();
        }
        let count = self.suffixes.entry(base.to_string()).or_insert(0);
        loop {
            *count += 1;
            let candidate = format!("{base}{count}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Number of distinct final usernames handed out so far.
    pub fn len(&self) -> usize {
        self.taken.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }
}

/// Draw one entry from a fixed pool.
fn pick<'a, R: Rng>(rng: &mut R, pool: &[&'a str]) -> &'a str {
    pool[rng.gen_range(0..pool.len())]
}

/// Capitalize the first character, leaving the rest untouched.
fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Sample a complete identity: username (two collided fragments, second one
/// capitalized), first/last name, email (username + domain) and display name
/// ("first last" with probability 0.5, else the bare username).
pub fn sample_identity<R: Rng>(rng: &mut R, registry: &mut UsernameRegistry) -> Identity {
    let part_one = pick(rng, &USERNAME_FRAGMENTS);
    let part_two = pick(rng, &USERNAME_FRAGMENTS);
    let base = format!("{part_one}{}", capitalize_first(part_two));
    let username = registry.claim(&base);

    let first_name = pick(rng, &FIRST_NAMES).to_string();
    let last_name = pick(rng, &LAST_NAMES).to_string();
    let email = format!("{username}{}", pick(rng, &EMAIL_DOMAINS));
    let display_name = if rng.gen::<f64>() > 0.5 {
        format!("{first_name} {last_name}")
    } else {
        username.clone()
    };

    Identity { username, first_name, last_name, email, display_name }
}

/// Sample a freeform collection name: three fragments joined by spaces.
pub fn sample_collection_name<R: Rng>(rng: &mut R) -> String {
    format!(
        "{} {} {}",
        pick(rng, &USERNAME_FRAGMENTS),
        pick(rng, &USERNAME_FRAGMENTS),
        pick(rng, &USERNAME_FRAGMENTS)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn first_claim_is_verbatim() {
        let mut registry = UsernameRegistry::new();
        assert_eq!(registry.claim("pyroFox"), "pyroFox");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn collision_suffix_is_monotonic_per_base() {
        let mut registry = UsernameRegistry::new();
        assert_eq!(registry.claim("pyroFox"), "pyroFox");
        assert_eq!(registry.claim("pyroFox"), "pyroFox1");
        assert_eq!(registry.claim("pyroFox"), "pyroFox2");
        // A different base keeps its own counter.
        assert_eq!(registry.claim("sansKing"), "sansKing");
        assert_eq!(registry.claim("sansKing"), "sansKing1");
        assert_eq!(registry.claim("pyroFox"), "pyroFox3");
    }

    #[test]
    fn suffixed_name_never_collides_with_later_base() {
        let mut registry = UsernameRegistry::new();
        assert_eq!(registry.claim("foo"), "foo");
        assert_eq!(registry.claim("foo"), "foo1");
        // "foo1" arriving as a base name of its own must not duplicate.
        assert_eq!(registry.claim("foo1"), "foo11");
        // And the original base keeps counting past it.
        assert_eq!(registry.claim("foo"), "foo2");
    }

    #[test]
    fn capitalize_first_handles_unicode_and_empty() {
        assert_eq!(capitalize_first("hAx0r"), "HAx0r");
        assert_eq!(capitalize_first(""), "");
        assert_eq!(capitalize_first("éclair"), "Éclair");
    }

    #[test]
    fn identity_fields_are_consistent() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut registry = UsernameRegistry::new();
        for _ in 0..200 {
            let identity = sample_identity(&mut rng, &mut registry);
            assert!(identity.email.starts_with(&identity.username));
            assert!(EMAIL_DOMAINS.iter().any(|d| identity.email.ends_with(d)));
            let full = format!("{} {}", identity.first_name, identity.last_name);
            assert!(identity.display_name == full || identity.display_name == identity.username);
        }
        // Every handed-out name was unique.
        assert_eq!(registry.len(), 200);
    }

    #[test]
    fn sampling_is_deterministic_under_a_seed() {
        let sample = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut registry = UsernameRegistry::new();
            (0..50)
                .map(|_| sample_identity(&mut rng, &mut registry).username)
                .collect::<Vec<_>>()
        };
        assert_eq!(sample(99), sample(99));
        assert_ne!(sample(99), sample(100));
    }

    #[test]
    fn collection_names_have_three_words() {
        let mut rng = StdRng::seed_from_u64(3);
        let name = sample_collection_name(&mut rng);
        assert_eq!(name.split(' ').count(), 3);
    }
}
