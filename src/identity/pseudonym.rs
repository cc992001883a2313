//! Generated display names and avatar initials

use uuid::Uuid;

/// First word of a generated pseudonym
pub const ADJECTIVES: [&str; 10] = [
    "Anonymous", "Silent", "Hopeful", "Peaceful", "Kind", "Gentle", "Brave", "Calm", "Serene",
    "Quiet",
];

/// Second word of a generated pseudonym
pub const NOUNS: [&str; 12] = [
    "Soul", "Heart", "Spirit", "Mind", "Voice", "Light", "Star", "Moon", "Cloud", "River", "Wave",
    "Dream",
];

/// Random two-word pseudonym such as "Gentle River"
pub fn generate_pseudonym() -> String {
    pseudonym_from_seed(Uuid::new_v4().as_u128())
}

/// Deterministic pseudonym for a seed
///
/// The low 64 bits pick the adjective and the high 64 bits the noun.
pub fn pseudonym_from_seed(seed: u128) -> String {
    let adjective = ADJECTIVES[((seed as u64) % ADJECTIVES.len() as u64) as usize];
    let noun = NOUNS[(((seed >> 64) as u64) % NOUNS.len() as u64) as usize];
    format!("{} {}", adjective, noun)
}

/// Two-letter avatar label.
///
/// First letters of the first two words, or the first two characters of a
/// single word, uppercased.
pub fn initials(name: &str) -> String {
    let mut words = name.split_whitespace();
    match (words.next(), words.next()) {
        (Some(first), Some(second)) => first
            .chars()
            .take(1)
            .chain(second.chars().take(1))
            .flat_map(char::to_uppercase)
            .collect(),
        (Some(only), None) => only.chars().take(2).flat_map(char::to_uppercase).collect(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_words_come_from_vocabulary() {
        for _ in 0..50 {
            let name = generate_pseudonym();
            let parts: Vec<&str> = name.split(' ').collect();
            assert_eq!(parts.len(), 2);
            assert!(ADJECTIVES.contains(&parts[0]), "unexpected adjective in {}", name);
            assert!(NOUNS.contains(&parts[1]), "unexpected noun in {}", name);
        }
    }

    #[test]
    fn test_seeded_pseudonym() {
        assert_eq!(pseudonym_from_seed(0), "Anonymous Soul");
        assert_eq!(pseudonym_from_seed(3 | (9u128 << 64)), "Peaceful River");
    }

    #[test]
    fn test_seed_halves_are_independent() {
        let low = 3u128;
        let base = pseudonym_from_seed(low);
        let adjective = base.split(' ').next().unwrap();

        for high in 1..NOUNS.len() as u128 {
            let name = pseudonym_from_seed(low | (high << 64));
            assert!(name.starts_with(adjective), "adjective changed in {}", name);
            assert!(name.ends_with(NOUNS[high as usize]), "wrong noun in {}", name);
        }
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials("Gentle River"), "GR");
        assert_eq!(initials("jane doe smith"), "JD");
        assert_eq!(initials("jane.doe"), "JA");
        assert_eq!(initials("x"), "X");
        assert_eq!(initials("  calm   wave "), "CW");
        assert_eq!(initials(""), "");
    }
}
