//! Name generation utilities

use rand::Rng;

use crate::components::Name;

/// Generate a random blob name from two syllables
pub fn generate_name(rng: &mut impl Rng) -> Name {
    let head = HEADS[rng.gen_range(0..HEADS.len())];
    let tail = TAILS[rng.gen_range(0..TAILS.len())];
    Name::new(format!("{}{}", head, tail))
}

/// Pick a star name
pub fn star_name(rng: &mut impl Rng) -> String {
    STARS[rng.gen_range(0..STARS.len())].to_string()
}

/// Planets are named after their star and orbit index, moons after their planet.
pub fn planet_name(star: &str, index: u32) -> String {
    let letter = (b'b' + (index % 25) as u8) as char;
    format!("{} {}", star, letter)
}

pub fn moon_name(planet: &str) -> String {
    format!("{} I", planet)
}

static HEADS: &[&str] = &[
    "Bo", "Pip", "Glo", "Mu", "Zib", "Wub", "Fen", "Lo", "Quo", "Tam", "Nib", "Ora", "Sku",
    "Dri", "Hap", "Yel",
];

static TAILS: &[&str] = &[
    "b", "bble", "mp", "rk", "zz", "ppo", "nk", "lo", "sh", "dle", "mby", "x",
];

static STARS: &[&str] = &[
    "Sol Minor", "Vega", "Talis", "Korrin", "Aster", "Nubis", "Pallas", "Hesper",
];

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_names_are_deterministic() {
        let a = generate_name(&mut StdRng::seed_from_u64(5));
        let b = generate_name(&mut StdRng::seed_from_u64(5));
        assert_eq!(a.as_str(), b.as_str());
        assert!(!a.as_str().is_empty());
    }

    #[test]
    fn test_body_names() {
        assert_eq!(planet_name("Vega", 0), "Vega b");
        assert_eq!(planet_name("Vega", 2), "Vega d");
        assert_eq!(moon_name("Vega b"), "Vega b I");
    }
}
