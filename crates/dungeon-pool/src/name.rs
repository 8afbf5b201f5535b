//! Pronounceable random names for instances and players.

use rand::Rng;

const CONSONANTS: [char; 18] = [
    'b', 'c', 'd', 'f', 'g', 'h', 'j', 'k', 'l', 'm', 'n', 'p', 'r', 's', 't', 'v', 'w', 'z',
];

const VOWELS: [char; 5] = ['a', 'e', 'i', 'o', 'u'];

/// Most syllables a generated name can have.
pub const MAX_SYLLABLES: usize = 3;

/// Generate a name using the thread-local random generator.
///
/// Safe to call from any number of tasks at once; each thread owns its
/// generator.
pub fn generate_name() -> String {
    generate_name_with(&mut rand::thread_rng())
}

/// Generate a name of one to three consonant-vowel syllables, capitalized.
pub fn generate_name_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let syllables = rng.gen_range(1..=MAX_SYLLABLES);
    let mut name = String::with_capacity(syllables * 2);

    for i in 0..syllables {
        let consonant = CONSONANTS[rng.gen_range(0..CONSONANTS.len())];
        let vowel = VOWELS[rng.gen_range(0..VOWELS.len())];
        if i == 0 {
            name.push(consonant.to_ascii_uppercase());
        } else {
            name.push(consonant);
        }
        name.push(vowel);
    }

    name
}
