//! Human-readable participant ids.

use deckhand_core::Environment;
use deckhand_proto::ClientId;
use rand::Rng;
use rand::seq::SliceRandom;

const ADJECTIVES: [&str; 26] = [
    "amazing", "brave", "courageous", "daring", "epic", "fearless", "gallant", "heroic",
    "intrepid", "jovial", "keen", "lively", "merry", "noble", "outstanding", "plucky", "quick",
    "resolute", "stalwart", "tireless", "unyielding", "valiant", "wily", "xenial", "youthful",
    "zealous",
];

const COLORS: [&str; 26] = [
    "azure", "blue", "crimson", "dusky", "emerald", "fuchsia", "gold", "hazel", "indigo", "jade",
    "khaki", "lavender", "magenta", "navy", "olive", "purple", "quartz", "red", "sapphire", "teal",
    "umber", "violet", "white", "xanthic", "yellow", "zaffre",
];

const NOUNS: [&str; 26] = [
    "archer", "bard", "cleric", "druid", "enchanter", "fighter", "guardian", "hunter",
    "illusionist", "jester", "knight", "lancer", "mage", "necromancer", "oracle", "paladin",
    "quartermaster", "ranger", "sorcerer", "templar", "undertaker", "vanguard", "warrior",
    "xenomancer", "yogi", "zealot",
];

/// Generates an `adjective-color-noun` id such as `brave-teal-ranger`.
///
/// Ids are for display and routing, not secrecy: there are only 26^3 of
/// them, so collisions at a busy table are possible and key exchange will
/// reject the duplicate.
pub fn generate_client_id<E: Environment>(env: &E) -> ClientId {
    let mut rng = env.rng();
    let adjective = pick(&ADJECTIVES, &mut rng);
    let color = pick(&COLORS, &mut rng);
    let noun = pick(&NOUNS, &mut rng);
    format!("{adjective}-{color}-{noun}")
}

fn pick<R: Rng + ?Sized>(words: &[&'static str], rng: &mut R) -> &'static str {
    words.choose(rng).copied().unwrap_or_default()
}
