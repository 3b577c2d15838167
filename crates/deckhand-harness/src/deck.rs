//! Application-side view of a shuffled deck.
//!
//! After a shuffle every position is locked under both participants'
//! per-item keys. A card becomes readable locally once the other
//! participant reveals their key for it; [`Deck`] tracks which keys are
//! known and where every position currently lives.

use deckhand_client::ShuffledDeck;
use deckhand_core::ProtocolError;
use deckhand_crypto::{
    CryptoError, SraKeyPair, bigint_to_string, decode_item, encode_item, string_to_bigint,
};

const VALUES: [&str; 13] = ["2", "3", "4", "5", "6", "7", "8", "9", "10", "J", "Q", "K", "A"];
const SUITS: [&str; 4] = ["hearts", "diamonds", "clubs", "spades"];

/// The 52 cards of a standard deck, named value then suit (`"Qspades"`).
pub fn standard_deck() -> Vec<String> {
    VALUES.iter().flat_map(|value| SUITS.iter().map(move |suit| format!("{value}{suit}"))).collect()
}

/// Decimal wire form of each item, ready to shuffle.
pub fn encode_deck<S: AsRef<str>>(items: &[S]) -> Result<Vec<String>, CryptoError> {
    items.iter().map(|item| encode_item(item.as_ref()).map(|n| bigint_to_string(&n))).collect()
}

/// Encrypted deck plus the bookkeeping a two-player game needs.
#[derive(Debug, Clone)]
pub struct Deck {
    encrypted: Vec<String>,
    my_keys: Vec<SraKeyPair>,
    others_keys: Vec<Option<SraKeyPair>>,
    opened: Vec<Option<String>>,
    draw_pile: Vec<usize>,
    my_hand: Vec<usize>,
    others_hand: Vec<usize>,
    discard_pile: Vec<usize>,
}

impl Deck {
    /// Wraps a shuffle outcome. Every position starts in the draw pile.
    pub fn new(shuffled: ShuffledDeck) -> Result<Self, ProtocolError> {
        let ShuffledDeck { deck, private_keys } = shuffled;
        if deck.len() != private_keys.len() {
            return Err(ProtocolError::DeckSizeMismatch {
                expected: deck.len(),
                actual: private_keys.len(),
            });
        }

        let len = deck.len();
        Ok(Self {
            encrypted: deck,
            my_keys: private_keys,
            others_keys: vec![None; len],
            opened: vec![None; len],
            draw_pile: (0..len).collect(),
            my_hand: Vec::new(),
            others_hand: Vec::new(),
            discard_pile: Vec::new(),
        })
    }

    /// Number of positions.
    pub fn len(&self) -> usize {
        self.encrypted.len()
    }

    /// Whether the deck has no positions.
    pub fn is_empty(&self) -> bool {
        self.encrypted.is_empty()
    }

    /// Local key for `index`, to reveal to the other participant.
    pub fn key(&self, index: usize) -> Result<&SraKeyPair, ProtocolError> {
        self.my_keys.get(index).ok_or(ProtocolError::IndexOutOfRange { index, len: self.len() })
    }

    /// Plaintext at `index`, or `None` while the other participant's key
    /// for it is unknown.
    ///
    /// Removes the local layer, then the other participant's, and caches
    /// the result.
    pub fn card_at(&mut self, index: usize) -> Result<Option<&str>, ProtocolError> {
        self.check(index)?;

        if self.opened[index].is_none() {
            let Some(theirs) = &self.others_keys[index] else {
                return Ok(None);
            };

            let partial = self.my_keys[index].decrypt_item(&self.encrypted[index])?;
            let bare = theirs.decrypt_item(&partial)?;
            self.opened[index] = Some(decode_item(&string_to_bigint(&bare)?)?);
        }

        Ok(self.opened[index].as_deref())
    }

    /// Takes the top of the draw pile.
    pub fn draw(&mut self) -> Result<usize, ProtocolError> {
        self.draw_pile.pop().ok_or_else(|| ProtocolError::invalid_state("no cards to draw"))
    }

    /// Position that [`draw`](Self::draw) will return next.
    pub fn peek(&self) -> Option<usize> {
        self.draw_pile.last().copied()
    }

    /// Takes `index` into the local hand with the other participant's key
    /// for it.
    pub fn put_in_my_hand(
        &mut self,
        index: usize,
        others_key: SraKeyPair,
    ) -> Result<usize, ProtocolError> {
        self.check(index)?;
        self.others_keys[index] = Some(others_key);
        self.my_hand.push(index);
        Ok(index)
    }

    /// Records that the other participant took `index`.
    pub fn put_in_others_hand(&mut self, index: usize) -> Result<usize, ProtocolError> {
        self.check(index)?;
        self.others_hand.push(index);
        Ok(index)
    }

    /// Moves `index` from the local hand to the discard pile.
    pub fn my_discard(&mut self, index: usize) -> Result<(), ProtocolError> {
        let at = self
            .my_hand
            .iter()
            .position(|&i| i == index)
            .ok_or_else(|| ProtocolError::invalid_state(format!("card {index} is not in hand")))?;
        self.discard_pile.push(self.my_hand.remove(at));
        Ok(())
    }

    /// Moves `index` from the other hand to the discard pile. A discard is
    /// played face up, so its key comes along.
    pub fn others_discard(
        &mut self,
        index: usize,
        others_key: SraKeyPair,
    ) -> Result<(), ProtocolError> {
        let at = self.others_hand.iter().position(|&i| i == index).ok_or_else(|| {
            ProtocolError::invalid_state(format!("card {index} is not in the other hand"))
        })?;
        self.others_keys[index] = Some(others_key);
        self.discard_pile.push(self.others_hand.remove(at));
        Ok(())
    }

    /// Positions in the local hand, in the order taken.
    pub fn my_hand(&self) -> &[usize] {
        &self.my_hand
    }

    /// Positions in the other hand, in the order taken.
    pub fn others_hand(&self) -> &[usize] {
        &self.others_hand
    }

    /// Discarded positions, oldest first.
    pub fn discard_pile(&self) -> &[usize] {
        &self.discard_pile
    }

    /// Positions left to draw.
    pub fn remaining(&self) -> usize {
        self.draw_pile.len()
    }

    fn check(&self, index: usize) -> Result<(), ProtocolError> {
        if index < self.len() {
            Ok(())
        } else {
            Err(ProtocolError::IndexOutOfRange { index, len: self.len() })
        }
    }
}

#[cfg(test)]
mod tests {
    use deckhand_crypto::{BigUint, random_prime};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::*;

    /// Locks `items` under two sets of per-item keys, as a finished shuffle
    /// would (without the permutation).
    fn locked(items: &[&str]) -> (Deck, Vec<SraKeyPair>) {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let prime: BigUint = random_prime(&mut rng, 16).expect("prime");
        let key = |rng: &mut ChaCha20Rng| SraKeyPair::generate(rng, &prime, 16).expect("key");

        let mine: Vec<SraKeyPair> = items.iter().map(|_| key(&mut rng)).collect();
        let theirs: Vec<SraKeyPair> = items.iter().map(|_| key(&mut rng)).collect();
        let deck = encode_deck(items)
            .expect("encode")
            .iter()
            .zip(mine.iter().zip(&theirs))
            .map(|(item, (a, b))| b.encrypt_item(&a.encrypt_item(item).expect("a")).expect("b"))
            .collect();

        (Deck::new(ShuffledDeck { deck, private_keys: mine }).expect("deck"), theirs)
    }

    #[test]
    fn standard_deck_has_52_distinct_cards() {
        let deck = standard_deck();
        let mut unique = deck.clone();
        unique.sort();
        unique.dedup();

        assert_eq!(deck.len(), 52);
        assert_eq!(unique.len(), 52);
        assert!(deck.contains(&"Qspades".to_owned()));
    }

    #[test]
    fn card_is_pending_until_key_arrives() {
        let (mut deck, theirs) = locked(&["Ahearts", "7clubs"]);

        let index = deck.draw().expect("draw");
        assert_eq!(index, 1);
        assert_eq!(deck.card_at(index).expect("card"), None);

        deck.put_in_my_hand(index, theirs[index].clone()).expect("hand");
        assert_eq!(deck.card_at(index).expect("card"), Some("7clubs"));
    }

    #[test]
    fn others_discard_opens_card() {
        let (mut deck, theirs) = locked(&["Ahearts", "7clubs"]);
        let index = deck.draw().expect("draw");
        deck.put_in_others_hand(index).expect("others");

        deck.others_discard(index, theirs[index].clone()).expect("discard");

        assert_eq!(deck.discard_pile(), [index]);
        assert!(deck.others_hand().is_empty());
        assert_eq!(deck.card_at(index).expect("card"), Some("7clubs"));
    }

    #[test]
    fn discard_moves_card_from_hand() {
        let (mut deck, theirs) = locked(&["Ahearts", "7clubs", "Kdiamonds"]);
        for _ in 0..2 {
            let index = deck.draw().expect("draw");
            deck.put_in_my_hand(index, theirs[index].clone()).expect("hand");
        }

        deck.my_discard(2).expect("discard");
        assert_eq!(deck.my_hand(), [1]);
        assert_eq!(deck.discard_pile(), [2]);
        assert!(deck.my_discard(2).is_err());
    }

    #[test]
    fn empty_draw_pile_is_an_error() {
        let (mut deck, _) = locked(&["Ahearts"]);
        deck.draw().expect("draw");

        assert_eq!(deck.remaining(), 0);
        assert!(matches!(deck.draw(), Err(ProtocolError::InvalidState { .. })));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let (mut deck, _) = locked(&["Ahearts"]);
        assert!(matches!(
            deck.card_at(4),
            Err(ProtocolError::IndexOutOfRange { index: 4, len: 1 })
        ));
        assert!(deck.key(1).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn dealing_partitions_the_deck(to_me in proptest::collection::vec(any::<bool>(), 6)) {
            let items = ["2hearts", "3clubs", "Jspades", "Qdiamonds", "Kclubs", "Ahearts"];
            let (mut deck, theirs) = locked(&items);

            for mine in &to_me {
                let index = deck.draw().expect("draw");
                if *mine {
                    deck.put_in_my_hand(index, theirs[index].clone()).expect("hand");
                    prop_assert_eq!(deck.card_at(index).expect("card"), Some(items[index]));
                } else {
                    deck.put_in_others_hand(index).expect("others");
                    prop_assert_eq!(deck.card_at(index).expect("card"), None);
                }
            }

            let mut seen: Vec<usize> =
                deck.my_hand().iter().chain(deck.others_hand()).copied().collect();
            seen.sort_unstable();
            prop_assert_eq!(seen, (0..items.len()).collect::<Vec<_>>());
            prop_assert_eq!(deck.remaining(), 0);
        }
    }
}
