//! Collaborator traits: word packs and the hosting entitlement.
//!
//! The core does not implement storage or purchases. It defines the
//! contracts it needs and ships in-memory implementations good enough
//! for development and tests; production wires real backends in.

use undercover_protocol::{PackId, PlayerId, WordPack, WordPair};

use undercover_engine::GameError;

/// Supplies word packs to the directory when games are created.
///
/// The core only requires a non-empty ordered pair list; where packs
/// live and how they are edited is the storage layer's business.
pub trait PackProvider: Send + Sync + 'static {
    /// Fetches a pack by id.
    ///
    /// # Errors
    /// [`GameError::NoWordPack`] if no such pack exists.
    fn fetch(&self, id: PackId) -> Result<WordPack, GameError>;

    /// Lists the packs `viewer` may pick from: defaults, public packs,
    /// and their own.
    fn list_visible(&self, viewer: PlayerId) -> Vec<WordPack>;
}

/// Decides whether a participant may host (create) a game.
///
/// Entitlement is decided entirely outside the core — a purchase
/// record, a subscription, whatever. The core trusts this gate.
pub trait HostGate: Send + Sync + 'static {
    /// Returns `true` if `player` may create a game.
    fn may_host(&self, player: PlayerId) -> bool;
}

/// A gate that admits everyone. The development default.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenGate;

impl HostGate for OpenGate {
    fn may_host(&self, _player: PlayerId) -> bool {
        true
    }
}

/// An in-memory pack provider seeded with the built-in default pack.
#[derive(Debug, Clone)]
pub struct StaticPacks {
    packs: Vec<WordPack>,
}

impl StaticPacks {
    /// Creates a provider over the given packs.
    pub fn new(packs: Vec<WordPack>) -> Self {
        Self { packs }
    }

    /// Adds a pack.
    pub fn insert(&mut self, pack: WordPack) {
        self.packs.push(pack);
    }

    /// The shipped default pack: everyday near-miss pairs.
    pub fn default_pack() -> WordPack {
        WordPack {
            id: PackId(1),
            name: "Food & Drink".into(),
            creator: None,
            is_public: false,
            is_default: true,
            words: vec![
                WordPair::new("matcha", "green tea"),
                WordPair::new("coffee", "espresso"),
                WordPair::new("burger", "sandwich"),
                WordPair::new("pizza", "flatbread"),
                WordPair::new("sushi", "sashimi"),
                WordPair::new("ice cream", "frozen yogurt"),
                WordPair::new("pancake", "waffle"),
                WordPair::new("smoothie", "milkshake"),
                WordPair::new("cheesecake", "sponge cake"),
                WordPair::new("lemonade", "iced tea"),
            ],
        }
    }
}

impl Default for StaticPacks {
    fn default() -> Self {
        Self::new(vec![Self::default_pack()])
    }
}

impl PackProvider for StaticPacks {
    fn fetch(&self, id: PackId) -> Result<WordPack, GameError> {
        self.packs
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(GameError::NoWordPack)
    }

    fn list_visible(&self, viewer: PlayerId) -> Vec<WordPack> {
        self.packs
            .iter()
            .filter(|p| p.is_visible_to(viewer))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_unknown_pack_is_no_word_pack() {
        let packs = StaticPacks::default();
        assert!(matches!(
            packs.fetch(PackId(999)),
            Err(GameError::NoWordPack)
        ));
    }

    #[test]
    fn test_default_pack_is_non_empty() {
        let pack = StaticPacks::default_pack();
        assert!(!pack.words.is_empty());
        assert!(pack.is_default);
    }

    #[test]
    fn test_list_visible_filters_private_packs() {
        let mut packs = StaticPacks::default();
        packs.insert(WordPack {
            id: PackId(2),
            name: "mine".into(),
            creator: Some(PlayerId(5)),
            is_public: false,
            is_default: false,
            words: vec![WordPair::new("a", "b")],
        });

        let mine = packs.list_visible(PlayerId(5));
        assert_eq!(mine.len(), 2);
        let theirs = packs.list_visible(PlayerId(6));
        assert_eq!(theirs.len(), 1);
    }
}
