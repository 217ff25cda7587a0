use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single card as read from a table slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub rank: String,
    pub suit: String,
}

impl Card {
    pub fn new(rank: impl Into<String>, suit: impl Into<String>) -> Self {
        Self {
            rank: rank.into(),
            suit: suit.into(),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

/// Cards visible on the table, left to right
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    pub cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a hand label such as `10hQsAd`.
    ///
    /// Each card is a rank (`10` or a single character) followed by a
    /// single suit character.
    pub fn parse(label: &str) -> Result<Self> {
        let mut cards = Vec::new();
        let mut rest = label;

        while !rest.is_empty() {
            let rank_len = if rest.starts_with("10") {
                2
            } else {
                rest.chars().next().map_or(0, char::len_utf8)
            };
            let (rank, tail) = rest.split_at(rank_len);

            let Some(suit) = tail.chars().next() else {
                bail!("Card '{}' in '{}' has no suit", rank, label);
            };
            let (suit, tail) = tail.split_at(suit.len_utf8());

            cards.push(Card::new(rank, suit));
            rest = tail;
        }

        tracing::trace!("Parsed '{}' into {} card(s)", label, cards.len());
        Ok(Self { cards })
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for card in &self.cards {
            write!(f, "{}", card)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hand() {
        let hand = Hand::parse("10hQsAd").unwrap();
        assert_eq!(
            hand.cards,
            vec![Card::new("10", "h"), Card::new("Q", "s"), Card::new("A", "d")]
        );
    }

    #[test]
    fn test_parse_empty() {
        let hand = Hand::parse("").unwrap();
        assert!(hand.is_empty());
    }

    #[test]
    fn test_parse_missing_suit() {
        assert!(Hand::parse("2c10").is_err());
        assert!(Hand::parse("K").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let label = "2c10dJh5s";
        let hand = Hand::parse(label).unwrap();
        assert_eq!(hand.len(), 4);
        assert_eq!(hand.to_string(), label);
    }

    #[test]
    fn test_serialize() {
        let hand = Hand::parse("Ac").unwrap();
        let json = serde_json::to_string(&hand).unwrap();
        assert_eq!(json, r#"{"cards":[{"rank":"A","suit":"c"}]}"#);
    }
}
