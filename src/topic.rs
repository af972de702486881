//! Topics: the three independently refreshed data feeds.

use bitflags::bitflags;
use std::fmt;

/// One of the ticker's data feeds.
///
/// The declaration order is the order the feeds appear in the ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Topic {
    /// Current conditions, alerts and short forecast.
    Weather,
    /// Index and symbol quotes.
    Market,
    /// Top news headlines.
    Headlines,
}

impl Topic {
    /// Every topic, in ticker order.
    pub const ALL: [Self; 3] = [Self::Weather, Self::Market, Self::Headlines];

    /// Position of this topic in [`Topic::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::Weather => 0,
            Self::Market => 1,
            Self::Headlines => 2,
        }
    }

    /// Lower-case name used in logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Market => "market",
            Self::Headlines => "headlines",
        }
    }

    /// String a feed returns when it has never fetched successfully.
    pub const fn no_data(self) -> &'static str {
        match self {
            Self::Weather => "No Weather Data",
            Self::Market => "No Market Data",
            Self::Headlines => "No Headlines Data",
        }
    }

    /// Ticker text shown before anything was received for this topic.
    pub const fn pending(self) -> &'static str {
        match self {
            Self::Weather => "No weather data yet.",
            Self::Market => "No market data yet.",
            Self::Headlines => "No headlines data yet.",
        }
    }

    /// The single-topic set.
    pub const fn flag(self) -> TopicSet {
        match self {
            Self::Weather => TopicSet::WEATHER,
            Self::Market => TopicSet::MARKET,
            Self::Headlines => TopicSet::HEADLINES,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// A set of topics, e.g. the topics received at least once.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TopicSet: u8 {
        /// Weather feed.
        const WEATHER = 0b0000_0001;
        /// Market feed.
        const MARKET = 0b0000_0010;
        /// Headlines feed.
        const HEADLINES = 0b0000_0100;
    }
}

impl fmt::Debug for TopicSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}
