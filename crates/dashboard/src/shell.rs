//! Tabs, cards and grid placement of the dashboard.
//!
//! Layouts are recomputed from the visible cards on every change and are
//! never stored.

use std::fmt;
use std::str::FromStr;

pub const TAB_NOT_IMPLEMENTED: &str = "Tab not implemented";
pub const CARD_HEIGHT: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Dashboard,
    Charts,
    Portfolio,
    Signals,
    Chat,
    Profile,
}

impl Tab {
    /// Resolves the `tab` query value. Absent or empty means the dashboard;
    /// an unknown name resolves to `None`.
    pub fn resolve(query: Option<&str>) -> Option<Self> {
        match query.map(str::trim) {
            None | Some("") => Some(Self::Dashboard),
            Some(name) => name.parse().ok(),
        }
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dashboard" => Ok(Self::Dashboard),
            "charts" => Ok(Self::Charts),
            "portfolio" => Ok(Self::Portfolio),
            "signals" => Ok(Self::Signals),
            "chat" => Ok(Self::Chat),
            "profile" => Ok(Self::Profile),
            other => Err(format!("unknown tab: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardId {
    Profile,
    Investment,
    Signals,
    TokenSearch,
    TokenDetails,
    Social,
    Performance,
}

impl CardId {
    pub const ALL: [CardId; 7] = [
        Self::Profile,
        Self::Investment,
        Self::Signals,
        Self::TokenSearch,
        Self::TokenDetails,
        Self::Social,
        Self::Performance,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Investment => "investment",
            Self::Signals => "signals",
            Self::TokenSearch => "tokenSearch",
            Self::TokenDetails => "tokenDetails",
            Self::Social => "social",
            Self::Performance => "performance",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Profile => "Agent Profile",
            Self::Investment => "Investment Portfolio",
            Self::Signals => "Trading Signals",
            Self::TokenSearch => "Token Search",
            Self::TokenDetails => "Token Details",
            Self::Social => "Social Presence",
            Self::Performance => "Performance Analytics",
        }
    }

    /// Cards that take the full row in the two-column flow.
    pub fn is_wide(self) -> bool {
        matches!(self, Self::TokenSearch | Self::Performance)
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for CardId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|card| card.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown card: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutItem {
    pub card: CardId,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub min_w: u32,
    pub max_w: Option<u32>,
}

impl LayoutItem {
    fn new(card: CardId, x: u32, y: u32, w: u32, max_w: Option<u32>) -> Self {
        Self {
            card,
            x,
            y,
            w,
            h: CARD_HEIGHT,
            min_w: 1,
            max_w,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardOption {
    pub id: CardId,
    pub visible: bool,
}

/// The card set of the dashboard tab, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardGrid {
    cards: Vec<CardOption>,
}

impl Default for CardGrid {
    fn default() -> Self {
        Self {
            cards: CardId::ALL
                .into_iter()
                .map(|id| CardOption { id, visible: true })
                .collect(),
        }
    }
}

impl CardGrid {
    pub fn toggle(&mut self, id: CardId) {
        if let Some(card) = self.cards.iter_mut().find(|c| c.id == id) {
            card.visible = !card.visible;
        }
    }

    pub fn visible(&self) -> impl Iterator<Item = CardId> + '_ {
        self.cards.iter().filter(|c| c.visible).map(|c| c.id)
    }

    pub fn is_visible(&self, id: CardId) -> bool {
        self.cards.iter().any(|c| c.id == id && c.visible)
    }

    /// Placement of the visible cards for `columns` columns. Only 1, 2 and 3
    /// columns have a layout; any other count yields an empty grid.
    pub fn generate_layout(&self, columns: u32) -> Vec<LayoutItem> {
        match columns {
            3 => three_column_template()
                .into_iter()
                .filter(|item| self.is_visible(item.card))
                .collect(),
            2 => self.two_column_flow(),
            1 => self
                .visible()
                .zip(0u32..)
                .map(|(card, index)| LayoutItem::new(card, 0, index * CARD_HEIGHT, 1, Some(1)))
                .collect(),
            _ => Vec::new(),
        }
    }

    // A wide card that lands in the right column is pushed to the next row
    // but keeps the single-column width it was given.
    fn two_column_flow(&self) -> Vec<LayoutItem> {
        let mut layout = Vec::new();
        let (mut x, mut y) = (0u32, 0u32);

        for card in self.visible() {
            let wide = card.is_wide();
            let width = if wide && x < 1 { 2 } else { 1 };

            if wide && x == 1 {
                x = 0;
                y += CARD_HEIGHT;
            }

            layout.push(LayoutItem::new(card, x, y, width, Some(width)));

            if width == 2 || x == 1 {
                x = 0;
                y += CARD_HEIGHT;
            } else {
                x += 1;
            }
        }
        layout
    }
}

fn three_column_template() -> [LayoutItem; 7] {
    [
        LayoutItem::new(CardId::Profile, 0, 0, 1, Some(1)),
        LayoutItem::new(CardId::Investment, 1, 0, 1, Some(1)),
        LayoutItem::new(CardId::Signals, 2, 0, 1, Some(1)),
        LayoutItem::new(CardId::TokenSearch, 0, 2, 2, None),
        LayoutItem::new(CardId::TokenDetails, 2, 2, 1, Some(1)),
        LayoutItem::new(CardId::Social, 0, 4, 1, Some(1)),
        LayoutItem::new(CardId::Performance, 1, 4, 2, None),
    ]
}

/// Side panels of the chat view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelState {
    pub left: bool,
    pub right: bool,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            left: true,
            right: true,
        }
    }
}

impl PanelState {
    /// Hides both panels if either is shown, otherwise shows both.
    pub fn toggle_both(&mut self) {
        let show = !(self.left || self.right);
        self.left = show;
        self.right = show;
    }
}
