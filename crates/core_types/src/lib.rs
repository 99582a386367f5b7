use std::fmt;

pub type RequestId = u64;

/// One of the three remote todo documents a button can fetch.
///
/// The set is closed: every variant is bound to exactly one button and no
/// other identifier can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProductId {
    One,
    Two,
    Three,
}

impl ProductId {
    pub const ALL: [ProductId; 3] = [ProductId::One, ProductId::Two, ProductId::Three];

    pub fn number(self) -> u8 {
        match self {
            ProductId::One => 1,
            ProductId::Two => 2,
            ProductId::Three => 3,
        }
    }

    /// Visible button caption.
    pub fn button_label(self) -> &'static str {
        match self {
            ProductId::One => "Button A",
            ProductId::Two => "Button B",
            ProductId::Three => "Button C",
        }
    }

    /// Stable identifier for UI automation. Never localized.
    pub fn accessibility_id(self) -> &'static str {
        match self {
            ProductId::One => "ButtonA",
            ProductId::Two => "ButtonB",
            ProductId::Three => "ButtonC",
        }
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnknownProduct(pub u8);

impl fmt::Display for UnknownProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown product id {}", self.0)
    }
}

impl std::error::Error for UnknownProduct {}

impl TryFrom<u8> for ProductId {
    type Error = UnknownProduct;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ProductId::One),
            2 => Ok(ProductId::Two),
            3 => Ok(ProductId::Three),
            other => Err(UnknownProduct(other)),
        }
    }
}
