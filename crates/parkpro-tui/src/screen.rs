//! Screen identifiers, in tab-bar order.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    #[default]
    Register, // 1
    Sessions, // 2
    History,  // 3
}

impl ScreenId {
    pub const ALL: [ScreenId; 3] = [Self::Register, Self::Sessions, Self::History];

    /// Number key that jumps to this screen.
    pub fn number(self) -> u8 {
        match self {
            Self::Register => 1,
            Self::Sessions => 2,
            Self::History => 3,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Register),
            2 => Some(Self::Sessions),
            3 => Some(Self::History),
            _ => None,
        }
    }

    /// Next screen in tab order, wrapping.
    pub fn next(self) -> Self {
        match self {
            Self::Register => Self::Sessions,
            Self::Sessions => Self::History,
            Self::History => Self::Register,
        }
    }

    /// Previous screen in tab order, wrapping.
    pub fn prev(self) -> Self {
        match self {
            Self::Register => Self::History,
            Self::Sessions => Self::Register,
            Self::History => Self::Sessions,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Register => "Register",
            Self::Sessions => "Sessions",
            Self::History => "History",
        }
    }

    /// Whether `/` search applies to this screen.
    pub fn is_searchable(self) -> bool {
        matches!(self, Self::Sessions | Self::History)
    }

    /// For terminals under 60 columns.
    pub fn label_short(self) -> &'static str {
        match self {
            Self::Register => "Reg",
            Self::Sessions => "Sess",
            Self::History => "Hist",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_round_trip() {
        for id in ScreenId::ALL {
            assert_eq!(ScreenId::from_number(id.number()), Some(id));
        }
        assert_eq!(ScreenId::from_number(0), None);
        assert_eq!(ScreenId::from_number(4), None);
    }

    #[test]
    fn tab_order_wraps_both_ways() {
        assert_eq!(ScreenId::History.next(), ScreenId::Register);
        assert_eq!(ScreenId::Register.prev(), ScreenId::History);
        for id in ScreenId::ALL {
            assert_eq!(id.next().prev(), id);
        }
    }
}
