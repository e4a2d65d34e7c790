//! Selectable force model.

/// Which elastic terms the force pass evaluates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ForceModel {
    /// Link springs plus actuated bending.
    #[default]
    SpringBending,
    /// Link springs only.
    SpringOnly,
    /// No elastic forces; markers are passive tracers.
    Disabled,
}

impl ForceModel {
    /// Whether link springs are evaluated.
    pub fn has_springs(self) -> bool {
        matches!(self, Self::SpringBending | Self::SpringOnly)
    }

    /// Whether the bending kernel is evaluated.
    pub fn has_bending(self) -> bool {
        matches!(self, Self::SpringBending)
    }
}
