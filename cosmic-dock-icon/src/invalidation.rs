// SPDX-License-Identifier: MPL-2.0-only

/// Signal for the host renderer that the icon needs to be painted again.
///
/// `Layout` implies `Redraw`, so merging two pending signals keeps the stronger one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Invalidation {
    /// repaint with the current geometry
    Redraw,
    /// geometry changed, the icon and its active light need to be laid out again
    Layout,
}

impl Invalidation {
    /// merge `other` into a pending signal
    pub fn merge(pending: Option<Self>, other: Self) -> Option<Self> {
        Some(pending.map_or(other, |p| p.max(other)))
    }
}

#[cfg(test)]
mod tests {
    use super::Invalidation;

    #[test]
    fn layout_wins() {
        assert_eq!(Invalidation::merge(None, Invalidation::Redraw), Some(Invalidation::Redraw));
        assert_eq!(
            Invalidation::merge(Some(Invalidation::Layout), Invalidation::Redraw),
            Some(Invalidation::Layout)
        );
        assert_eq!(
            Invalidation::merge(Some(Invalidation::Redraw), Invalidation::Layout),
            Some(Invalidation::Layout)
        );
    }
}
