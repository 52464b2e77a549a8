//! Mapping of color indices to displayable colors.

const PASTEL: [&str; 10] = [
    "#a1c9f4", "#ffb482", "#8de5a1", "#ff9f9b", "#d0bbff", "#debb9b", "#fab0e4", "#cfcfcf", "#fffea3", "#b9f2f0",
];

/// A sequence of `k` colors, as `#rrggbb` strings.
///
/// When more colors are requested than the base palette provides, the base colors are reused cyclically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<&'static str>,
}

impl Palette {
    pub fn pastel(k: u32) -> Self {
        let colors = PASTEL.iter().copied().cycle().take(k as usize).collect();
        Palette { colors }
    }

    /// Color of index `i`, if `i < k`.
    pub fn color(&self, i: u32) -> Option<&'static str> {
        self.colors.get(i as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}
