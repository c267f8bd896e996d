//! Route colors.
//!
//! Colors come round-robin from a fixed palette, indexed by each route's
//! first-occurrence position. Once there are more routes than palette
//! entries, colors repeat.

/// Route palette, ordered so neighbors in the list contrast strongly.
pub const ROUTE_PALETTE: [&str; 20] = [
    "#e6194b", // red
    "#3cb44b", // green
    "#4363d8", // blue
    "#f58231", // orange
    "#911eb4", // purple
    "#42d4f4", // cyan
    "#f032e6", // magenta
    "#bfef45", // lime
    "#fabed4", // pink
    "#469990", // teal
    "#dcbeff", // lavender
    "#9a6324", // brown
    "#ffe119", // yellow
    "#800000", // maroon
    "#aaffc3", // mint
    "#808000", // olive
    "#ffd8b1", // apricot
    "#000075", // navy
    "#a9a9a9", // grey
    "#e6beff", // mauve
];

/// Color for the route at `index`.
#[inline]
pub fn route_color(index: usize) -> &'static str {
    ROUTE_PALETTE[index % ROUTE_PALETTE.len()]
}

/// Pair each folder with its color, preserving input order.
pub fn assign_route_colors<'f, S: AsRef<str>>(folders: &'f [S]) -> Vec<(&'f str, &'static str)> {
    folders
        .iter()
        .enumerate()
        .map(|(i, folder)| (folder.as_ref(), route_color(i)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_palette_is_distinct() {
        let unique: HashSet<&str> = ROUTE_PALETTE.iter().copied().collect();
        assert_eq!(unique.len(), ROUTE_PALETTE.len());
        assert!(ROUTE_PALETTE.len() >= 18);
    }

    #[test]
    fn test_round_robin() {
        let n = ROUTE_PALETTE.len();
        assert_eq!(route_color(0), ROUTE_PALETTE[0]);
        assert_eq!(route_color(n), ROUTE_PALETTE[0]);
        assert_eq!(route_color(n + 3), route_color(3));
    }

    #[test]
    fn test_assign_follows_input_order() {
        let folders = vec!["Z".to_string(), "A".to_string()];
        let colors = assign_route_colors(&folders);
        assert_eq!(colors, vec![("Z", ROUTE_PALETTE[0]), ("A", ROUTE_PALETTE[1])]);
    }
}
