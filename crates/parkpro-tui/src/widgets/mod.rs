//! Small rendering helpers shared by the screens.

pub mod session_table;
pub mod sub_tabs;

use ratatui::layout::Rect;

/// A `width` x `height` rectangle centred in `area`, shrunk to fit.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Move a table selection by `delta` rows, clamped to `len`. `None` when
/// the table is empty.
pub fn step(selected: Option<usize>, len: usize, delta: isize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let current = selected.unwrap_or(0).min(len - 1);
    let next = current.saturating_add_signed(delta).min(len - 1);
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_clamps_to_table() {
        assert_eq!(step(None, 0, 1), None);
        assert_eq!(step(None, 3, 1), Some(1));
        assert_eq!(step(Some(2), 3, 1), Some(2));
        assert_eq!(step(Some(0), 3, -1), Some(0));
        assert_eq!(step(Some(9), 3, -10), Some(0));
        assert_eq!(step(Some(1), 3, 10), Some(2));
    }

    #[test]
    fn centered_fits_inside_area() {
        let area = Rect::new(0, 0, 80, 24);
        let r = centered(area, 40, 10);
        assert_eq!(r, Rect::new(20, 7, 40, 10));

        let tiny = centered(Rect::new(0, 0, 10, 5), 40, 10);
        assert!(tiny.width <= 6 && tiny.height <= 3);
    }
}
