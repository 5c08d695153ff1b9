//! One-line tab strip used inside a screen (session filters, sort keys).

use ratatui::style::Modifier;
use ratatui::text::{Line, Span};

use crate::theme;

/// The active label is bracketed and highlighted; the rest are dimmed.
pub fn render_sub_tabs<'a>(labels: &[&'a str], active_index: usize) -> Line<'a> {
    let mut spans = Vec::with_capacity(labels.len() * 2);

    for (i, label) in labels.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  ", theme::key_hint()));
        }
        if i == active_index {
            spans.push(Span::styled(
                format!("[{label}]"),
                theme::tab_active().add_modifier(Modifier::UNDERLINED),
            ));
        } else {
            spans.push(Span::styled(*label, theme::tab_inactive()));
        }
    }

    Line::from(spans)
}
