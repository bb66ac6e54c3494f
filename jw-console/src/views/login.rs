//! Sign-in form. The only route reachable without a session.

use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::theme;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Username,
    Password,
}

/// What the shell should do after a keystroke.
pub enum LoginAction {
    Submit { username: String, password: String },
    Quit,
}

pub struct LoginView {
    username: String,
    password: String,
    focus: Field,
    submitting: bool,
    error: Option<String>,
}

impl Default for LoginView {
    fn default() -> Self {
        LoginView {
            username: String::new(),
            password: String::new(),
            focus: Field::Username,
            submitting: false,
            error: None,
        }
    }
}

impl LoginView {
    pub fn reset(&mut self) {
        *self = LoginView::default();
    }

    /// Called when the spawned login attempt reports back.
    pub fn fail(&mut self, message: String) {
        self.submitting = false;
        self.error = Some(message);
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Option<LoginAction> {
        if self.submitting {
            return None;
        }
        match code {
            KeyCode::Esc => return Some(LoginAction::Quit),
            KeyCode::Tab | KeyCode::Up | KeyCode::Down => {
                self.focus = match self.focus {
                    Field::Username => Field::Password,
                    Field::Password => Field::Username,
                };
            }
            KeyCode::Enter => {
                if self.username.is_empty() || self.password.is_empty() {
                    self.error = Some("Enter a username and a password".to_string());
                } else {
                    self.submitting = true;
                    self.error = None;
                    return Some(LoginAction::Submit {
                        username: self.username.clone(),
                        password: self.password.clone(),
                    });
                }
            }
            KeyCode::Backspace => {
                match self.focus {
                    Field::Username => self.username.pop(),
                    Field::Password => self.password.pop(),
                };
            }
            KeyCode::Char(c) => match self.focus {
                Field::Username => self.username.push(c),
                Field::Password => self.password.push(c),
            },
            _ => {}
        }
        None
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let backdrop = Block::default().style(Style::default().bg(theme::DEEP_SEA));
        frame.render_widget(backdrop, area);

        let card = centered_rect(48, 12, area);
        let block = Block::default()
            .title(" Jellyfish Warning System ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT));

        let field_line = |label: &str, value: String, focused: bool| {
            let marker = if focused { "> " } else { "  " };
            Line::from(vec![
                Span::styled(marker, Style::default().fg(theme::ACCENT)),
                Span::styled(format!("{label:<10}"), Style::default().fg(theme::MUTED)),
                Span::styled(
                    value,
                    if focused {
                        Style::default().add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    },
                ),
            ])
        };

        let mut lines = vec![
            Line::from(""),
            field_line(
                "Username",
                self.username.clone(),
                self.focus == Field::Username,
            ),
            Line::from(""),
            field_line(
                "Password",
                "*".repeat(self.password.chars().count()),
                self.focus == Field::Password,
            ),
            Line::from(""),
        ];
        if self.submitting {
            lines.push(Line::from(Span::styled(
                "  Signing in...",
                Style::default().fg(theme::ACCENT),
            )));
        } else if let Some(error) = &self.error {
            lines.push(Line::from(Span::styled(
                format!("  {error}"),
                Style::default().fg(theme::DANGER),
            )));
        } else {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "  Tab switch field   Enter sign in   Esc quit",
            Style::default().fg(theme::MUTED),
        )));

        frame.render_widget(Paragraph::new(lines).block(block), card);
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_fills_the_focused_field() {
        let mut view = LoginView::default();
        for c in "admin".chars() {
            view.handle_key(KeyCode::Char(c));
        }
        view.handle_key(KeyCode::Tab);
        for c in "secret".chars() {
            view.handle_key(KeyCode::Char(c));
        }
        view.handle_key(KeyCode::Backspace);

        match view.handle_key(KeyCode::Enter) {
            Some(LoginAction::Submit { username, password }) => {
                assert_eq!(username, "admin");
                assert_eq!(password, "secre");
            }
            _ => panic!("filled form must submit"),
        }
        assert!(view.submitting);
    }

    #[test]
    fn empty_fields_do_not_submit() {
        let mut view = LoginView::default();
        assert!(view.handle_key(KeyCode::Enter).is_none());
        assert!(view.error.is_some());
        assert!(!view.submitting);
    }

    #[test]
    fn keys_are_swallowed_while_submitting() {
        let mut view = LoginView::default();
        view.username = "admin".to_string();
        view.password = "admin".to_string();
        assert!(view.handle_key(KeyCode::Enter).is_some());
        assert!(view.handle_key(KeyCode::Char('x')).is_none());
        assert_eq!(view.username, "admin", "input frozen during the attempt");
    }
}
