use crate::error::ValidationError;
use crate::plans::Plan;
use clap::ValueEnum;
use crossterm::style::Color;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Colours the page is painted with
pub struct Palette {
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,
    pub accent: Color,
    pub error: Color,
    pub card_front: (u8, u8, u8),
    pub card_side: (u8, u8, u8),
    pub ring: Color,
}

impl Theme {
    pub fn toggle(&mut self) {
        *self = match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        };
    }

    /// Label of the toggle, naming the theme it switches to
    pub fn toggle_label(self) -> &'static str {
        match self {
            Theme::Dark => "Light Mode",
            Theme::Light => "Dark Mode",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Dark => Palette {
                background: Color::Rgb { r: 0, g: 0, b: 0 },
                foreground: Color::Rgb { r: 245, g: 245, b: 245 },
                muted: Color::Rgb { r: 160, g: 160, b: 170 },
                accent: Color::Rgb { r: 255, g: 255, b: 255 },
                error: Color::Rgb { r: 248, g: 113, b: 113 },
                card_front: (92, 92, 104),
                card_side: (40, 40, 48),
                ring: Color::Rgb { r: 120, g: 120, b: 132 },
            },
            Theme::Light => Palette {
                background: Color::Rgb { r: 255, g: 255, b: 255 },
                foreground: Color::Rgb { r: 17, g: 24, b: 39 },
                muted: Color::Rgb { r: 75, g: 85, b: 99 },
                accent: Color::Rgb { r: 0, g: 0, b: 0 },
                error: Color::Rgb { r: 185, g: 28, b: 28 },
                card_front: (214, 214, 220),
                card_side: (150, 150, 160),
                ring: Color::Rgb { r: 60, g: 60, b: 70 },
            },
        }
    }
}

/// Fields of the interest form, in focus order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Field {
    #[default]
    Name,
    Email,
    Phone,
    Plan,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Name, Field::Email, Field::Phone, Field::Plan];

    pub fn next(self) -> Field {
        match self {
            Field::Name => Field::Email,
            Field::Email => Field::Phone,
            Field::Phone => Field::Plan,
            Field::Plan => Field::Name,
        }
    }

    pub fn prev(self) -> Field {
        match self {
            Field::Name => Field::Plan,
            Field::Email => Field::Name,
            Field::Phone => Field::Email,
            Field::Plan => Field::Phone,
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Field::Name => "Full name",
            Field::Email => "Email",
            Field::Phone => "Phone",
            Field::Plan => "Plan",
        }
    }
}

/// Current values of the interest form
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub plan: Plan,
}

impl FormDraft {
    pub fn reset(&mut self) {
        *self = FormDraft::default();
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::Plan => self.plan.label(),
        }
    }

    fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Name => Some(&mut self.name),
            Field::Email => Some(&mut self.email),
            Field::Phone => Some(&mut self.phone),
            Field::Plan => None,
        }
    }

    /// Appends to a text field; the plan field ignores typing
    pub fn push_char(&mut self, field: Field, c: char) {
        if let Some(text) = self.text_mut(field) {
            text.push(c);
        }
    }

    pub fn pop_char(&mut self, field: Field) {
        if let Some(text) = self.text_mut(field) {
            text.pop();
        }
    }

    /// Name and email are required, phone is optional.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(ValidationError::MissingEmail);
        }
        match email.split_once('@') {
            Some((local, domain))
                if !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !email.contains(char::is_whitespace) =>
            {
                Ok(())
            }
            _ => Err(ValidationError::InvalidEmail),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Notice,
    Error,
}

/// Modal message, dismissed by the next key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub text: String,
}

pub type BannerSlot = Rc<RefCell<Option<Banner>>>;

/// Application state
pub struct AppState {
    pub theme: Theme,
    pub draft: FormDraft,
    pub focus: Field,
    /// Debug overlay enabled
    pub debug: bool,
    pub banner: BannerSlot,
}

impl AppState {
    pub fn new(theme: Theme, debug: bool) -> Self {
        AppState {
            theme,
            draft: FormDraft::default(),
            focus: Field::default(),
            debug,
            banner: Rc::new(RefCell::new(None)),
        }
    }

    pub fn show_banner(&self, kind: BannerKind, text: impl Into<String>) {
        *self.banner.borrow_mut() = Some(Banner {
            kind,
            text: text.into(),
        });
    }

    /// Clears the banner, returning whether one was showing
    pub fn dismiss_banner(&self) -> bool {
        self.banner.borrow_mut().take().is_some()
    }

    pub fn banner(&self) -> Option<Banner> {
        self.banner.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, email: &str) -> FormDraft {
        FormDraft {
            name: name.into(),
            email: email.into(),
            ..FormDraft::default()
        }
    }

    #[test]
    fn default_draft_picks_the_first_plan() {
        let draft = FormDraft::default();
        assert_eq!(draft.value(Field::Plan), "Plan One: ₹1500/mo");
        assert!(draft.name.is_empty() && draft.email.is_empty() && draft.phone.is_empty());
    }

    #[test]
    fn reset_restores_defaults() {
        let mut draft = draft("A", "a@b.com");
        draft.plan = Plan::PlanThree;
        draft.reset();
        assert_eq!(draft, FormDraft::default());
    }

    #[test]
    fn validation_requires_name_and_email() {
        assert_eq!(draft("", "a@b.com").validate(), Err(ValidationError::MissingName));
        assert_eq!(draft("  ", "a@b.com").validate(), Err(ValidationError::MissingName));
        assert_eq!(draft("A", "").validate(), Err(ValidationError::MissingEmail));
        assert_eq!(draft("A", "a@b.com").validate(), Ok(()));
    }

    #[test]
    fn validation_rejects_malformed_email() {
        for email in ["ab.com", "@b.com", "a@", "a@b@c", "a b@c.com"] {
            assert_eq!(draft("A", email).validate(), Err(ValidationError::InvalidEmail), "{email}");
        }
    }

    #[test]
    fn typing_into_plan_is_ignored() {
        let mut draft = FormDraft::default();
        draft.push_char(Field::Plan, 'x');
        draft.pop_char(Field::Plan);
        assert_eq!(draft, FormDraft::default());
        draft.push_char(Field::Phone, '9');
        assert_eq!(draft.phone, "9");
    }

    #[test]
    fn theme_toggles_back_and_forth() {
        let mut theme = Theme::default();
        theme.toggle();
        assert_eq!(theme, Theme::Light);
        assert_eq!(theme.toggle_label(), "Dark Mode");
        theme.toggle();
        assert_eq!(theme, Theme::Dark);
    }

    #[test]
    fn focus_order_wraps() {
        assert_eq!(Field::Plan.next(), Field::Name);
        assert_eq!(Field::Name.prev(), Field::Plan);
    }
}
