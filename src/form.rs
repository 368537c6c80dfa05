use crate::state::{Field, FormDraft};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press asked the form to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormCommand {
    /// The draft or focus changed
    Changed,
    Submit,
    OpenSheet,
    Reset,
    Ignored,
}

/// Applies a key press to the draft and focused field.
pub fn handle_key(draft: &mut FormDraft, focus: &mut Field, key: KeyEvent) -> FormCommand {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => FormCommand::Submit,
        KeyCode::Char('o') if ctrl => FormCommand::OpenSheet,
        KeyCode::Char('r') if ctrl => {
            draft.reset();
            *focus = Field::default();
            FormCommand::Reset
        }
        KeyCode::Tab | KeyCode::Down => {
            *focus = focus.next();
            FormCommand::Changed
        }
        KeyCode::BackTab | KeyCode::Up => {
            *focus = focus.prev();
            FormCommand::Changed
        }
        KeyCode::Left if *focus == Field::Plan => {
            draft.plan = draft.plan.prev();
            FormCommand::Changed
        }
        KeyCode::Right | KeyCode::Char(' ') if *focus == Field::Plan => {
            draft.plan = draft.plan.next();
            FormCommand::Changed
        }
        KeyCode::Backspace => {
            draft.pop_char(*focus);
            FormCommand::Changed
        }
        KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
            draft.push_char(*focus, c);
            FormCommand::Changed
        }
        _ => FormCommand::Ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plans::Plan;

    fn press(draft: &mut FormDraft, focus: &mut Field, code: KeyCode) -> FormCommand {
        handle_key(draft, focus, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(draft: &mut FormDraft, focus: &mut Field, c: char) -> FormCommand {
        handle_key(draft, focus, KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    #[test]
    fn typing_fills_the_focused_field() {
        let mut draft = FormDraft::default();
        let mut focus = Field::Name;
        for c in "Asha".chars() {
            press(&mut draft, &mut focus, KeyCode::Char(c));
        }
        press(&mut draft, &mut focus, KeyCode::Tab);
        for c in "a@b.co".chars() {
            press(&mut draft, &mut focus, KeyCode::Char(c));
        }
        press(&mut draft, &mut focus, KeyCode::Backspace);
        assert_eq!(draft.name, "Asha");
        assert_eq!(draft.email, "a@b.c");
        assert_eq!(focus, Field::Email);
    }

    #[test]
    fn arrows_cycle_the_plan_only_when_focused() {
        let mut draft = FormDraft::default();
        let mut focus = Field::Name;
        assert_eq!(press(&mut draft, &mut focus, KeyCode::Right), FormCommand::Ignored);
        assert_eq!(draft.plan, Plan::PlanOne);

        press(&mut draft, &mut focus, KeyCode::BackTab);
        assert_eq!(focus, Field::Plan);
        press(&mut draft, &mut focus, KeyCode::Right);
        assert_eq!(draft.plan, Plan::PlanTwo);
        press(&mut draft, &mut focus, KeyCode::Left);
        press(&mut draft, &mut focus, KeyCode::Left);
        assert_eq!(draft.plan, Plan::PlanThree);
    }

    #[test]
    fn control_keys_become_commands() {
        let mut draft = FormDraft::default();
        let mut focus = Field::Phone;
        draft.phone = "98".into();
        assert_eq!(press(&mut draft, &mut focus, KeyCode::Enter), FormCommand::Submit);
        assert_eq!(ctrl(&mut draft, &mut focus, 'o'), FormCommand::OpenSheet);
        assert_eq!(draft.phone, "98");
        assert_eq!(ctrl(&mut draft, &mut focus, 'x'), FormCommand::Ignored);
        assert_eq!(ctrl(&mut draft, &mut focus, 'r'), FormCommand::Reset);
        assert_eq!(draft, FormDraft::default());
        assert_eq!(focus, Field::Name);
    }
}
