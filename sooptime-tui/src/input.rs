use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Screen};

const DATE_INPUT_LEN: usize = 10;

#[derive(Debug, Clone, Copy)]
pub(crate) enum Action {
    None,
    Quit,
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Backspace, Char, Down, Enter, Esc, Left, Right, Up};

    // Global quit shortcuts
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }
    if key.code == Char('q') && key.modifiers.is_empty() {
        return Action::Quit;
    }

    match app.screen {
        Screen::Overview => match key.code {
            Up | Char('k') => {
                if app.list_index > 0 {
                    app.list_index -= 1;
                }
            }
            Down | Char('j') => {
                if app.list_index + 1 < app.pass.len() {
                    app.list_index += 1;
                }
            }
            Left | Char('h') => app.previous_month(),
            Right | Char('l') => app.next_month(),
            Char('0') => app.all_months(),
            Char('t') => app.toggle_today_only(),
            Char('d') => app.begin_date_input(),
            Enter | Char(' ') => app.open_detail(),
            _ => {}
        },

        Screen::Detail => match key.code {
            Left | Esc | Enter | Char('b') => {
                app.screen = Screen::Overview;
            }
            _ => {}
        },

        Screen::DateInput => match key.code {
            Char(character) if character.is_ascii_digit() || character == '-' => {
                if app.date_input.chars().count() < DATE_INPUT_LEN {
                    app.date_input.push(character);
                }
            }
            Backspace => {
                app.date_input.pop();
            }
            Enter => app.apply_date_input(),
            Esc => app.cancel_date_input(),
            _ => {}
        },
    }
    Action::None
}
