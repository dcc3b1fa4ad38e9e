use crate::app::actions::Action;
use crate::app::events::{Event, InputEvent};
use crate::app::state::AppState;
use crate::tui::ScreenLayout;
use crate::volume::{Arrow, Input, WheelRegion};
use crossterm::event::{
    self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent,
    MouseEventKind,
};
use tokio::sync::mpsc;

pub fn spawn_input_task(tx: mpsc::Sender<Event>, mouse_enabled: bool) {
    tokio::task::spawn_blocking(move || {
        loop {
            if event::poll(std::time::Duration::from_millis(250)).unwrap_or(false) {
                let ev = match event::read() {
                    Ok(CtEvent::Key(k)) if k.kind == KeyEventKind::Press => InputEvent::Key(k),
                    Ok(CtEvent::Mouse(m)) if mouse_enabled => InputEvent::Mouse(m),
                    Ok(CtEvent::Resize(_, _)) => InputEvent::Resize,
                    Ok(_) => continue,
                    Err(e) => {
                        tracing::debug!(error = %e, "terminal event read failed");
                        continue;
                    }
                };
                if tx.blocking_send(Event::Input(ev)).is_err() {
                    break;
                }
            } else if tx.is_closed() {
                break;
            }
        }
    });
}

pub fn map_input_to_action(state: &AppState, layout: &ScreenLayout, ev: InputEvent) -> Option<Action> {
    match ev {
        InputEvent::Resize => Some(Action::Resize),
        InputEvent::Mouse(m) => map_mouse(state, layout, m),
        InputEvent::Key(k) => map_key(state, k),
    }
}

fn map_key(state: &AppState, k: KeyEvent) -> Option<Action> {
    if state.show_help {
        return match k.code {
            KeyCode::Char('q') => Some(Action::Quit),
            _ => Some(Action::ToggleHelp),
        };
    }
    match k.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),

        // Arrow shortcuts; the controller decides whether they are enabled.
        KeyCode::Up => Some(Action::Volume(Input::Arrow(Arrow::Up))),
        KeyCode::Down => Some(Action::Volume(Input::Arrow(Arrow::Down))),

        KeyCode::Char(' ') => Some(Action::TogglePause),
        KeyCode::Char('l') => Some(Action::FetchLyrics),
        KeyCode::Char('j') => Some(Action::ScrollLyrics(1)),
        KeyCode::Char('k') => Some(Action::ScrollLyrics(-1)),
        KeyCode::PageDown => Some(Action::ScrollLyrics(10)),
        KeyCode::PageUp => Some(Action::ScrollLyrics(-10)),
        KeyCode::Char('?') | KeyCode::F(1) => Some(Action::ToggleHelp),
        _ => None,
    }
}

fn map_mouse(state: &AppState, layout: &ScreenLayout, m: MouseEvent) -> Option<Action> {
    let (col, row) = (m.column, m.row);
    match m.kind {
        MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
            // Wheel-up scrolls "away" from the user, like a negative DOM deltaY.
            let delta_y = if m.kind == MouseEventKind::ScrollUp { -1.0 } else { 1.0 };
            if layout.in_bar(col, row) {
                Some(Action::Volume(Input::Wheel {
                    region: WheelRegion::Bar,
                    delta_y,
                }))
            } else if layout.in_player(col, row) {
                Some(Action::Volume(Input::Wheel {
                    region: WheelRegion::Player,
                    delta_y,
                }))
            } else if layout.in_lyrics(col, row) {
                Some(Action::ScrollLyrics(delta_y as i16))
            } else {
                None
            }
        }
        MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left) => {
            layout.slider_value_at(col, row).map(Action::SliderSet)
        }
        MouseEventKind::Moved => {
            let over = layout.in_bar(col, row);
            (over != state.pointer_over_bar).then_some(Action::PointerOverBar(over))
        }
        _ => None,
    }
}
