//! Toolkit-agnostic input handling for the slideshow window.
//!
//! The windowing layer translates raw events into [`InputEvent`]s and applies
//! whatever [`Action`] the dispatch table returns; everything here is plain
//! state so the event-to-action mapping can be tested without a display.

use crate::config::WindowMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    /// `F` or `F11`.
    FullscreenToggle,
    /// `D`.
    DecorationsToggle,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(Key),
    PointerPress,
    PointerMotion,
    CloseRequested,
}

/// What the windowing layer should do in response to an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    EnterFullscreen,
    LeaveFullscreen,
    SetDecorated(bool),
}

/// Window-mode state the dispatch table consults and updates.
#[derive(Debug, Clone)]
pub struct Shell {
    pub mode: WindowMode,
    /// Once the user toggles the mode manually, fullscreen stops acting as a
    /// click-or-keypress-to-quit screensaver.
    pub mode_was_changed: bool,
    pub quit_on_motion: bool,
}

impl Shell {
    pub fn new(mode: WindowMode, quit_on_motion: bool) -> Self {
        Self {
            mode,
            mode_was_changed: false,
            quit_on_motion,
        }
    }

    fn quits_on_any_input(&self) -> bool {
        self.mode == WindowMode::Fullscreen && !self.mode_was_changed
    }

    /// The event-to-action table. Mutates the mode state for toggles and
    /// returns the action the windowing layer must carry out.
    pub fn dispatch(&mut self, event: InputEvent) -> Option<Action> {
        match event {
            InputEvent::CloseRequested => Some(Action::Quit),
            InputEvent::PointerPress => self.quits_on_any_input().then_some(Action::Quit),
            InputEvent::PointerMotion => {
                (self.quit_on_motion && self.quits_on_any_input()).then_some(Action::Quit)
            }
            InputEvent::Key(key) => {
                if self.quits_on_any_input() {
                    return Some(Action::Quit);
                }
                match key {
                    Key::Escape => Some(Action::Quit),
                    Key::FullscreenToggle => {
                        if self.mode == WindowMode::Desktop {
                            return None;
                        }
                        self.mode_was_changed = true;
                        if self.mode == WindowMode::Fullscreen {
                            self.mode = WindowMode::Window;
                            Some(Action::LeaveFullscreen)
                        } else {
                            self.mode = WindowMode::Fullscreen;
                            Some(Action::EnterFullscreen)
                        }
                    }
                    Key::DecorationsToggle => {
                        if self.mode == WindowMode::Undecorated {
                            self.mode = WindowMode::Window;
                            Some(Action::SetDecorated(true))
                        } else {
                            self.mode = WindowMode::Undecorated;
                            Some(Action::SetDecorated(false))
                        }
                    }
                    Key::Other => None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fullscreen_quits_on_any_input() {
        let mut shell = Shell::new(WindowMode::Fullscreen, false);
        assert_eq!(shell.dispatch(InputEvent::PointerPress), Some(Action::Quit));
        assert_eq!(
            shell.dispatch(InputEvent::Key(Key::Other)),
            Some(Action::Quit)
        );
    }

    #[test]
    fn motion_quits_only_when_configured() {
        let mut quiet = Shell::new(WindowMode::Fullscreen, false);
        assert_eq!(quiet.dispatch(InputEvent::PointerMotion), None);

        let mut screensaver = Shell::new(WindowMode::Fullscreen, true);
        assert_eq!(
            screensaver.dispatch(InputEvent::PointerMotion),
            Some(Action::Quit)
        );
    }

    #[test]
    fn windowed_mode_ignores_clicks_but_escape_quits() {
        let mut shell = Shell::new(WindowMode::Window, true);
        assert_eq!(shell.dispatch(InputEvent::PointerPress), None);
        assert_eq!(shell.dispatch(InputEvent::PointerMotion), None);
        assert_eq!(
            shell.dispatch(InputEvent::Key(Key::Escape)),
            Some(Action::Quit)
        );
    }

    #[test]
    fn fullscreen_toggle_disarms_quit_on_input() {
        let mut shell = Shell::new(WindowMode::Window, false);
        assert_eq!(
            shell.dispatch(InputEvent::Key(Key::FullscreenToggle)),
            Some(Action::EnterFullscreen)
        );
        assert_eq!(shell.mode, WindowMode::Fullscreen);
        assert!(shell.mode_was_changed);

        // Manually entered fullscreen no longer quits on arbitrary input.
        assert_eq!(shell.dispatch(InputEvent::PointerPress), None);
        assert_eq!(shell.dispatch(InputEvent::Key(Key::Other)), None);
        assert_eq!(
            shell.dispatch(InputEvent::Key(Key::FullscreenToggle)),
            Some(Action::LeaveFullscreen)
        );
        assert_eq!(shell.mode, WindowMode::Window);
    }

    #[test]
    fn desktop_mode_never_toggles_fullscreen() {
        let mut shell = Shell::new(WindowMode::Desktop, false);
        assert_eq!(shell.dispatch(InputEvent::Key(Key::FullscreenToggle)), None);
        assert!(!shell.mode_was_changed);
    }

    #[test]
    fn decorations_toggle_flips_between_window_and_undecorated() {
        let mut shell = Shell::new(WindowMode::Window, false);
        assert_eq!(
            shell.dispatch(InputEvent::Key(Key::DecorationsToggle)),
            Some(Action::SetDecorated(false))
        );
        assert_eq!(shell.mode, WindowMode::Undecorated);
        assert_eq!(
            shell.dispatch(InputEvent::Key(Key::DecorationsToggle)),
            Some(Action::SetDecorated(true))
        );
        assert_eq!(shell.mode, WindowMode::Window);
    }
}
