//! Screen navigation as a finite-state machine.
//!
//! A front-end drives a `Session` with `Event`s; the session owns the current
//! screen, the chosen role and the signed-in user. Any event that does not
//! apply to the current screen is rejected and leaves the session unchanged.

use serde_json::Value;
use thiserror::Error;

use crate::types::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// Role picker shown at start-up and after logout.
    #[default]
    Options,
    Login(Role),
    Register(Role),
    Dashboard(Role),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    ChooseRole(Role),
    ShowRegister,
    ShowLogin,
    /// The backend accepted a login or registration; carries the `user`
    /// object from the response envelope.
    Authenticated(Value),
    Back,
    Logout,
}

impl Event {
    fn name(&self) -> &'static str {
        match self {
            Event::ChooseRole(_) => "choose-role",
            Event::ShowRegister => "show-register",
            Event::ShowLogin => "show-login",
            Event::Authenticated(_) => "authenticated",
            Event::Back => "back",
            Event::Logout => "logout",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("`{event}` is not valid on the {from:?} screen")]
    InvalidTransition { from: Screen, event: &'static str },

    #[error("signed-in user has role `{actual}` but `{expected}` was selected")]
    RoleMismatch { expected: Role, actual: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    screen: Screen,
    user: Option<Value>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Role chosen on the options screen, if any.
    pub fn role(&self) -> Option<Role> {
        match self.screen {
            Screen::Options => None,
            Screen::Login(role) | Screen::Register(role) | Screen::Dashboard(role) => Some(role),
        }
    }

    pub fn user(&self) -> Option<&Value> {
        self.user.as_ref()
    }

    /// Apply `event`, returning the new screen.
    pub fn apply(&mut self, event: Event) -> Result<Screen, NavigationError> {
        let next = match (self.screen, &event) {
            (Screen::Options, Event::ChooseRole(role)) => Screen::Login(*role),
            (Screen::Login(role), Event::ShowRegister) => Screen::Register(role),
            (Screen::Register(role), Event::ShowLogin) => Screen::Login(role),
            (Screen::Login(_) | Screen::Register(_), Event::Back) => Screen::Options,
            (Screen::Login(role) | Screen::Register(role), Event::Authenticated(user)) => {
                check_role(role, user)?;
                Screen::Dashboard(role)
            }
            (Screen::Dashboard(_), Event::Logout) => Screen::Options,
            (from, event) => {
                return Err(NavigationError::InvalidTransition {
                    from,
                    event: event.name(),
                })
            }
        };

        match event {
            Event::Authenticated(user) => self.user = Some(user),
            Event::Logout => self.user = None,
            _ => {}
        }
        self.screen = next;
        Ok(next)
    }
}

// A user object without a `role` field is accepted as-is.
fn check_role(expected: Role, user: &Value) -> Result<(), NavigationError> {
    match user.get("role").and_then(Value::as_str) {
        Some(actual) if !actual.eq_ignore_ascii_case(expected.as_str()) => {
            Err(NavigationError::RoleMismatch {
                expected,
                actual: actual.to_string(),
            })
        }
        _ => Ok(()),
    }
}
