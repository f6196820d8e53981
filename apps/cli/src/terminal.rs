//! Terminal stand-ins for the document view and the blocking prompts.

use std::{
    io::{self, BufRead, Write},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};

use client_core::{DocumentView, EditForm, Fragment, RecordKind, UserPrompts, ViewState};
use tracing::warn;

/// Fragments go to stdout; everything about the edit surface goes to stderr.
#[derive(Default)]
pub struct TerminalView {
    last_state: Mutex<Option<ViewState>>,
}

impl TerminalView {
    pub fn last_state(&self) -> Option<ViewState> {
        self.last_state.lock().map(|state| *state).unwrap_or(None)
    }
}

impl<K: RecordKind> DocumentView<K> for TerminalView {
    fn replace_items(&self, fragment: &Fragment) {
        if let Ok(mut state) = self.last_state.lock() {
            *state = Some(fragment.state());
        }
        println!("{fragment}");
    }

    fn reset_add_form(&self) {}

    fn show_edit_surface(&self, form: &EditForm<K::Changes>) {
        match serde_json::to_string(&form.fields) {
            Ok(fields) => eprintln!("editing {} {}: {fields}", K::DESCRIPTOR.name, form.id),
            Err(err) => warn!(error = %err, "cannot display edit form"),
        }
    }

    fn hide_edit_surface(&self) {}
}

pub struct TerminalPrompts {
    assume_yes: bool,
    alerted: AtomicBool,
}

impl TerminalPrompts {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            alerted: AtomicBool::new(false),
        }
    }

    pub fn alerted(&self) -> bool {
        self.alerted.load(Ordering::Relaxed)
    }
}

impl UserPrompts for TerminalPrompts {
    fn alert(&self, message: &str) {
        self.alerted.store(true, Ordering::Relaxed);
        eprintln!("error: {message}");
    }

    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        eprint!("{message} [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_affirmative(&answer),
            Err(err) => {
                warn!(error = %err, "could not read confirmation");
                false
            }
        }
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes" | "예" | "네"
    )
}
