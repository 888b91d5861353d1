/// What the user did with the dialog.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    /// Cancel button, close button or dismissing the dialog.
    Cancel,
    /// The delete button.
    Delete,
}

/// A modal asking the user to confirm deleting an election.
///
/// Responding consumes the dialog, so exactly one of the two callbacks runs,
/// exactly once.
pub struct DeleteConfirmation<'a, C, D> {
    election_name: &'a str,
    on_close: C,
    on_confirm: D,
}

impl<'a, C, D> DeleteConfirmation<'a, C, D>
where
    C: FnOnce(),
    D: FnOnce(),
{
    pub fn new(election_name: &'a str, on_close: C, on_confirm: D) -> Self {
        Self {
            election_name,
            on_close,
            on_confirm,
        }
    }

    pub fn title(&self) -> &'static str {
        "Delete election"
    }

    pub fn prompt(&self) -> String {
        format!(
            "Are you sure you want to delete \"{}\"? This cannot be undone.",
            self.election_name
        )
    }

    pub fn buttons(&self) -> [(&'static str, ConfirmAction); 2] {
        [
            ("Cancel", ConfirmAction::Cancel),
            ("Delete", ConfirmAction::Delete),
        ]
    }

    pub fn respond(self, action: ConfirmAction) {
        match action {
            ConfirmAction::Cancel => (self.on_close)(),
            ConfirmAction::Delete => (self.on_confirm)(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn delete_calls_confirm_once() {
        let closed = Cell::new(0);
        let confirmed = Cell::new(0);
        let dialog = DeleteConfirmation::new(
            "VP Election",
            || closed.set(closed.get() + 1),
            || confirmed.set(confirmed.get() + 1),
        );

        dialog.respond(ConfirmAction::Delete);
        assert_eq!(confirmed.get(), 1);
        assert_eq!(closed.get(), 0);
    }

    #[test]
    fn cancel_calls_close_once() {
        let closed = Cell::new(0);
        let confirmed = Cell::new(0);
        let dialog = DeleteConfirmation::new(
            "VP Election",
            || closed.set(closed.get() + 1),
            || confirmed.set(confirmed.get() + 1),
        );

        dialog.respond(ConfirmAction::Cancel);
        assert_eq!(closed.get(), 1);
        assert_eq!(confirmed.get(), 0);
    }

    #[test]
    fn prompt_names_the_election() {
        let dialog = DeleteConfirmation::new("Student Council", || {}, || {});
        assert!(dialog.prompt().contains("\"Student Council\""));
        assert_eq!(dialog.buttons()[1], ("Delete", ConfirmAction::Delete));
    }
}
