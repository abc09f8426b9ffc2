/// Moderation actions on a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Ban,
    Unban,
}
