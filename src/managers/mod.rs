// BookmarkPro state managers
// Managers own mutable state: the bookmark collection and the sign-in session.

pub mod bookmark_manager;
pub mod session_manager;
