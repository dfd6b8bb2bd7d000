pub mod conversation;
pub mod posting;
pub mod preferences;
pub mod source;
