mod set;
mod term;
mod user;

pub use set::{DEFAULT_CATEGORY, DEFAULT_SET_NAME, FlashcardSet, SetStats};
pub use term::TermRecord;
pub use user::{SetMap, UserAccount, UserDirectory};
