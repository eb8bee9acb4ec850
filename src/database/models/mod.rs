pub mod entry;
pub mod glossary;
pub mod user;

pub use entry::{Entry, EntryChanges, NewEntry};
pub use glossary::{Glossary, NewGlossary};
pub use user::{User, UserIdentity, ROLE_USER};
