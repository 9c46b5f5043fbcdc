pub mod user;
pub mod note;
pub mod tag;

pub use user::{NewUser, Registration, User, UserUpdate};
pub use note::{NewNote, Note, NoteTagRow, NoteUpdate, NoteWithTags};
pub use tag::{Tag, TagCreate, TagUpdate};
