pub mod choice;
pub mod question;
pub mod user;
pub mod vote;

pub use choice::Entity as Choice;
pub use question::Entity as Question;
pub use user::Entity as User;
pub use vote::Entity as Vote;
