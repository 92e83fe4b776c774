pub mod entry;
pub mod person;
pub mod registry;
pub mod result;
pub mod role;

pub use entry::LedgerEntry;
pub use person::Person;
pub use registry::PeopleRegistry;
pub use result::SignInOutResult;
pub use role::Role;
