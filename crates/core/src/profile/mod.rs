pub mod builtin;
pub mod site;
pub mod table;

pub use builtin::builtin_profiles;
pub use site::{Composition, Matcher, Repair, SiteProfile};
pub use table::ProfileTable;
