mod phone;
mod table;
mod user;

pub use phone::*;
pub use table::*;
pub use user::*;
