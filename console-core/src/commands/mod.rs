pub mod articles;
pub mod references;
pub mod session;

pub use articles::get_article;
pub use references::load_reference_tables;
pub use session::{cached_user_info, fetch_personal_info, login, logout};
