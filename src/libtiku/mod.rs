pub mod cuoti;
pub mod db;
pub mod question;
pub mod scorer;
pub mod session;
pub mod shuffle;
