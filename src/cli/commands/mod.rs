pub mod db;
pub mod serve;
