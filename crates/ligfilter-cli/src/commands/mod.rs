pub mod count;
pub mod pack;
pub mod query;
pub mod serve;
pub mod worker;
