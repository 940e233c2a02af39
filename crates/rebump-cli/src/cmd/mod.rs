pub mod bump;
pub mod response;
pub mod run;
pub mod schedule;
pub mod selftest;
