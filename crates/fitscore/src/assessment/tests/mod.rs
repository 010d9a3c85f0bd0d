mod common;
mod intake;
mod measures;
mod performance_age;
