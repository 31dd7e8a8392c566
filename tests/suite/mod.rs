mod clock;
mod config;
mod scenarios;
