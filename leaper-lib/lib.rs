pub mod autoclose;
pub mod cluster;
pub mod config;
pub mod context;
pub mod controller;
pub mod decoration;
pub mod leap;
pub mod pair;
pub mod selection;
pub mod tracker;
pub mod view;

pub use controller::{
  Controller,
  ControllerError,
  Host,
};
pub use leaper_core::{
  Position,
  TextReplacement,
  TextSource,
};
