mod common;
mod directory;
mod service;
