// src/fetch/mod.rs

pub mod directory;
pub mod pages;
