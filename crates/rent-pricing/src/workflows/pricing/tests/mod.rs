mod common;

mod clamp;
mod conversion;
mod engine;
