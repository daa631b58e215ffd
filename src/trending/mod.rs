pub mod archive;
pub mod audit;
pub mod calendar;
pub mod config;
pub mod fetch;
pub mod index;
pub mod item;
pub mod lock;
pub mod merge;
pub mod paths;
pub mod pipeline;
pub mod render;
pub mod section;
pub mod util;
pub mod warn;
