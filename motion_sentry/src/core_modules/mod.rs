pub mod event;
pub mod merge_engine;
pub mod publisher;
pub mod region;
pub mod region_filter;
pub mod tailer;
pub mod trail;
