//! 商品实时搜索

pub mod handler;
pub mod model;
pub mod service;
